pub mod types;
pub mod filter_where;
pub mod update;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter_where::Filter;
pub use update::Update;
