pub mod auth;
pub mod context;
pub mod pipeline;
pub mod response;

pub use auth::authenticate;
pub use context::RequestContext;
pub use pipeline::{log_request, request_pipeline, RouteBinding, RouteSpec};
pub use response::finalize_response;
