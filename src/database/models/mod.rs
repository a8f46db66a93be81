pub mod cart;
pub mod catalog;
pub mod user;

pub use cart::{Cart, CartItemView, CART_COLLECTION};
pub use catalog::{CatalogItem, CatalogItemView, CATALOG_COLLECTION};
pub use user::{UserRecord, USER_COLLECTION};
