use serde::{Deserialize, Serialize};

pub const CART_COLLECTION: &str = "cart";

/// One cart per user; `cart_items` holds catalog item ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: String,
    #[serde(default)]
    pub cart_items: Vec<String>,
}

impl Cart {
    pub fn new(user: impl Into<String>, cart_items: Vec<String>) -> Self {
        Self {
            id: None,
            user: user.into(),
            cart_items,
        }
    }
}

/// A cart entry resolved against the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemView {
    pub item_id: String,
    pub description: String,
    pub price: i64,
}
