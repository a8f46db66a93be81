use serde::{Deserialize, Serialize};

use super::cart::CartItemView;

pub const CATALOG_COLLECTION: &str = "catalog";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
}

/// Catalog entry as returned to clients: `_id` exposed as `item_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItemView {
    pub item_id: String,
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
}

impl CatalogItem {
    /// `None` for items that were never stored
    pub fn into_view(self) -> Option<CatalogItemView> {
        Some(CatalogItemView {
            item_id: self.id?,
            item_name: self.item_name,
            description: self.description,
            price: self.price,
        })
    }

    pub fn to_cart_item(&self) -> Option<CartItemView> {
        Some(CartItemView {
            item_id: self.id.clone()?,
            description: self.description.clone().unwrap_or_default(),
            price: self.price,
        })
    }
}
