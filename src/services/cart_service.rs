use std::collections::{HashMap, HashSet};

use crate::database::models::{
    Cart, CartItemView, CatalogItem, CART_COLLECTION, CATALOG_COLLECTION,
};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::{Filter, Update};
use crate::state::AppState;

pub struct CartService {
    carts: Repository<Cart>,
    catalog: Repository<CatalogItem>,
}

fn owned_by(user: &str) -> Filter {
    Filter::all().eq("user", user)
}

impl CartService {
    pub fn new(state: &AppState) -> Self {
        Self {
            carts: Repository::new(CART_COLLECTION, state.db.clone()),
            catalog: Repository::new(CATALOG_COLLECTION, state.db.clone()),
        }
    }

    /// Cart entries resolved against the catalog, in cart order
    pub async fn get_cart(&self, user: &str) -> Result<Vec<CartItemView>, ApiError> {
        let cart = self
            .carts
            .find_one(&owned_by(user))
            .await
            .ok_or_else(|| ApiError::not_found("Cart not found"))?;

        if cart.cart_items.is_empty() {
            return Ok(Vec::new());
        }

        let items = self
            .catalog
            .find_all(&Filter::all().is_in("_id", cart.cart_items.iter().cloned()))
            .await
            .ok_or_else(|| ApiError::internal_server_error("Failed to get catalog"))?;
        let by_id: HashMap<&str, &CatalogItem> = items
            .iter()
            .filter_map(|item| item.id.as_deref().map(|id| (id, item)))
            .collect();

        Ok(cart
            .cart_items
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).and_then(|item| item.to_cart_item()))
            .collect())
    }

    /// Carts may only reference catalog items
    async fn check_items_exist(&self, cart_items: &[String]) -> Result<(), ApiError> {
        if cart_items.is_empty() {
            return Ok(());
        }

        let known: HashSet<String> = self
            .catalog
            .find_all(&Filter::all().is_in("_id", cart_items.iter().cloned()))
            .await
            .ok_or_else(|| ApiError::internal_server_error("Failed to get catalog"))?
            .into_iter()
            .filter_map(|item| item.id)
            .collect();

        let mut unknown: Vec<&str> = Vec::new();
        for id in cart_items {
            if !known.contains(id) && !unknown.contains(&id.as_str()) {
                unknown.push(id);
            }
        }
        if !unknown.is_empty() {
            return Err(ApiError::bad_request(format!("Unknown cart items: {:?}", unknown)));
        }
        Ok(())
    }

    pub async fn create_cart(&self, user: &str, cart_items: Vec<String>) -> Result<String, ApiError> {
        if self.carts.find_one(&owned_by(user)).await.is_some() {
            return Err(ApiError::bad_request("User already has a cart"));
        }
        self.check_items_exist(&cart_items).await?;

        self.carts
            .insert_one(&Cart::new(user, cart_items))
            .await
            .ok_or_else(|| ApiError::internal_server_error("Failed to create user cart"))?;
        Ok("cart successfully created".to_string())
    }

    pub async fn remove_cart_item(&self, user: &str, item_id: &str) -> Result<String, ApiError> {
        let update = Update::new().pull("cart_items", item_id);
        if self.carts.update_one(&owned_by(user), &update).await == 0 {
            return Err(ApiError::not_found("Cart item was not found"));
        }
        Ok("cart item successfully removed".to_string())
    }

    pub async fn delete_cart(&self, user: &str) -> Result<String, ApiError> {
        if self.carts.delete_one(&owned_by(user)).await == 0 {
            return Err(ApiError::not_found("User cart does not exist"));
        }
        Ok("cart was successfully deleted".to_string())
    }

    /// Replace the cart contents
    pub async fn update_cart_items(&self, user: &str, cart_items: Vec<String>) -> Result<String, ApiError> {
        self.check_items_exist(&cart_items).await?;
        let update = Update::new().set("cart_items", cart_items);
        if self.carts.update_one(&owned_by(user), &update).await == 0 {
            return Err(ApiError::not_found("User cart does not exist"));
        }
        Ok("cart items was successfully updated".to_string())
    }
}
