// handlers/cart.rs - /cart handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::CartItemView;
use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::services::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CartItemsRequest {
    pub cart_items: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart_items: Vec<CartItemView>,
}

/// GET /cart
pub async fn get_cart(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<CartResponse>, ApiError> {
    let cart_items = CartService::new(&state).get_cart(ctx.subject()?).await?;
    Ok(Json(CartResponse { cart_items }))
}

/// POST /cart/items - create the user's cart
pub async fn create_cart(State(state): State<AppState>, ctx: RequestContext) -> Result<String, ApiError> {
    let body: CartItemsRequest = ctx.payload_as()?;
    CartService::new(&state)
        .create_cart(ctx.subject()?, body.cart_items)
        .await
}

/// DELETE /cart/items/:item_id
pub async fn delete_cart_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    ctx: RequestContext,
) -> Result<String, ApiError> {
    CartService::new(&state)
        .remove_cart_item(ctx.subject()?, &item_id)
        .await
}

/// DELETE /cart
pub async fn delete_cart(State(state): State<AppState>, ctx: RequestContext) -> Result<String, ApiError> {
    CartService::new(&state).delete_cart(ctx.subject()?).await
}

/// PATCH /cart/items - replace the cart contents
pub async fn add_cart_items(State(state): State<AppState>, ctx: RequestContext) -> Result<String, ApiError> {
    let body: CartItemsRequest = ctx.payload_as()?;
    CartService::new(&state)
        .update_cart_items(ctx.subject()?, body.cart_items)
        .await
}
