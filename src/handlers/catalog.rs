// handlers/catalog.rs - /catalog handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::{CatalogItem, CatalogItemView};
use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::services::CatalogService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCatalogItem {
    pub item_name: String,
    pub description: Option<String>,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCatalogRequest {
    pub items: Vec<NewCatalogItem>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub items: Vec<CatalogItemView>,
}

#[derive(Debug, Serialize)]
pub struct CreatedItemsResponse {
    pub items: Vec<String>,
}

/// GET /catalog
pub async fn get_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, ApiError> {
    let items = CatalogService::new(&state).get_catalog().await?;
    Ok(Json(CatalogResponse { items }))
}

/// POST /catalog - add items; names must be new
pub async fn create_catalog(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<CreatedItemsResponse>, ApiError> {
    let body: CreateCatalogRequest = ctx.payload_as()?;
    let items = body
        .items
        .into_iter()
        .map(|item| CatalogItem {
            id: None,
            item_name: item.item_name,
            description: item.description,
            price: item.price,
        })
        .collect();

    let items = CatalogService::new(&state).create_items(items).await?;
    Ok(Json(CreatedItemsResponse { items }))
}
