// handlers/auth.rs - /auth handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: String,
}

/// POST /auth/login - exchange credentials for a token, registering unknown users
pub async fn authenticate(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<TokenResponse>, ApiError> {
    let login: LoginRequest = ctx.payload_as()?;
    let token = AuthService::new(&state).login(&login.user, &login.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// GET /auth - the authenticated user's email
pub async fn get_user(ctx: RequestContext) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse {
        user: ctx.subject()?.to_string(),
    }))
}
