use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{CredentialGateway, TokenError};
use crate::error::ApiError;

/// Verify the bearer token carried by the request and return its subject
pub fn authenticate(gateway: &CredentialGateway, headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| TokenError::Invalid))
        .transpose()?;

    let subject = gateway.verify_token(header)?;
    Ok(subject)
}
