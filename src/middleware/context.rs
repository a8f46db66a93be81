use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Per-request bag filled by the pipeline before the handler runs
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub route: &'static str,
    /// Validated JSON body, present for POST/PUT/PATCH
    pub payload: Option<Value>,
    /// Authenticated user, present for protected routes
    pub subject: Option<String>,
}

impl RequestContext {
    pub fn new(route: &'static str) -> Self {
        Self {
            route,
            payload: None,
            subject: None,
        }
    }

    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let payload = self
            .payload
            .clone()
            .ok_or_else(|| ApiError::unhandled(format!("no validated payload for {}", self.route)))?;
        serde_json::from_value(payload)
            .map_err(|e| ApiError::unhandled(format!("payload for {} did not deserialize: {}", self.route, e)))
    }

    pub fn subject(&self) -> Result<&str, ApiError> {
        self.subject
            .as_deref()
            .ok_or_else(|| ApiError::unhandled(format!("no authenticated subject for {}", self.route)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .remove::<RequestContext>()
            .ok_or_else(|| ApiError::unhandled("request context missing; route is not bound to the pipeline"))
    }
}
