use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::schema::{SchemaError, SchemaId, SchemaRegistry};

/// Normalize a successful handler response to JSON and check it against the
/// route's response schema. Non-200 responses pass through untouched.
///
/// Schema problems on the way out are logged, never returned to the client.
pub async fn finalize_response(
    schemas: &SchemaRegistry,
    schema_id: &SchemaId,
    response: Response,
) -> Response {
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let value = match read_json(&parts.headers, body).await {
        Ok(value) => value,
        Err(err) => return err.into_response(),
    };

    match schemas.check(schema_id, &value) {
        Ok(()) => {}
        Err(SchemaError::Violation { violations, .. }) => {
            tracing::warn!("Server returned an invalid response: {}: {}", schema_id, violations);
        }
        Err(_) => {
            tracing::warn!("Missing schema for response: {}", schema_id);
        }
    }

    Json(value).into_response()
}

/// JSON bodies are parsed as-is; anything else is wrapped as `{"message": text}`
async fn read_json(headers: &HeaderMap, body: Body) -> Result<Value, ApiError> {
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ApiError::unhandled(format!("failed to read response body: {}", e)))?;

    if is_json(headers) {
        if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
            return Ok(value);
        }
    }

    let text = String::from_utf8_lossy(&bytes);
    Ok(json!({ "message": text }))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}
