use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::info;

use super::{auth::authenticate, context::RequestContext, response::finalize_response};
use crate::error::ApiError;
use crate::schema::{Direction, SchemaError, SchemaId};
use crate::state::AppState;

/// What the pipeline needs to know about a route, fixed at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// Fully-qualified route name, e.g. `cart.create_cart`
    pub name: &'static str,
    pub request_schema: SchemaId,
    pub response_schema: SchemaId,
    pub requires_auth: bool,
}

impl RouteSpec {
    fn new(name: &'static str, requires_auth: bool) -> Self {
        Self {
            name,
            request_schema: SchemaId::new(Direction::Request, name),
            response_schema: SchemaId::new(Direction::Response, name),
            requires_auth,
        }
    }

    pub fn public(name: &'static str) -> Self {
        Self::new(name, false)
    }

    pub fn protected(name: &'static str) -> Self {
        Self::new(name, true)
    }
}

/// Layer state: the shared app state plus the bound `RouteSpec`
#[derive(Debug, Clone)]
pub struct RouteBinding {
    pub state: AppState,
    pub spec: Arc<RouteSpec>,
}

impl RouteBinding {
    pub fn new(state: AppState, spec: RouteSpec) -> Self {
        Self {
            state,
            spec: Arc::new(spec),
        }
    }
}

fn expects_payload(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Wraps a single route: payload validation and authentication before the
/// handler, response normalization and schema checking after it.
pub async fn request_pipeline(
    State(binding): State<RouteBinding>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let logging = binding.state.config.api.enable_request_logging;
    log_request(logging, format_args!("Received {} request to: {}", method, uri));

    let response = match prepare(&binding, request).await {
        Ok(request) => {
            let response = next.run(request).await;
            finalize_response(&binding.state.schemas, &binding.spec.response_schema, response).await
        }
        Err(err) => err.into_response(),
    };

    log_request(logging, format_args!("Returning response for {} {}", method, uri));
    response
}

/// Per-request receipt and return lines; debug level when request logging is off
pub fn log_request(enabled: bool, message: std::fmt::Arguments<'_>) {
    if enabled {
        info!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}

async fn prepare(binding: &RouteBinding, request: Request) -> Result<Request, ApiError> {
    let spec = &binding.spec;
    let state = &binding.state;
    let mut context = RequestContext::new(spec.name);

    let (parts, body) = request.into_parts();

    let body = if expects_payload(&parts.method) {
        let bytes = to_bytes(body, state.config.api.max_request_size_bytes)
            .await
            .map_err(|e| {
                tracing::debug!("Failed to read request body: {}", e);
                ApiError::invalid_json()
            })?;

        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            info!("Request body for {} is not JSON: {}", spec.name, e);
            ApiError::invalid_json()
        })?;

        let payload = state
            .schemas
            .validate(&spec.request_schema, payload)
            .map_err(|err| match err {
                SchemaError::Violation { violations, .. } => {
                    let message = format!(
                        "Schema violation for API: {}, errors: {}",
                        parts.uri.path(),
                        violations
                    );
                    info!("{}", message);
                    ApiError::schema_violation(message)
                }
                other => ApiError::unhandled(other.to_string()),
            })?;

        context.payload = Some(payload);
        Body::from(bytes)
    } else {
        body
    };

    if spec.requires_auth {
        context.subject = Some(authenticate(&state.gateway, &parts.headers)?);
    }

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(context);
    Ok(request)
}
