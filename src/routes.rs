use std::any::Any;

use axum::{
    extract::State,
    http::{Method, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers::{auth, cart, catalog, health};
use crate::middleware::{log_request, request_pipeline, RouteBinding, RouteSpec};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = if state.config.security.enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(auth_routes(&state))
        .merge(cart_routes(&state))
        .merge(catalog_routes(&state))
        .route(
            "/health",
            path(vec![bind(&state, RouteSpec::public("health"), get(health::health))]),
        )
        .fallback(unknown_route)
        // Global middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/auth/login",
            path(vec![bind(
                state,
                RouteSpec::public("authentication.authenticate"),
                post(auth::authenticate),
            )]),
        )
        .route(
            "/auth",
            path(vec![bind(
                state,
                RouteSpec::protected("authentication.get_user"),
                get(auth::get_user),
            )]),
        )
}

fn cart_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            path(vec![
                bind(state, RouteSpec::protected("cart.get_cart"), get(cart::get_cart)),
                bind(state, RouteSpec::protected("cart.delete_cart"), delete(cart::delete_cart)),
            ]),
        )
        .route(
            "/cart/items",
            path(vec![
                bind(state, RouteSpec::protected("cart.create_cart"), post(cart::create_cart)),
                bind(state, RouteSpec::protected("cart.add_cart_items"), patch(cart::add_cart_items)),
            ]),
        )
        .route(
            "/cart/items/:item_id",
            path(vec![bind(
                state,
                RouteSpec::protected("cart.delete_cart_item"),
                delete(cart::delete_cart_item),
            )]),
        )
}

fn catalog_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/catalog",
        path(vec![
            bind(state, RouteSpec::public("catalog.get_catalog"), get(catalog::get_catalog)),
            bind(state, RouteSpec::protected("catalog.create_catalog"), post(catalog::create_catalog)),
        ]),
    )
}

/// Wrap one method handler in the request pipeline for its route
fn bind(state: &AppState, spec: RouteSpec, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    tracing::debug!("Binding route {} (auth required: {})", spec.name, spec.requires_auth);
    let binding = RouteBinding::new(state.clone(), spec);
    route.route_layer(middleware::from_fn_with_state(binding, request_pipeline))
}

/// Combine the bound methods of one path; other methods are unknown routes
fn path(methods: Vec<MethodRouter<AppState>>) -> MethodRouter<AppState> {
    methods
        .into_iter()
        .fold(MethodRouter::new(), MethodRouter::merge)
        .fallback(unknown_route)
}

async fn unknown_route(State(state): State<AppState>, method: Method, uri: Uri) -> ApiError {
    let logging = state.config.api.enable_request_logging;
    log_request(logging, format_args!("Received {} request to: {}", method, uri));
    log_request(logging, format_args!("Returning response for {} {}", method, uri));
    ApiError::unknown_route()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::unhandled(detail).into_response()
}
