use axum::{
    middleware,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::{openapi, origin, pages, products, state::ServerState};

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public routes, the product pages and static assets
pub fn build_router(state: ServerState, cors: CorsLayer, static_dir: &str) -> Router {
    // Public routes (health + API document)
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    // Product pages; identity is checked per handler by the CurrentUser extractor
    let pages = Router::new()
        .route("/products", get(products::index).post(products::store))
        .route("/products/create", get(products::create))
        .route(
            "/products/:id",
            axum::routing::put(products::update)
                .delete(products::destroy)
                .post(products::spoofed),
        )
        .route("/products/:id/edit", get(products::edit))
        .route_layer(middleware::from_fn_with_state(state.clone(), pages::check_version))
        .route_layer(middleware::from_fn_with_state(state.clone(), origin::require_same_origin));

    public
        .merge(pages)
        .nest_service("/assets", ServeDir::new(static_dir))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
