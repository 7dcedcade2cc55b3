// Library crate for CollectionVault
// Exports modules for use by the server binary and tests

pub mod config;
pub mod converter;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    clone_request, create_collection, create_request, delete_collection, delete_request,
    export_collection, get_collection, get_collection_with_requests, get_request, health,
    import_collection, list_collection_requests, list_collections, list_requests,
    update_collection, update_request_headers, update_request_params, update_request_payload,
};
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let api_routes = Router::new()
        // Collection routes
        .route(
            "/collections",
            get(list_collections).post(create_collection),
        )
        .route("/collections/import", post(import_collection))
        .route(
            "/collections/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route(
            "/collections/{id}/with-requests",
            get(get_collection_with_requests),
        )
        .route("/collections/{id}/export", get(export_collection))
        .route("/collections/{id}/requests", get(list_collection_requests))
        // Request routes
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/{id}", get(get_request).delete(delete_request))
        .route("/requests/{id}/payload", put(update_request_payload))
        .route("/requests/{id}/headers", put(update_request_headers))
        .route("/requests/{id}/params", put(update_request_params))
        .route("/requests/{id}/clone", post(clone_request));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
