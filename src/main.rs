use anyhow::Context;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use collection_vault::config::Config;
use collection_vault::handlers::{
    CloneRequestRequest, CollectionListResponse, CollectionResponse,
    CollectionWithRequestsResponse, CreateCollectionRequest, CreateRequestRequest,
    HealthResponse, ImportResponse, ImportUpload, RequestListResponse, RequestResponse,
    UpdateCollectionRequest, WarningResponse,
};
use collection_vault::state::AppState;
use collection_vault::{build_router, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::collection::create_collection,
        handlers::collection::list_collections,
        handlers::collection::get_collection,
        handlers::collection::get_collection_with_requests,
        handlers::collection::update_collection,
        handlers::collection::delete_collection,
        handlers::collection::import_collection,
        handlers::collection::export_collection,
        handlers::request::create_request,
        handlers::request::list_requests,
        handlers::request::list_collection_requests,
        handlers::request::get_request,
        handlers::request::delete_request,
        handlers::request::update_request_payload,
        handlers::request::update_request_headers,
        handlers::request::update_request_params,
        handlers::request::clone_request,
    ),
    components(schemas(
        HealthResponse,
        CreateCollectionRequest,
        UpdateCollectionRequest,
        CollectionResponse,
        CollectionListResponse,
        CollectionWithRequestsResponse,
        ImportUpload,
        ImportResponse,
        WarningResponse,
        CreateRequestRequest,
        CloneRequestRequest,
        RequestResponse,
        RequestListResponse,
    )),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Collections", description = "Collection management endpoints"),
        (name = "Import/Export", description = "Collection document import and export"),
        (name = "Requests", description = "Request management endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let addr = config.server_addr();

    // Initialize application state (connects to the database, runs migrations)
    tracing::info!("Connecting to database...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!("Database connection established");

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
