use std::sync::Arc;

use axum_test::TestServer;
use collection_vault::build_router;
use collection_vault::config::{Config, FolderLayout};
use collection_vault::state::AppState;
use collection_vault::store::InMemoryStore;

/// Test configuration
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused-in-tests".to_string(),
        database_max_connections: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        log_json: false,
        max_import_depth: 32,
        max_upload_bytes: 1024 * 1024,
        folder_layout: FolderLayout::Nested,
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom configuration
    pub async fn with_config(config: Config) -> Self {
        // InMemoryStore keeps the HTTP tests independent of PostgreSQL
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::with_store(config, store);

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state }
    }
}
