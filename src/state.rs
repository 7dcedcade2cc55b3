use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use sqlx::postgres::PgPool;

use crate::config::Config;
use crate::converter::CollectionConverter;
use crate::services::{CollectionService, RequestService};
use crate::store::{CollectionStore, SeaOrmStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL in production, in-memory in tests)
    pub store: Arc<dyn CollectionStore>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState by connecting to PostgreSQL and running migrations
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        // Connect to PostgreSQL with SQLx (for migrations)
        let pg_pool = PgPool::connect(&config.database_url)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;
        pg_pool.close().await;

        // Connect to PostgreSQL with SeaORM
        let mut opt = ConnectOptions::new(&config.database_url);
        opt.max_connections(config.database_max_connections)
            .min_connections(1)
            .sqlx_logging(true);

        let db = Database::connect(opt)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        Ok(Self::with_store(config, Arc::new(SeaOrmStore::new(db))))
    }

    /// Create AppState around an existing store (for testing)
    pub fn with_store(config: Config, store: Arc<dyn CollectionStore>) -> Self {
        Self { store, config }
    }

    pub fn collection_service(&self) -> CollectionService {
        CollectionService::new(
            self.store.clone(),
            CollectionConverter::from_config(&self.config),
        )
    }

    pub fn request_service(&self) -> RequestService {
        RequestService::new(self.store.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),
}
