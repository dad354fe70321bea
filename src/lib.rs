pub mod config;
pub mod context;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::database::pool::{create_pool, run_migrations};
use crate::services::catalog_service::CatalogService;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub session_service: SessionService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let session_service = SessionService::new(
            pool.clone(),
            config.jwt_secret.clone(),
            config.session_ttl_hours,
        );

        Self {
            pool,
            config: Arc::new(config),
            session_service,
        }
    }

    /// Opens the store, applies migrations and seeds the catalog when configured to.
    pub async fn initialize(config: Config) -> error::Result<Self> {
        let pool = create_pool(&config).await?;
        run_migrations(&pool).await?;

        if config.seed_catalog && CatalogService::new(pool.clone()).seed_default_catalog().await? {
            tracing::info!("seeded default test catalog");
        }

        Ok(Self::new(pool, config))
    }
}
