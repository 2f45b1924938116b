//! CLI command implementations.

pub mod migrate;
pub mod orders;
pub mod works;

use sqlx::PgPool;
use thiserror::Error;

use atelier_shop::config::{ConfigError, ShopConfig};
use atelier_shop::db::{self, PgStore};
use atelier_shop::services::ServiceError;

/// Errors shared by the commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} invalid entries in catalog file")]
    InvalidCatalog(usize),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Load configuration and connect to the database.
async fn connect() -> Result<PgPool, CommandError> {
    let config = ShopConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    Ok(pool)
}

/// Connect and wrap the pool in the repository implementation.
async fn store() -> Result<PgStore, CommandError> {
    Ok(PgStore::new(connect().await?))
}
