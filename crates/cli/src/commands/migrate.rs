//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! atelier-cli migrate
//! ```
//!
//! # Migration Files
//!
//! Migrations live in `crates/shop/migrations/` and are embedded into the
//! binary at compile time:
//! ```text
//! migrations/
//! └── 20261016000001_create_shop_schema.sql
//! ```

use super::{CommandError, connect};

/// Run all pending shop migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../shop/migrations").run(&pool).await?;

    tracing::info!("Shop migrations complete!");
    Ok(())
}
