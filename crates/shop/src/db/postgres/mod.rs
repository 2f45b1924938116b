//! `PostgreSQL` implementation of the repository traits.
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` rows) so the
//! crate builds without a live database. Rows are converted into domain types
//! through `TryFrom`, and any value that violates a domain invariant surfaces
//! as `RepositoryError::DataCorruption`.

mod carts;
mod orders;
mod works;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use atelier_core::{Price, Quantity, WorkId};

use super::{RepositoryError, Store};
use crate::models::Line;

/// Postgres SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Repository backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Shared row shape for cart and order lines.
#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    work_id: WorkId,
    title: String,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<LineRow> for Line {
    type Error = RepositoryError;

    fn try_from(row: LineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            work_id: row.work_id,
            title: row.title,
            quantity: parse_quantity(row.quantity)?,
            unit_price: parse_price(row.unit_price)?,
        })
    }
}

fn parse_price(amount: Decimal) -> Result<Price, RepositoryError> {
    Price::new(amount)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))
}

fn parse_quantity(quantity: i32) -> Result<Quantity, RepositoryError> {
    Quantity::try_from(quantity)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid quantity in database: {e}")))
}

fn lines_from_rows(rows: Vec<LineRow>) -> Result<Vec<Line>, RepositoryError> {
    rows.into_iter().map(Line::try_from).collect()
}

/// Timestamps come back as `TIMESTAMPTZ`; this alias keeps row structs short.
type Timestamp = DateTime<Utc>;

/// Whether a database error is a numeric overflow (e.g. a quantity past `INTEGER`).
fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE)
    )
}

/// Whether a database error is a foreign key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
