//! Catalog queries.

use rust_decimal::Decimal;

use atelier_core::WorkId;

use super::{PgStore, Timestamp, is_foreign_key_violation, parse_price};
use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{NewWork, Work};

#[derive(Debug, sqlx::FromRow)]
struct WorkRow {
    id: WorkId,
    title: String,
    description: String,
    price: Decimal,
    image: String,
    posted_at: Timestamp,
}

impl TryFrom<WorkRow> for Work {
    type Error = RepositoryError;

    fn try_from(row: WorkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: parse_price(row.price)?,
            image: row.image,
            posted_at: row.posted_at,
        })
    }
}

const INSERT_WORK: &str = r"
    INSERT INTO atelier.work (title, description, price, image)
    VALUES ($1, $2, $3, $4)
    RETURNING id, title, description, price, image, posted_at
";

impl CatalogRepository for PgStore {
    async fn create_work(&self, work: &NewWork) -> Result<Work, RepositoryError> {
        let row = sqlx::query_as::<_, WorkRow>(INSERT_WORK)
            .bind(&work.title)
            .bind(&work.description)
            .bind(work.price.amount())
            .bind(&work.image)
            .fetch_one(&self.pool)
            .await?;

        Work::try_from(row)
    }

    async fn create_works(&self, works: &[NewWork]) -> Result<Vec<Work>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(works.len());
        for work in works {
            let row = sqlx::query_as::<_, WorkRow>(INSERT_WORK)
                .bind(&work.title)
                .bind(&work.description)
                .bind(work.price.amount())
                .bind(&work.image)
                .fetch_one(&mut *tx)
                .await?;
            created.push(Work::try_from(row)?);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn get_work(&self, id: WorkId) -> Result<Option<Work>, RepositoryError> {
        let row = sqlx::query_as::<_, WorkRow>(
            r"
            SELECT id, title, description, price, image, posted_at
            FROM atelier.work
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Work::try_from).transpose()
    }

    async fn list_works(&self) -> Result<Vec<Work>, RepositoryError> {
        let rows = sqlx::query_as::<_, WorkRow>(
            r"
            SELECT id, title, description, price, image, posted_at
            FROM atelier.work
            ORDER BY posted_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Work::try_from).collect()
    }

    async fn update_work(&self, id: WorkId, work: &NewWork) -> Result<Work, RepositoryError> {
        let row = sqlx::query_as::<_, WorkRow>(
            r"
            UPDATE atelier.work
            SET title = $2, description = $3, price = $4, image = $5
            WHERE id = $1
            RETURNING id, title, description, price, image, posted_at
            ",
        )
        .bind(id)
        .bind(&work.title)
        .bind(&work.description)
        .bind(work.price.amount())
        .bind(&work.image)
        .fetch_optional(&self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), Work::try_from)
    }

    async fn delete_work(&self, id: WorkId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM atelier.work WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return RepositoryError::Conflict(format!(
                        "work {id} is referenced by placed orders"
                    ));
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
