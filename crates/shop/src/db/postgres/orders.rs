//! Order queries.
//!
//! Status values travel as text and are cast to `atelier.order_status` in SQL,
//! so no custom type mapping is registered with sqlx.

use atelier_core::{CartId, OrderId, OrderStatus, Quantity, UserId, WorkId};

use super::{LineRow, PgStore, Timestamp, lines_from_rows};
use crate::db::{OrderRepository, RepositoryError};
use crate::models::{Line, Order, StatusChange};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: String,
    created_at: Timestamp,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusChangeRow {
    order_id: OrderId,
    from_status: String,
    to_status: String,
    changed_at: Timestamp,
}

impl TryFrom<StatusChangeRow> for StatusChange {
    type Error = RepositoryError;

    fn try_from(row: StatusChangeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: row.order_id,
            from_status: parse_status(&row.from_status)?,
            to_status: parse_status(&row.to_status)?,
            changed_at: row.changed_at,
        })
    }
}

fn parse_status(value: &str) -> Result<OrderStatus, RepositoryError> {
    value
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))
}

const INSERT_ORDER: &str = r"
    INSERT INTO atelier.customer_order (user_id)
    VALUES ($1)
    RETURNING id, user_id, status::text AS status, created_at
";

impl OrderRepository for PgStore {
    async fn create_order(
        &self,
        user_id: UserId,
        items: &[(WorkId, Quantity)],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(INSERT_ORDER)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        for (work_id, quantity) in items {
            // Copies the current price; no row means the work does not exist.
            let inserted = sqlx::query(
                r"
                INSERT INTO atelier.order_item (order_id, work_id, quantity, unit_price)
                SELECT $1, w.id, $3, w.price
                FROM atelier.work w
                WHERE w.id = $2
                ",
            )
            .bind(row.id)
            .bind(*work_id)
            .bind(i32::from(*quantity))
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;

        Order::try_from(row)
    }

    async fn checkout_cart(
        &self,
        user_id: UserId,
        cart_id: CartId,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query(
            r"
            SELECT id FROM atelier.cart
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            ",
        )
        .bind(cart_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        // Lock the lines so quantity edits wait for the checkout to finish.
        let item_ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM atelier.cart_item
            WHERE cart_id = $1
            ORDER BY id
            FOR UPDATE
            ",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;
        if item_ids.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, OrderRow>(INSERT_ORDER)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO atelier.order_item (order_id, work_id, quantity, unit_price)
            SELECT $1, ci.work_id, ci.quantity, w.price
            FROM atelier.cart_item ci
            JOIN atelier.work w ON w.id = ci.work_id
            WHERE ci.cart_id = $2
            ORDER BY ci.id
            ",
        )
        .bind(row.id)
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM atelier.cart_item WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Order::try_from(row).map(Some)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status::text AS status, created_at
            FROM atelier.customer_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status::text AS status, created_at
            FROM atelier.customer_order
            WHERE user_id = $1 AND status <> 'deleted'
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn order_lines(&self, id: OrderId) -> Result<Vec<Line>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT oi.work_id, w.title, oi.quantity, oi.unit_price
            FROM atelier.order_item oi
            JOIN atelier.work w ON w.id = oi.work_id
            WHERE oi.order_id = $1
            ORDER BY oi.id ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        lines_from_rows(rows)
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE atelier.customer_order
            SET status = $3::atelier.order_status
            WHERE id = $1 AND status = $2::atelier.order_status
            ",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r"
            INSERT INTO atelier.order_status_change (order_id, from_status, to_status)
            VALUES ($1, $2::atelier.order_status, $3::atelier.order_status)
            ",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn status_history(&self, id: OrderId) -> Result<Vec<StatusChange>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusChangeRow>(
            r"
            SELECT order_id,
                   from_status::text AS from_status,
                   to_status::text AS to_status,
                   changed_at
            FROM atelier.order_status_change
            WHERE order_id = $1
            ORDER BY changed_at ASC, id ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatusChange::try_from).collect()
    }
}
