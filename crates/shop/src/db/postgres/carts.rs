//! Cart queries.
//!
//! Adding to a cart takes a `FOR SHARE` lock on the cart row so that a
//! concurrent checkout (which holds `FOR UPDATE`) cannot copy and clear the
//! cart around a half-finished add. Concurrent adds share the lock and merge
//! through the `(cart_id, work_id)` upsert.

use atelier_core::{CartId, CartItemId, Quantity, UserId, WorkId};

use super::{
    LineRow, PgStore, is_foreign_key_violation, is_numeric_overflow, lines_from_rows,
    parse_quantity,
};
use crate::db::{CartRepository, RepositoryError};
use crate::models::{Cart, CartItem, Line};

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    cart_id: CartId,
    work_id: WorkId,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            cart_id: row.cart_id,
            work_id: row.work_id,
            quantity: parse_quantity(row.quantity)?,
        })
    }
}

impl CartRepository for PgStore {
    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // A separate SELECT sees a cart inserted by a concurrent caller, which a
        // single statement snapshot would not.
        sqlx::query(
            r"
            INSERT INTO atelier.cart (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let cart = sqlx::query_as::<_, Cart>(
            r"
            SELECT id, user_id, created_at
            FROM atelier.cart
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cart)
    }

    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            r"
            SELECT id, user_id, created_at
            FROM atelier.cart
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    async fn add_item(
        &self,
        cart_id: CartId,
        work_id: WorkId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM atelier.cart WHERE id = $1 FOR SHARE")
            .bind(cart_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO atelier.cart_item (cart_id, work_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, work_id)
            DO UPDATE SET quantity = atelier.cart_item.quantity + EXCLUDED.quantity
            RETURNING id, cart_id, work_id, quantity
            ",
        )
        .bind(cart_id)
        .bind(work_id)
        .bind(i32::from(quantity))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                return RepositoryError::NotFound;
            }
            if is_numeric_overflow(&e) {
                return RepositoryError::Conflict(format!(
                    "quantity of work {work_id} exceeds {}",
                    Quantity::MAX
                ));
            }
            RepositoryError::Database(e)
        })?;

        tx.commit().await?;

        CartItem::try_from(row)
    }

    async fn set_quantity(
        &self,
        cart_id: CartId,
        work_id: WorkId,
        quantity: Quantity,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            UPDATE atelier.cart_item
            SET quantity = $3
            WHERE cart_id = $1 AND work_id = $2
            RETURNING id, cart_id, work_id, quantity
            ",
        )
        .bind(cart_id)
        .bind(work_id)
        .bind(i32::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartItem::try_from).transpose()
    }

    async fn remove_item(&self, cart_id: CartId, work_id: WorkId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM atelier.cart_item
            WHERE cart_id = $1 AND work_id = $2
            ",
        )
        .bind(cart_id)
        .bind(work_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn cart_lines(&self, cart_id: CartId) -> Result<Vec<Line>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT ci.work_id, w.title, ci.quantity, w.price AS unit_price
            FROM atelier.cart_item ci
            JOIN atelier.work w ON w.id = ci.work_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id ASC
            ",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        lines_from_rows(rows)
    }
}
