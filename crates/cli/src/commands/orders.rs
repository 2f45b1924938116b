//! Order management commands.

use atelier_core::{OrderId, OrderStatus};
use atelier_shop::services::{OrderService, ServiceError};

use super::{CommandError, store};

/// Move an order to a new status, enforcing the lifecycle.
///
/// # Errors
///
/// Returns `CommandError::Service` for an unknown status, a missing order or a
/// transition the lifecycle does not allow.
pub async fn set_status(order_id: OrderId, status: &str) -> Result<(), CommandError> {
    let next: OrderStatus = status.trim().parse().map_err(ServiceError::from)?;

    let store = store().await?;
    let order = OrderService::new(&store)
        .transition_status(order_id, next)
        .await?;

    tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
    Ok(())
}
