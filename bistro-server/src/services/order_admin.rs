//! Back-office order management

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderDetail};
use shared::order::{OrderListQuery, OrderStats, OrderStatus, TransitionPolicy};
use shared::request::UpdateStatusRequest;

use crate::db::Store;

fn order_not_found(order_id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
        .with_detail("order_id", order_id)
}

/// Orders with items and payments, filtered and sorted
pub async fn list_orders(
    store: &dyn Store,
    query: &OrderListQuery,
) -> Result<Vec<OrderDetail>, AppError> {
    let orders = store.list_orders().await?;
    Ok(query.apply(orders))
}

/// Dashboard counters over every order
pub async fn order_stats(store: &dyn Store) -> Result<OrderStats, AppError> {
    let orders = store.list_orders().await?;
    Ok(OrderStats::compute(&orders))
}

/// Change an order's status under the configured transition policy
///
/// The write is a compare-and-set against the status that was checked, so a
/// concurrent change between check and write is reported instead of
/// silently overwritten.
pub async fn set_status(
    store: &dyn Store,
    policy: &TransitionPolicy,
    order_id: i64,
    req: &UpdateStatusRequest,
) -> Result<Order, AppError> {
    let target: OrderStatus = req
        .status
        .as_deref()
        .ok_or_else(|| AppError::required("status"))?
        .parse()?;

    let current = store
        .find_order(order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    policy.check(current.status, target)?;

    match store
        .update_order_status(order_id, current.status, target)
        .await?
    {
        Some(order) => {
            tracing::info!(
                order_id,
                from = %current.status,
                to = %target,
                "Order status changed"
            );
            Ok(order)
        }
        None => match store.find_order(order_id).await? {
            None => Err(order_not_found(order_id)),
            Some(now) => Err(AppError::with_message(
                ErrorCode::OrderTransitionNotAllowed,
                format!("Order {order_id} changed to {} concurrently", now.status),
            )
            .with_detail("from", now.status.as_str())
            .with_detail("to", target.as_str())),
        },
    }
}

/// Irreversibly delete an order with its items and payments
pub async fn delete_order(store: &dyn Store, order_id: i64, confirm: bool) -> Result<(), AppError> {
    if !confirm {
        return Err(AppError::with_message(
            ErrorCode::ConfirmationRequired,
            "Deleting an order is irreversible; repeat with confirm=true",
        )
        .with_detail("field", "confirm"));
    }
    if !store.delete_order(order_id).await? {
        return Err(order_not_found(order_id));
    }
    tracing::warn!(order_id, "Order deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::orders::submit_order;
    use rust_decimal::Decimal;
    use shared::models::CustomerContact;
    use shared::request::{OrderLineRequest, SubmitOrderRequest};

    async fn seeded_order(store: &MemoryStore) -> Order {
        let item = store.seed_menu_item("Soup", Decimal::new(500, 2), None);
        let req = SubmitOrderRequest::new(
            CustomerContact::new("cy@example.com"),
            vec![OrderLineRequest::new(item.item_id, 1)],
        );
        submit_order(store, "u1", req, None).await.unwrap().order
    }

    #[tokio::test]
    async fn test_set_status_any_policy() {
        let store = MemoryStore::new();
        let order = seeded_order(&store).await;
        let policy = TransitionPolicy::any();

        let done = set_status(
            &store,
            &policy,
            order.order_id,
            &UpdateStatusRequest::new(OrderStatus::Completed),
        )
        .await
        .unwrap();
        assert_eq!(done.status, OrderStatus::Completed);

        let back = set_status(
            &store,
            &policy,
            order.order_id,
            &UpdateStatusRequest::new(OrderStatus::Pending),
        )
        .await
        .unwrap();
        assert_eq!(back.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_set_status_errors() {
        let store = MemoryStore::new();
        let order = seeded_order(&store).await;
        let policy = TransitionPolicy::lifecycle();

        let err = set_status(
            &store,
            &policy,
            order.order_id,
            &UpdateStatusRequest::new(OrderStatus::Delivered),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderTransitionNotAllowed);

        let err = set_status(&store, &policy, order.order_id, &UpdateStatusRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);

        let err = set_status(
            &store,
            &policy,
            order.order_id,
            &UpdateStatusRequest {
                status: Some("lost".into()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderStatusInvalid);

        let err = set_status(
            &store,
            &policy,
            9_999,
            &UpdateStatusRequest::new(OrderStatus::Preparing),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let store = MemoryStore::new();
        let order = seeded_order(&store).await;

        let err = delete_order(&store, order.order_id, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfirmationRequired);
        assert_eq!(store.order_count(), 1);

        delete_order(&store, order.order_id, true).await.unwrap();
        assert_eq!(store.order_count(), 0);

        let err = delete_order(&store, order.order_id, true).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = MemoryStore::new();
        seeded_order(&store).await;
        let stats = order_stats(&store).await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.pending, 1);
    }
}
