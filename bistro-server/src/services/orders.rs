//! Order submission
//!
//! Validation and pricing run before anything is written, so a rejected
//! request leaves no customer, order, item or payment behind.

use shared::error::AppError;
use shared::models::{Order, OrderDetail, PaymentMethod};
use shared::order::OrderStatus;
use shared::request::SubmitOrderRequest;

use super::customers::CustomerRef;
use super::pricing::price_cart;
use crate::db::{IdempotencyKey, NewOrder, OrderWriteError, Store};

/// Longest accepted `Idempotency-Key`
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Result of a submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedOrder {
    pub order: Order,
    /// `false` when an earlier submission with the same idempotency key is returned
    pub created: bool,
}

fn validate_idempotency_key(key: Option<String>) -> Result<Option<String>, AppError> {
    match key.map(|k| k.trim().to_string()) {
        None => Ok(None),
        Some(k) if k.is_empty() || k.len() > MAX_IDEMPOTENCY_KEY_LEN => {
            Err(AppError::invalid_request(format!(
                "Idempotency-Key must be 1..={MAX_IDEMPOTENCY_KEY_LEN} characters"
            ))
            .with_detail("field", "idempotency-key"))
        }
        Some(k) => Ok(Some(k)),
    }
}

/// New orders always start pending
fn validate_initial_status(status: Option<&str>) -> Result<(), AppError> {
    let Some(raw) = status else {
        return Ok(());
    };
    let status: OrderStatus = raw.parse()?;
    if status != OrderStatus::Pending {
        return Err(AppError::validation(format!(
            "New orders start as pending, not {status}"
        ))
        .with_detail("field", "status"));
    }
    Ok(())
}

fn parse_payment_method(raw: Option<&str>) -> Result<PaymentMethod, AppError> {
    raw.map(str::parse::<PaymentMethod>).transpose().map(Option::unwrap_or_default)
}

/// Answer a repeated key with the order it created, if that order is whole
///
/// An order still missing its items or payment never replays as a success,
/// whether its write failed or is still in flight.
fn replay(detail: OrderDetail) -> Result<SubmittedOrder, AppError> {
    let order_id = detail.order.order_id;
    if !detail.is_complete() {
        tracing::warn!(
            order_id,
            status = %detail.order.status,
            "Idempotent replay found an incomplete order"
        );
        return Err(AppError::partial_order(
            order_id,
            true,
            format!(
                "Order {order_id} from an earlier submission with this key was not fully saved; \
                 manual reconciliation may be required"
            ),
        ));
    }
    tracing::info!(order_id, "Idempotent replay of order submission");
    Ok(SubmittedOrder {
        order: detail.order,
        created: false,
    })
}

/// Map a failed order write to the client-facing error
fn write_error(e: OrderWriteError) -> AppError {
    match &e {
        OrderWriteError::NotCreated(source) => {
            tracing::error!(error = %source, "Order was not created");
            AppError::database("Order could not be saved")
                .with_detail("partial", false)
        }
        OrderWriteError::RolledBack { order_id, source } => {
            tracing::error!(order_id, error = %source, "Order write rolled back");
            AppError::partial_order(
                *order_id,
                false,
                "Order could not be saved; the partial order was removed",
            )
        }
        OrderWriteError::Cancelled { order_id, source } => {
            tracing::error!(order_id, error = %source, "Partial order left cancelled");
            AppError::partial_order(
                *order_id,
                true,
                format!("Order {order_id} was only partially saved and has been cancelled"),
            )
        }
        OrderWriteError::Orphaned { order_id, source } => {
            tracing::error!(order_id, error = %source, "Partial order may remain pending");
            AppError::partial_order(
                *order_id,
                true,
                format!(
                    "Order {order_id} was only partially saved and may remain pending; \
                     manual reconciliation is required"
                ),
            )
        }
    }
}

/// Submit an order
///
/// 1. A key the caller already used returns the order it created, provided
///    that order was fully written.
/// 2. Status, payment method, cart and customer reference are validated and
///    the total is priced from the current catalog.
/// 3. The customer is resolved (get-or-create by email).
/// 4. Order, items and payment are persisted as one unit.
pub async fn submit_order(
    store: &dyn Store,
    user_id: &str,
    req: SubmitOrderRequest,
    idempotency_key: Option<String>,
) -> Result<SubmittedOrder, AppError> {
    let idempotency_key = validate_idempotency_key(idempotency_key)?
        .map(|key| IdempotencyKey::new(user_id, key));
    if let Some(key) = &idempotency_key
        && let Some(detail) = store.find_order_by_idempotency_key(key).await?
    {
        return replay(detail);
    }

    validate_initial_status(req.status.as_deref())?;
    let payment_method = parse_payment_method(req.payment_method.as_deref())?;
    let customer_ref = CustomerRef::from_request(req.customer_id, req.customer.as_ref())?;
    let priced = price_cart(store, &req.items).await?;

    if let Some(client_total) = req.total_amount
        && client_total != priced.total
    {
        tracing::debug!(
            client_total = %client_total,
            total = %priced.total,
            "Ignoring client-supplied total"
        );
    }

    let customer = customer_ref.resolve(store).await?;

    let item_count = priced.item_count();
    let new_order = NewOrder {
        customer_id: customer.customer_id,
        total_amount: priced.total,
        lines: priced.lines,
        payment_method,
        idempotency_key: idempotency_key.clone(),
    };

    let detail = match (store.create_order(&new_order).await, &idempotency_key) {
        (Ok(detail), _) => detail,
        // Lost a race with a concurrent submission carrying the same key
        (Err(OrderWriteError::NotCreated(e)), Some(key)) if e.is_conflict() => {
            let detail = store
                .find_order_by_idempotency_key(key)
                .await?
                .ok_or_else(|| AppError::conflict("Order submission conflicted"))?;
            return replay(detail);
        }
        (Err(e), _) => return Err(write_error(e)),
    };

    tracing::info!(
        order_id = detail.order.order_id,
        customer_id = customer.customer_id,
        total = %detail.order.total_amount,
        item_count,
        "Order created"
    );

    Ok(SubmittedOrder {
        order: detail.order,
        created: true,
    })
}
