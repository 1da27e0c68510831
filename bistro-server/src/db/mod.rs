//! Data access layer
//!
//! Every backend implements the store traits below. Handlers and services only
//! see `Arc<dyn Store>`, so the Postgres store and the in-memory store are
//! interchangeable.
//!
//! Order creation writes three record kinds (order, items, payment). The
//! default [`OrderStore::create_order`] runs them stepwise with compensation
//! for backends without transactions; [`postgres::PgStore`] overrides it with
//! a single database transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Customer, MenuItem, MenuItemCreate, NormalizedContact, Order, OrderDetail, OrderItem,
    Payment, PaymentMethod, Reservation, ReservationWithCustomer, Role, RoleAssignment, Staff,
};
use shared::order::OrderStatus;
use std::collections::HashMap;
use thiserror::Error;

pub use crate::error::StoreError;
pub use memory::{FaultPoint, MemoryStore};
pub use postgres::PgStore;

/// One priced order line, ready to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub item_id: i64,
    pub quantity: i32,
    /// Catalog price at submission time
    pub unit_price: Decimal,
}

/// Client idempotency key, unique per submitting user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey {
    /// Identity-provider user id of the caller
    pub owner: String,
    pub key: String,
}

impl IdempotencyKey {
    pub fn new(owner: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            key: key.into(),
        }
    }
}

/// Everything needed to persist an order with its items and payment
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub total_amount: Decimal,
    pub lines: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Reservation to insert; status always starts as reserved
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub customer_id: i64,
    pub reservation_date: chrono::DateTime<chrono::Utc>,
    pub party_size: i32,
}

/// Role assignment upsert, keyed by `user_id` when present, else by `email`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpsert {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

/// Outcome of a failed order write, stating what may remain in the store
#[derive(Debug, Error)]
pub enum OrderWriteError {
    /// Nothing was written
    #[error("order was not created: {0}")]
    NotCreated(#[source] StoreError),
    /// The order row was written, then removed again
    #[error("order {order_id} was rolled back: {source}")]
    RolledBack {
        order_id: i64,
        #[source]
        source: StoreError,
    },
    /// Removal failed; the order row remains, flagged cancelled
    #[error("order {order_id} could not be removed and was cancelled: {source}")]
    Cancelled {
        order_id: i64,
        #[source]
        source: StoreError,
    },
    /// Neither removal nor cancellation succeeded; the order may remain pending
    #[error("order {order_id} may remain pending without items or payment: {source}")]
    Orphaned {
        order_id: i64,
        #[source]
        source: StoreError,
    },
}

impl OrderWriteError {
    /// Id of the order row that may still exist
    pub fn partial_order_id(&self) -> Option<i64> {
        match self {
            Self::NotCreated(_) | Self::RolledBack { .. } => None,
            Self::Cancelled { order_id, .. } | Self::Orphaned { order_id, .. } => Some(*order_id),
        }
    }

    /// The underlying store error
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::NotCreated(source)
            | Self::RolledBack { source, .. }
            | Self::Cancelled { source, .. }
            | Self::Orphaned { source, .. } => source,
        }
    }
}

#[async_trait]
pub trait MenuStore: Send + Sync {
    /// All menu items sorted by name
    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError>;

    async fn create_menu_item(&self, item: &MenuItemCreate) -> Result<MenuItem, StoreError>;

    /// Current prices for the given items; unknown ids are absent from the map
    async fn menu_prices(&self, item_ids: &[i64]) -> Result<HashMap<i64, Decimal>, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Atomic lookup-or-insert keyed by email
    ///
    /// Concurrent callers with the same email receive the same customer.
    /// Existing name/phone values are kept; missing ones are filled in.
    async fn get_or_create_customer(
        &self,
        contact: &NormalizedContact,
    ) -> Result<Customer, StoreError>;

    async fn find_customer(&self, customer_id: i64) -> Result<Option<Customer>, StoreError>;

    /// All customers sorted by name
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;

    /// Order created under `key`, with its items and payments
    async fn find_order_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<OrderDetail>, StoreError>;

    /// Orders with their items and payments, newest first
    async fn list_orders(&self) -> Result<Vec<OrderDetail>, StoreError>;

    /// Insert the order row only (status pending)
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    async fn insert_order_items(
        &self,
        order_id: i64,
        lines: &[OrderLine],
    ) -> Result<Vec<OrderItem>, StoreError>;

    async fn insert_payment(
        &self,
        order_id: i64,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment, StoreError>;

    /// Compare-and-set status change; `None` if the order is gone or its
    /// status is no longer `expected`
    async fn update_order_status(
        &self,
        order_id: i64,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    /// Delete an order with its items and payments; `false` if it did not exist
    async fn delete_order(&self, order_id: i64) -> Result<bool, StoreError>;

    /// Persist order, items and payment as one logical unit
    ///
    /// Stepwise policy: order, then items, then payment. On failure after the
    /// order row exists, delete it; if that fails, mark it cancelled; the
    /// returned error says which of these happened.
    async fn create_order(&self, new_order: &NewOrder) -> Result<OrderDetail, OrderWriteError> {
        let order = self
            .insert_order(new_order)
            .await
            .map_err(OrderWriteError::NotCreated)?;
        let order_id = order.order_id;

        let written = async {
            let items = self.insert_order_items(order_id, &new_order.lines).await?;
            let payment = self
                .insert_payment(order_id, new_order.total_amount, new_order.payment_method)
                .await?;
            Ok::<_, StoreError>((items, payment))
        }
        .await;

        match written {
            Ok((order_items, payment)) => Ok(OrderDetail {
                order,
                order_items,
                payments: vec![payment],
            }),
            Err(source) => Err(self.compensate_order(order_id, source).await),
        }
    }

    /// Undo a half-written order, reporting what is left behind
    async fn compensate_order(&self, order_id: i64, source: StoreError) -> OrderWriteError {
        tracing::warn!(order_id, error = %source, "Order write failed, compensating");

        match self.delete_order(order_id).await {
            Ok(_) => return OrderWriteError::RolledBack { order_id, source },
            Err(e) => {
                tracing::error!(order_id, error = %e, "Failed to delete partial order");
            }
        }

        match self
            .update_order_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
        {
            Ok(Some(_)) => OrderWriteError::Cancelled { order_id, source },
            Ok(None) => {
                tracing::error!(order_id, "Partial order vanished or changed while cancelling");
                OrderWriteError::Orphaned { order_id, source }
            }
            Err(e) => {
                tracing::error!(order_id, error = %e, "Failed to cancel partial order");
                OrderWriteError::Orphaned { order_id, source }
            }
        }
    }
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, StoreError>;

    /// Reservations with customer contact, newest reservation date first
    async fn list_reservations(&self) -> Result<Vec<ReservationWithCustomer>, StoreError>;
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Staff, most recently hired first
    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError>;

    async fn upsert_role_assignment(
        &self,
        upsert: &RoleUpsert,
    ) -> Result<RoleAssignment, StoreError>;

    /// Assigned role for an identity: by user id first, then by email
    async fn find_role(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<Option<Role>, StoreError>;
}

/// Full store surface used by the application state
pub trait Store: MenuStore + CustomerStore + OrderStore + ReservationStore + DirectoryStore {}

impl<T> Store for T where
    T: MenuStore + CustomerStore + OrderStore + ReservationStore + DirectoryStore
{
}
