//! PostgreSQL store
//!
//! Free functions per table take `&PgPool` (or any executor); [`PgStore`]
//! wires them into the store traits and overrides order creation with a
//! single transaction.

pub mod customers;
pub mod directory;
pub mod menu;
pub mod orders;
pub mod reservations;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Customer, MenuItem, MenuItemCreate, NormalizedContact, Order, OrderDetail, OrderItem,
    Payment, PaymentMethod, Reservation, ReservationWithCustomer, Role, RoleAssignment, Staff,
};
use shared::order::OrderStatus;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::time::Duration;

use super::{
    CustomerStore, DirectoryStore, IdempotencyKey, MenuStore, NewOrder, NewReservation, OrderLine,
    OrderStore, OrderWriteError, ReservationStore, RoleUpsert, StoreError,
};

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a bounded pool and run embedded migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MenuStore for PgStore {
    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        Ok(menu::list(&self.pool).await?)
    }

    async fn create_menu_item(&self, item: &MenuItemCreate) -> Result<MenuItem, StoreError> {
        Ok(menu::create(&self.pool, item).await?)
    }

    async fn menu_prices(&self, item_ids: &[i64]) -> Result<HashMap<i64, Decimal>, StoreError> {
        Ok(menu::prices(&self.pool, item_ids).await?)
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn get_or_create_customer(
        &self,
        contact: &NormalizedContact,
    ) -> Result<Customer, StoreError> {
        Ok(customers::get_or_create(&self.pool, contact).await?)
    }

    async fn find_customer(&self, customer_id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(customers::find_by_id(&self.pool, customer_id).await?)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(customers::list(&self.pool).await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
        Ok(orders::find_by_id(&self.pool, order_id).await?)
    }

    async fn find_order_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<OrderDetail>, StoreError> {
        Ok(orders::find_by_idempotency_key(&self.pool, key).await?)
    }

    async fn list_orders(&self) -> Result<Vec<OrderDetail>, StoreError> {
        Ok(orders::list_with_details(&self.pool).await?)
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        Ok(orders::insert_order(&self.pool, order).await?)
    }

    async fn insert_order_items(
        &self,
        order_id: i64,
        lines: &[OrderLine],
    ) -> Result<Vec<OrderItem>, StoreError> {
        Ok(orders::insert_items(&self.pool, order_id, lines).await?)
    }

    async fn insert_payment(
        &self,
        order_id: i64,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment, StoreError> {
        Ok(orders::insert_payment(&self.pool, order_id, amount, method).await?)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        Ok(orders::update_status(&self.pool, order_id, expected, status).await?)
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, StoreError> {
        Ok(orders::delete(&self.pool, order_id).await?)
    }

    /// Order, items and payment in one transaction; any failure leaves nothing behind
    async fn create_order(&self, new_order: &NewOrder) -> Result<OrderDetail, OrderWriteError> {
        let write = async {
            let mut tx = self.pool.begin().await?;
            let order = orders::insert_order(&mut *tx, new_order).await?;
            let order_items =
                orders::insert_items(&mut *tx, order.order_id, &new_order.lines).await?;
            let payment = orders::insert_payment(
                &mut *tx,
                order.order_id,
                new_order.total_amount,
                new_order.payment_method,
            )
            .await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(OrderDetail {
                order,
                order_items,
                payments: vec![payment],
            })
        };

        write
            .await
            .map_err(|e| OrderWriteError::NotCreated(StoreError::from(e)))
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, StoreError> {
        Ok(reservations::insert(&self.pool, reservation).await?)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationWithCustomer>, StoreError> {
        Ok(reservations::list_with_customer(&self.pool).await?)
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError> {
        Ok(directory::list_staff(&self.pool).await?)
    }

    async fn upsert_role_assignment(
        &self,
        upsert: &RoleUpsert,
    ) -> Result<RoleAssignment, StoreError> {
        Ok(directory::upsert(&self.pool, upsert).await?)
    }

    async fn find_role(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<Option<Role>, StoreError> {
        Ok(directory::find_role(&self.pool, user_id, email).await?)
    }
}
