//! In-memory store
//!
//! Backs development runs (`STORE_BACKEND=memory`) and the test suite. All
//! state sits behind one mutex, so every single method is atomic. It has no
//! transactions, so order creation uses the stepwise default of
//! [`OrderStore::create_order`]. Faults can be injected per write step to
//! exercise that path.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{
    Customer, MenuItem, MenuItemCreate, NormalizedContact, Order, OrderDetail, OrderItem,
    Payment, PaymentMethod, PaymentStatus, Reservation, ReservationStatus,
    ReservationWithCustomer, Role, RoleAssignment, Staff,
};
use shared::order::OrderStatus;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    CustomerStore, DirectoryStore, IdempotencyKey, MenuStore, NewOrder, NewReservation, OrderLine,
    OrderStore, ReservationStore, RoleUpsert, StoreError,
};

/// Write step that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    InsertOrder,
    InsertOrderItems,
    InsertPayment,
    DeleteOrder,
    UpdateOrderStatus,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    menu_items: BTreeMap<i64, MenuItem>,
    customers: BTreeMap<i64, Customer>,
    customer_by_email: HashMap<String, i64>,
    orders: BTreeMap<i64, Order>,
    order_by_key: HashMap<IdempotencyKey, i64>,
    order_items: Vec<OrderItem>,
    payments: Vec<Payment>,
    reservations: Vec<Reservation>,
    staff: Vec<Staff>,
    roles: Vec<RoleAssignment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn order_detail(&self, order: &Order) -> OrderDetail {
        OrderDetail {
            order: order.clone(),
            order_items: self
                .order_items
                .iter()
                .filter(|i| i.order_id == order.order_id)
                .cloned()
                .collect(),
            payments: self
                .payments
                .iter()
                .filter(|p| p.order_id == order.order_id)
                .cloned()
                .collect(),
        }
    }
}

/// Mutex-guarded in-process store
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<HashSet<FaultPoint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a small demo catalog, for development runs
    pub fn with_demo_menu() -> Self {
        let store = Self::new();
        for (name, cents, category) in [
            ("Margherita Pizza", 1200, "Pizza"),
            ("Pepperoni Pizza", 1400, "Pizza"),
            ("Caesar Salad", 850, "Salads"),
            ("Tiramisu", 650, "Desserts"),
            ("Soda", 250, "Drinks"),
        ] {
            store.seed_menu_item(name, Decimal::new(cents, 2), Some(category));
        }
        store
    }

    /// Add a catalog item directly (fixtures, dev seed)
    pub fn seed_menu_item(
        &self,
        name: &str,
        price: Decimal,
        category: Option<&str>,
    ) -> MenuItem {
        let mut t = self.tables.lock();
        let item = MenuItem {
            item_id: t.next_id(),
            name: name.to_string(),
            price,
            category: category.map(String::from),
            description: None,
            image_url: None,
        };
        t.menu_items.insert(item.item_id, item.clone());
        item
    }

    /// Add a staff member directly (fixtures, dev seed)
    pub fn seed_staff(
        &self,
        name: &str,
        position: Option<&str>,
        hired_at: chrono::DateTime<Utc>,
    ) -> Staff {
        let mut t = self.tables.lock();
        let staff = Staff {
            staff_id: t.next_id(),
            name: name.to_string(),
            email: None,
            phone: None,
            position: position.map(String::from),
            hired_at,
        };
        t.staff.push(staff.clone());
        staff
    }

    /// Change a catalog price in place
    pub fn set_menu_price(&self, item_id: i64, price: Decimal) -> bool {
        match self.tables.lock().menu_items.get_mut(&item_id) {
            Some(item) => {
                item.price = price;
                true
            }
            None => false,
        }
    }

    /// Make every later call of the given step fail until cleared
    pub fn inject_fault(&self, point: FaultPoint) {
        self.faults.lock().insert(point);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    pub fn customer_count(&self) -> usize {
        self.tables.lock().customers.len()
    }

    pub fn order_count(&self) -> usize {
        self.tables.lock().orders.len()
    }

    fn check_fault(&self, point: FaultPoint) -> Result<(), StoreError> {
        if self.faults.lock().contains(&point) {
            return Err(StoreError::Unavailable(format!("injected fault at {point:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
        let mut items: Vec<MenuItem> = self.tables.lock().menu_items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn create_menu_item(&self, item: &MenuItemCreate) -> Result<MenuItem, StoreError> {
        let mut t = self.tables.lock();
        let created = MenuItem {
            item_id: t.next_id(),
            name: item.name.clone(),
            price: item.price,
            category: item.category.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
        };
        t.menu_items.insert(created.item_id, created.clone());
        Ok(created)
    }

    async fn menu_prices(&self, item_ids: &[i64]) -> Result<HashMap<i64, Decimal>, StoreError> {
        let t = self.tables.lock();
        Ok(item_ids
            .iter()
            .filter_map(|id| t.menu_items.get(id).map(|item| (*id, item.price)))
            .collect())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn get_or_create_customer(
        &self,
        contact: &NormalizedContact,
    ) -> Result<Customer, StoreError> {
        let mut t = self.tables.lock();
        if let Some(id) = t.customer_by_email.get(&contact.email).copied() {
            if let Some(existing) = t.customers.get_mut(&id) {
                if existing.name.is_none() {
                    existing.name = contact.name.clone();
                }
                if existing.phone.is_none() {
                    existing.phone = contact.phone.clone();
                }
                return Ok(existing.clone());
            }
        }

        let customer = Customer {
            customer_id: t.next_id(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            created_at: Utc::now(),
        };
        t.customer_by_email
            .insert(customer.email.clone(), customer.customer_id);
        t.customers.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    async fn find_customer(&self, customer_id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(self.tables.lock().customers.get(&customer_id).cloned())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let mut customers: Vec<Customer> =
            self.tables.lock().customers.values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.lock().orders.get(&order_id).cloned())
    }

    async fn find_order_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<OrderDetail>, StoreError> {
        let t = self.tables.lock();
        Ok(t
            .order_by_key
            .get(key)
            .and_then(|id| t.orders.get(id))
            .map(|order| t.order_detail(order)))
    }

    async fn list_orders(&self) -> Result<Vec<OrderDetail>, StoreError> {
        let t = self.tables.lock();
        let mut details: Vec<OrderDetail> =
            t.orders.values().map(|order| t.order_detail(order)).collect();
        details.sort_by(|a, b| {
            b.order
                .order_date
                .cmp(&a.order.order_date)
                .then(b.order.order_id.cmp(&a.order.order_id))
        });
        Ok(details)
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.check_fault(FaultPoint::InsertOrder)?;
        let mut t = self.tables.lock();
        if !t.customers.contains_key(&order.customer_id) {
            return Err(StoreError::MissingReference("orders_customer_id_fkey".into()));
        }
        if let Some(key) = &order.idempotency_key
            && t.order_by_key.contains_key(key)
        {
            return Err(StoreError::Conflict("orders_idempotency_key_key".into()));
        }
        let created = Order {
            order_id: t.next_id(),
            customer_id: order.customer_id,
            order_date: Utc::now(),
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            idempotency_key: order.idempotency_key.as_ref().map(|k| k.key.clone()),
        };
        if let Some(key) = &order.idempotency_key {
            t.order_by_key.insert(key.clone(), created.order_id);
        }
        t.orders.insert(created.order_id, created.clone());
        Ok(created)
    }

    async fn insert_order_items(
        &self,
        order_id: i64,
        lines: &[OrderLine],
    ) -> Result<Vec<OrderItem>, StoreError> {
        self.check_fault(FaultPoint::InsertOrderItems)?;
        let mut t = self.tables.lock();
        if !t.orders.contains_key(&order_id) {
            return Err(StoreError::MissingReference("order_items_order_id_fkey".into()));
        }
        if let Some(line) = lines.iter().find(|l| !t.menu_items.contains_key(&l.item_id)) {
            return Err(StoreError::MissingReference(format!(
                "order_items_item_id_fkey ({})",
                line.item_id
            )));
        }
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = OrderItem {
                order_item_id: t.next_id(),
                order_id,
                item_id: line.item_id,
                quantity: line.quantity,
            };
            t.order_items.push(item.clone());
            items.push(item);
        }
        Ok(items)
    }

    async fn insert_payment(
        &self,
        order_id: i64,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment, StoreError> {
        self.check_fault(FaultPoint::InsertPayment)?;
        let mut t = self.tables.lock();
        if !t.orders.contains_key(&order_id) {
            return Err(StoreError::MissingReference("payments_order_id_fkey".into()));
        }
        let payment = Payment {
            payment_id: t.next_id(),
            order_id,
            amount,
            payment_method: method,
            payment_status: PaymentStatus::Pending,
        };
        t.payments.push(payment.clone());
        Ok(payment)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        self.check_fault(FaultPoint::UpdateOrderStatus)?;
        let mut t = self.tables.lock();
        match t.orders.get_mut(&order_id) {
            Some(order) if order.status == expected => {
                order.status = status;
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, StoreError> {
        self.check_fault(FaultPoint::DeleteOrder)?;
        let mut t = self.tables.lock();
        let existed = t.orders.remove(&order_id).is_some();
        t.order_by_key.retain(|_, id| *id != order_id);
        t.order_items.retain(|i| i.order_id != order_id);
        t.payments.retain(|p| p.order_id != order_id);
        Ok(existed)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, StoreError> {
        let mut t = self.tables.lock();
        if !t.customers.contains_key(&reservation.customer_id) {
            return Err(StoreError::MissingReference(
                "reservations_customer_id_fkey".into(),
            ));
        }
        let created = Reservation {
            reservation_id: t.next_id(),
            customer_id: reservation.customer_id,
            reservation_date: reservation.reservation_date,
            party_size: reservation.party_size,
            status: ReservationStatus::Reserved,
        };
        t.reservations.push(created.clone());
        Ok(created)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationWithCustomer>, StoreError> {
        let t = self.tables.lock();
        let mut rows: Vec<ReservationWithCustomer> = t
            .reservations
            .iter()
            .filter_map(|r| {
                t.customers.get(&r.customer_id).map(|c| ReservationWithCustomer {
                    reservation_id: r.reservation_id,
                    customer_id: r.customer_id,
                    reservation_date: r.reservation_date,
                    party_size: r.party_size,
                    status: r.status,
                    customer_name: c.name.clone(),
                    customer_email: c.email.clone(),
                    customer_phone: c.phone.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.reservation_date.cmp(&a.reservation_date));
        Ok(rows)
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError> {
        let mut staff = self.tables.lock().staff.clone();
        staff.sort_by(|a, b| b.hired_at.cmp(&a.hired_at));
        Ok(staff)
    }

    async fn upsert_role_assignment(
        &self,
        upsert: &RoleUpsert,
    ) -> Result<RoleAssignment, StoreError> {
        let mut t = self.tables.lock();
        let now = Utc::now();

        let existing = match (&upsert.user_id, &upsert.email) {
            (Some(user_id), _) => t
                .roles
                .iter_mut()
                .find(|r| r.user_id.as_ref() == Some(user_id)),
            (None, Some(email)) => t
                .roles
                .iter_mut()
                .find(|r| r.user_id.is_none() && r.email.as_ref() == Some(email)),
            (None, None) => {
                return Err(StoreError::Conflict("role_assignments_key_present".into()));
            }
        };

        if let Some(assignment) = existing {
            assignment.role = upsert.role;
            if upsert.email.is_some() {
                assignment.email = upsert.email.clone();
            }
            assignment.updated_at = now;
            return Ok(assignment.clone());
        }

        let assignment = RoleAssignment {
            assignment_id: t.next_id(),
            user_id: upsert.user_id.clone(),
            email: upsert.email.clone(),
            role: upsert.role,
            updated_at: now,
        };
        t.roles.push(assignment.clone());
        Ok(assignment)
    }

    async fn find_role(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<Option<Role>, StoreError> {
        let t = self.tables.lock();
        let by_user = t
            .roles
            .iter()
            .find(|r| r.user_id.as_deref() == Some(user_id));
        let by_email = || {
            email.and_then(|email| {
                t.roles
                    .iter()
                    .filter(|r| r.email.as_deref() == Some(email))
                    .max_by_key(|r| r.updated_at)
            })
        };
        Ok(by_user.or_else(by_email).map(|r| r.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::OrderWriteError;

    fn contact(email: &str) -> NormalizedContact {
        NormalizedContact {
            email: email.to_string(),
            name: None,
            phone: None,
        }
    }

    async fn new_order(store: &MemoryStore) -> NewOrder {
        let pizza = store.seed_menu_item("Pizza", Decimal::new(1200, 2), None);
        let customer = store.get_or_create_customer(&contact("a@b.co")).await.unwrap();
        NewOrder {
            customer_id: customer.customer_id,
            total_amount: Decimal::new(2400, 2),
            lines: vec![OrderLine {
                item_id: pizza.item_id,
                quantity: 2,
                unit_price: pizza.price,
            }],
            payment_method: PaymentMethod::Cash,
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_fills_missing_fields() {
        let store = MemoryStore::new();
        let first = store.get_or_create_customer(&contact("a@b.co")).await.unwrap();
        let second = store
            .get_or_create_customer(&NormalizedContact {
                email: "a@b.co".into(),
                name: Some("Ada".into()),
                phone: None,
            })
            .await
            .unwrap();
        assert_eq!(first.customer_id, second.customer_id);
        assert_eq!(second.name.as_deref(), Some("Ada"));
        assert_eq!(store.customer_count(), 1);
    }

    #[tokio::test]
    async fn test_create_order_writes_all_records() {
        let store = MemoryStore::new();
        let new_order = new_order(&store).await;
        let detail = store.create_order(&new_order).await.unwrap();
        assert!(detail.is_complete());
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_items_roll_back_order() {
        let store = MemoryStore::new();
        let new_order = new_order(&store).await;
        store.inject_fault(FaultPoint::InsertOrderItems);

        let err = store.create_order(&new_order).await.unwrap_err();
        assert!(matches!(err, OrderWriteError::RolledBack { .. }));
        assert_eq!(err.partial_order_id(), None);
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_rollback_cancels_order() {
        let store = MemoryStore::new();
        let new_order = new_order(&store).await;
        store.inject_fault(FaultPoint::InsertPayment);
        store.inject_fault(FaultPoint::DeleteOrder);

        let err = store.create_order(&new_order).await.unwrap_err();
        let order_id = err.partial_order_id().unwrap();
        assert!(matches!(err, OrderWriteError::Cancelled { .. }));

        store.clear_faults();
        let left = store.find_order(order_id).await.unwrap().unwrap();
        assert_eq!(left.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_everything_failing_reports_orphan() {
        let store = MemoryStore::new();
        let new_order = new_order(&store).await;
        store.inject_fault(FaultPoint::InsertPayment);
        store.inject_fault(FaultPoint::DeleteOrder);
        store.inject_fault(FaultPoint::UpdateOrderStatus);

        let err = store.create_order(&new_order).await.unwrap_err();
        assert!(matches!(err, OrderWriteError::Orphaned { .. }));
        assert!(err.partial_order_id().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_idempotency_key_conflicts() {
        let store = MemoryStore::new();
        let mut new_order = new_order(&store).await;
        new_order.idempotency_key = Some(IdempotencyKey::new("u1", "k1"));
        store.create_order(&new_order).await.unwrap();

        let err = store.create_order(&new_order).await.unwrap_err();
        assert!(matches!(err, OrderWriteError::NotCreated(StoreError::Conflict(_))));
        assert_eq!(store.order_count(), 1);

        // same key from another user is a separate submission
        new_order.idempotency_key = Some(IdempotencyKey::new("u2", "k1"));
        store.create_order(&new_order).await.unwrap();
        assert_eq!(store.order_count(), 2);
    }

    #[tokio::test]
    async fn test_deleted_order_releases_its_key() {
        let store = MemoryStore::new();
        let mut new_order = new_order(&store).await;
        let key = IdempotencyKey::new("u1", "k1");
        new_order.idempotency_key = Some(key.clone());
        let detail = store.create_order(&new_order).await.unwrap();

        let found = store.find_order_by_idempotency_key(&key).await.unwrap().unwrap();
        assert_eq!(found, detail);

        store.delete_order(detail.order.order_id).await.unwrap();
        assert!(store.find_order_by_idempotency_key(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_lookup_prefers_user_id() {
        let store = MemoryStore::new();
        store
            .upsert_role_assignment(&RoleUpsert {
                user_id: None,
                email: Some("boss@bistro.test".into()),
                role: Role::Staff,
            })
            .await
            .unwrap();
        assert_eq!(
            store.find_role("u1", Some("boss@bistro.test")).await.unwrap(),
            Some(Role::Staff)
        );

        store
            .upsert_role_assignment(&RoleUpsert {
                user_id: Some("u1".into()),
                email: None,
                role: Role::Admin,
            })
            .await
            .unwrap();
        assert_eq!(
            store.find_role("u1", Some("boss@bistro.test")).await.unwrap(),
            Some(Role::Admin)
        );
        assert_eq!(store.find_role("u2", None).await.unwrap(), None);
    }
}
