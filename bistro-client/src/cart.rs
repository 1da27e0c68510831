//! Shopping cart
//!
//! Held in a watch channel so every view sees the same cart. Prices shown
//! here are previews only; the server reprices every order.

use rust_decimal::Decimal;
use shared::models::MenuItem;
use shared::order::{MAX_QUANTITY, line_total, sum_lines};
use shared::request::OrderLineRequest;
use tokio::sync::watch;

/// One menu item and its quantity
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: i32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        line_total(self.item.price, self.quantity)
    }
}

/// Cart contents in the order items were first added
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    /// Preview total
    pub fn total(&self) -> Decimal {
        sum_lines(self.lines.iter().map(|l| (l.item.price, l.quantity)))
    }

    /// Lines to send with an order
    pub fn order_lines(&self) -> Vec<OrderLineRequest> {
        self.lines
            .iter()
            .map(|l| OrderLineRequest::new(l.item.item_id, l.quantity))
            .collect()
    }

    fn position(&self, item_id: i64) -> Option<usize> {
        self.lines.iter().position(|l| l.item.item_id == item_id)
    }
}

/// Cart shared between views
#[derive(Debug)]
pub struct CartStore {
    cart: watch::Sender<Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        let (cart, _) = watch::channel(Cart::default());
        Self { cart }
    }

    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    pub fn snapshot(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// Add one unit; adding an item already in the cart bumps its quantity
    pub fn add_item(&self, item: &MenuItem) {
        self.cart.send_modify(|cart| match cart.position(item.item_id) {
            Some(idx) => {
                let line = &mut cart.lines[idx];
                line.quantity = (line.quantity + 1).min(MAX_QUANTITY);
            }
            None => cart.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            }),
        });
    }

    /// Set a line's quantity; zero or less removes the line
    pub fn set_quantity(&self, item_id: i64, quantity: i32) {
        self.cart.send_modify(|cart| {
            let Some(idx) = cart.position(item_id) else {
                return;
            };
            if quantity <= 0 {
                cart.lines.remove(idx);
            } else {
                cart.lines[idx].quantity = quantity.min(MAX_QUANTITY);
            }
        });
    }

    pub fn remove_item(&self, item_id: i64) {
        self.set_quantity(item_id, 0);
    }

    pub fn clear(&self) {
        self.cart.send_replace(Cart::default());
    }

    pub fn total(&self) -> Decimal {
        self.cart.borrow().total()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
