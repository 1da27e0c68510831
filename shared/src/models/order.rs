//! Order, Order Item and Payment Models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};
use crate::order::OrderStatus;
use crate::order::money::money_eq;

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    /// Authoritative total, computed server-side
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// One line of an order; one row per distinct menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: i32,
}

/// Payment method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            other => Err(AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                format!("Unsupported payment method: {other}"),
            )),
        }
    }
}

/// Payment status; no gateway is involved, so payments stay pending until settled at the counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// Payment record, created once with its order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub payment_id: i64,
    pub order_id: i64,
    /// Always equal to the order total
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

/// Order with its line items and payments (list/detail views)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl OrderDetail {
    /// Total number of units across all lines
    pub fn item_count(&self) -> i64 {
        self.order_items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    /// Whether the order carries items and exactly one payment matching its total
    pub fn is_complete(&self) -> bool {
        !self.order_items.is_empty()
            && self.payments.len() == 1
            && self
                .payments
                .iter()
                .all(|p| money_eq(p.amount, self.order.total_amount))
    }
}
