//! Response bodies of the HTTP API that are not plain models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Order;

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// `POST /api/orders` confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub order: Order,
    /// Authoritative total (same as `order.total_amount`)
    pub total_amount: Decimal,
}

impl From<Order> for OrderCreatedResponse {
    fn from(order: Order) -> Self {
        Self {
            total_amount: order.total_amount,
            order,
        }
    }
}

/// `DELETE /api/admin/orders/:id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub order_id: i64,
    pub deleted: bool,
}
