//! Request bodies and query strings of the HTTP API
//!
//! Enum-valued fields (status, payment method, role) travel as strings so
//! that an unknown value is reported with its own error code instead of a
//! generic body rejection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CustomerContact, PaymentMethod, Role};
use crate::order::OrderStatus;

/// Header carrying the client-generated idempotency key of an order submission
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// One requested order line; a missing quantity counts as 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub item_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

impl OrderLineRequest {
    pub fn new(item_id: i64, quantity: i32) -> Self {
        Self {
            item_id,
            quantity: Some(quantity),
        }
    }

    pub fn quantity_or_default(&self) -> i32 {
        self.quantity.unwrap_or(1)
    }
}

/// `POST /api/orders`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Client-side display total; accepted for compatibility and never used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
}

impl SubmitOrderRequest {
    pub fn new(customer: CustomerContact, items: Vec<OrderLineRequest>) -> Self {
        Self {
            customer: Some(customer),
            items,
            ..Default::default()
        }
    }

    pub fn for_customer_id(customer_id: i64, items: Vec<OrderLineRequest>) -> Self {
        Self {
            customer_id: Some(customer_id),
            items,
            ..Default::default()
        }
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method.as_str().to_string());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    pub fn with_client_total(mut self, total: Decimal) -> Self {
        self.total_amount = Some(total);
        self
    }
}

/// `POST /api/reservations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<i32>,
}

impl ReservationRequest {
    pub fn new(
        customer: CustomerContact,
        reservation_date: impl Into<String>,
        party_size: i32,
    ) -> Self {
        Self {
            customer: Some(customer),
            customer_id: None,
            reservation_date: Some(reservation_date.into()),
            party_size: Some(party_size),
        }
    }
}

/// `PATCH /api/orders/:id/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    pub fn new(status: OrderStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
        }
    }
}

/// `DELETE /api/admin/orders/:id?confirm=true`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOrderQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// `POST /api/admin/users/role`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl RoleAssignmentRequest {
    pub fn for_email(email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
            role: Some(role.as_str().to_string()),
        }
    }

    pub fn for_user(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: None,
            role: Some(role.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_order_defaults() {
        let req: SubmitOrderRequest = serde_json::from_str(
            r#"{"customer":{"email":"a@b.co"},"items":[{"item_id":3}],"total_amount":1.0}"#,
        )
        .unwrap();
        assert_eq!(req.items[0].quantity_or_default(), 1);
        assert!(req.payment_method.is_none());
        assert_eq!(req.total_amount, Some(Decimal::ONE));

        let empty: SubmitOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_builders_write_wire_names() {
        let req = SubmitOrderRequest::for_customer_id(4, vec![OrderLineRequest::new(1, 2)])
            .with_payment_method(PaymentMethod::Card)
            .with_status(OrderStatus::Pending);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["payment_method"], "card");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert!(json.get("customer").is_none());
    }
}
