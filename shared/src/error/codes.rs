//! Numeric error codes
//!
//! Codes are grouped by thousands, one block per domain (see [`ErrorCategory`]).
//! A code's number is part of the wire format: never renumber, only add.
//!
//! [`ErrorCategory`]: super::ErrorCategory

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares [`ErrorCode`] with its default message and the `u16` mapping
/// from a single table
macro_rules! error_codes {
    ($($(#[$doc:meta])* $name:ident = $value:literal => $message:literal,)+) => {
        /// Error code sent as a bare number in every error body
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $($(#[$doc])* $name = $value,)+
        }

        impl ErrorCode {
            /// Default English message
            pub const fn message(&self) -> &'static str {
                match self {
                    $(Self::$name => $message,)+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$name),)+
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    // 0xxx general
    /// Code sent by a newer server, or a failure with no better code
    Unknown = 1 => "An unknown error occurred",
    ValidationFailed = 2 => "Validation failed",
    NotFound = 3 => "Resource not found",
    AlreadyExists = 4 => "Resource already exists",
    /// Malformed request outside of body field validation (headers, query)
    InvalidRequest = 5 => "Invalid request",
    RequiredField = 7 => "Required field is missing",
    /// Destructive operation called without `confirm=true`
    ConfirmationRequired = 9 => "Explicit confirmation is required",

    // 1xxx auth
    NotAuthenticated = 1001 => "User is not authenticated",
    TokenExpired = 1003 => "Authentication token has expired",
    TokenInvalid = 1004 => "Authentication token is invalid",

    // 2xxx permission
    PermissionDenied = 2001 => "Permission denied",
    AdminRequired = 2003 => "Administrator role is required",
    RoleInvalid = 2004 => "Unknown role",

    // 3xxx customer
    CustomerEmailRequired = 3002 => "Customer email is required when customer_id is not provided",
    CustomerEmailInvalid = 3003 => "Customer email is invalid",

    // 4xxx order
    OrderNotFound = 4001 => "Order not found",
    OrderEmpty = 4002 => "Order must contain at least one item",
    InvalidQuantity = 4003 => "Item quantity is out of range",
    OrderStatusInvalid = 4004 => "Invalid order status",
    OrderTransitionNotAllowed = 4005 => "Order status transition is not allowed",
    /// Order row written without its items or payment
    OrderPartiallyPersisted = 4006 => "Order was partially saved and needs manual reconciliation",

    // 5xxx payment
    PaymentInvalidMethod = 5003 => "Invalid payment method",

    // 6xxx menu
    MenuItemNotFound = 6001 => "Menu item not found",
    MenuItemInvalidPrice = 6002 => "Menu item has invalid price",

    // 7xxx reservation
    PartySizeInvalid = 7002 => "Party size is out of range",
    ReservationDateInvalid = 7003 => "Reservation date/time is invalid",

    // 9xxx system
    InternalError = 9001 => "Internal server error",
    DatabaseError = 9002 => "Database error",
    ConfigError = 9005 => "Configuration error",
    IdentityProviderError = 9006 => "Identity provider is unavailable",
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A number with no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);
