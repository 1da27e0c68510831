//! Error domain from the code's thousands digit

use super::codes::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    General,
    /// Missing, invalid or expired credential (401)
    Auth,
    /// Authenticated but not allowed (403)
    Permission,
    Customer,
    Order,
    Payment,
    Menu,
    Reservation,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Customer,
            4 => Self::Order,
            5 => Self::Payment,
            6 => Self::Menu,
            7 => Self::Reservation,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_by_thousands() {
        assert_eq!(ErrorCategory::from_code(9), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1004), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(7003), ErrorCategory::Reservation);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(u16::MAX), ErrorCategory::System);
    }

    #[test]
    fn test_code_categories() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::AdminRequired.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::CustomerEmailRequired.category(), ErrorCategory::Customer);
        assert_eq!(ErrorCode::OrderPartiallyPersisted.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::PaymentInvalidMethod.category(), ErrorCategory::Payment);
        assert_eq!(ErrorCode::MenuItemInvalidPrice.category(), ErrorCategory::Menu);
        assert_eq!(ErrorCode::IdentityProviderError.category(), ErrorCategory::System);
    }
}
