//! Customer resolution for orders and reservations

use shared::error::{AppError, ErrorCode};
use shared::models::{Customer, CustomerContact, NormalizedContact};

use crate::db::CustomerStore;

/// Who an order or reservation is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerRef {
    /// Existing customer id sent by the client
    Id(i64),
    /// Contact info to get-or-create by email
    Contact(NormalizedContact),
}

impl CustomerRef {
    /// A known id wins over contact info; otherwise the contact needs an email
    pub fn from_request(
        customer_id: Option<i64>,
        contact: Option<&CustomerContact>,
    ) -> Result<Self, AppError> {
        match (customer_id, contact) {
            (Some(id), _) => Ok(Self::Id(id)),
            (None, Some(contact)) => Ok(Self::Contact(contact.normalize()?)),
            (None, None) => Err(AppError::with_message(
                ErrorCode::CustomerEmailRequired,
                "customer.email or customer_id is required",
            )
            .with_detail("field", "customer.email")),
        }
    }

    /// Look up or create the customer record
    ///
    /// An unknown id is a validation error, not a 404: the caller sent a
    /// reference that cannot be used.
    pub async fn resolve(
        &self,
        store: &(impl CustomerStore + ?Sized),
    ) -> Result<Customer, AppError> {
        match self {
            Self::Id(id) => store.find_customer(*id).await?.ok_or_else(|| {
                AppError::validation(format!("Customer {id} does not exist"))
                    .with_detail("field", "customer_id")
            }),
            Self::Contact(contact) => Ok(store.get_or_create_customer(contact).await?),
        }
    }
}
