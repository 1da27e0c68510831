//! Checkout: turn the cart into an order and an optional table reservation
//!
//! Each attempt gets one idempotency key. Only a failed connection is
//! retried, under the same key; the server never saw that request.
//! A reservation that fails after the order went through is reported but
//! does not undo the order.

use std::sync::atomic::{AtomicBool, Ordering};

use shared::models::{CustomerContact, Order, PaymentMethod, Reservation};
use shared::order::OrderStatus;
use shared::request::{ReservationRequest, SubmitOrderRequest};
use uuid::Uuid;

use crate::cart::CartStore;
use crate::{ClientError, ClientResult, HttpClient};

/// Attempts per checkout when the connection fails
const MAX_ATTEMPTS: usize = 2;

/// Table booking requested alongside the order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    /// `YYYY-MM-DDTHH:MM`, local to the restaurant
    pub reservation_date: String,
    pub party_size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub contact: CustomerContact,
    pub payment_method: PaymentMethod,
    pub reservation: Option<ReservationDraft>,
}

impl CheckoutForm {
    pub fn new(contact: CustomerContact) -> Self {
        Self {
            contact,
            payment_method: PaymentMethod::Cash,
            reservation: None,
        }
    }

    pub fn with_reservation(
        mut self,
        reservation_date: impl Into<String>,
        party_size: i32,
    ) -> Self {
        self.reservation = Some(ReservationDraft {
            reservation_date: reservation_date.into(),
            party_size,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReservationOutcome {
    NotRequested,
    Booked(Reservation),
    /// The order stands; the message is for the user
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub idempotency_key: String,
    pub reservation: ReservationOutcome,
}

/// Clears the in-flight flag when a checkout attempt ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Checkout runner; at most one submission at a time
#[derive(Debug)]
pub struct Checkout {
    http: HttpClient,
    in_flight: AtomicBool,
}

impl Checkout {
    /// `http` must carry the signed-in user's token
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> ClientResult<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| ClientError::SubmissionInFlight)
    }

    /// Submit the cart; on success the cart is cleared
    pub async fn submit(
        &self,
        cart: &CartStore,
        form: &CheckoutForm,
    ) -> ClientResult<CheckoutOutcome> {
        if !self.http.has_token() {
            return Err(ClientError::NotSignedIn);
        }
        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            return Err(ClientError::EmptyCart);
        }
        let _guard = self.begin()?;

        let idempotency_key = Uuid::new_v4().to_string();
        let request = SubmitOrderRequest::new(form.contact.clone(), snapshot.order_lines())
            .with_payment_method(form.payment_method)
            .with_status(OrderStatus::Pending)
            .with_client_total(snapshot.total());

        let receipt = self.submit_with_retry(&request, &idempotency_key).await?;
        tracing::info!(
            order_id = receipt.order.order_id,
            total = %receipt.order.total_amount,
            replayed = !receipt.created,
            "Order placed"
        );

        let reservation = match &form.reservation {
            None => ReservationOutcome::NotRequested,
            Some(draft) => self.book(&form.contact, draft).await,
        };

        cart.clear();
        Ok(CheckoutOutcome {
            order: receipt.order,
            idempotency_key,
            reservation,
        })
    }

    async fn submit_with_retry(
        &self,
        request: &SubmitOrderRequest,
        idempotency_key: &str,
    ) -> ClientResult<crate::OrderReceipt> {
        let mut attempt = 1;
        loop {
            match self.http.submit_order(request, idempotency_key).await {
                Err(ClientError::Http(e)) if e.is_connect() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "Could not reach server, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn book(
        &self,
        contact: &CustomerContact,
        draft: &ReservationDraft,
    ) -> ReservationOutcome {
        let request = ReservationRequest::new(
            contact.clone(),
            draft.reservation_date.clone(),
            draft.party_size,
        );
        match self.http.submit_reservation(&request).await {
            Ok(reservation) => ReservationOutcome::Booked(reservation),
            Err(e) => {
                tracing::warn!(error = %e, "Reservation failed after order was placed");
                ReservationOutcome::Failed(e.to_string())
            }
        }
    }
}
