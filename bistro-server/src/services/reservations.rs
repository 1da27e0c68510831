//! Reservation submission
//!
//! Independent of order submission: a checkout that sends both may end up
//! with only one of them persisted.

use shared::error::AppError;
use shared::models::{
    Reservation, ReservationWithCustomer, parse_reservation_date, validate_party_size,
};
use shared::request::ReservationRequest;

use super::customers::CustomerRef;
use crate::db::{NewReservation, Store};

pub async fn submit_reservation(
    store: &dyn Store,
    req: ReservationRequest,
) -> Result<Reservation, AppError> {
    let reservation_date =
        parse_reservation_date(req.reservation_date.as_deref().unwrap_or_default())?;
    let party_size = validate_party_size(
        req.party_size
            .ok_or_else(|| AppError::required("party_size"))?,
    )?;
    let customer_ref = CustomerRef::from_request(req.customer_id, req.customer.as_ref())?;
    let customer = customer_ref.resolve(store).await?;

    let reservation = store
        .insert_reservation(&NewReservation {
            customer_id: customer.customer_id,
            reservation_date,
            party_size,
        })
        .await?;

    tracing::info!(
        reservation_id = reservation.reservation_id,
        customer_id = customer.customer_id,
        party_size,
        date = %reservation.reservation_date,
        "Reservation created"
    );
    Ok(reservation)
}

pub async fn list_reservations(
    store: &dyn Store,
) -> Result<Vec<ReservationWithCustomer>, AppError> {
    Ok(store.list_reservations().await?)
}
