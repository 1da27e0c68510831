//! Reservation database operations

use shared::models::{Reservation, ReservationStatus, ReservationWithCustomer};
use sqlx::PgPool;

use crate::db::NewReservation;

pub async fn insert(
    pool: &PgPool,
    reservation: &NewReservation,
) -> Result<Reservation, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO reservations (customer_id, reservation_date, party_size, status)
         VALUES ($1, $2, $3, $4)
         RETURNING reservation_id, customer_id, reservation_date, party_size, status",
    )
    .bind(reservation.customer_id)
    .bind(reservation.reservation_date)
    .bind(reservation.party_size)
    .bind(ReservationStatus::Reserved)
    .fetch_one(pool)
    .await
}

pub async fn list_with_customer(
    pool: &PgPool,
) -> Result<Vec<ReservationWithCustomer>, sqlx::Error> {
    sqlx::query_as(
        "SELECT r.reservation_id, r.customer_id, r.reservation_date, r.party_size, r.status,
                c.name AS customer_name, c.email AS customer_email, c.phone AS customer_phone
         FROM reservations r
         JOIN customers c ON c.customer_id = r.customer_id
         ORDER BY r.reservation_date DESC, r.reservation_id DESC",
    )
    .fetch_all(pool)
    .await
}
