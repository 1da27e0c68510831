//! Reservation Model

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Largest party a single reservation may seat
pub const MAX_PARTY_SIZE: i32 = 50;

/// Reservation status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum ReservationStatus {
    #[default]
    Reserved,
    Seated,
    Cancelled,
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub reservation_id: i64,
    pub customer_id: i64,
    pub reservation_date: DateTime<Utc>,
    pub party_size: i32,
    pub status: ReservationStatus,
}

/// Reservation joined with its customer's contact info (staff list view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationWithCustomer {
    pub reservation_id: i64,
    pub customer_id: i64,
    pub reservation_date: DateTime<Utc>,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
}

/// Parse a reservation date
///
/// Accepts RFC 3339 (`2026-05-01T19:30:00+02:00`) or a local datetime without
/// offset (`2026-05-01T19:30`, `2026-05-01T19:30:00`), the latter read as UTC.
pub fn parse_reservation_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::required("reservation_date"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ReservationDateInvalid,
                format!("Invalid reservation date: {raw}"),
            )
            .with_detail("field", "reservation_date")
        })
}

/// Check a party size is within `1..=MAX_PARTY_SIZE`
pub fn validate_party_size(party_size: i32) -> Result<i32, AppError> {
    if (1..=MAX_PARTY_SIZE).contains(&party_size) {
        Ok(party_size)
    } else {
        Err(AppError::with_message(
            ErrorCode::PartySizeInvalid,
            format!("party_size must be between 1 and {MAX_PARTY_SIZE}, got {party_size}"),
        )
        .with_detail("field", "party_size"))
    }
}
