//! Staff Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff member (read-only directory entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub staff_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Job title, e.g. "chef" or "waiter"
    pub position: Option<String>,
    pub hired_at: DateTime<Utc>,
}
