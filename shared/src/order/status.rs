//! Order status and the status transition policy

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderStatusInvalid,
                    format!("Unknown order status: {wanted}"),
                )
                .with_detail("status", wanted)
            })
    }
}

/// Which status changes staff may apply
///
/// `Any` allows every transition. `Table` lists, per source status, the
/// allowed targets; sources missing from the table are terminal. Setting an
/// order to the status it already has is always accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Any,
    Table(BTreeMap<OrderStatus, BTreeSet<OrderStatus>>),
}

impl TransitionPolicy {
    /// Every status may move to every other status
    pub fn any() -> Self {
        Self::Any
    }

    /// Kitchen flow with delivered, completed and cancelled as terminal states
    pub fn lifecycle() -> Self {
        use OrderStatus::*;
        let mut table = BTreeMap::new();
        table.insert(Pending, BTreeSet::from([Preparing, Cancelled]));
        table.insert(Preparing, BTreeSet::from([Ready, Cancelled]));
        table.insert(Ready, BTreeSet::from([Delivered, Completed, Cancelled]));
        Self::Table(table)
    }

    /// Parse a policy description
    ///
    /// Accepts `any`, `lifecycle`, or a table like
    /// `pending=preparing,cancelled;preparing=ready`.
    pub fn parse(policy: &str) -> Result<Self, AppError> {
        let policy = policy.trim();
        if policy.is_empty() || policy.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        if policy.eq_ignore_ascii_case("lifecycle") {
            return Ok(Self::lifecycle());
        }

        let mut table: BTreeMap<OrderStatus, BTreeSet<OrderStatus>> = BTreeMap::new();
        for rule in policy.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let (from, targets) = rule.split_once('=').ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ConfigError,
                    format!("Transition rule '{rule}' must look like from=to1,to2"),
                )
            })?;
            let from: OrderStatus = from.parse()?;
            let entry = table.entry(from).or_default();
            for target in targets.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                entry.insert(target.parse()?);
            }
        }
        Ok(Self::Table(table))
    }

    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        if from == to {
            return true;
        }
        match self {
            Self::Any => true,
            Self::Table(table) => table.get(&from).is_some_and(|targets| targets.contains(&to)),
        }
    }

    /// Check a transition, producing the 409 error when rejected
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(AppError::with_message(
                ErrorCode::OrderTransitionNotAllowed,
                format!("Cannot move order from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()))
        }
    }
}
