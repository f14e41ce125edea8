use crate::domain::chat::UserId;
use crate::domain::reference::ReferenceCode;
use crate::error::BotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a payment claim: `Pending` until an administrator resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Only `Pending -> Approved` and `Pending -> Rejected` are legal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Approved)
                | (OrderStatus::Pending, OrderStatus::Rejected)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "APPROVED" => Ok(OrderStatus::Approved),
            "REJECTED" => Ok(OrderStatus::Rejected),
            other => Err(BotError::ValidationError(format!(
                "unknown order status {other:?}"
            ))),
        }
    }
}

/// How a store treats a decision aimed at an order that is already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Overwrite whatever status the user's orders carry.
    #[default]
    Lenient,
    /// Only touch orders for which the transition is legal.
    Strict,
}

impl TransitionPolicy {
    pub fn permits(&self, current: OrderStatus, next: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Lenient => true,
            TransitionPolicy::Strict => current.can_transition_to(next),
        }
    }

    /// Statuses an order may currently hold for a move to `next` to apply.
    pub fn sources_for(&self, next: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|current| self.permits(*current, next))
            .collect()
    }
}

impl FromStr for TransitionPolicy {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(TransitionPolicy::Lenient),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(BotError::ConfigError(format!(
                "unknown transition policy {other:?} (expected \"lenient\" or \"strict\")"
            ))),
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionPolicy::Lenient => f.write_str("lenient"),
            TransitionPolicy::Strict => f.write_str("strict"),
        }
    }
}

/// The data a user supplies when claiming a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub username: Option<String>,
    pub utr: ReferenceCode,
}

/// A persisted payment claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub utr: ReferenceCode,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Materializes a fresh `Pending` order under the given id.
    pub fn from_new(id: OrderId, new: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            username: new.username,
            utr: new.utr,
            status: OrderStatus::Pending,
            created_at,
        }
    }

    /// Applies `next` if `policy` allows it. Returns whether the order changed.
    pub fn apply(&mut self, next: OrderStatus, policy: TransitionPolicy) -> bool {
        if policy.permits(self.status, next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}
