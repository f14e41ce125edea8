use crate::domain::chat::UserId;
use crate::domain::order::OrderStatus;
use crate::error::BotError;
use std::fmt;
use std::str::FromStr;

/// An administrator's verdict on a user's payment claim.
///
/// Travels through the transport as the callback payload `approve:<id>` or
/// `reject:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve(UserId),
    Reject(UserId),
}

impl Decision {
    pub fn user_id(&self) -> UserId {
        match self {
            Decision::Approve(user) | Decision::Reject(user) => *user,
        }
    }

    /// Status the user's order moves to.
    pub fn target_status(&self) -> OrderStatus {
        match self {
            Decision::Approve(_) => OrderStatus::Approved,
            Decision::Reject(_) => OrderStatus::Rejected,
        }
    }

    pub fn payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve(user) => write!(f, "approve:{user}"),
            Decision::Reject(user) => write!(f, "reject:{user}"),
        }
    }
}

impl FromStr for Decision {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || BotError::MalformedCallback(s.to_string());

        let (action, user) = s.split_once(':').ok_or_else(malformed)?;
        let user = UserId(user.parse::<i64>().map_err(|_| malformed())?);

        match action {
            "approve" => Ok(Decision::Approve(user)),
            "reject" => Ok(Decision::Reject(user)),
            _ => Err(malformed()),
        }
    }
}
