//! Process configuration, read once at startup and shared read-only.

use crate::domain::chat::UserId;
use crate::domain::order::TransitionPolicy;
use crate::domain::price::Price;
use crate::error::BotError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The transport's authentication token, `<bot id>:<secret>`.
///
/// Never printed in full; `Debug` and `Display` show only the bot id.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn bot_id(&self) -> &str {
        self.0.split_once(':').map(|(id, _)| id).unwrap_or_default()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for BotToken {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token.split_once(':') {
            Some((id, secret))
                if !id.is_empty()
                    && id.bytes().all(|b| b.is_ascii_digit())
                    && !secret.is_empty()
                    && !secret.contains(char::is_whitespace) =>
            {
                Ok(Self(token.to_string()))
            }
            _ => Err(BotError::ConfigError(
                "bot token must look like <digits>:<secret>".to_string(),
            )),
        }
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BotToken({}:***)", self.bot_id())
    }
}

impl fmt::Display for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:***", self.bot_id())
    }
}

/// Everything the workflow needs to know about this deployment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: BotToken,
    /// The only identity allowed to approve or reject orders.
    pub admin_id: UserId,
    pub price: Price,
    /// What an approved user receives.
    pub content_link: String,
    pub qr_image_path: PathBuf,
    pub transition_policy: TransitionPolicy,
}

impl BotConfig {
    /// Checks values that parsing alone cannot rule out.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.content_link.trim().is_empty() {
            return Err(BotError::ConfigError(
                "content link must not be empty".to_string(),
            ));
        }
        if self.qr_image_path.as_os_str().is_empty() {
            return Err(BotError::ConfigError(
                "QR image path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
