use crate::application::replies;
use crate::config::BotConfig;
use crate::domain::chat::{
    CallbackQuery, ChatId, IncomingMessage, InlineButton, Outbound, ParseMode, Sender, Update,
};
use crate::domain::decision::Decision;
use crate::domain::order::{NewOrder, OrderId, TransitionPolicy};
use crate::domain::ports::{NotifierBox, OrderStoreBox};
use crate::domain::reference::ReferenceCode;
use crate::error::{BotError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How an inbound text message is interpreted.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Start,
    Get,
    /// A slash command the bot does not know. Ignored.
    UnknownCommand(&'a str),
    /// Anything else is a reference code submission.
    Text(&'a str),
}

impl<'a> Input<'a> {
    pub fn classify(text: &'a str) -> Self {
        // Only a leading slash makes a command; " /start" is plain text.
        let Some(command) = text.strip_prefix('/') else {
            return Input::Text(text);
        };
        // "/start@my_bot extra" -> "start"
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();
        match name {
            "start" => Input::Start,
            "get" => Input::Get,
            other => Input::UnknownCommand(other),
        }
    }
}

/// Result of a reference code submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted(OrderId),
    Rejected,
}

/// Result of an administrator callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The user was notified. `updated` orders changed, which under the
    /// lenient policy may be zero.
    Applied { decision: Decision, updated: u64 },
    /// Strict policy only: no order of the user could take the transition.
    NothingToResolve(Decision),
    Unauthorized,
    Malformed,
}

/// The payment approval state machine.
///
/// Owns the order store and the outbound side of the transport. Updates are
/// handled one at a time by whoever drives `handle`; storage failures
/// propagate to that caller, notification failures are logged and dropped.
pub struct ApprovalWorkflow {
    config: Arc<BotConfig>,
    orders: OrderStoreBox,
    notifier: NotifierBox,
}

impl ApprovalWorkflow {
    pub fn new(config: Arc<BotConfig>, orders: OrderStoreBox, notifier: NotifierBox) -> Self {
        Self {
            config,
            orders,
            notifier,
        }
    }

    /// Routes one inbound update to the matching operation.
    pub async fn handle(&self, update: Update) -> Result<()> {
        match update {
            Update::Message(message) => self.handle_message(message).await,
            Update::Callback(query) => self.decide(query).await.map(|_| ()),
        }
    }

    async fn handle_message(&self, message: IncomingMessage) -> Result<()> {
        match Input::classify(&message.text) {
            Input::Start => self.welcome(message.chat_id).await,
            Input::Get => self.send_payment_instructions(message.chat_id).await,
            Input::UnknownCommand(name) => {
                debug!(command = name, chat = %message.chat_id, "ignoring unknown command");
            }
            Input::Text(text) => {
                self.submit_reference(&message.from, message.chat_id, text)
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn welcome(&self, chat_id: ChatId) {
        self.notify(Outbound::text(chat_id, replies::WELCOME)).await;
    }

    /// Sends the QR code asset with the amount to pay.
    pub async fn send_payment_instructions(&self, chat_id: ChatId) {
        self.notify(Outbound::Photo {
            chat_id,
            path: self.config.qr_image_path.clone(),
            caption: replies::payment_instructions(self.config.price),
            parse_mode: Some(ParseMode::Markdown),
        })
        .await;
    }

    /// Validates a claimed reference code and, if well-formed, records a
    /// pending order and asks the administrator to review it.
    pub async fn submit_reference(
        &self,
        from: &Sender,
        chat_id: ChatId,
        text: &str,
    ) -> Result<Submission> {
        let utr = match ReferenceCode::parse(text) {
            Ok(utr) => utr,
            Err(e) => {
                debug!(user = %from.id, error = %e, "rejected reference code");
                self.notify(Outbound::text(chat_id, replies::INVALID_REFERENCE))
                    .await;
                return Ok(Submission::Rejected);
            }
        };

        let order_id = self
            .orders
            .create(NewOrder {
                user_id: from.id,
                username: from.username.clone(),
                utr: utr.clone(),
            })
            .await?;
        info!(order = %order_id, user = %from.id, "order created");

        self.notify(Outbound::text(chat_id, replies::REFERENCE_SAVED))
            .await;

        let approve = Decision::Approve(from.id);
        let reject = Decision::Reject(from.id);
        self.notify(Outbound::Text {
            chat_id: ChatId::from(self.config.admin_id),
            text: replies::admin_review_request(from, &utr),
            parse_mode: Some(ParseMode::Html),
            buttons: vec![
                InlineButton {
                    label: replies::APPROVE_LABEL.to_string(),
                    payload: approve.payload(),
                },
                InlineButton {
                    label: replies::REJECT_LABEL.to_string(),
                    payload: reject.payload(),
                },
            ],
        })
        .await;

        Ok(Submission::Accepted(order_id))
    }

    /// Applies an administrator's approve/reject callback.
    pub async fn decide(&self, query: CallbackQuery) -> Result<DecisionOutcome> {
        if query.from.id != self.config.admin_id {
            let denied = BotError::AuthorizationError {
                actor: query.from.id,
            };
            warn!(error = %denied, payload = %query.data, "decision denied");
            self.notify(Outbound::alert(query.id, replies::NOT_AUTHORIZED))
                .await;
            return Ok(DecisionOutcome::Unauthorized);
        }

        self.notify(Outbound::ack(query.id.as_str())).await;

        let decision = match query.data.parse::<Decision>() {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, "ignoring callback");
                return Ok(DecisionOutcome::Malformed);
            }
        };

        let user = decision.user_id();
        let policy = self.config.transition_policy;
        let updated = self
            .orders
            .set_status(user, decision.target_status(), policy)
            .await?;

        if updated == 0 && policy == TransitionPolicy::Strict {
            info!(%user, %decision, %policy, "no order to resolve");
            self.edit(&query, replies::nothing_to_resolve(user)).await;
            return Ok(DecisionOutcome::NothingToResolve(decision));
        }

        if updated == 0 {
            warn!(%user, %decision, %policy, "no order matched; delivering the decision anyway");
        } else {
            info!(%user, %decision, updated, "orders resolved");
        }
        match decision {
            Decision::Approve(_) => {
                self.notify(Outbound::text(
                    ChatId::from(user),
                    replies::payment_verified(&self.config.content_link),
                ))
                .await;
                self.edit(&query, replies::approved_user(user)).await;
            }
            Decision::Reject(_) => {
                self.notify(Outbound::text(ChatId::from(user), replies::PAYMENT_REJECTED))
                    .await;
                self.edit(&query, replies::rejected_user(user)).await;
            }
        }

        Ok(DecisionOutcome::Applied { decision, updated })
    }

    async fn edit(&self, query: &CallbackQuery, text: String) {
        self.notify(Outbound::Edit {
            chat_id: query.chat_id,
            message_id: query.message_id,
            text,
        })
        .await;
    }

    /// Best-effort delivery.
    async fn notify(&self, message: Outbound) {
        if let Err(e) = self.notifier.deliver(message).await {
            warn!(error = %e, "failed to deliver message");
        }
    }
}
