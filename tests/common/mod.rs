#![allow(dead_code)]

use async_trait::async_trait;
use paybot::application::workflow::ApprovalWorkflow;
use paybot::config::BotConfig;
use paybot::domain::chat::{
    CallbackQuery, ChatId, IncomingMessage, Outbound, Sender, Update, UserId,
};
use paybot::domain::order::{NewOrder, Order, OrderId, OrderStatus, TransitionPolicy};
use paybot::domain::ports::{Notifier, OrderStore};
use paybot::domain::price::Price;
use paybot::error::{BotError, Result};
use paybot::infrastructure::in_memory::InMemoryOrderStore;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const ADMIN: i64 = 7;
pub const ADMIN_MESSAGE_ID: i64 = 100;
pub const CONTENT_LINK: &str = "https://example.com/premium";
pub const TOKEN: &str = "123456:TEST-token";

pub fn config(policy: TransitionPolicy) -> BotConfig {
    BotConfig {
        token: TOKEN.parse().unwrap(),
        admin_id: UserId(ADMIN),
        price: Price::new(dec!(20)).unwrap(),
        content_link: CONTENT_LINK.to_string(),
        qr_image_path: PathBuf::from("qr.jpg"),
        transition_policy: policy,
    }
}

/// A notifier that keeps every outbound message instead of sending it.
///
/// Clones share the same log, so a test can hand one clone to the workflow
/// and inspect the other.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Outbound>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in order.
    pub async fn sent(&self) -> Vec<Outbound> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, chat_id: ChatId) -> Vec<Outbound> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|message| message.chat_id() == Some(chat_id))
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.write().await.clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, message: Outbound) -> Result<()> {
        self.sent.write().await.push(message);
        Ok(())
    }
}

/// An order store whose database is gone: every call fails.
#[derive(Default, Clone)]
pub struct UnavailableOrderStore;

fn unavailable() -> BotError {
    BotError::StorageError(Box::new(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "database is unavailable",
    )))
}

#[async_trait]
impl OrderStore for UnavailableOrderStore {
    async fn create(&self, _order: NewOrder) -> Result<OrderId> {
        Err(unavailable())
    }

    async fn set_status(
        &self,
        _user_id: UserId,
        _status: OrderStatus,
        _policy: TransitionPolicy,
    ) -> Result<u64> {
        Err(unavailable())
    }

    async fn get(&self, _id: OrderId) -> Result<Option<Order>> {
        Err(unavailable())
    }

    async fn find_by_user(&self, _user_id: UserId) -> Result<Vec<Order>> {
        Err(unavailable())
    }
}

/// A workflow over in-memory adapters, plus handles to inspect them.
pub struct Harness {
    pub workflow: ApprovalWorkflow,
    pub store: InMemoryOrderStore,
    pub notifier: RecordingNotifier,
}

pub fn harness(policy: TransitionPolicy) -> Harness {
    let store = InMemoryOrderStore::new();
    let notifier = RecordingNotifier::new();
    let workflow = ApprovalWorkflow::new(
        Arc::new(config(policy)),
        Box::new(store.clone()),
        Box::new(notifier.clone()),
    );
    Harness {
        workflow,
        store,
        notifier,
    }
}

/// A workflow whose store always fails, plus the notifier it reports to.
pub fn unavailable_harness(policy: TransitionPolicy) -> (ApprovalWorkflow, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let workflow = ApprovalWorkflow::new(
        Arc::new(config(policy)),
        Box::new(UnavailableOrderStore),
        Box::new(notifier.clone()),
    );
    (workflow, notifier)
}

pub fn alice() -> Sender {
    Sender::new(42).with_username("alice").with_first_name("Alice")
}

pub fn message(from: &Sender, text: &str) -> Update {
    Update::Message(IncomingMessage {
        chat_id: ChatId(from.id.0),
        from: from.clone(),
        text: text.to_string(),
    })
}

pub fn callback(from: i64, data: &str) -> CallbackQuery {
    CallbackQuery {
        id: format!("cb-{from}-{data}"),
        from: Sender::new(from),
        chat_id: ChatId(from),
        message_id: ADMIN_MESSAGE_ID,
        data: data.to_string(),
    }
}

pub fn admin_callback(data: &str) -> CallbackQuery {
    callback(ADMIN, data)
}

/// Arguments every binary invocation needs.
pub fn required_args() -> Vec<String> {
    vec![
        "--token".to_string(),
        TOKEN.to_string(),
        "--admin-id".to_string(),
        ADMIN.to_string(),
        "--content-link".to_string(),
        CONTENT_LINK.to_string(),
    ]
}

pub fn message_line(user: i64, text: &str) -> String {
    serde_json::json!({
        "kind": "message",
        "chat_id": user,
        "from": {"id": user, "username": format!("user{user}")},
        "text": text,
    })
    .to_string()
}

pub fn callback_line(from: i64, data: &str) -> String {
    serde_json::json!({
        "kind": "callback",
        "id": format!("cb-{data}"),
        "from": {"id": from},
        "chat_id": from,
        "message_id": ADMIN_MESSAGE_ID,
        "data": data,
    })
    .to_string()
}
