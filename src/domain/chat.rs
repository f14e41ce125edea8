use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identity of a chat participant as assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl From<UserId> for ChatId {
    /// Private chats share the id of the user they belong to.
    fn from(user: UserId) -> Self {
        Self(user.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The author of an inbound message or callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Sender {
    pub fn new(id: i64) -> Self {
        Self {
            id: UserId(id),
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// First and last name, if the sender has either.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Human readable name, falling back to the username and then the id.
    pub fn display_name(&self) -> String {
        self.full_name()
            .or_else(|| self.username.as_ref().map(|u| format!("@{u}")))
            .unwrap_or_else(|| self.id.to_string())
    }

    /// An HTML link that mentions the sender.
    pub fn mention_html(&self) -> String {
        format!(
            "<a href=\"tg://user?id={}\">{}</a>",
            self.id,
            escape_html(&self.display_name())
        )
    }
}

/// A text message written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub from: Sender,
    pub text: String,
}

/// A press on one of the inline buttons attached to an earlier message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: Sender,
    /// Chat holding the message the button belongs to.
    pub chat_id: ChatId,
    pub message_id: i64,
    pub data: String,
}

/// Everything the transport can hand to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Update {
    Message(IncomingMessage),
    Callback(CallbackQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Html,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub payload: String,
}

/// Everything the bot can ask the transport to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    Text {
        chat_id: ChatId,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parse_mode: Option<ParseMode>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        buttons: Vec<InlineButton>,
    },
    Photo {
        chat_id: ChatId,
        path: PathBuf,
        caption: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parse_mode: Option<ParseMode>,
    },
    Edit {
        chat_id: ChatId,
        message_id: i64,
        text: String,
    },
    CallbackAnswer {
        callback_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default)]
        show_alert: bool,
    },
}

impl Outbound {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Outbound::Text {
            chat_id,
            text: text.into(),
            parse_mode: None,
            buttons: Vec::new(),
        }
    }

    /// Silently acknowledges a callback so the client stops its spinner.
    pub fn ack(callback_id: impl Into<String>) -> Self {
        Outbound::CallbackAnswer {
            callback_id: callback_id.into(),
            text: None,
            show_alert: false,
        }
    }

    pub fn alert(callback_id: impl Into<String>, text: impl Into<String>) -> Self {
        Outbound::CallbackAnswer {
            callback_id: callback_id.into(),
            text: Some(text.into()),
            show_alert: true,
        }
    }

    /// The chat a message is addressed to, if any.
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Outbound::Text { chat_id, .. }
            | Outbound::Photo { chat_id, .. }
            | Outbound::Edit { chat_id, .. } => Some(*chat_id),
            Outbound::CallbackAnswer { .. } => None,
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_decodes_tagged_message() {
        let line = r#"{"kind":"message","chat_id":42,"from":{"id":42,"username":"alice"},"text":"/start"}"#;
        let update: Update = serde_json::from_str(line).unwrap();

        match update {
            Update::Message(msg) => {
                assert_eq!(msg.chat_id, ChatId(42));
                assert_eq!(msg.from.username.as_deref(), Some("alice"));
                assert_eq!(msg.from.first_name, None);
                assert_eq!(msg.text, "/start");
            }
            other => panic!("expected a message, got {other:?}"),
        }
    }

    #[test]
    fn test_update_decodes_callback() {
        let line = r#"{"kind":"callback","id":"cb-1","from":{"id":7},"chat_id":7,"message_id":100,"data":"approve:42"}"#;
        let update: Update = serde_json::from_str(line).unwrap();

        assert!(matches!(update, Update::Callback(ref cb) if cb.data == "approve:42" && cb.message_id == 100));
    }

    #[test]
    fn test_outbound_text_omits_empty_fields() {
        let json = serde_json::to_string(&Outbound::text(ChatId(1), "hi")).unwrap();
        assert_eq!(json, r#"{"kind":"text","chat_id":1,"text":"hi"}"#);
    }

    #[test]
    fn test_mention_escapes_name() {
        let sender = Sender::new(5).with_first_name("<b>Bob & co</b>");
        assert_eq!(
            sender.mention_html(),
            "<a href=\"tg://user?id=5\">&lt;b&gt;Bob &amp; co&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(Sender::new(9).display_name(), "9");
        assert_eq!(Sender::new(9).with_username("carol").display_name(), "@carol");
        assert_eq!(
            Sender::new(9)
                .with_username("carol")
                .with_first_name("Carol")
                .display_name(),
            "Carol"
        );
        assert_eq!(
            Sender::new(9)
                .with_first_name("Carol")
                .with_last_name("Danvers")
                .display_name(),
            "Carol Danvers"
        );
        assert_eq!(Sender::new(9).with_last_name("Danvers").display_name(), "Danvers");
    }

    #[test]
    fn test_sender_decodes_last_name() {
        let from: Sender =
            serde_json::from_str(r#"{"id":3,"first_name":"Ada","last_name":"Lovelace"}"#).unwrap();
        assert_eq!(
            from.mention_html(),
            "<a href=\"tg://user?id=3\">Ada Lovelace</a>"
        );
    }
}
