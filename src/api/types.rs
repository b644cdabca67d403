//! Wire and domain types shared by the gateway, cache, and controller

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Title shown for conversations the backend has not named yet
pub const DEFAULT_TITLE: &str = "New conversation";

/// Identifier accepted from the backend as either a JSON number or string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Server-assigned conversation identifier
///
/// The backend emits integer ids; they are kept as strings so the rest of
/// the client never depends on the numeric representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Message identifier used for render and cache deduplication
///
/// Numeric ids coming from the backend are namespaced as `srv-<id>`;
/// messages created locally get a random UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh local identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Identifier for a backend-assigned numeric id
    pub fn from_server(id: i64) -> Self {
        Self(format!("srv-{}", id))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from_server(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the keyboard
    User,
    /// Produced by the model
    Assistant,
}

impl Role {
    /// Lowercase label used on the wire and in rendered markup
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message
///
/// Messages are never mutated after creation. `time` is a display string
/// (`HH:MM`), not a machine timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier used for deduplication
    #[serde(default = "MessageId::generate")]
    pub id: MessageId,
    /// Who wrote the message
    pub role: Role,
    /// Raw, unescaped text
    pub content: String,
    /// Display-formatted time
    #[serde(default)]
    pub time: String,
}

impl Message {
    /// Create a message stamped with the current local time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role,
            content: content.into(),
            time: display_time(),
        }
    }

    /// Create a user message stamped now
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdesk::api::{Message, Role};
    ///
    /// let msg = Message::user("Hello");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.time.len(), 5);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message stamped now
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Strip the message down to what the chat endpoint expects
    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Current local time as `HH:MM`
pub fn display_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Conversation entry as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Server-assigned id
    pub id: ConversationId,
    /// Title, absent or empty until the backend names the conversation
    #[serde(default)]
    pub title: Option<String>,
    /// Model bound to the conversation
    #[serde(default, alias = "model")]
    pub model_name: String,
    /// Server-formatted creation time
    #[serde(default)]
    pub created_at: String,
}

impl ConversationSummary {
    /// Title to display, falling back to [`DEFAULT_TITLE`]
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(DEFAULT_TITLE)
    }
}

/// Response body of the create endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedConversation {
    /// Id of the new conversation
    pub id: ConversationId,
    /// Initial title, if the backend sent one
    #[serde(default)]
    pub title: Option<String>,
}

/// Role and content pair sent as chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Author
    pub role: Role,
    /// Raw text
    pub content: String,
}

/// Body of `POST /api/chat/`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Target conversation
    pub conversation_id: ConversationId,
    /// Full history including the newest user message
    pub messages: Vec<ChatTurn>,
    /// Model to answer with
    pub model: String,
}

/// Conversation snapshot embedded in some chat replies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyConversation {
    /// Title after the exchange
    #[serde(default)]
    pub title: Option<String>,
}

/// Response body of `POST /api/chat/`
///
/// Accepts both `{response, title}` and `{response, conversation: {title}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// Assistant text
    pub response: String,
    /// Updated conversation title
    #[serde(default)]
    pub title: Option<String>,
    /// Updated conversation snapshot
    #[serde(default)]
    pub conversation: Option<ReplyConversation>,
}

impl ChatReply {
    /// Title to display after this exchange
    pub fn resolved_title(&self) -> &str {
        non_empty(self.title.as_deref())
            .or_else(|| {
                self.conversation
                    .as_ref()
                    .and_then(|c| non_empty(c.title.as_deref()))
            })
            .unwrap_or(DEFAULT_TITLE)
    }
}

/// Body of the model change request
#[derive(Debug, Clone, Serialize)]
pub struct ModelChange<'a> {
    /// New model identifier
    pub model: &'a str,
}

/// Body of the rename request
#[derive(Debug, Clone, Serialize)]
pub struct TitleChange<'a> {
    /// New title
    pub title: &'a str,
}

/// Response body of the rename endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenameReply {
    /// Title as stored by the backend
    #[serde(default)]
    pub title: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|t| !t.trim().is_empty())
}
