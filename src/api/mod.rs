//! Network gateway for the chat backend
//!
//! This module contains the wire types and the [`ChatApi`] abstraction over
//! the backend's REST surface, together with the reqwest-backed
//! [`HttpChatApi`] implementation.

pub mod http;
pub mod types;

pub use http::{extract_csrf_token, HttpChatApi, CSRF_HEADER};
pub use types::{
    display_time, ChatReply, ChatRequest, ChatTurn, ConversationId, ConversationSummary,
    CreatedConversation, Message, MessageId, Role, DEFAULT_TITLE,
};

use crate::error::Result;
use async_trait::async_trait;

/// Operations the client performs against the backend
///
/// Every method maps to exactly one HTTP request. Implementations return
/// `ChatdeskError::Status` for non-2xx responses so callers can tell a
/// rejected request from a transport failure.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `GET /api/models/`
    async fn list_models(&self) -> Result<Vec<String>>;

    /// `GET /api/conversations/`
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;

    /// `POST /api/conversations/new/`
    async fn create_conversation(&self, model: &str) -> Result<CreatedConversation>;

    /// `GET /api/conversations/{id}/messages/`
    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>>;

    /// `PATCH /api/conversations/{id}/model/`
    async fn change_model(&self, id: &ConversationId, model: &str) -> Result<()>;

    /// `PATCH /api/conversations/{id}/title/`
    ///
    /// Returns the title as stored by the backend, when it reports one.
    async fn rename_conversation(&self, id: &ConversationId, title: &str)
        -> Result<Option<String>>;

    /// `DELETE /api/conversations/{id}/delete/`
    async fn delete_conversation(&self, id: &ConversationId) -> Result<()>;

    /// `POST /api/chat/`
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply>;
}
