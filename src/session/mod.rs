//! Chat session controller
//!
//! [`ChatController`] ties the gateway, the local cache and the page model
//! together. It holds the only [`SessionState`] and is the sole writer of
//! the [`ChatView`].
//!
//! Every public operation catches its own failures: network errors are
//! logged and turned into an alert on the view, cache errors are logged and
//! otherwise ignored. Nothing here returns an error to the caller.
//!
//! Methods take `&self` and release their locks before awaiting, so a
//! delete or conversation switch can run while a send is in flight. A
//! [`SendTicket`] taken at send time keeps a late reply out of the wrong
//! conversation's pane, and a reply for a conversation deleted meanwhile
//! is dropped. Overlapping switches resolve to the one started last.

pub mod state;

pub use state::{SendTicket, SessionState};

use crate::api::{ChatApi, ChatRequest, ConversationId, HttpChatApi, Message};
use crate::cache::ConversationCache;
use crate::config::Config;
use crate::error::Result;
use crate::ui::{Action, Affordance, ChatView, HandlerTable, UiEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const SEND_FAILED: &str = "Failed to send message, please try again later";
const CREATE_FAILED: &str = "Failed to create conversation, please try again later";
const DELETE_FAILED: &str = "Failed to delete conversation, please try again later";
const HISTORY_FAILED: &str = "Failed to load conversation history, please try again later";
const LIST_FAILED: &str = "Failed to load conversations, please try again later";
const MODELS_FAILED: &str = "Failed to load models, please try again later";
const RENAME_FAILED: &str = "Failed to rename conversation, please try again later";

/// How a send attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Preconditions not met; nothing happened
    Skipped,
    /// Reply received and rendered
    Delivered,
    /// Reply received after the user left the conversation; cached only
    Detached,
    /// Reply received for a conversation deleted meanwhile; dropped
    Discarded,
    /// Request failed; an alert was raised
    Failed,
}

/// Single owner of session state for one client
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    cache: ConversationCache,
    state: Mutex<SessionState>,
    view: Mutex<ChatView>,
    handlers: HandlerTable,
    processing: AtomicBool,
}

/// Releases the send latch and the loading overlay on every exit path
struct ProcessingGuard<'a> {
    controller: &'a ChatController,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.controller.lock_view().set_loading(false);
        self.controller.processing.store(false, Ordering::Release);
    }
}

impl ChatController {
    /// Create a controller with the default event bindings
    ///
    /// # Arguments
    ///
    /// * `api` - Backend gateway
    /// * `cache` - Local message mirror
    /// * `model` - Model selected at startup
    pub fn new(api: Arc<dyn ChatApi>, cache: ConversationCache, model: impl Into<String>) -> Self {
        Self {
            api,
            cache,
            state: Mutex::new(SessionState::new(model)),
            view: Mutex::new(ChatView::new()),
            handlers: HandlerTable::with_default_bindings(),
            processing: AtomicBool::new(false),
        }
    }

    /// Build the HTTP gateway and cache described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the cache database cannot be
    /// created.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = HttpChatApi::new(&config.server)?;
        let cache = ConversationCache::from_config(&config.cache)?;
        Ok(Self::new(
            Arc::new(api),
            cache,
            config.chat.default_model.clone(),
        ))
    }

    /// Replace the event bindings
    pub fn with_handlers(mut self, handlers: HandlerTable) -> Self {
        self.handlers = handlers;
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_view(&self) -> MutexGuard<'_, ChatView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn alert(&self, message: &str) {
        self.lock_view().push_alert(message);
    }

    /// Copy of the session state
    pub fn session(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Active conversation, if any
    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.lock_state().current_conversation_id.clone()
    }

    /// Model used for new conversations and sends
    pub fn current_model(&self) -> String {
        self.lock_state().current_model.clone()
    }

    /// Whether a send is in flight
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Copy of the page model
    pub fn view(&self) -> ChatView {
        self.lock_view().clone()
    }

    /// Read the page model without copying it
    pub fn with_view<R>(&self, f: impl FnOnce(&ChatView) -> R) -> R {
        f(&self.lock_view())
    }

    /// Drain pending alerts
    pub fn take_alerts(&self) -> Vec<String> {
        self.lock_view().take_alerts()
    }

    /// Replace the input field's text
    pub fn set_input(&self, text: impl Into<String>) {
        self.lock_view().set_input(text);
    }

    /// Local message mirror
    pub fn cache(&self) -> &ConversationCache {
        &self.cache
    }

    /// Load the model selector and the conversation sidebar
    pub async fn initialize(&self) {
        tracing::info!("Initializing chat session");
        self.load_models().await;
        self.load_conversations().await;
    }

    /// Populate the model selector from the backend
    ///
    /// Returns `true` on success.
    pub async fn load_models(&self) -> bool {
        match self.api.list_models().await {
            Ok(models) => {
                tracing::debug!("Loaded {} models", models.len());
                let current = self.current_model();
                self.lock_view().set_model_options(models, &current);
                true
            }
            Err(e) => {
                tracing::error!("Failed to load models: {:#}", e);
                self.alert(MODELS_FAILED);
                false
            }
        }
    }

    /// Refresh the conversation sidebar
    ///
    /// Returns `true` on success.
    pub async fn load_conversations(&self) -> bool {
        match self.api.list_conversations().await {
            Ok(conversations) => {
                tracing::debug!("Loaded {} conversations", conversations.len());
                let active = self.active_conversation();
                self.lock_view()
                    .set_conversations(&conversations, active.as_ref());
                true
            }
            Err(e) => {
                tracing::error!("Failed to load conversations: {:#}", e);
                self.alert(LIST_FAILED);
                false
            }
        }
    }

    /// Create a conversation with the current model and make it active
    ///
    /// On failure an alert is raised and the session is left as it was.
    ///
    /// # Returns
    ///
    /// The new conversation's id, or `None` if creation failed
    pub async fn create_conversation(&self) -> Option<ConversationId> {
        let model = self.current_model();
        let created = match self.api.create_conversation(&model).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("Failed to create conversation: {:#}", e);
                self.alert(CREATE_FAILED);
                return None;
            }
        };

        tracing::info!(conversation = %created.id, model = %model, "Created conversation");
        self.lock_state().set_active(Some(created.id.clone()));
        self.lock_view().clear_messages();
        self.load_conversations().await;
        Some(created.id)
    }

    /// Open a conversation: fetch its history, render it, and sync the cache
    ///
    /// The pane and the active id only change once the history arrived. A
    /// non-empty server history replaces the cached copy; the cached copy is
    /// then replayed so messages the backend does not know about yet still
    /// show, without rendering anything twice.
    ///
    /// A switch started later, or a create or delete that changed the
    /// active conversation meanwhile, wins over this one.
    ///
    /// Returns `true` when the conversation was shown.
    pub async fn select_conversation(&self, id: &ConversationId) -> bool {
        let generation = self.lock_state().begin_select();
        let history = match self.api.list_messages(id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(conversation = %id, "Failed to load history: {:#}", e);
                self.alert(HISTORY_FAILED);
                return false;
            }
        };

        // Held until the pane is rendered so a later switch cannot interleave
        let mut state = self.lock_state();
        if !state.finish_select(id, generation) {
            tracing::debug!(conversation = %id, "Superseded by a later switch, not showing");
            return false;
        }

        let cached = match self.cache.reconcile(id, &history) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(conversation = %id, "Cache reconcile failed: {:#}", e);
                Vec::new()
            }
        };

        let mut view = self.lock_view();
        view.clear_messages();
        for message in history.iter().chain(cached.iter()) {
            view.append_message(message);
        }
        view.mark_selected(Some(id));
        tracing::debug!(
            conversation = %id,
            "Showing {} messages",
            view.messages().len()
        );
        true
    }

    /// Delete a conversation on the backend and drop it locally
    ///
    /// Deleting the active conversation empties the pane and clears the
    /// active id. On failure the sidebar entry stays.
    ///
    /// Returns `true` on success.
    pub async fn delete_conversation(&self, id: &ConversationId) -> bool {
        if let Err(e) = self.api.delete_conversation(id).await {
            tracing::error!(conversation = %id, "Failed to delete conversation: {:#}", e);
            self.alert(DELETE_FAILED);
            return false;
        }

        let was_active = {
            let mut state = self.lock_state();
            if let Err(e) = self.cache.forget(id) {
                tracing::warn!(conversation = %id, "Failed to drop cache entry: {:#}", e);
            }
            state.mark_deleted(id)
        };

        let mut view = self.lock_view();
        view.remove_conversation(id);
        if was_active {
            view.clear_messages();
        }

        tracing::info!(conversation = %id, "Deleted conversation");
        true
    }

    /// Switch the session model and bind it to the active conversation
    ///
    /// A failed backend update is only logged; the local selection stays.
    ///
    /// Returns `false` when the backend rejected the change.
    pub async fn change_model(&self, model: &str) -> bool {
        let active = {
            let mut state = self.lock_state();
            state.current_model = model.to_string();
            state.current_conversation_id.clone()
        };
        self.lock_view().select_model(model);

        let Some(id) = active else {
            tracing::debug!("Model set to {} with no active conversation", model);
            return true;
        };

        match self.api.change_model(&id, model).await {
            Ok(()) => {
                tracing::info!(conversation = %id, "Model changed to {}", model);
                true
            }
            Err(e) => {
                tracing::warn!(conversation = %id, "Failed to change model: {:#}", e);
                false
            }
        }
    }

    /// Rename a conversation
    ///
    /// The sidebar shows the title the backend stored, falling back to the
    /// requested one.
    ///
    /// Returns `true` on success.
    pub async fn rename_conversation(&self, id: &ConversationId, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            self.alert("Title cannot be empty");
            return false;
        }

        match self.api.rename_conversation(id, title).await {
            Ok(stored) => {
                let shown = stored.unwrap_or_else(|| title.to_string());
                self.lock_view().set_conversation_title(id, &shown);
                tracing::info!(conversation = %id, "Renamed conversation to {}", shown);
                true
            }
            Err(e) => {
                tracing::error!(conversation = %id, "Failed to rename conversation: {:#}", e);
                self.alert(RENAME_FAILED);
                false
            }
        }
    }

    /// Type `text` into the input field and send it
    pub async fn submit(&self, text: &str) -> SendOutcome {
        self.set_input(text);
        self.handle_send().await
    }

    /// Send the input field's text to the active conversation
    ///
    /// Does nothing when the trimmed input is empty, no conversation is
    /// active, or another send is in flight. The user message is rendered
    /// and cached before the request goes out and stays even if the request
    /// fails.
    pub async fn handle_send(&self) -> SendOutcome {
        let text = self.with_view(|view| view.input().trim().to_string());
        if text.is_empty() {
            return SendOutcome::Skipped;
        }

        let Some(ticket) = self.lock_state().ticket() else {
            tracing::debug!("No active conversation, ignoring send");
            return SendOutcome::Skipped;
        };

        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Send already in flight, ignoring");
            return SendOutcome::Skipped;
        }
        let _guard = ProcessingGuard { controller: self };

        let conversation = &ticket.conversation_id;
        let pending = Message::user(text);
        {
            let mut view = self.lock_view();
            view.append_message(&pending);
            view.clear_input();
            view.set_loading(true);
        }
        if let Err(e) = self.cache.append(conversation, &pending) {
            tracing::warn!(conversation = %conversation, "Failed to cache message: {:#}", e);
        }

        let history = match self.cache.history_for_send(conversation, &pending) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(conversation = %conversation, "Cache unreadable, sending last message only: {:#}", e);
                vec![pending.to_turn()]
            }
        };

        let request = ChatRequest {
            conversation_id: conversation.clone(),
            messages: history,
            model: self.current_model(),
        };
        tracing::debug!(
            conversation = %conversation,
            "Sending {} messages with model {}",
            request.messages.len(),
            request.model
        );

        let reply = match self.api.send_chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(conversation = %conversation, "Failed to send message: {:#}", e);
                self.alert(SEND_FAILED);
                return SendOutcome::Failed;
            }
        };

        let answer = Message::assistant(reply.response.as_str());
        let state = self.lock_state();
        if state.is_deleted(conversation) {
            tracing::info!(conversation = %conversation, "Conversation deleted during send, dropping reply");
            return SendOutcome::Discarded;
        }
        if let Err(e) = self.cache.append(conversation, &answer) {
            tracing::warn!(conversation = %conversation, "Failed to cache reply: {:#}", e);
        }

        let mut view = self.lock_view();
        view.set_conversation_title(conversation, reply.resolved_title());
        if state.accepts(&ticket) {
            view.append_message(&answer);
            SendOutcome::Delivered
        } else {
            tracing::info!(conversation = %conversation, "Reply arrived after leaving conversation, cached only");
            SendOutcome::Detached
        }
    }

    /// Route a UI event through the handler table and perform its action
    ///
    /// Clicks on a disabled send or new-chat button are dropped.
    ///
    /// # Returns
    ///
    /// The action performed, if any
    pub async fn dispatch(&self, event: UiEvent) -> Option<Action> {
        if !self.control_enabled(event.target) {
            tracing::debug!("Ignoring event on disabled {:?}", event.target);
            return None;
        }

        let action = self.handlers.dispatch(&event)?;
        self.perform(action.clone()).await;
        Some(action)
    }

    fn control_enabled(&self, target: Affordance) -> bool {
        let view = self.lock_view();
        match target {
            Affordance::SendButton => view.send_enabled(),
            Affordance::NewChatButton => view.new_chat_enabled(),
            _ => true,
        }
    }

    /// Run a controller operation
    pub async fn perform(&self, action: Action) {
        match action {
            Action::Send => {
                self.handle_send().await;
            }
            Action::InsertNewline => self.lock_view().insert_newline(),
            Action::ChangeModel(model) => {
                self.change_model(&model).await;
            }
            Action::NewConversation => {
                self.create_conversation().await;
            }
            Action::SelectConversation(id) => {
                self.select_conversation(&id).await;
            }
            Action::DeleteConversation(id) => {
                self.delete_conversation(&id).await;
            }
        }
    }
}
