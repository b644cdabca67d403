//! Headless page state
//!
//! [`ChatView`] holds everything the page shows: the message pane, the
//! conversation sidebar, the model selector, the input field, the loading
//! overlay, control enablement, and pending alerts. Front ends read it and
//! draw; the controller is the only writer.

use crate::api::{ConversationId, ConversationSummary, Message, MessageId};
use crate::ui::render::{render_conversation_list, render_message, RenderedMessage, SidebarItem};

/// The page model
#[derive(Debug, Clone)]
pub struct ChatView {
    messages: Vec<RenderedMessage>,
    conversations: Vec<SidebarItem>,
    model_options: Vec<String>,
    selected_model: Option<String>,
    input: String,
    loading: bool,
    send_enabled: bool,
    new_chat_enabled: bool,
    alerts: Vec<String>,
    pane_epoch: u64,
}

impl Default for ChatView {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            conversations: Vec::new(),
            model_options: Vec::new(),
            selected_model: None,
            input: String::new(),
            loading: false,
            send_enabled: true,
            new_chat_enabled: true,
            alerts: Vec::new(),
            pane_epoch: 0,
        }
    }
}

impl ChatView {
    /// Empty page with all controls enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a message into the pane unless one with the same id is shown
    ///
    /// Returns `true` when a block was appended.
    pub fn append_message(&mut self, message: &Message) -> bool {
        if self.contains_message(&message.id) {
            tracing::debug!(message = %message.id, "Skipping already displayed message");
            return false;
        }
        self.messages.push(render_message(message));
        true
    }

    /// Whether a message with this id is displayed
    pub fn contains_message(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }

    /// Empty the message pane
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.pane_epoch += 1;
    }

    /// Displayed message blocks in order
    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    /// Incremented every time the pane is cleared
    ///
    /// Lets incremental front ends notice that previously drawn blocks
    /// are gone.
    pub fn pane_epoch(&self) -> u64 {
        self.pane_epoch
    }

    /// Replace the sidebar
    pub fn set_conversations(
        &mut self,
        conversations: &[ConversationSummary],
        active: Option<&ConversationId>,
    ) {
        self.conversations = render_conversation_list(conversations, active);
    }

    /// Sidebar entries in order
    pub fn conversations(&self) -> &[SidebarItem] {
        &self.conversations
    }

    /// Remove a sidebar entry; returns whether one was present
    pub fn remove_conversation(&mut self, id: &ConversationId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| &c.id != id);
        self.conversations.len() != before
    }

    /// Set the displayed title of a sidebar entry; returns whether it exists
    pub fn set_conversation_title(&mut self, id: &ConversationId, title: &str) -> bool {
        match self.conversations.iter_mut().find(|c| &c.id == id) {
            Some(item) => {
                item.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Move the `selected` marker to `active`
    pub fn mark_selected(&mut self, active: Option<&ConversationId>) {
        for item in &mut self.conversations {
            item.selected = active == Some(&item.id);
        }
    }

    /// Populate the model selector
    ///
    /// The current model stays selected when offered, otherwise the first
    /// option shows as selected.
    pub fn set_model_options(&mut self, models: Vec<String>, current: &str) {
        self.selected_model = if models.iter().any(|m| m == current) {
            Some(current.to_string())
        } else {
            models.first().cloned()
        };
        self.model_options = models;
    }

    /// Options in the model selector
    pub fn model_options(&self) -> &[String] {
        &self.model_options
    }

    /// Option shown as selected
    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// Reflect a selector change
    pub fn select_model(&mut self, model: &str) {
        self.selected_model = Some(model.to_string());
    }

    /// Current text in the input field
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input field's text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Append a line break to the input field
    pub fn insert_newline(&mut self) {
        self.input.push('\n');
    }

    /// Empty the input field
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Show or hide the loading overlay, toggling send and new-chat controls
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.send_enabled = !loading;
        self.new_chat_enabled = !loading;
    }

    /// Whether the loading overlay is visible
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the send button is enabled
    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Whether the new-chat button is enabled
    pub fn new_chat_enabled(&self) -> bool {
        self.new_chat_enabled
    }

    /// Queue a user-facing alert
    pub fn push_alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    /// Alerts not yet shown
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Take all pending alerts
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_same_message_twice_renders_once() {
        let mut view = ChatView::new();
        let msg = Message::user("hello");
        assert!(view.append_message(&msg));
        assert!(!view.append_message(&msg));
        assert_eq!(view.messages().len(), 1);
    }

    #[test]
    fn test_distinct_messages_with_equal_text_both_render() {
        let mut view = ChatView::new();
        view.append_message(&Message::user("ok"));
        view.append_message(&Message::assistant("ok"));
        assert_eq!(view.messages().len(), 2);
    }

    #[test]
    fn test_clear_messages_bumps_epoch() {
        let mut view = ChatView::new();
        view.append_message(&Message::user("x"));
        view.clear_messages();
        assert!(view.messages().is_empty());
        assert_eq!(view.pane_epoch(), 1);
    }

    #[test]
    fn test_loading_toggles_controls() {
        let mut view = ChatView::new();
        view.set_loading(true);
        assert!(view.is_loading());
        assert!(!view.send_enabled());
        assert!(!view.new_chat_enabled());
        view.set_loading(false);
        assert!(view.send_enabled());
        assert!(view.new_chat_enabled());
    }

    #[test]
    fn test_sidebar_title_update_and_removal() {
        let mut view = ChatView::new();
        let summaries = vec![
            ConversationSummary {
                id: ConversationId::new("1"),
                title: Some("One".to_string()),
                model_name: "m".to_string(),
                created_at: String::new(),
            },
            ConversationSummary {
                id: ConversationId::new("2"),
                title: None,
                model_name: "m".to_string(),
                created_at: String::new(),
            },
        ];
        view.set_conversations(&summaries, Some(&ConversationId::new("2")));
        assert!(view.conversations()[1].selected);

        assert!(view.set_conversation_title(&ConversationId::new("2"), "Two"));
        assert_eq!(view.conversations()[1].title, "Two");
        assert!(!view.set_conversation_title(&ConversationId::new("9"), "Nope"));

        assert!(view.remove_conversation(&ConversationId::new("1")));
        assert!(!view.remove_conversation(&ConversationId::new("1")));
        assert_eq!(view.conversations().len(), 1);
    }

    #[test]
    fn test_model_options_keep_current_selection() {
        let mut view = ChatView::new();
        view.set_model_options(vec!["a".into(), "b".into()], "b");
        assert_eq!(view.selected_model(), Some("b"));
        view.set_model_options(vec!["a".into(), "c".into()], "b");
        assert_eq!(view.selected_model(), Some("a"));
    }

    #[test]
    fn test_take_alerts_drains() {
        let mut view = ChatView::new();
        view.push_alert("boom");
        assert_eq!(view.take_alerts(), vec!["boom".to_string()]);
        assert!(view.alerts().is_empty());
    }
}
