//! Markup rendering for messages and sidebar entries
//!
//! Rendering is pure: it maps records to escaped HTML fragments and never
//! touches page state. Deduplication happens in [`crate::ui::ChatView`].

use crate::api::{ConversationId, ConversationSummary, Message, MessageId, Role};

/// Escape the five HTML-significant characters
///
/// A literal `<think>`/`</think>` pair, emitted by some reasoning models,
/// comes out in entity form like any other tag. Each character is escaped
/// exactly once.
///
/// # Examples
///
/// ```
/// use chatdesk::ui::escape_html;
///
/// assert_eq!(escape_html("a < b & 'c'"), "a &lt; b &amp; &#039;c&#039;");
/// assert_eq!(escape_html("<think>x</think>"), "&lt;think&gt;x&lt;/think&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// A message block as displayed in the message pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Id of the source message
    pub id: MessageId,
    /// Author
    pub role: Role,
    /// Raw text, i.e. the element's text content
    pub text: String,
    /// Display time
    pub time: String,
    /// Escaped markup block
    pub html: String,
}

/// Render a message into its templated block
pub fn render_message(message: &Message) -> RenderedMessage {
    let html = format!(
        concat!(
            "<div class=\"message {role}-message\" data-message-id=\"{id}\">\n",
            "  <div class=\"message-content\">{content}</div>\n",
            "  <div class=\"message-footer\">\n",
            "    <span class=\"message-role\">{role}</span>\n",
            "    <time class=\"message-time\">{time}</time>\n",
            "  </div>\n",
            "</div>"
        ),
        role = message.role,
        id = escape_html(message.id.as_str()),
        content = escape_html(&message.content),
        time = escape_html(&message.time),
    );

    RenderedMessage {
        id: message.id.clone(),
        role: message.role,
        text: message.content.clone(),
        time: message.time.clone(),
        html,
    }
}

/// A conversation entry in the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    /// Conversation id
    pub id: ConversationId,
    /// Displayed title
    pub title: String,
    /// Model badge
    pub model_name: String,
    /// Creation time as sent by the backend
    pub created_at: String,
    /// Whether this is the active conversation
    pub selected: bool,
}

impl SidebarItem {
    /// Build an entry from a list-endpoint record
    pub fn from_summary(summary: &ConversationSummary, active: Option<&ConversationId>) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.display_title().to_string(),
            model_name: summary.model_name.clone(),
            created_at: summary.created_at.clone(),
            selected: active == Some(&summary.id),
        }
    }

    /// Markup for this entry, including its delete affordance
    pub fn html(&self) -> String {
        let id = escape_html(self.id.as_str());
        format!(
            concat!(
                "<div class=\"conversation-item{selected}\" data-conv-id=\"{id}\">\n",
                "  <div class=\"conv-header\">\n",
                "    <h3 class=\"conv-title\">{title}</h3>\n",
                "    <button class=\"delete-conv-btn\" aria-label=\"Delete conversation\" data-conv-id=\"{id}\">×</button>\n",
                "  </div>\n",
                "  <div class=\"conv-meta\">\n",
                "    <span class=\"model-badge\">{model}</span>\n",
                "    <time class=\"conv-time\">{created}</time>\n",
                "  </div>\n",
                "</div>"
            ),
            selected = if self.selected { " selected" } else { "" },
            id = id,
            title = escape_html(&self.title),
            model = escape_html(&self.model_name),
            created = escape_html(&self.created_at),
        )
    }
}

/// Render the sidebar for a conversation list
pub fn render_conversation_list(
    conversations: &[ConversationSummary],
    active: Option<&ConversationId>,
) -> Vec<SidebarItem> {
    conversations
        .iter()
        .map(|c| SidebarItem::from_summary(c, active))
        .collect()
}
