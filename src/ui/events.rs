//! UI event wiring
//!
//! Front ends describe user input as [`UiEvent`]s aimed at an
//! [`Affordance`]. A [`HandlerTable`] maps each affordance to a handler
//! that turns the event into an [`Action`] for the controller, so the
//! wiring can be tested without any real widgets.

use crate::api::ConversationId;
use std::collections::HashMap;

/// Interactive elements of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    /// The send button
    SendButton,
    /// The message input field
    MessageInput,
    /// The model dropdown
    ModelSelector,
    /// The new-chat button
    NewChatButton,
    /// The delete button on a sidebar entry
    DeleteButton,
    /// A sidebar entry
    ConversationItem,
}

/// What happened to an affordance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Pointer click or equivalent activation
    Click,
    /// Key press, with DOM-style key name (`"Enter"`, `"a"`, ...)
    KeyDown {
        /// Key name
        key: String,
        /// Whether Shift was held
        shift: bool,
    },
    /// Value change, e.g. a new dropdown selection
    Change(String),
}

/// A user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    /// Element the event targets
    pub target: Affordance,
    /// Kind of interaction
    pub kind: EventKind,
    /// Conversation the element belongs to, for sidebar elements
    pub conversation: Option<ConversationId>,
}

impl UiEvent {
    /// Click on a page-level element
    pub fn click(target: Affordance) -> Self {
        Self {
            target,
            kind: EventKind::Click,
            conversation: None,
        }
    }

    /// Click on a sidebar element belonging to `id`
    pub fn click_conversation(target: Affordance, id: ConversationId) -> Self {
        Self {
            target,
            kind: EventKind::Click,
            conversation: Some(id),
        }
    }

    /// Key press on an element
    pub fn key_down(target: Affordance, key: impl Into<String>, shift: bool) -> Self {
        Self {
            target,
            kind: EventKind::KeyDown {
                key: key.into(),
                shift,
            },
            conversation: None,
        }
    }

    /// Value change on an element
    pub fn change(target: Affordance, value: impl Into<String>) -> Self {
        Self {
            target,
            kind: EventKind::Change(value.into()),
            conversation: None,
        }
    }
}

/// Controller operation requested by an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send the input field's text
    Send,
    /// Insert a line break into the input field
    InsertNewline,
    /// Switch the active model
    ChangeModel(String),
    /// Create a new conversation
    NewConversation,
    /// Open a conversation
    SelectConversation(ConversationId),
    /// Delete a conversation
    DeleteConversation(ConversationId),
}

/// Event handler: returns the action to perform, if any
pub type Handler = fn(&UiEvent) -> Option<Action>;

/// Registration table mapping affordances to handlers
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<Affordance, Handler>,
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl HandlerTable {
    /// Table with no bindings
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the standard page bindings
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdesk::ui::{Action, Affordance, HandlerTable, UiEvent};
    ///
    /// let table = HandlerTable::with_default_bindings();
    /// let event = UiEvent::key_down(Affordance::MessageInput, "Enter", false);
    /// assert_eq!(table.dispatch(&event), Some(Action::Send));
    /// ```
    pub fn with_default_bindings() -> Self {
        let mut table = Self::empty();
        table.register(Affordance::SendButton, on_send_button);
        table.register(Affordance::MessageInput, on_input_key);
        table.register(Affordance::ModelSelector, on_model_change);
        table.register(Affordance::NewChatButton, on_new_chat);
        table.register(Affordance::DeleteButton, on_delete);
        table.register(Affordance::ConversationItem, on_conversation_click);
        table
    }

    /// Bind `handler` to `affordance`, returning any previous handler
    pub fn register(&mut self, affordance: Affordance, handler: Handler) -> Option<Handler> {
        self.handlers.insert(affordance, handler)
    }

    /// Whether an affordance has a handler
    pub fn is_bound(&self, affordance: Affordance) -> bool {
        self.handlers.contains_key(&affordance)
    }

    /// Route an event to its handler
    pub fn dispatch(&self, event: &UiEvent) -> Option<Action> {
        let handler = self.handlers.get(&event.target)?;
        handler(event)
    }
}

fn on_send_button(event: &UiEvent) -> Option<Action> {
    matches!(event.kind, EventKind::Click).then_some(Action::Send)
}

fn on_input_key(event: &UiEvent) -> Option<Action> {
    match &event.kind {
        EventKind::KeyDown { key, shift } if key == "Enter" => Some(if *shift {
            Action::InsertNewline
        } else {
            Action::Send
        }),
        _ => None,
    }
}

fn on_model_change(event: &UiEvent) -> Option<Action> {
    match &event.kind {
        EventKind::Change(value) => Some(Action::ChangeModel(value.clone())),
        _ => None,
    }
}

fn on_new_chat(event: &UiEvent) -> Option<Action> {
    matches!(event.kind, EventKind::Click).then_some(Action::NewConversation)
}

fn on_delete(event: &UiEvent) -> Option<Action> {
    match event.kind {
        EventKind::Click => event.conversation.clone().map(Action::DeleteConversation),
        _ => None,
    }
}

fn on_conversation_click(event: &UiEvent) -> Option<Action> {
    match event.kind {
        EventKind::Click => event.conversation.clone().map(Action::SelectConversation),
        _ => None,
    }
}
