use crate::api::ConversationId;
use std::collections::BTreeSet;

/// Per-session mutable state owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Conversation shown in the pane and targeted by sends
    pub current_conversation_id: Option<ConversationId>,
    /// Model used for new conversations and sends
    pub current_model: String,
    /// Bumped when a switch starts or the active conversation changes
    pub generation: u64,
    /// Conversations deleted during this session
    pub deleted: BTreeSet<ConversationId>,
}

/// Snapshot taken when a send starts
///
/// A reply is rendered only if its conversation is active when it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    /// Conversation the message was sent to
    pub conversation_id: ConversationId,
}

impl SessionState {
    /// Fresh session with no active conversation
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            current_conversation_id: None,
            current_model: model.into(),
            generation: 0,
            deleted: BTreeSet::new(),
        }
    }

    /// Change the active conversation, bumping the generation on change
    pub fn set_active(&mut self, id: Option<ConversationId>) {
        if self.current_conversation_id != id {
            self.generation += 1;
            self.current_conversation_id = id;
        }
    }

    /// Start switching conversations
    ///
    /// Any switch started earlier and not yet finished is superseded.
    /// Returns the generation to hand back to [`SessionState::finish_select`].
    pub fn begin_select(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Activate `id` if nothing changed the session since `generation`
    ///
    /// Returns `false` when a later switch, create or delete got there first.
    pub fn finish_select(&mut self, id: &ConversationId, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.current_conversation_id = Some(id.clone());
        true
    }

    /// Whether `id` is the active conversation
    pub fn is_active(&self, id: &ConversationId) -> bool {
        self.current_conversation_id.as_ref() == Some(id)
    }

    /// Record a deleted conversation, clearing it if it was active
    ///
    /// Returns whether it was the active conversation.
    pub fn mark_deleted(&mut self, id: &ConversationId) -> bool {
        self.deleted.insert(id.clone());
        let was_active = self.is_active(id);
        if was_active {
            self.set_active(None);
        }
        was_active
    }

    /// Whether `id` was deleted during this session
    pub fn is_deleted(&self, id: &ConversationId) -> bool {
        self.deleted.contains(id)
    }

    /// Ticket for a send to the active conversation
    pub fn ticket(&self) -> Option<SendTicket> {
        self.current_conversation_id
            .as_ref()
            .map(|id| SendTicket {
                conversation_id: id.clone(),
            })
    }

    /// Whether a reply for `ticket` belongs in the pane
    pub fn accepts(&self, ticket: &SendTicket) -> bool {
        self.is_active(&ticket.conversation_id) && !self.is_deleted(&ticket.conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_no_ticket() {
        let state = SessionState::new("m");
        assert!(state.ticket().is_none());
        assert_eq!(state.generation, 0);
    }

    #[test]
    fn test_reselecting_same_conversation_keeps_generation() {
        let mut state = SessionState::new("m");
        state.set_active(Some(ConversationId::new("1")));
        state.set_active(Some(ConversationId::new("1")));
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn test_ticket_accepted_again_after_switching_back() {
        let mut state = SessionState::new("m");
        state.set_active(Some(ConversationId::new("1")));
        let ticket = state.ticket().unwrap();
        assert!(state.accepts(&ticket));

        state.set_active(Some(ConversationId::new("2")));
        assert!(!state.accepts(&ticket));

        state.set_active(Some(ConversationId::new("1")));
        assert!(state.accepts(&ticket));
    }

    #[test]
    fn test_ticket_rejected_after_clearing_active() {
        let mut state = SessionState::new("m");
        state.set_active(Some(ConversationId::new("1")));
        let ticket = state.ticket().unwrap();
        state.set_active(None);
        assert!(!state.accepts(&ticket));
    }

    #[test]
    fn test_later_select_supersedes_earlier_one() {
        let mut state = SessionState::new("m");
        let first = state.begin_select();
        let second = state.begin_select();

        assert!(state.finish_select(&ConversationId::new("8"), second));
        assert!(!state.finish_select(&ConversationId::new("7"), first));
        assert!(state.is_active(&ConversationId::new("8")));
    }

    #[test]
    fn test_active_change_supersedes_pending_select() {
        let mut state = SessionState::new("m");
        let pending = state.begin_select();
        state.set_active(Some(ConversationId::new("3")));

        assert!(!state.finish_select(&ConversationId::new("7"), pending));
        assert!(state.is_active(&ConversationId::new("3")));
    }

    #[test]
    fn test_mark_deleted_clears_active_and_rejects_ticket() {
        let mut state = SessionState::new("m");
        state.set_active(Some(ConversationId::new("1")));
        let ticket = state.ticket().unwrap();

        assert!(state.mark_deleted(&ConversationId::new("1")));
        assert_eq!(state.current_conversation_id, None);
        assert!(state.is_deleted(&ConversationId::new("1")));
        assert!(!state.accepts(&ticket));
        assert!(!state.mark_deleted(&ConversationId::new("2")));
    }
}
