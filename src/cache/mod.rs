//! Local message cache
//!
//! The cache mirrors each conversation's message history into a key-value
//! store so the client can replay it without a round trip. It is a display
//! mirror only; the backend holds the authoritative history.
//!
//! Every conversation lives under a single versioned key,
//! `chatdesk.v1.messages.<conversation id>`, holding a JSON array of
//! [`Message`] records in append order. There is no expiry and no size cap.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::api::{ChatTurn, ConversationId, Message};
use crate::config::CacheConfig;
use crate::error::Result;

/// Prefix of every conversation key
pub const KEY_PREFIX: &str = "chatdesk.v1.messages.";

/// Storage key for a conversation's cached messages
///
/// # Examples
///
/// ```
/// use chatdesk::api::ConversationId;
/// use chatdesk::cache::cache_key;
///
/// assert_eq!(cache_key(&ConversationId::new("12")), "chatdesk.v1.messages.12");
/// ```
pub fn cache_key(id: &ConversationId) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// Synchronous string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop `key`; succeeds when the key is absent
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>>;
}

/// Per-conversation message lists on top of a [`KeyValueStore`]
pub struct ConversationCache {
    store: Box<dyn KeyValueStore>,
}

impl ConversationCache {
    /// Wrap a store
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Wrap an already boxed store
    pub fn from_boxed(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// In-memory cache, mostly for tests and `cache.enabled = false`
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Build the cache described by the configuration
    ///
    /// A disabled cache is backed by memory and lives only as long as the
    /// process.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        if !config.enabled {
            tracing::debug!("Persistent cache disabled, using memory store");
            return Ok(Self::in_memory());
        }

        let store = match &config.path {
            Some(path) => SqliteStore::new_with_path(path.clone())?,
            None => SqliteStore::new()?,
        };
        tracing::debug!("Using cache database at {}", store.path().display());
        Ok(Self::new(store))
    }

    /// Cached messages for a conversation in stored order
    ///
    /// A missing entry yields an empty list. An entry that no longer parses
    /// is logged and treated as empty.
    pub fn load(&self, id: &ConversationId) -> Result<Vec<Message>> {
        let Some(raw) = self.store.get(&cache_key(id))? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                tracing::warn!(conversation = %id, "Discarding unreadable cache entry: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Append a message unless one with the same id is already cached
    ///
    /// Returns `true` when the message was written.
    pub fn append(&self, id: &ConversationId, message: &Message) -> Result<bool> {
        let mut messages = self.load(id)?;
        if messages.iter().any(|m| m.id == message.id) {
            tracing::debug!(conversation = %id, message = %message.id, "Message already cached");
            return Ok(false);
        }

        messages.push(message.clone());
        self.write(id, &messages)?;
        Ok(true)
    }

    /// Align the cache with history fetched from the backend
    ///
    /// A non-empty server history replaces the cached list. An empty one
    /// leaves the cache untouched. Returns the list now cached.
    pub fn reconcile(&self, id: &ConversationId, server: &[Message]) -> Result<Vec<Message>> {
        if server.is_empty() {
            return self.load(id);
        }

        self.write(id, server)?;
        Ok(server.to_vec())
    }

    /// History to submit with a send: cached turns plus `pending` exactly once
    pub fn history_for_send(&self, id: &ConversationId, pending: &Message) -> Result<Vec<ChatTurn>> {
        let mut turns: Vec<ChatTurn> = self
            .load(id)?
            .iter()
            .filter(|m| m.id != pending.id)
            .map(Message::to_turn)
            .collect();
        turns.push(pending.to_turn());
        Ok(turns)
    }

    /// Drop everything cached for a conversation
    pub fn forget(&self, id: &ConversationId) -> Result<()> {
        self.store.remove(&cache_key(id))
    }

    /// Conversations that currently have a cache entry
    pub fn conversation_ids(&self) -> Result<Vec<ConversationId>> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(ConversationId::from))
            .collect())
    }

    fn write(&self, id: &ConversationId, messages: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(messages)?;
        self.store.set(&cache_key(id), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Role;

    fn conv(id: &str) -> ConversationId {
        ConversationId::new(id)
    }

    #[test]
    fn test_load_missing_conversation_is_empty() {
        let cache = ConversationCache::in_memory();
        assert!(cache.load(&conv("1")).unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let cache = ConversationCache::in_memory();
        let id = conv("1");
        let messages: Vec<Message> = (0..5).map(|i| Message::user(format!("m{}", i))).collect();
        for m in &messages {
            assert!(cache.append(&id, m).unwrap());
        }
        assert_eq!(cache.load(&id).unwrap(), messages);
    }

    #[test]
    fn test_append_skips_same_id() {
        let cache = ConversationCache::in_memory();
        let id = conv("1");
        let msg = Message::user("hello");
        assert!(cache.append(&id, &msg).unwrap());
        assert!(!cache.append(&id, &msg).unwrap());
        assert_eq!(cache.load(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_append_keeps_distinct_messages_with_equal_text() {
        let cache = ConversationCache::in_memory();
        let id = conv("1");
        cache.append(&id, &Message::user("ok")).unwrap();
        cache.append(&id, &Message::user("ok")).unwrap();
        assert_eq!(cache.load(&id).unwrap().len(), 2);
    }

    #[test]
    fn test_conversations_are_isolated() {
        let cache = ConversationCache::in_memory();
        cache.append(&conv("1"), &Message::user("a")).unwrap();
        cache.append(&conv("2"), &Message::user("b")).unwrap();
        assert_eq!(cache.load(&conv("1")).unwrap()[0].content, "a");
        assert_eq!(cache.load(&conv("2")).unwrap()[0].content, "b");
    }

    #[test]
    fn test_corrupt_entry_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(&cache_key(&conv("9")), "{not json").unwrap();
        let cache = ConversationCache::new(store);
        assert!(cache.load(&conv("9")).unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_replaces_with_server_history() {
        let cache = ConversationCache::in_memory();
        let id = conv("1");
        cache.append(&id, &Message::user("stale")).unwrap();

        let server = vec![Message::user("q"), Message::assistant("a")];
        let result = cache.reconcile(&id, &server).unwrap();
        assert_eq!(result, server);
        assert_eq!(cache.load(&id).unwrap(), server);
    }

    #[test]
    fn test_reconcile_with_empty_server_history_keeps_cache() {
        let cache = ConversationCache::in_memory();
        let id = conv("1");
        let local = Message::user("only local");
        cache.append(&id, &local).unwrap();

        let result = cache.reconcile(&id, &[]).unwrap();
        assert_eq!(result, vec![local]);
    }

    #[test]
    fn test_history_for_send_includes_pending_once() {
        let cache = ConversationCache::in_memory();
        let id = conv("1");
        cache.append(&id, &Message::user("first")).unwrap();
        cache.append(&id, &Message::assistant("reply")).unwrap();
        let pending = Message::user("second");
        cache.append(&id, &pending).unwrap();

        let turns = cache.history_for_send(&id, &pending).unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].content, "second");
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[test]
    fn test_forget_and_conversation_ids() {
        let cache = ConversationCache::in_memory();
        cache.append(&conv("1"), &Message::user("a")).unwrap();
        cache.append(&conv("2"), &Message::user("b")).unwrap();
        assert_eq!(cache.conversation_ids().unwrap(), vec![conv("1"), conv("2")]);

        cache.forget(&conv("1")).unwrap();
        assert_eq!(cache.conversation_ids().unwrap(), vec![conv("2")]);
        assert!(cache.load(&conv("1")).unwrap().is_empty());
    }
}
