use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatdesk::api::HttpChatApi;
use chatdesk::cache::{ConversationCache, SqliteStore};
use chatdesk::config::ServerConfig;
use chatdesk::ChatController;

#[allow(dead_code)]
pub const CSRF_TOKEN: &str = "tok123";

#[allow(dead_code)]
pub fn server_config(uri: &str, cookie: Option<&str>) -> ServerConfig {
    ServerConfig {
        base_url: uri.to_string(),
        cookie: cookie.map(str::to_string),
        timeout_seconds: None,
    }
}

#[allow(dead_code)]
pub fn api_for(server: &MockServer) -> HttpChatApi {
    let cookie = format!("csrftoken={}; sessionid=s1", CSRF_TOKEN);
    HttpChatApi::new(&server_config(&server.uri(), Some(&cookie)))
        .expect("failed to create gateway")
}

#[allow(dead_code)]
pub fn controller_for(server: &MockServer) -> ChatController {
    controller_with_cache(server, ConversationCache::in_memory())
}

#[allow(dead_code)]
pub fn controller_with_cache(server: &MockServer, cache: ConversationCache) -> ChatController {
    ChatController::new(Arc::new(api_for(server)), cache, "deepseek-r1:1.5b")
}

#[allow(dead_code)]
pub fn create_temp_cache() -> (ConversationCache, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SqliteStore::new_with_path(tmp.path().join("cache.db"))
        .expect("failed to create sqlite store with path");
    (ConversationCache::new(store), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Server message record as the history endpoint returns it
#[allow(dead_code)]
pub fn server_message(id: i64, role: &str, content: &str) -> Value {
    json!({ "id": id, "role": role, "content": content, "time": "10:00" })
}

/// Mount a history endpoint for `id` returning `messages`
#[allow(dead_code)]
pub async fn mount_history(server: &MockServer, id: &str, messages: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages))
        .mount(server)
        .await;
}

/// Mount a conversation list with the given ids
#[allow(dead_code)]
pub async fn mount_conversation_list(server: &MockServer, ids: &[&str]) {
    let body: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id.parse::<i64>().unwrap_or_default(),
                "title": format!("Conversation {}", id),
                "model_name": "deepseek-r1:1.5b",
                "created_at": "2025-03-01 10:00"
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/conversations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
