//! reqwest implementation of the chat backend gateway
//!
//! Cookies live in a `reqwest` cookie jar seeded from configuration and
//! refreshed from `Set-Cookie` headers. Mutating requests echo the
//! `csrftoken` cookie in the `X-CSRFToken` header, sending an empty value
//! when no token is known so the backend can reject the request itself.

use crate::api::types::{
    ChatReply, ChatRequest, ConversationId, ConversationSummary, CreatedConversation, Message,
    ModelChange, RenameReply, TitleChange,
};
use crate::api::ChatApi;
use crate::config::ServerConfig;
use crate::error::{ChatdeskError, Result};

use async_trait::async_trait;
use regex::Regex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use url::Url;

/// Header carrying the CSRF token on mutating requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Extract the `csrftoken` value from a `Cookie`-style header string
///
/// # Examples
///
/// ```
/// use chatdesk::api::extract_csrf_token;
///
/// assert_eq!(
///     extract_csrf_token("sessionid=s1; csrftoken=abc123"),
///     Some("abc123".to_string())
/// );
/// assert_eq!(extract_csrf_token("sessionid=s1"), None);
/// ```
pub fn extract_csrf_token(cookie_header: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"csrftoken=([^;]+)").ok())
        .as_ref()?;
    pattern
        .captures(cookie_header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// HTTP gateway to the chat backend
///
/// # Examples
///
/// ```
/// use chatdesk::api::HttpChatApi;
/// use chatdesk::config::ServerConfig;
///
/// let config = ServerConfig {
///     base_url: "http://localhost:8000".to_string(),
///     cookie: Some("csrftoken=abc".to_string()),
///     timeout_seconds: None,
/// };
/// let api = HttpChatApi::new(&config).unwrap();
/// assert_eq!(api.csrf_token(), "abc");
/// ```
pub struct HttpChatApi {
    client: Client,
    base_url: Url,
    cookies: Arc<Jar>,
}

impl HttpChatApi {
    /// Create a gateway for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be built
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut base_url = Url::parse(config.base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let cookies = Arc::new(Jar::default());
        if let Some(cookie) = &config.cookie {
            for pair in cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                cookies.add_cookie_str(pair, &base_url);
            }
        }

        let mut builder = Client::builder()
            .cookie_provider(cookies.clone())
            .user_agent(concat!("chatdesk/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ChatdeskError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized chat gateway: base_url={}", base_url);

        Ok(Self {
            client,
            base_url,
            cookies,
        })
    }

    /// Base URL every endpoint path is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current CSRF token, or an empty string when the jar holds none
    pub fn csrf_token(&self) -> String {
        self.cookies
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().and_then(extract_csrf_token))
            .unwrap_or_default()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("{} request failed: {}", context, e);
            ChatdeskError::Http(e)
        })?;

        let response = check_status(response, context).await?;
        decode(response, context).await
    }

    async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: &str,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(CSRF_HEADER, self.csrf_token());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} request failed: {}", context, e);
            ChatdeskError::Http(e)
        })?;

        check_status(response, context).await
    }
}

async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    tracing::error!("{} returned error {}: {}", context, status, error_text);
    Err(ChatdeskError::Status {
        status: status.as_u16(),
        context: context.to_string(),
    }
    .into())
}

async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let body = response.text().await.map_err(|e| {
        tracing::error!("Failed to read {} response body: {}", context, e);
        ChatdeskError::Http(e)
    })?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse {} response: {}", context, e);
        ChatdeskError::Decode(format!("{}: {}", context, e)).into()
    })
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_models(&self) -> Result<Vec<String>> {
        self.get_json("api/models/", "Load models").await
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.get_json("api/conversations/", "Load conversations")
            .await
    }

    async fn create_conversation(&self, model: &str) -> Result<CreatedConversation> {
        let response = self
            .mutate(
                Method::POST,
                "api/conversations/new/",
                Some(&ModelChange { model }),
                "Create conversation",
            )
            .await?;
        decode(response, "Create conversation").await
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>> {
        self.get_json(
            &format!("api/conversations/{}/messages/", id),
            "Load messages",
        )
        .await
    }

    async fn change_model(&self, id: &ConversationId, model: &str) -> Result<()> {
        self.mutate(
            Method::PATCH,
            &format!("api/conversations/{}/model/", id),
            Some(&ModelChange { model }),
            "Change model",
        )
        .await?;
        Ok(())
    }

    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<Option<String>> {
        let response = self
            .mutate(
                Method::PATCH,
                &format!("api/conversations/{}/title/", id),
                Some(&TitleChange { title }),
                "Rename conversation",
            )
            .await?;
        let reply: RenameReply = decode(response, "Rename conversation").await?;
        Ok(reply.title)
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<()> {
        self.mutate::<()>(
            Method::DELETE,
            &format!("api/conversations/{}/delete/", id),
            None,
            "Delete conversation",
        )
        .await?;
        Ok(())
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let response = self
            .mutate(Method::POST, "api/chat/", Some(request), "Send message")
            .await?;
        decode(response, "Send message").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, cookie: Option<&str>) -> ServerConfig {
        ServerConfig {
            base_url: base_url.to_string(),
            cookie: cookie.map(str::to_string),
            timeout_seconds: None,
        }
    }

    #[test]
    fn test_extract_csrf_token_variants() {
        assert_eq!(extract_csrf_token("csrftoken=abc"), Some("abc".to_string()));
        assert_eq!(
            extract_csrf_token("a=1; csrftoken=xyz; b=2"),
            Some("xyz".to_string())
        );
        assert_eq!(extract_csrf_token(""), None);
        assert_eq!(extract_csrf_token("csrftoken="), None);
    }

    #[test]
    fn test_csrf_token_empty_without_cookie() {
        let api = HttpChatApi::new(&config("http://localhost:8000", None)).unwrap();
        assert_eq!(api.csrf_token(), "");
    }

    #[test]
    fn test_csrf_token_from_multi_cookie_string() {
        let api = HttpChatApi::new(&config(
            "http://localhost:8000",
            Some("sessionid=s1; csrftoken=tok42"),
        ))
        .unwrap();
        assert_eq!(api.csrf_token(), "tok42");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let api = HttpChatApi::new(&config("http://localhost:8000/chatapp", None)).unwrap();
        let url = api.endpoint("/api/models/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/chatapp/api/models/");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(HttpChatApi::new(&config("not a url", None)).is_err());
    }
}
