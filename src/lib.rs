//! Chatdesk - terminal chat client library
//!
//! This library provides the client side of a conversation-based chat
//! service: a typed gateway to the backend's REST API, a local message
//! cache, a headless page model, and the controller that keeps them in step.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Wire types, the `ChatApi` trait, and the reqwest gateway
//! - `cache`: Per-conversation message mirror over SQLite or memory
//! - `ui`: Rendering, page state, and event-to-action wiring
//! - `session`: The controller owning session state
//! - `commands`: Terminal front end and one-shot commands
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatdesk::cli::Cli;
//! use chatdesk::{ChatController, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     let controller = ChatController::from_config(&config)?;
//!     controller.initialize().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use api::{ChatApi, ConversationId, HttpChatApi, Message, MessageId, Role};
pub use cache::ConversationCache;
pub use config::Config;
pub use error::{ChatdeskError, Result};
pub use session::{ChatController, SendOutcome, SessionState};
