//! Command-line interface definition for Chatdesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat front end plus one-shot commands for
//! conversations, models, and the local message cache.

use clap::{Parser, Subcommand};

/// Chatdesk - terminal chat client for a conversation-based inference backend
///
/// Lists conversations, sends messages to the backend chat endpoint, and
/// mirrors message history into a local cache.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL (e.g. http://localhost:8000)
    #[arg(long)]
    pub server: Option<String>,

    /// Override the local cache database path
    #[arg(long)]
    pub cache_db: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatdesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat session
    Chat {
        /// Open this conversation on start
        #[arg(long)]
        conversation: Option<String>,

        /// Model to use for new conversations and sends
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage server-side conversations
    Conversations {
        /// Conversation subcommand
        #[command(subcommand)]
        command: ConversationCommand,
    },

    /// Inspect available models
    Models {
        /// Model subcommand
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Inspect or clear the local message cache
    Cache {
        /// Cache subcommand
        #[command(subcommand)]
        command: CacheCommand,
    },
}

/// Conversation management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConversationCommand {
    /// List all conversations on the server
    List,

    /// Create a new conversation
    New {
        /// Model for the conversation (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print the message history of a conversation
    Show {
        /// Conversation identifier
        id: String,
    },

    /// Delete a conversation and its messages
    Delete {
        /// Conversation identifier
        id: String,
    },

    /// Rename a conversation
    Rename {
        /// Conversation identifier
        id: String,

        /// New title
        title: String,
    },
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List models the backend can serve
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Local cache subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CacheCommand {
    /// List conversations that have cached messages
    List,

    /// Print cached messages for a conversation
    Show {
        /// Conversation identifier
        id: String,
    },

    /// Drop cached messages for a conversation
    Clear {
        /// Conversation identifier
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            server: None,
            cache_db: None,
            command: Commands::Chat {
                conversation: None,
                model: None,
            },
        }
    }
}
