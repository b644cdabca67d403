//! One-shot conversation management commands

use crate::api::{ChatApi, ConversationId, HttpChatApi};
use crate::cache::ConversationCache;
use crate::cli::ConversationCommand;
use crate::commands::display::{print_conversations, print_message};
use crate::config::Config;
use crate::error::{ChatdeskError, Result};
use crate::ui::render::render_conversation_list;
use colored::Colorize;

/// Handle `chatdesk conversations ...`
///
/// # Errors
///
/// Returns an error if the backend rejects the request or cannot be
/// reached.
pub async fn handle_conversations(config: &Config, command: ConversationCommand) -> Result<()> {
    let api = HttpChatApi::new(&config.server)?;
    let cache = ConversationCache::from_config(&config.cache)?;
    run_conversation_command(&api, &cache, &config.chat.default_model, command).await
}

/// Execute a conversation command against any gateway
///
/// # Arguments
///
/// * `api` - Backend gateway
/// * `cache` - Local mirror, synced by `show` and pruned by `delete`
/// * `default_model` - Model for `new` when none is given
/// * `command` - Parsed subcommand
///
/// # Errors
///
/// Propagates gateway errors; a blank rename title is a command error.
pub async fn run_conversation_command(
    api: &dyn ChatApi,
    cache: &ConversationCache,
    default_model: &str,
    command: ConversationCommand,
) -> Result<()> {
    match command {
        ConversationCommand::List => {
            let conversations = api.list_conversations().await?;
            print_conversations(&render_conversation_list(&conversations, None));
        }
        ConversationCommand::New { model } => {
            let model = model.as_deref().unwrap_or(default_model);
            let created = api.create_conversation(model).await?;
            println!(
                "{}",
                format!("Created conversation {} using {}", created.id, model).green()
            );
        }
        ConversationCommand::Show { id } => {
            let id = ConversationId::from(id);
            let history = api.list_messages(&id).await?;
            let messages = match cache.reconcile(&id, &history) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(conversation = %id, "Cache reconcile failed: {:#}", e);
                    history
                }
            };

            if messages.is_empty() {
                println!("{}", "No messages in this conversation.".yellow());
            }
            for message in &messages {
                print_message(message);
            }
        }
        ConversationCommand::Delete { id } => {
            let id = ConversationId::from(id);
            api.delete_conversation(&id).await?;
            if let Err(e) = cache.forget(&id) {
                tracing::warn!(conversation = %id, "Failed to drop cache entry: {:#}", e);
            }
            println!("{}", format!("Deleted conversation {}", id).green());
        }
        ConversationCommand::Rename { id, title } => {
            let title = title.trim();
            if title.is_empty() {
                return Err(ChatdeskError::Command("Title cannot be empty".to_string()).into());
            }
            let id = ConversationId::from(id);
            let stored = api.rename_conversation(&id, title).await?;
            let shown = stored.as_deref().unwrap_or(title);
            println!(
                "{}",
                format!("Renamed conversation {} to \"{}\"", id, shown).green()
            );
        }
    }

    Ok(())
}
