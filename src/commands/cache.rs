//! Local cache inspection commands

use crate::api::ConversationId;
use crate::cache::ConversationCache;
use crate::cli::CacheCommand;
use crate::commands::display::{print_message, truncate};
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, row, Table};

/// Handle `chatdesk cache ...`
pub fn handle_cache(config: &Config, command: CacheCommand) -> Result<()> {
    let cache = ConversationCache::from_config(&config.cache)?;
    run_cache_command(&cache, command)
}

/// Execute a cache command against an open cache
pub fn run_cache_command(cache: &ConversationCache, command: CacheCommand) -> Result<()> {
    match command {
        CacheCommand::List => {
            let ids = cache.conversation_ids()?;
            if ids.is_empty() {
                println!("{}", "No cached conversations found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(row![
                "ID".bold(),
                "Messages".bold(),
                "Last message".bold()
            ]);

            for id in ids {
                let messages = cache.load(&id)?;
                let last = messages
                    .last()
                    .map(|m| truncate(&m.content, 40))
                    .unwrap_or_default();
                table.add_row(row![id.as_str().cyan(), messages.len(), last]);
            }

            println!("\nCached conversations:");
            table.printstd();
            println!();
        }
        CacheCommand::Show { id } => {
            let messages = cache.load(&ConversationId::from(id))?;
            if messages.is_empty() {
                println!("{}", "No cached messages for this conversation.".yellow());
            }
            for message in &messages {
                print_message(message);
            }
        }
        CacheCommand::Clear { id } => {
            let id = ConversationId::from(id);
            cache.forget(&id)?;
            println!("{}", format!("Cleared cached messages for {}", id).green());
        }
    }

    Ok(())
}
