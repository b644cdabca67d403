//! Slash command parser for the interactive chat session
//!
//! Lines starting with `/` control the session instead of being sent as a
//! message. The command word is case-insensitive; arguments keep their case
//! so model names and titles survive intact.

use crate::api::ConversationId;
use thiserror::Error;

/// Errors that can occur when parsing slash commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands available inside the chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// Create a conversation and switch to it
    NewConversation,

    /// Refresh and print the conversation list
    ListConversations,

    /// Switch to a conversation
    Open(ConversationId),

    /// Delete a conversation
    Delete(ConversationId),

    /// Switch the session model
    SwitchModel(String),

    /// Refresh and print the available models
    ListModels,

    /// Rename a conversation
    Rename { id: ConversationId, title: String },

    /// Show the session status
    ShowStatus,

    /// Show help
    Help,

    /// Leave the session
    Exit,

    /// Not a command; the line is a chat message
    None,
}

/// Parse one line of user input
///
/// # Errors
///
/// Returns `CommandError` for unknown commands, missing arguments, or
/// arguments given to commands that take none.
///
/// # Examples
///
/// ```
/// use chatdesk::api::ConversationId;
/// use chatdesk::commands::slash_commands::{parse_slash_command, SlashCommand};
///
/// assert_eq!(
///     parse_slash_command("/open 12").unwrap(),
///     SlashCommand::Open(ConversationId::new("12"))
/// );
/// assert_eq!(parse_slash_command("hello").unwrap(), SlashCommand::None);
/// assert!(parse_slash_command("/frobnicate").is_err());
/// ```
pub fn parse_slash_command(input: &str) -> Result<SlashCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SlashCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SlashCommand::None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower, ""),
    };

    match word.as_str() {
        "/new" => no_argument(&word, rest, SlashCommand::NewConversation),
        "/list" | "/conversations" => no_argument(&word, rest, SlashCommand::ListConversations),
        "/models" => no_argument(&word, rest, SlashCommand::ListModels),
        "/status" => no_argument(&word, rest, SlashCommand::ShowStatus),
        "/help" | "/?" => Ok(SlashCommand::Help),
        "/exit" | "/quit" => Ok(SlashCommand::Exit),

        "/open" => required(&word, rest, "/open <conversation_id>")
            .map(|id| SlashCommand::Open(ConversationId::new(id))),
        "/delete" => required(&word, rest, "/delete <conversation_id>")
            .map(|id| SlashCommand::Delete(ConversationId::new(id))),
        "/model" => required(&word, rest, "/model <model_name>")
            .map(|model| SlashCommand::SwitchModel(model.to_string())),

        "/rename" => {
            let usage = "/rename <conversation_id> <title>";
            let args = required(&word, rest, usage)?;
            match args.split_once(char::is_whitespace) {
                Some((id, title)) if !title.trim().is_empty() => Ok(SlashCommand::Rename {
                    id: ConversationId::new(id),
                    title: title.trim().to_string(),
                }),
                _ => Err(CommandError::MissingArgument {
                    command: word.clone(),
                    usage: usage.to_string(),
                }),
            }
        }

        _ => Err(CommandError::UnknownCommand(word.clone())),
    }
}

fn no_argument(
    word: &str,
    rest: &str,
    command: SlashCommand,
) -> Result<SlashCommand, CommandError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: word.to_string(),
            arg: rest.to_string(),
        })
    }
}

fn required<'a>(word: &str, rest: &'a str, usage: &str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: word.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest)
    }
}

/// Display help text for slash commands
pub fn print_help() {
    println!(
        r#"
Chat Session Commands
=====================

CONVERSATIONS:
  /new                      - Create a conversation and switch to it
  /list                     - Show all conversations
  /open <id>                - Switch to a conversation
  /delete <id>              - Delete a conversation
  /rename <id> <title>      - Rename a conversation

MODELS:
  /models                   - Show available models
  /model <name>             - Switch the model for this session

SESSION:
  /status                   - Show the active conversation and model
  /help                     - Show this help
  /exit                     - Leave the session (also: exit, quit, Ctrl-D)

Any other input is sent to the active conversation.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_slash_command("what is rust?").unwrap(),
            SlashCommand::None
        );
    }

    #[test]
    fn test_command_word_is_case_insensitive() {
        assert_eq!(
            parse_slash_command("/NEW").unwrap(),
            SlashCommand::NewConversation
        );
        assert_eq!(parse_slash_command("QUIT").unwrap(), SlashCommand::Exit);
    }

    #[test]
    fn test_model_argument_keeps_case() {
        assert_eq!(
            parse_slash_command("/Model Qwen2:7B").unwrap(),
            SlashCommand::SwitchModel("Qwen2:7B".to_string())
        );
    }

    #[test]
    fn test_rename_splits_id_and_title() {
        assert_eq!(
            parse_slash_command("/rename 7  Trip   planning ").unwrap(),
            SlashCommand::Rename {
                id: ConversationId::new("7"),
                title: "Trip   planning".to_string(),
            }
        );
    }

    #[test]
    fn test_rename_without_title_is_missing_argument() {
        assert!(matches!(
            parse_slash_command("/rename 7"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_open_without_id_is_missing_argument() {
        let err = parse_slash_command("/open").unwrap_err();
        assert_eq!(
            err,
            CommandError::MissingArgument {
                command: "/open".to_string(),
                usage: "/open <conversation_id>".to_string(),
            }
        );
    }

    #[test]
    fn test_argument_to_bare_command_is_rejected() {
        assert_eq!(
            parse_slash_command("/new now").unwrap_err(),
            CommandError::UnsupportedArgument {
                command: "/new".to_string(),
                arg: "now".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_slash_command("/mode write").unwrap_err(),
            CommandError::UnknownCommand("/mode".to_string())
        );
    }
}
