//! Interactive chat session
//!
//! Builds a [`ChatController`] from the configuration and runs a
//! readline loop on top of it. Plain lines are typed into the input field
//! and submitted with an Enter key event; slash commands drive the other
//! affordances. After every step the loop prints whatever the page model
//! gained: new message blocks and alerts.

use crate::api::ConversationId;
use crate::commands::display::{
    print_alerts, print_conversations, print_models, print_rendered, PaneCursor,
};
use crate::commands::slash_commands::{parse_slash_command, print_help, SlashCommand};
use crate::config::Config;
use crate::error::Result;
use crate::session::ChatController;
use crate::ui::{Affordance, UiEvent};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Start the interactive chat session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `conversation` - Conversation to open on start
///
/// # Errors
///
/// Returns an error if the HTTP client, the cache, or the line editor
/// cannot be created. Backend failures during the session are shown as
/// alerts and never end the loop.
pub async fn run_chat(config: Config, conversation: Option<String>) -> Result<()> {
    tracing::info!("Starting interactive chat session");

    let controller = ChatController::from_config(&config)?;
    controller.initialize().await;

    if let Some(id) = conversation {
        controller
            .dispatch(UiEvent::click_conversation(
                Affordance::ConversationItem,
                ConversationId::from(id),
            ))
            .await;
    }

    let mut rl = DefaultEditor::new()?;
    let mut cursor = PaneCursor::default();

    print_welcome_banner(&config, &controller);
    flush(&controller, &mut cursor);

    loop {
        match rl.readline(&format_prompt(&controller)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_slash_command(trimmed) {
                    Ok(SlashCommand::Exit) => break,
                    Ok(SlashCommand::None) => {
                        if controller.active_conversation().is_none() {
                            println!(
                                "{}",
                                "No conversation open. Use /new or /open <id> first.".yellow()
                            );
                            continue;
                        }
                        controller.set_input(trimmed);
                        println!("{}", "Waiting for reply...".dimmed());
                        controller
                            .dispatch(UiEvent::key_down(Affordance::MessageInput, "Enter", false))
                            .await;
                    }
                    Ok(command) => handle_slash_command(&config, &controller, command).await,
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }

                flush(&controller, &mut cursor);
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn handle_slash_command(
    config: &Config,
    controller: &ChatController,
    command: SlashCommand,
) {
    match command {
        SlashCommand::NewConversation => {
            controller
                .dispatch(UiEvent::click(Affordance::NewChatButton))
                .await;
            if let Some(id) = controller.active_conversation() {
                println!("{}", format!("Switched to new conversation {}", id).green());
            }
        }
        SlashCommand::ListConversations => {
            if controller.load_conversations().await {
                controller.with_view(|view| print_conversations(view.conversations()));
            }
        }
        SlashCommand::Open(id) => {
            controller
                .dispatch(UiEvent::click_conversation(Affordance::ConversationItem, id))
                .await;
        }
        SlashCommand::Delete(id) => {
            if controller.delete_conversation(&id).await {
                println!("{}", format!("Deleted conversation {}", id).green());
            }
        }
        SlashCommand::SwitchModel(model) => {
            controller
                .dispatch(UiEvent::change(Affordance::ModelSelector, model))
                .await;
            println!("Model: {}", controller.current_model().cyan());
        }
        SlashCommand::ListModels => {
            if controller.load_models().await {
                let current = controller.current_model();
                controller
                    .with_view(|view| print_models(view.model_options(), Some(current.as_str())));
            }
        }
        SlashCommand::Rename { id, title } => {
            if controller.rename_conversation(&id, &title).await {
                println!("{}", format!("Renamed conversation {}", id).green());
            }
        }
        SlashCommand::ShowStatus => print_status(config, controller),
        SlashCommand::Help => print_help(),
        SlashCommand::Exit | SlashCommand::None => {}
    }
}

fn flush(controller: &ChatController, cursor: &mut PaneCursor) {
    controller.with_view(|view| {
        for message in cursor.unseen(view) {
            print_rendered(message);
        }
    });
    print_alerts(&controller.take_alerts());
}

fn format_prompt(controller: &ChatController) -> String {
    match controller.active_conversation() {
        Some(id) => format!("[{}|{}] >> ", id.as_str().cyan(), controller.current_model()),
        None => format!("[{}] >> ", "no conversation".yellow()),
    }
}

fn print_welcome_banner(config: &Config, controller: &ChatController) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Chatdesk Interactive Chat                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Server: {}", config.server.base_url.cyan());
    println!("Model:  {}", controller.current_model().cyan());
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

fn print_status(config: &Config, controller: &ChatController) {
    let session = controller.session();
    let (shown, models) =
        controller.with_view(|view| (view.messages().len(), view.model_options().len()));

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Chatdesk Session Status                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Server:            {}", config.server.base_url);
    println!(
        "Conversation:      {}",
        session
            .current_conversation_id
            .as_ref()
            .map(|id| id.as_str().cyan().to_string())
            .unwrap_or_else(|| "none".yellow().to_string())
    );
    println!("Model:             {}", session.current_model.cyan());
    println!("Messages shown:    {}", shown);
    println!("Models available:  {}", models);
    println!();
}
