//! Chatdesk - terminal chat client
//!
#![doc = "Chatdesk - terminal chat client"]
#![doc = "Main entry point for the Chatdesk application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatdesk::cli::{Cli, Commands, ModelCommand};
use chatdesk::commands;
use chatdesk::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can shape the log filter
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            conversation,
            model,
        } => {
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            if let Some(c) = &conversation {
                tracing::debug!("Opening conversation: {}", c);
            }
            commands::chat::run_chat(config, conversation).await?;
            Ok(())
        }
        Commands::Conversations { command } => {
            tracing::info!("Starting conversation command");
            commands::conversations::handle_conversations(&config, command).await?;
            Ok(())
        }
        Commands::Models { command } => {
            tracing::info!("Starting model command");
            match command {
                ModelCommand::List { json } => {
                    commands::models::list_models(&config, json).await?;
                    Ok(())
                }
            }
        }
        Commands::Cache { command } => {
            tracing::info!("Starting cache command");
            commands::cache::handle_cache(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "chatdesk=debug" } else { "chatdesk=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
