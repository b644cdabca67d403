//! Model listing command

use crate::api::{ChatApi, HttpChatApi};
use crate::commands::display::print_models;
use crate::config::Config;
use crate::error::Result;

/// List models the backend can serve
///
/// # Arguments
///
/// * `config` - Configuration containing server settings
/// * `json` - Print a JSON array instead of a table
///
/// # Returns
///
/// Returns Ok(()) on success, error if the backend is unreachable or
/// rejects the request
///
/// # Examples
///
/// ```no_run
/// use chatdesk::cli::Cli;
/// use chatdesk::commands::models::list_models;
/// use chatdesk::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Cli::default())?;
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    let api = HttpChatApi::new(&config.server)?;
    print_model_list(&api, &config.chat.default_model, json).await
}

/// Fetch and print the model list from any gateway
pub async fn print_model_list(api: &dyn ChatApi, current: &str, json: bool) -> Result<()> {
    tracing::info!("Listing models");
    let models = api.list_models().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        print_models(&models, Some(current));
    }

    Ok(())
}
