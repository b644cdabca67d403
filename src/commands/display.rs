//! Terminal output shared by the chat session and one-shot commands

use crate::api::{Message, Role};
use crate::ui::{ChatView, RenderedMessage, SidebarItem};
use colored::Colorize;
use prettytable::{format, row, Table};

/// Shorten `text` to at most `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn role_label(role: Role) -> colored::ColoredString {
    match role {
        Role::User => "You".cyan().bold(),
        Role::Assistant => "Assistant".green().bold(),
    }
}

/// Print one message with a role and time header
pub fn print_entry(role: Role, time: &str, text: &str) {
    println!("{} {}", role_label(role), time.dimmed());
    println!("{}\n", text);
}

/// Print a displayed message block
pub fn print_rendered(message: &RenderedMessage) {
    print_entry(message.role, &message.time, &message.text);
}

/// Print a stored message
pub fn print_message(message: &Message) {
    print_entry(message.role, &message.time, &message.content);
}

/// Print the conversation sidebar as a table
pub fn print_conversations(items: &[SidebarItem]) {
    if items.is_empty() {
        println!("{}", "No conversations found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["", "ID".bold(), "Title".bold(), "Model".bold(), "Created".bold()]);

    for item in items {
        let marker = if item.selected { "*" } else { "" };
        table.add_row(row![
            marker.green(),
            item.id.as_str().cyan(),
            truncate(&item.title, 40),
            item.model_name,
            item.created_at
        ]);
    }

    println!("\nConversations:");
    table.printstd();
    println!();
}

/// Print the model list, marking `current`
pub fn print_models(models: &[String], current: Option<&str>) {
    if models.is_empty() {
        println!("{}", "No models available.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["Model".bold(), "Selected".bold()]);
    for model in models {
        let selected = if Some(model.as_str()) == current {
            "yes".green()
        } else {
            "".normal()
        };
        table.add_row(row![model, selected]);
    }

    println!("\nAvailable models:");
    table.printstd();
    println!();
}

/// Print queued alerts to stderr
pub fn print_alerts(alerts: &[String]) {
    for alert in alerts {
        eprintln!("{} {}", "Error:".red().bold(), alert);
    }
}

/// Tracks which message blocks a terminal has already printed
///
/// The view only grows between pane clears, so remembering the pane epoch
/// and the number of printed blocks is enough to print each block once.
#[derive(Debug, Default)]
pub struct PaneCursor {
    epoch: u64,
    printed: usize,
}

impl PaneCursor {
    /// Blocks that have not been printed yet; advances the cursor
    pub fn unseen<'a>(&mut self, view: &'a ChatView) -> &'a [RenderedMessage] {
        if view.pane_epoch() != self.epoch {
            self.epoch = view.pane_epoch();
            self.printed = 0;
        }
        let messages = view.messages();
        let start = self.printed.min(messages.len());
        self.printed = messages.len();
        &messages[start..]
    }
}
