/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`          — Interactive chat session
- `conversations` — One-shot conversation management
- `models`        — Model listing
- `cache`         — Local cache inspection

Handlers build the gateway and cache from configuration and print with
`colored` and `prettytable`.
*/

pub mod cache;
pub mod chat;
pub mod conversations;
pub mod display;
pub mod models;
pub mod slash_commands;
