//! Headless page model
//!
//! - `render`: pure mapping of messages and conversations to markup
//! - `view`: the page state a front end draws from
//! - `events`: affordances, events, and the handler registration table

pub mod events;
pub mod render;
pub mod view;

pub use events::{Action, Affordance, EventKind, Handler, HandlerTable, UiEvent};
pub use render::{escape_html, render_message, RenderedMessage, SidebarItem};
pub use view::ChatView;
