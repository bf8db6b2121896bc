//! Terminal view: panels, selectors with their popups, and modal dialogs.

mod app;
mod forms;
mod helpers;
mod terminal;
mod theme;

pub use app::App;
pub use terminal::run_app;
pub use theme::{ButtonStyle, Theme};
