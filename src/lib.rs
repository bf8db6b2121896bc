//! Core library surface for the Tool Lending Tracker TUI application.
//!
//! The `bin` target only wires these pieces together; everything else,
//! including the in-memory store doubles used by the tests, lives here.
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod messages;
pub mod models;
pub mod registry;
pub mod typeahead;
pub mod ui;

/// Startup helpers used by `main.rs`.
pub use config::Config;
pub use db::{open_audit_log, open_store};
pub use logging::init_logging;

/// The domain types other layers manipulate.
pub use models::{Loan, Snapshot};
pub use registry::{LoanRegistry, RegistryError};

pub use controller::AppController;

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Theme};
