//! Binary entry point: load configuration, open the snapshot store and audit
//! log, then drive the Ratatui event loop until the user exits.
use tool_lending_tracker::{
    init_logging, open_audit_log, open_store, run_app, App, AppController, Config, Theme,
};
use tracing::info;

/// Fatal startup problems (an unreadable config file, a database that cannot
/// be opened) are reported on the terminal instead of starting a broken UI.
fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let data_dir = config.data_dir()?;
    init_logging(&data_dir, &config.log_level)?;
    info!(data_dir = %data_dir.display(), storage = ?config.storage, "starting");

    let store = open_store(&config, &data_dir)?;
    let audit = open_audit_log(&config, &data_dir);
    let controller = AppController::new(store, audit, config.focus_grace());

    let mut app = App::new(controller, config.locale, Theme::default());
    run_app(&mut app)
}
