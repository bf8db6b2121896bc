//! Diagnostic logging through `tracing`. The terminal UI owns stdout, so the
//! subscriber writes plain lines to a file in the data directory instead. This
//! log is for troubleshooting; the lend/return history lives in the audit log.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DIAGNOSTIC_LOG_NAME;

static INIT: Once = Once::new();

/// Install the global subscriber. `level` is the default directive for this
/// crate; a non-empty `RUST_LOG` replaces it entirely. Later calls are ignored.
pub fn init_logging(data_dir: &Path, level: &str) -> Result<()> {
    fs::create_dir_all(data_dir).context("failed to create data directory")?;
    let path = data_dir.join(DIAGNOSTIC_LOG_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let filter = build_filter(level, env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())?;

    INIT.call_once(|| {
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(file));
        // Another subscriber may already be installed by a test harness.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
    Ok(())
}

/// The configured level only applies when `env_spec` is unset, blank, or
/// unparsable.
fn build_filter(level: &str, env_spec: Option<&str>) -> Result<EnvFilter> {
    let fallback = EnvFilter::try_new(format!("tool_lending_tracker={level}"))
        .with_context(|| format!("invalid log level '{level}'"))?;
    let from_env = env_spec
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok());
    Ok(from_env.unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn rejects_unknown_levels() {
        assert!(build_filter("loud", None).is_err());
    }

    #[test]
    fn env_spec_replaces_configured_level() {
        let filter = build_filter("info", Some("tool_lending_tracker=debug")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn blank_or_broken_env_spec_falls_back() {
        for spec in [None, Some(""), Some("  "), Some("tool_lending_tracker=loudest")] {
            let filter = build_filter("warn", spec).unwrap();
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
        }
    }
}
