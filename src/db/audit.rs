use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::messages::{AuditAction, Locale};

use super::AuditLog;

/// One lend or return event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: NaiveDateTime,
    pub action: AuditAction,
    pub tool: String,
    pub borrower: String,
}

impl AuditEntry {
    /// `[2024-05-17 09:30:00] LEND: Hammer -> Alice`
    pub fn format(&self, locale: Locale) -> String {
        format!(
            "[{}] {}: {} -> {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            locale.audit_tag(self.action),
            self.tool,
            self.borrower
        )
    }
}

/// Append-only history file next to the snapshot.
pub struct FileAuditLog {
    path: PathBuf,
    locale: Locale,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>, locale: Locale) -> Self {
        Self {
            path: path.into(),
            locale,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn append(&mut self, entry: &AuditEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        writeln!(file, "{}", entry.format(self.locale))
            .with_context(|| format!("failed to append to {}", self.path.display()))
    }
}
