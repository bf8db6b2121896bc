use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::Snapshot;

use super::SnapshotStore;

/// Snapshot store using the pretty-printed JSON layout of the legacy
/// `tool_lending_data.json` files.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable data file is kept before the first save replaces it.
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    fn keep_unreadable_copy(&self) -> Result<()> {
        if !self.path.exists() || self.read().is_ok() {
            return Ok(());
        }
        let backup = self.backup_path();
        warn!(path = %self.path.display(), backup = %backup.display(), "keeping a copy of unreadable data file");
        fs::copy(&self.path, &backup)
            .with_context(|| format!("failed to back up {}", self.path.display()))?;
        Ok(())
    }
}

impl SnapshotStore for JsonStore {
    fn read(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    /// Write through a sibling temp file and rename it over the target, so a
    /// crash mid-write never leaves a truncated snapshot behind.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        self.keep_unreadable_copy()?;
        let body = serde_json::to_string_pretty(snapshot).context("failed to encode snapshot")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Loan;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("absent.json"));
        assert!(store.read().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonStore::new(&path);
        assert!(store.read().is_err());
        assert!(store.load_or_default().is_empty());
    }

    #[test]
    fn unreadable_file_is_kept_before_the_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let original = r#"{"tools": ["Saw"], "borrowers": [], "loans": [{"tool": "Saw", "borrower": "Ann", "date": "last week"}]}"#;
        fs::write(&path, original).unwrap();

        let mut store = JsonStore::new(&path);
        assert!(store.load_or_default().is_empty());
        store.save(&Snapshot { tools: vec!["Drill".into()], ..Snapshot::default() }).unwrap();

        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), original);
        assert_eq!(store.read().unwrap().tools, ["Drill"]);

        // A readable file is replaced without touching the backup again.
        fs::remove_file(store.backup_path()).unwrap();
        store.save(&Snapshot::default()).unwrap();
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn hand_edited_dates_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"tools": ["Saw"], "borrowers": ["Ann"], "loans": [{"tool": "Saw", "borrower": "Ann", "date": "17.05.2024"}]}"#,
        )
        .unwrap();
        let snapshot = JsonStore::new(&path).read().unwrap();
        assert_eq!(snapshot.loans[0].date, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
    }

    #[test]
    fn reads_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool_lending_data.json");
        fs::write(
            &path,
            r#"{
  "tools": ["Hammer", "Młotek"],
  "borrowers": ["Alice"],
  "loans": [{"tool": "Hammer", "borrower": "Alice", "date": "2023-11-02"}]
}"#,
        )
        .unwrap();
        let snapshot = JsonStore::new(&path).read().unwrap();
        assert_eq!(snapshot.tools, vec!["Hammer".to_string(), "Młotek".to_string()]);
        assert_eq!(
            snapshot.loans,
            vec![Loan::new(
                "Hammer",
                "Alice",
                NaiveDate::from_ymd_opt(2023, 11, 2).unwrap()
            )]
        );
    }

    #[test]
    fn save_writes_readable_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path().join("data.json"));
        let snapshot = Snapshot {
            tools: vec!["Wiertarka".into(), "Piła".into()],
            borrowers: vec!["Łucja".into()],
            loans: Vec::new(),
        };
        store.save(&snapshot).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("Piła"));
        assert_eq!(store.read().unwrap(), snapshot);
        assert!(!dir.path().join("data.json.tmp").exists());
    }
}
