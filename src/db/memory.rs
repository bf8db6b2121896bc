use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};

use crate::messages::Locale;
use crate::models::Snapshot;

use super::{AuditEntry, AuditLog, SnapshotStore};

#[derive(Default)]
struct MemoryState {
    snapshot: Snapshot,
    fail_saves: bool,
    saves: usize,
}

/// Store that keeps the snapshot in memory. Clones share state, so a test can
/// hand one clone to the controller and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::default();
        store.state.borrow_mut().snapshot = snapshot;
        store
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }

    /// Make every following `save` fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.state.borrow_mut().fail_saves = fail;
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Snapshot> {
        Ok(self.snapshot())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_saves {
            return Err(anyhow!("disk full"));
        }
        state.snapshot = snapshot.clone();
        state.saves += 1;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryAuditState {
    lines: Vec<String>,
    fail: bool,
}

/// Audit log that records formatted lines in memory.
#[derive(Clone, Default)]
pub struct MemoryAuditLog {
    locale: Locale,
    state: Rc<RefCell<MemoryAuditState>>,
}

impl MemoryAuditLog {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            state: Rc::default(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.state.borrow().lines.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.borrow_mut().fail = fail;
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&mut self, entry: &AuditEntry) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail {
            return Err(anyhow!("log file is read-only"));
        }
        state.lines.push(entry.format(self.locale));
        Ok(())
    }
}
