//! Turns user actions into registry calls. Each action either commits (the
//! registry changed and the snapshot was saved) or is refused with a
//! [`Notice`] describing why; in both cases the view redraws from [`ViewModel`].

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::db::{AuditEntry, AuditLog, SnapshotStore};
use crate::messages::{AuditAction, Message};
use crate::models::Loan;
use crate::registry::{normalize_name, Entity, LoanRegistry, RegistryError};
use crate::typeahead::TypeaheadSelector;

/// Source of "now" for loan dates and audit timestamps.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message for the user plus how loudly to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: Message,
}

impl Notice {
    pub fn info(message: Message) -> Self {
        Self {
            severity: Severity::Info,
            message,
        }
    }

    pub fn warning(message: Message) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }

    pub fn error(message: Message) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }
}

/// A destructive action waiting for the user to say yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeleteTool(String),
    DeleteBorrower(String),
    ReturnLoan(Loan),
}

impl Confirmation {
    pub fn prompt(&self) -> Message {
        match self {
            Confirmation::DeleteTool(name) => Message::ConfirmDeleteTool(name.clone()),
            Confirmation::DeleteBorrower(name) => Message::ConfirmDeleteBorrower(name.clone()),
            Confirmation::ReturnLoan(loan) => Message::ConfirmReturn {
                tool: loan.tool_name.clone(),
                borrower: loan.borrower_name.clone(),
            },
        }
    }
}

/// Everything the view needs after a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub tools: Vec<String>,
    pub borrowers: Vec<String>,
    /// Tools that can be lent right now.
    pub tool_candidates: Vec<String>,
    pub borrower_candidates: Vec<String>,
    /// Active loans; each row's return action goes through
    /// [`AppController::request_return`].
    pub loans: Vec<Loan>,
}

/// `Ok` means the action committed; `Err` means nothing changed.
pub type ActionResult = Result<Notice, Notice>;

pub struct AppController {
    registry: LoanRegistry,
    store: Box<dyn SnapshotStore>,
    audit: Box<dyn AuditLog>,
    clock: Box<dyn Clock>,
    tool_selector: TypeaheadSelector,
    borrower_selector: TypeaheadSelector,
}

impl AppController {
    /// Load the registry from `store`; an unreadable snapshot starts empty.
    pub fn new(store: Box<dyn SnapshotStore>, audit: Box<dyn AuditLog>, grace: Duration) -> Self {
        let snapshot = store.load_or_default();
        if snapshot.is_empty() {
            info!("no saved data, starting with an empty registry");
        }
        let registry = LoanRegistry::from_snapshot(snapshot);
        info!(
            tools = registry.tools().len(),
            borrowers = registry.borrowers().len(),
            loans = registry.loans().len(),
            "registry loaded"
        );
        let mut controller = Self {
            registry,
            store,
            audit,
            clock: Box::new(SystemClock),
            tool_selector: TypeaheadSelector::new(grace),
            borrower_selector: TypeaheadSelector::new(grace),
        };
        controller.refresh();
        controller
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &LoanRegistry {
        &self.registry
    }

    pub fn tool_selector(&self) -> &TypeaheadSelector {
        &self.tool_selector
    }

    pub fn tool_selector_mut(&mut self) -> &mut TypeaheadSelector {
        &mut self.tool_selector
    }

    pub fn borrower_selector(&self) -> &TypeaheadSelector {
        &self.borrower_selector
    }

    pub fn borrower_selector_mut(&mut self) -> &mut TypeaheadSelector {
        &mut self.borrower_selector
    }

    pub fn view(&self) -> ViewModel {
        ViewModel {
            tools: self.registry.tools().to_vec(),
            borrowers: self.registry.borrowers().to_vec(),
            tool_candidates: self.registry.available_tools(),
            borrower_candidates: self.registry.available_borrowers(),
            loans: self.registry.loans().to_vec(),
        }
    }

    pub fn add_tool(&mut self, raw: &str) -> ActionResult {
        let name = normalize_name(raw).map_err(Self::notice_for)?;
        let previous = self.registry.clone();
        let name = self
            .registry
            .add_tool(name)
            .map_err(Self::notice_for)?;
        self.commit(previous)?;
        info!(tool = %name, "tool added");
        Ok(Notice::info(Message::ToolAdded(name)))
    }

    pub fn add_borrower(&mut self, raw: &str) -> ActionResult {
        let name = normalize_name(raw).map_err(Self::notice_for)?;
        let previous = self.registry.clone();
        let name = self
            .registry
            .add_borrower(name)
            .map_err(Self::notice_for)?;
        self.commit(previous)?;
        info!(borrower = %name, "borrower added");
        Ok(Notice::info(Message::BorrowerAdded(name)))
    }

    /// First step of a tool delete: check the selection and ask for
    /// confirmation.
    pub fn request_delete_tool(&self, selection: Option<&str>) -> Result<Confirmation, Notice> {
        let Some(name) = selection.filter(|name| self.registry.has_tool(name)) else {
            return Err(Notice::info(Message::SelectToolToDelete));
        };
        if self.registry.is_lent(name) {
            return Err(Self::notice_for(RegistryError::ToolInUse(name.to_string())));
        }
        Ok(Confirmation::DeleteTool(name.to_string()))
    }

    pub fn request_delete_borrower(&self, selection: Option<&str>) -> Result<Confirmation, Notice> {
        let Some(name) = selection.filter(|name| self.registry.has_borrower(name)) else {
            return Err(Notice::info(Message::SelectBorrowerToDelete));
        };
        if self.registry.has_active_loans(name) {
            return Err(Self::notice_for(RegistryError::BorrowerInUse(name.to_string())));
        }
        Ok(Confirmation::DeleteBorrower(name.to_string()))
    }

    pub fn request_return(&self, loan: &Loan) -> Result<Confirmation, Notice> {
        if self.registry.loans().contains(loan) {
            Ok(Confirmation::ReturnLoan(loan.clone()))
        } else {
            Err(Notice::warning(Message::LoanMissing(loan.tool_name.clone())))
        }
    }

    /// Second step: the user said yes.
    pub fn confirm(&mut self, confirmation: Confirmation) -> ActionResult {
        match confirmation {
            Confirmation::DeleteTool(name) => {
                let previous = self.registry.clone();
                self.registry
                    .delete_tool(&name)
                    .map_err(Self::notice_for)?;
                self.commit(previous)?;
                info!(tool = %name, "tool deleted");
                Ok(Notice::info(Message::ToolDeleted(name)))
            }
            Confirmation::DeleteBorrower(name) => {
                let previous = self.registry.clone();
                self.registry
                    .delete_borrower(&name)
                    .map_err(Self::notice_for)?;
                self.commit(previous)?;
                info!(borrower = %name, "borrower deleted");
                Ok(Notice::info(Message::BorrowerDeleted(name)))
            }
            Confirmation::ReturnLoan(loan) => self.return_loan(&loan),
        }
    }

    /// Lend whatever the two selectors hold.
    pub fn lend(&mut self) -> ActionResult {
        let tool = self.tool_selector.text().trim().to_string();
        let borrower = self.borrower_selector.text().trim().to_string();
        if tool.is_empty() || borrower.is_empty() {
            return Err(Notice::warning(Message::LendFieldsMissing));
        }

        let previous = self.registry.clone();
        let now = self.clock.now();
        let loan = self
            .registry
            .lend_on(&tool, &borrower, now.date())
            .map_err(Self::notice_for)?;
        self.commit(previous)?;
        info!(tool = %loan.tool_name, borrower = %loan.borrower_name, "tool lent");

        self.tool_selector.clear();
        self.borrower_selector.clear();

        let done = Notice::info(Message::Lent {
            tool: loan.tool_name.clone(),
            borrower: loan.borrower_name.clone(),
        });
        Ok(self.record(AuditAction::Lend, &loan, now).unwrap_or(done))
    }

    fn return_loan(&mut self, loan: &Loan) -> ActionResult {
        let previous = self.registry.clone();
        let returned = self
            .registry
            .return_loan(loan)
            .map_err(Self::notice_for)?;
        self.commit(previous)?;
        info!(tool = %returned.tool_name, borrower = %returned.borrower_name, "tool returned");

        let done = Notice::info(Message::Returned {
            tool: returned.tool_name.clone(),
            borrower: returned.borrower_name.clone(),
        });
        let now = self.clock.now();
        Ok(self.record(AuditAction::Return, &returned, now).unwrap_or(done))
    }

    /// Append to the audit log. The mutation is already saved, so a failure
    /// only downgrades the outcome to a warning.
    fn record(&mut self, action: AuditAction, loan: &Loan, now: NaiveDateTime) -> Option<Notice> {
        let entry = AuditEntry {
            timestamp: now,
            action,
            tool: loan.tool_name.clone(),
            borrower: loan.borrower_name.clone(),
        };
        match self.audit.append(&entry) {
            Ok(()) => None,
            Err(err) => {
                warn!("audit append failed: {err:#}");
                Some(Notice::warning(Message::AuditFailed(err.root_cause().to_string())))
            }
        }
    }

    /// Persist the current registry. On failure the registry goes back to
    /// `previous` so memory never runs ahead of disk.
    fn commit(&mut self, previous: LoanRegistry) -> Result<(), Notice> {
        if let Err(err) = self.store.save(&self.registry.snapshot()) {
            error!("snapshot save failed, rolling back: {err:#}");
            self.registry = previous;
            self.refresh();
            return Err(Notice::error(Message::SaveFailed(
                err.root_cause().to_string(),
            )));
        }
        self.refresh();
        Ok(())
    }

    /// Push fresh candidate lists into both selectors.
    fn refresh(&mut self) {
        self.tool_selector
            .set_candidates(self.registry.available_tools());
        self.borrower_selector
            .set_candidates(self.registry.available_borrowers());
    }

    fn notice_for(err: RegistryError) -> Notice {
        match err {
            RegistryError::BlankName => Notice::warning(Message::BlankName),
            RegistryError::NameTooLong { max, .. } => {
                Notice::warning(Message::NameTooLong { max })
            }
            RegistryError::DuplicateTool(name) => Notice::warning(Message::ToolExists(name)),
            RegistryError::DuplicateBorrower(name) => {
                Notice::warning(Message::BorrowerExists(name))
            }
            RegistryError::ToolInUse(name) => Notice::warning(Message::ToolInUse(name)),
            RegistryError::BorrowerInUse(name) => Notice::warning(Message::BorrowerInUse(name)),
            RegistryError::AlreadyLent(name) => Notice::warning(Message::AlreadyLent(name)),
            RegistryError::UnknownTool(name) => Notice::error(Message::InvalidTool(name)),
            RegistryError::UnknownBorrower(name) => Notice::error(Message::InvalidBorrower(name)),
            RegistryError::NotFound { entity, name } => match entity {
                Entity::Tool => Notice::info(Message::SelectToolToDelete),
                Entity::Borrower => Notice::info(Message::SelectBorrowerToDelete),
                Entity::Loan => Notice::warning(Message::LoanMissing(name)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crossterm::event::KeyCode;

    use super::*;
    use crate::db::{MemoryAuditLog, MemoryStore};
    use crate::messages::Locale;
    use crate::models::{Snapshot, MAX_NAME_LEN};

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn controller_with(snapshot: Snapshot) -> (AppController, MemoryStore, MemoryAuditLog) {
        let store = MemoryStore::with_snapshot(snapshot);
        let audit = MemoryAuditLog::new(Locale::English);
        let controller = AppController::new(
            Box::new(store.clone()),
            Box::new(audit.clone()),
            Duration::from_millis(200),
        )
        .with_clock(Box::new(FixedClock(noon())));
        (controller, store, audit)
    }

    fn stocked() -> (AppController, MemoryStore, MemoryAuditLog) {
        controller_with(Snapshot {
            tools: vec!["Hammer".into(), "Wrench".into()],
            borrowers: vec!["Alice".into(), "Bob".into()],
            loans: Vec::new(),
        })
    }

    fn select(selector: &mut TypeaheadSelector, text: &str) {
        for ch in text.chars() {
            selector.handle_key(KeyCode::Char(ch));
        }
    }

    #[test]
    fn add_tool_persists_and_refreshes_candidates() {
        let (mut controller, store, _) = controller_with(Snapshot::default());
        let notice = controller.add_tool("  Saw ").unwrap();
        assert_eq!(notice, Notice::info(Message::ToolAdded("Saw".into())));
        assert_eq!(store.snapshot().tools, vec!["Saw".to_string()]);
        assert_eq!(controller.tool_selector().candidates(), ["Saw"]);
    }

    #[test]
    fn add_rejects_blank_and_long_names_before_the_registry() {
        let (mut controller, store, _) = stocked();
        assert_eq!(
            controller.add_tool("   "),
            Err(Notice::warning(Message::BlankName))
        );
        assert_eq!(
            controller.add_borrower(&"b".repeat(MAX_NAME_LEN + 1)),
            Err(Notice::warning(Message::NameTooLong { max: MAX_NAME_LEN }))
        );
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn duplicate_add_warns() {
        let (mut controller, _, _) = stocked();
        assert_eq!(
            controller.add_tool("Hammer"),
            Err(Notice::warning(Message::ToolExists("Hammer".into())))
        );
        assert_eq!(
            controller.add_borrower("Bob"),
            Err(Notice::warning(Message::BorrowerExists("Bob".into())))
        );
    }

    #[test]
    fn delete_requires_selection_and_confirmation() {
        let (mut controller, store, _) = stocked();
        assert_eq!(
            controller.request_delete_tool(None),
            Err(Notice::info(Message::SelectToolToDelete))
        );
        assert_eq!(
            controller.request_delete_borrower(Some("Nobody")),
            Err(Notice::info(Message::SelectBorrowerToDelete))
        );

        let confirmation = controller.request_delete_tool(Some("Wrench")).unwrap();
        assert_eq!(confirmation.prompt(), Message::ConfirmDeleteTool("Wrench".into()));
        assert_eq!(store.save_count(), 0);

        controller.confirm(confirmation).unwrap();
        assert_eq!(store.snapshot().tools, vec!["Hammer".to_string()]);
    }

    #[test]
    fn blank_legacy_entry_is_deleted_after_confirmation() {
        let (mut controller, store, _) = controller_with(Snapshot {
            tools: vec!["Saw".into(), " ".into()],
            borrowers: Vec::new(),
            loans: Vec::new(),
        });
        let confirmation = controller.request_delete_tool(Some(" ")).unwrap();
        controller.confirm(confirmation).unwrap();
        assert_eq!(store.snapshot().tools, vec!["Saw".to_string()]);
    }

    #[test]
    fn delete_of_lent_entries_is_blocked() {
        let (mut controller, _, _) = stocked();
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Alice");
        controller.lend().unwrap();

        assert_eq!(
            controller.request_delete_tool(Some("Hammer")),
            Err(Notice::warning(Message::ToolInUse("Hammer".into())))
        );
        assert_eq!(
            controller.request_delete_borrower(Some("Alice")),
            Err(Notice::warning(Message::BorrowerInUse("Alice".into())))
        );
    }

    #[test]
    fn confirmed_delete_still_respects_loans() {
        let (mut controller, _, _) = stocked();
        let confirmation = controller.request_delete_tool(Some("Hammer")).unwrap();
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Bob");
        controller.lend().unwrap();
        assert_eq!(
            controller.confirm(confirmation),
            Err(Notice::warning(Message::ToolInUse("Hammer".into())))
        );
    }

    #[test]
    fn lend_records_loan_audit_line_and_clears_selectors() {
        let (mut controller, store, audit) = stocked();
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Alice");

        let notice = controller.lend().unwrap();
        assert_eq!(
            notice,
            Notice::info(Message::Lent {
                tool: "Hammer".into(),
                borrower: "Alice".into()
            })
        );
        assert_eq!(
            store.snapshot().loans,
            vec![Loan::new("Hammer", "Alice", noon().date())]
        );
        assert_eq!(
            audit.lines(),
            vec!["[2024-06-01 12:00:00] LEND: Hammer -> Alice".to_string()]
        );
        assert_eq!(controller.tool_selector().text(), "");
        assert_eq!(controller.borrower_selector().text(), "");
        assert_eq!(controller.view().tool_candidates, vec!["Wrench".to_string()]);
    }

    #[test]
    fn lend_requires_both_fields() {
        let (mut controller, _, _) = stocked();
        select(controller.tool_selector_mut(), "Hammer");
        assert_eq!(
            controller.lend(),
            Err(Notice::warning(Message::LendFieldsMissing))
        );
    }

    #[test]
    fn lend_rejects_unlisted_text() {
        let (mut controller, store, audit) = stocked();
        select(controller.tool_selector_mut(), "hammer");
        select(controller.borrower_selector_mut(), "Alice");
        assert_eq!(
            controller.lend(),
            Err(Notice::error(Message::InvalidTool("hammer".into())))
        );

        controller.tool_selector_mut().clear();
        select(controller.tool_selector_mut(), "Wrench");
        controller.borrower_selector_mut().clear();
        select(controller.borrower_selector_mut(), "Carol");
        assert_eq!(
            controller.lend(),
            Err(Notice::error(Message::InvalidBorrower("Carol".into())))
        );
        assert_eq!(store.save_count(), 0);
        assert!(audit.lines().is_empty());
    }

    #[test]
    fn lend_of_lent_tool_warns() {
        let (mut controller, _, _) = stocked();
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Alice");
        controller.lend().unwrap();

        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Bob");
        assert_eq!(
            controller.lend(),
            Err(Notice::warning(Message::AlreadyLent("Hammer".into())))
        );
        assert_eq!(controller.registry().loans().len(), 1);
    }

    #[test]
    fn return_requires_confirmation_and_logs() {
        let (mut controller, store, audit) = stocked();
        select(controller.tool_selector_mut(), "Wrench");
        select(controller.borrower_selector_mut(), "Bob");
        controller.lend().unwrap();

        let loan = controller.view().loans[0].clone();
        let confirmation = controller.request_return(&loan).unwrap();
        assert_eq!(
            confirmation.prompt(),
            Message::ConfirmReturn {
                tool: "Wrench".into(),
                borrower: "Bob".into()
            }
        );
        controller.confirm(confirmation).unwrap();

        assert!(store.snapshot().loans.is_empty());
        assert_eq!(audit.lines().len(), 2);
        assert!(audit.lines()[1].ends_with("RETURN: Wrench -> Bob"));
        assert_eq!(
            controller.view().tool_candidates,
            vec!["Hammer".to_string(), "Wrench".to_string()]
        );
    }

    #[test]
    fn returning_a_vanished_loan_warns() {
        let (mut controller, _, _) = stocked();
        let ghost = Loan::new("Hammer", "Alice", noon().date());
        assert!(controller.request_return(&ghost).is_err());
        assert_eq!(
            controller.confirm(Confirmation::ReturnLoan(ghost)),
            Err(Notice::warning(Message::LoanMissing("Hammer".into())))
        );
    }

    #[test]
    fn failed_save_rolls_back() {
        let (mut controller, store, audit) = stocked();
        store.set_fail_saves(true);
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Alice");

        let result = controller.lend();
        assert_eq!(
            result,
            Err(Notice::error(Message::SaveFailed("disk full".into())))
        );
        assert!(controller.registry().loans().is_empty());
        assert!(audit.lines().is_empty());
        // Inputs stay filled so the user can retry.
        assert_eq!(controller.tool_selector().text(), "Hammer");

        store.set_fail_saves(false);
        assert!(controller.lend().is_ok());
    }

    #[test]
    fn audit_failure_keeps_the_loan() {
        let (mut controller, store, audit) = stocked();
        audit.set_fail(true);
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Alice");

        let notice = controller.lend().unwrap();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(store.snapshot().loans.len(), 1);
    }

    #[test]
    fn view_lists_everything() {
        let (mut controller, _, _) = stocked();
        select(controller.tool_selector_mut(), "Hammer");
        select(controller.borrower_selector_mut(), "Bob");
        controller.lend().unwrap();

        let view = controller.view();
        assert_eq!(view.tools, vec!["Hammer".to_string(), "Wrench".to_string()]);
        assert_eq!(view.borrowers, vec!["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(view.tool_candidates, vec!["Wrench".to_string()]);
        assert_eq!(
            view.borrower_candidates,
            vec!["Alice".to_string(), "Bob".to_string()]
        );
        assert_eq!(view.loans.len(), 1);
    }
}
