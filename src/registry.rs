//! In-memory owner of tools, borrowers, and active loans. Every mutation is
//! checked against the lending invariants before anything changes, so a
//! rejected call always leaves the registry exactly as it was.

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::models::{Loan, Snapshot, MAX_NAME_LEN};

/// Which kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Tool,
    Borrower,
    Loan,
}

/// Every way the registry can refuse a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("name must not be blank")]
    BlankName,
    #[error("name '{name}' is longer than {max} characters")]
    NameTooLong { name: String, max: usize },
    #[error("tool '{0}' already exists")]
    DuplicateTool(String),
    #[error("borrower '{0}' already exists")]
    DuplicateBorrower(String),
    #[error("tool '{0}' is currently lent")]
    ToolInUse(String),
    #[error("borrower '{0}' has active loans")]
    BorrowerInUse(String),
    #[error("tool '{0}' is already lent")]
    AlreadyLent(String),
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("unknown borrower '{0}'")]
    UnknownBorrower(String),
    #[error("{entity:?} '{name}' not found")]
    NotFound { entity: Entity, name: String },
}

/// Trim a raw name and check it against the length rules shared by tools and
/// borrowers. Returns the trimmed slice on success.
pub fn normalize_name(raw: &str) -> Result<&str, RegistryError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RegistryError::BlankName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RegistryError::NameTooLong {
            name: name.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(name)
}

/// Tools and borrowers keep insertion order because the UI lists them in the
/// order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanRegistry {
    tools: Vec<String>,
    borrowers: Vec<String>,
    loans: Vec<Loan>,
}

impl LoanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted data. The snapshot is taken as-is;
    /// blank entries left by hand edits are filtered out of the candidate
    /// lists rather than rejected here.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tools: snapshot.tools,
            borrowers: snapshot.borrowers,
            loans: snapshot.loans,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tools: self.tools.clone(),
            borrowers: self.borrowers.clone(),
            loans: self.loans.clone(),
        }
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn borrowers(&self) -> &[String] {
        &self.borrowers
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool == name)
    }

    pub fn has_borrower(&self, name: &str) -> bool {
        self.borrowers.iter().any(|borrower| borrower == name)
    }

    pub fn is_lent(&self, tool_name: &str) -> bool {
        self.loans.iter().any(|loan| loan.tool_name == tool_name)
    }

    pub fn has_active_loans(&self, borrower_name: &str) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.borrower_name == borrower_name)
    }

    pub fn add_tool(&mut self, raw: &str) -> Result<String, RegistryError> {
        let name = normalize_name(raw)?;
        if self.has_tool(name) {
            return Err(RegistryError::DuplicateTool(name.to_string()));
        }
        self.tools.push(name.to_string());
        Ok(name.to_string())
    }

    /// Remove a tool by its stored name. Matching is exact so entries loaded
    /// from older data files, blank ones included, can still be removed.
    pub fn delete_tool(&mut self, name: &str) -> Result<(), RegistryError> {
        let index = self
            .tools
            .iter()
            .position(|tool| tool == name)
            .ok_or_else(|| RegistryError::NotFound {
                entity: Entity::Tool,
                name: name.to_string(),
            })?;
        if self.is_lent(name) {
            return Err(RegistryError::ToolInUse(name.to_string()));
        }
        self.tools.remove(index);
        Ok(())
    }

    pub fn add_borrower(&mut self, raw: &str) -> Result<String, RegistryError> {
        let name = normalize_name(raw)?;
        if self.has_borrower(name) {
            return Err(RegistryError::DuplicateBorrower(name.to_string()));
        }
        self.borrowers.push(name.to_string());
        Ok(name.to_string())
    }

    /// Remove a borrower by its stored name. Matching is exact so entries loaded
    /// from older data files, blank ones included, can still be removed.
    pub fn delete_borrower(&mut self, name: &str) -> Result<(), RegistryError> {
        let index = self
            .borrowers
            .iter()
            .position(|borrower| borrower == name)
            .ok_or_else(|| RegistryError::NotFound {
                entity: Entity::Borrower,
                name: name.to_string(),
            })?;
        if self.has_active_loans(name) {
            return Err(RegistryError::BorrowerInUse(name.to_string()));
        }
        self.borrowers.remove(index);
        Ok(())
    }

    /// Lend a tool dated with the local calendar day.
    pub fn lend(&mut self, tool_name: &str, borrower_name: &str) -> Result<Loan, RegistryError> {
        self.lend_on(tool_name, borrower_name, Local::now().date_naive())
    }

    pub fn lend_on(
        &mut self,
        tool_name: &str,
        borrower_name: &str,
        date: NaiveDate,
    ) -> Result<Loan, RegistryError> {
        let tool = tool_name.trim();
        let borrower = borrower_name.trim();
        if !self.has_tool(tool) {
            return Err(RegistryError::UnknownTool(tool.to_string()));
        }
        if !self.has_borrower(borrower) {
            return Err(RegistryError::UnknownBorrower(borrower.to_string()));
        }
        if self.is_lent(tool) {
            return Err(RegistryError::AlreadyLent(tool.to_string()));
        }
        let loan = Loan::new(tool, borrower, date);
        self.loans.push(loan.clone());
        Ok(loan)
    }

    /// Remove the loan matching `loan` on all three fields.
    pub fn return_loan(&mut self, loan: &Loan) -> Result<Loan, RegistryError> {
        let index = self
            .loans
            .iter()
            .position(|active| active == loan)
            .ok_or_else(|| RegistryError::NotFound {
                entity: Entity::Loan,
                name: loan.tool_name.clone(),
            })?;
        Ok(self.loans.remove(index))
    }

    /// Tools that can be lent right now, in insertion order.
    pub fn available_tools(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|tool| !tool.trim().is_empty() && !self.is_lent(tool))
            .cloned()
            .collect()
    }

    pub fn available_borrowers(&self) -> Vec<String> {
        self.borrowers
            .iter()
            .filter(|borrower| !borrower.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn stocked() -> LoanRegistry {
        let mut registry = LoanRegistry::new();
        registry.add_tool("Hammer").unwrap();
        registry.add_tool("Wrench").unwrap();
        registry.add_borrower("Alice").unwrap();
        registry.add_borrower("Bob").unwrap();
        registry
    }

    #[test]
    fn add_tool_keeps_insertion_order() {
        let mut registry = LoanRegistry::new();
        registry.add_tool("Saw").unwrap();
        registry.add_tool("Drill").unwrap();
        assert_eq!(registry.tools(), ["Saw", "Drill"]);
    }

    #[test]
    fn add_tool_trims_and_rejects_blank() {
        let mut registry = LoanRegistry::new();
        assert_eq!(registry.add_tool("  Level  ").unwrap(), "Level");
        assert_eq!(registry.add_tool("   "), Err(RegistryError::BlankName));
        assert_eq!(registry.tools(), ["Level"]);
    }

    #[test]
    fn add_tool_rejects_overlong_names() {
        let mut registry = LoanRegistry::new();
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            registry.add_tool(&long),
            Err(RegistryError::NameTooLong { max: MAX_NAME_LEN, .. })
        ));
        assert!(registry.add_tool(&"y".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn duplicate_tool_is_rejected() {
        let mut registry = stocked();
        assert_eq!(
            registry.add_tool("Hammer"),
            Err(RegistryError::DuplicateTool("Hammer".into()))
        );
        assert_eq!(registry.tools().len(), 2);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut registry = stocked();
        assert!(registry.add_tool("hammer").is_ok());
        assert_eq!(
            registry.lend_on("HAMMER", "Alice", day()),
            Err(RegistryError::UnknownTool("HAMMER".into()))
        );
    }

    #[test]
    fn duplicate_borrower_is_rejected() {
        let mut registry = stocked();
        assert_eq!(
            registry.add_borrower(" Bob "),
            Err(RegistryError::DuplicateBorrower("Bob".into()))
        );
    }

    #[test]
    fn double_lend_is_rejected() {
        let mut registry = stocked();
        registry.lend_on("Hammer", "Alice", day()).unwrap();
        assert_eq!(
            registry.lend_on("Hammer", "Bob", day()),
            Err(RegistryError::AlreadyLent("Hammer".into()))
        );
        assert_eq!(registry.loans().len(), 1);
    }

    #[test]
    fn lend_checks_tool_before_borrower() {
        let mut registry = stocked();
        assert_eq!(
            registry.lend_on("Ghost", "Nobody", day()),
            Err(RegistryError::UnknownTool("Ghost".into()))
        );
        assert_eq!(
            registry.lend_on("Hammer", "Nobody", day()),
            Err(RegistryError::UnknownBorrower("Nobody".into()))
        );
        assert!(registry.loans().is_empty());
    }

    #[test]
    fn return_restores_availability() {
        let mut registry = stocked();
        let loan = registry.lend_on("Wrench", "Bob", day()).unwrap();
        assert_eq!(registry.available_tools(), ["Hammer"]);
        registry.return_loan(&loan).unwrap();
        assert_eq!(registry.available_tools(), ["Hammer", "Wrench"]);
        assert!(registry.loans().is_empty());
    }

    #[test]
    fn return_of_unknown_loan_fails() {
        let mut registry = stocked();
        let loan = registry.lend_on("Wrench", "Bob", day()).unwrap();
        let stale = Loan::new("Wrench", "Alice", day());
        assert!(matches!(
            registry.return_loan(&stale),
            Err(RegistryError::NotFound { entity: Entity::Loan, .. })
        ));
        registry.return_loan(&loan).unwrap();
        assert!(registry.return_loan(&loan).is_err());
    }

    #[test]
    fn delete_tool_blocked_while_lent() {
        let mut registry = stocked();
        let loan = registry.lend_on("Hammer", "Alice", day()).unwrap();
        assert_eq!(
            registry.delete_tool("Hammer"),
            Err(RegistryError::ToolInUse("Hammer".into()))
        );
        registry.return_loan(&loan).unwrap();
        registry.delete_tool("Hammer").unwrap();
        assert_eq!(registry.tools(), ["Wrench"]);
    }

    #[test]
    fn delete_borrower_blocked_while_holding_a_loan() {
        let mut registry = stocked();
        registry.lend_on("Hammer", "Bob", day()).unwrap();
        assert_eq!(
            registry.delete_borrower("Bob"),
            Err(RegistryError::BorrowerInUse("Bob".into()))
        );
        registry.delete_borrower("Alice").unwrap();
        assert_eq!(registry.borrowers(), ["Bob"]);
    }

    #[test]
    fn delete_missing_entries_reports_not_found() {
        let mut registry = stocked();
        assert!(matches!(
            registry.delete_tool("Chisel"),
            Err(RegistryError::NotFound { entity: Entity::Tool, .. })
        ));
        assert!(matches!(
            registry.delete_borrower("Carol"),
            Err(RegistryError::NotFound { entity: Entity::Borrower, .. })
        ));
    }

    #[test]
    fn blank_entries_from_old_data_can_be_deleted() {
        let mut registry = LoanRegistry::from_snapshot(Snapshot {
            tools: vec!["Saw".into(), " ".into()],
            borrowers: vec!["  ".into()],
            loans: Vec::new(),
        });
        registry.delete_tool(" ").unwrap();
        registry.delete_borrower("  ").unwrap();
        assert_eq!(registry.tools(), ["Saw"]);
        assert!(registry.borrowers().is_empty());
    }

    #[test]
    fn delete_matches_stored_names_exactly() {
        let mut registry = stocked();
        assert!(matches!(
            registry.delete_tool(" Hammer "),
            Err(RegistryError::NotFound { entity: Entity::Tool, .. })
        ));
        assert_eq!(registry.tools(), ["Hammer", "Wrench"]);
    }

    #[test]
    fn available_lists_skip_blank_entries() {
        let registry = LoanRegistry::from_snapshot(Snapshot {
            tools: vec!["Saw".into(), " ".into(), "".into()],
            borrowers: vec!["".into(), "Dana".into()],
            loans: Vec::new(),
        });
        assert_eq!(registry.available_tools(), ["Saw"]);
        assert_eq!(registry.available_borrowers(), ["Dana"]);
    }

    #[test]
    fn available_borrowers_ignore_loans() {
        let mut registry = stocked();
        registry.lend_on("Hammer", "Alice", day()).unwrap();
        assert_eq!(registry.available_borrowers(), ["Alice", "Bob"]);
    }

    #[test]
    fn snapshot_round_trips() {
        let mut registry = stocked();
        registry.lend_on("Hammer", "Alice", day()).unwrap();
        let rebuilt = LoanRegistry::from_snapshot(registry.snapshot());
        assert_eq!(rebuilt, registry);
    }
}
