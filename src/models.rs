//! Domain models shared by the registry, the persistence layer, and the TUI.
//! Tools and borrowers are identified purely by name, so only the loan and the
//! durable snapshot need dedicated types.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of characters accepted for a tool or borrower name.
pub const MAX_NAME_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// An active association of one tool with one borrower. Loans are created by a
/// lend and destroyed by a return; nothing edits them in between.
pub struct Loan {
    /// Name of the lent tool. Serialized as `tool` to stay compatible with the
    /// JSON data files written by earlier releases.
    #[serde(rename = "tool")]
    pub tool_name: String,
    #[serde(rename = "borrower")]
    pub borrower_name: String,
    /// Calendar day the loan was created, stored as `YYYY-MM-DD`.
    #[serde(with = "loan_date")]
    pub date: NaiveDate,
}

impl Loan {
    pub fn new(
        tool_name: impl Into<String>,
        borrower_name: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            borrower_name: borrower_name.into(),
            date,
        }
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}  {}",
            self.tool_name,
            self.borrower_name,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// Full durable state: everything the store reads at startup and rewrites after
/// each committed mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub borrowers: Vec<String>,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.borrowers.is_empty() && self.loans.is_empty()
    }
}

/// Loan dates in data files. Writes `YYYY-MM-DD`; reads also accept the
/// hand-edited spellings found in older files and ignore a time-of-day suffix.
mod loan_date {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y"];

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised loan date '{raw}'")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let day = raw.split([' ', 'T']).next().unwrap_or(raw);
        FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
    }
}
