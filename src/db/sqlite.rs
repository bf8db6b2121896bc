use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::{Loan, Snapshot};

use super::connection::{ensure_schema, open_database};
use super::SnapshotStore;

/// Snapshot store backed by an embedded SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotStore for SqliteStore {
    fn read(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            tools: fetch_names(&self.conn, "tools")?,
            borrowers: fetch_names(&self.conn, "borrowers")?,
            loans: fetch_loans(&self.conn)?,
        })
    }

    /// Replace every row in one transaction so a failed write leaves the
    /// previous snapshot intact.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to start snapshot transaction")?;

        tx.execute("DELETE FROM tools", [])
            .context("failed to clear tools")?;
        tx.execute("DELETE FROM borrowers", [])
            .context("failed to clear borrowers")?;
        tx.execute("DELETE FROM loans", [])
            .context("failed to clear loans")?;

        {
            let mut insert_tool = tx
                .prepare("INSERT INTO tools (position, name) VALUES (?1, ?2)")
                .context("failed to prepare tool insert")?;
            for (position, name) in snapshot.tools.iter().enumerate() {
                insert_tool
                    .execute(params![position as i64, name])
                    .context("failed to insert tool")?;
            }

            let mut insert_borrower = tx
                .prepare("INSERT INTO borrowers (position, name) VALUES (?1, ?2)")
                .context("failed to prepare borrower insert")?;
            for (position, name) in snapshot.borrowers.iter().enumerate() {
                insert_borrower
                    .execute(params![position as i64, name])
                    .context("failed to insert borrower")?;
            }

            let mut insert_loan = tx
                .prepare(
                    "INSERT INTO loans (position, tool, borrower, date) VALUES (?1, ?2, ?3, ?4)",
                )
                .context("failed to prepare loan insert")?;
            for (position, loan) in snapshot.loans.iter().enumerate() {
                insert_loan
                    .execute(params![
                        position as i64,
                        loan.tool_name,
                        loan.borrower_name,
                        loan.date
                    ])
                    .context("failed to insert loan")?;
            }
        }

        tx.commit().context("failed to commit snapshot")
    }
}

fn fetch_names(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("SELECT name FROM {table} ORDER BY position"))
        .with_context(|| format!("failed to prepare {table} query"))?;

    let names = stmt
        .query_map([], |row| row.get(0))
        .with_context(|| format!("failed to load {table}"))?
        .collect::<Result<Vec<String>, _>>()
        .with_context(|| format!("failed to collect {table}"))?;

    Ok(names)
}

fn fetch_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn
        .prepare("SELECT tool, borrower, date FROM loans ORDER BY position")
        .context("failed to prepare loan query")?;

    let loans = stmt
        .query_map([], |row| {
            Ok(Loan {
                tool_name: row.get(0)?,
                borrower_name: row.get(1)?,
                date: row.get(2)?,
            })
        })
        .context("failed to load loans")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect loans")?;

    Ok(loans)
}
