use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (or create) the SQLite snapshot file and make sure every table exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the three snapshot tables if they are missing. `position` carries
/// insertion order, which the UI relies on when listing tools and borrowers.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tools (
            position INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create tools table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS borrowers (
            position INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create borrowers table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS loans (
            position INTEGER PRIMARY KEY,
            tool TEXT NOT NULL,
            borrower TEXT NOT NULL,
            date TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create loans table")?;

    Ok(())
}
