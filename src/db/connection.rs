use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Ensure the database file exists, create missing tables, and return a live
/// connection. Foreign keys are switched on so the sighting -> bird reference
/// is enforced the same way in tests and production runs.
pub fn ensure_schema(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    info!("Opening SQLite database at {}", db_path.display());
    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Open a throwaway database. Used by tests and when the server is pointed
/// at `:memory:`.
pub fn open_in_memory() -> Result<Connection> {
    debug!("Opening in-memory SQLite database");
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS birds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            weight REAL NOT NULL,
            height REAL NOT NULL
        )",
        [],
    )
    .context("failed to create birds table")?;

    // Sightings never cascade: a bird with sightings cannot be deleted.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sightings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bird_id INTEGER NOT NULL,
            location TEXT NOT NULL,
            date_time TEXT NOT NULL,
            FOREIGN KEY(bird_id) REFERENCES birds(id) ON DELETE RESTRICT
        )",
        [],
    )
    .context("failed to create sightings table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sightings_bird ON sightings(bird_id)",
        [],
    )
    .context("failed to create sightings index")?;

    Ok(())
}
