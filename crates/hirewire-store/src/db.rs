use rusqlite::{Connection, Result};
use tracing::info;

/// Initialise the interviews schema. Safe to call on every startup
/// (idempotent), including against databases written by deployments
/// that predate the time column.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_interviews_table(conn)?;
    ensure_time_column(conn)?;
    Ok(())
}

fn create_interviews_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS interviews (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id        INTEGER NOT NULL,
            owner_name      TEXT NOT NULL,
            interview_date  TEXT NOT NULL,      -- ISO-8601 date
            interview_time  TEXT,               -- HH:MM, sentinel, or NULL
            category        TEXT NOT NULL,
            description     TEXT NOT NULL,
            created_at      TEXT NOT NULL       -- RFC 3339
        );
        CREATE INDEX IF NOT EXISTS idx_interviews_owner
            ON interviews (owner_id, interview_date);
        CREATE INDEX IF NOT EXISTS idx_interviews_date
            ON interviews (interview_date);",
    )
}

/// Older deployments lack `interview_time`; add it in place without
/// touching existing rows (they keep NULL).
fn ensure_time_column(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(interviews)")?;
    let has_time = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|r| r.ok())
        .any(|name| name == "interview_time");

    if !has_time {
        conn.execute("ALTER TABLE interviews ADD COLUMN interview_time TEXT", [])?;
        info!("added interview_time column to existing interviews table");
    }
    Ok(())
}
