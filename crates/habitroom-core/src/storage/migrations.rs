//! Database schema migrations for habitroom.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version, assuming 0");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: habits, completion ledger, active timers and the
/// non-working-day calendar.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id           TEXT PRIMARY KEY,
            owner        TEXT NOT NULL,
            name         TEXT NOT NULL,
            habit_type   TEXT NOT NULL,
            target_value INTEGER,
            sort_order   INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL,
            paused_at    TEXT,
            archived_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS habit_completions (
            habit_id  TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            date      TEXT NOT NULL,
            value     INTEGER NOT NULL DEFAULT 0 CHECK (value >= 0),
            completed INTEGER NOT NULL DEFAULT 0,
            UNIQUE (habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS active_timers (
            habit_id            TEXT PRIMARY KEY REFERENCES habits(id) ON DELETE CASCADE,
            date                TEXT NOT NULL,
            started_at          TEXT NOT NULL,
            accumulated_seconds INTEGER NOT NULL DEFAULT 0,
            is_running          INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS holidays (
            date TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS day_offs (
            owner  TEXT NOT NULL,
            date   TEXT NOT NULL,
            reason TEXT NOT NULL DEFAULT '',
            UNIQUE (owner, date)
        );

        CREATE INDEX IF NOT EXISTS idx_habits_owner ON habits(owner, archived_at);
        CREATE INDEX IF NOT EXISTS idx_completions_habit ON habit_completions(habit_id);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: per-habit weekly schedules and streak freeze fields.
///
/// Adds:
/// - scheduled_days: JSON array of weekday numbers, NULL for Monday..Friday
/// - frozen_streak: streak carried across schedule changes
/// - streak_frozen_at: baseline date of the last freeze
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE habits ADD COLUMN scheduled_days TEXT;
         ALTER TABLE habits ADD COLUMN frozen_streak INTEGER NOT NULL DEFAULT 0;
         ALTER TABLE habits ADD COLUMN streak_frozen_at TEXT;",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}
