//! SQLite-backed habit store.
//!
//! Provides persistent storage for:
//! - Habits (owner scoped)
//! - The completion ledger, one row per (habit, date)
//! - Active habit timers, at most one per habit
//! - Global holidays and per-account days off
//!
//! Dates are ISO `YYYY-MM-DD` text and timestamps RFC 3339 text. Ledger
//! mutations are single upsert statements so concurrent writers cannot lose
//! each other's updates.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::calendar::{LocalDate, WorkCalendar};
use crate::error::{DatabaseError, Result};
use crate::habit::{Habit, HabitType, ScheduledDays};
use crate::ledger::Completion;
use crate::timer::HabitTimer;

/// Default database file name inside the data directory.
pub const DEFAULT_DB_FILE: &str = "habitroom.db";

const HABIT_COLUMNS: &str = "id, owner, name, habit_type, target_value, sort_order, created_at,
     paused_at, archived_at, scheduled_days, frozen_streak, streak_frozen_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: LocalDate,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOff {
    pub date: LocalDate,
    #[serde(default)]
    pub reason: String,
}

// === SQL conversions ===

impl ToSql for LocalDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for LocalDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        LocalDate::parse(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for HabitType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for HabitType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn format_schedule(days: Option<&ScheduledDays>) -> Option<String> {
    days.map(|d| {
        let list: Vec<String> = d.as_slice().iter().map(u32::to_string).collect();
        format!("[{}]", list.join(","))
    })
}

fn parse_schedule(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<ScheduledDays>> {
    raw.map(|text| {
        serde_json::from_str::<Vec<u32>>(&text)
            .map_err(|e| conversion_error(idx, Box::new(e)))
            .and_then(|days| {
                ScheduledDays::new(days).map_err(|e| conversion_error(idx, Box::new(e)))
            })
    })
    .transpose()
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, Box::new(e)))
}

fn parse_optional_timestamp(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(|s| parse_timestamp(idx, s)).transpose()
}

fn conversion_error(
    idx: usize,
    err: Box<dyn std::error::Error + Send + Sync + 'static>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err)
}

fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        habit_type: row.get(3)?,
        target_value: row.get(4)?,
        sort_order: row.get(5)?,
        created_at: row.get(6)?,
        paused_at: parse_optional_timestamp(7, row.get(7)?)?,
        archived_at: parse_optional_timestamp(8, row.get(8)?)?,
        scheduled_days: parse_schedule(9, row.get(9)?)?,
        frozen_streak: row.get(10)?,
        streak_frozen_at: row.get(11)?,
    })
}

fn row_to_completion(row: &Row) -> rusqlite::Result<Completion> {
    Ok(Completion {
        habit_id: row.get(0)?,
        date: row.get(1)?,
        value: row.get(2)?,
        completed: row.get(3)?,
    })
}

fn row_to_timer(row: &Row) -> rusqlite::Result<HabitTimer> {
    let started_at: String = row.get(2)?;
    Ok(HabitTimer {
        habit_id: row.get(0)?,
        date: row.get(1)?,
        started_at: parse_timestamp(2, &started_at)?,
        accumulated_seconds: row.get(3)?,
        is_running: row.get(4)?,
    })
}

/// SQLite database for habits, completions, timers and calendar data.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database named `file` inside [`data_dir`].
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened
    /// or migrated.
    pub fn open_in_data_dir(file: &str) -> Result<Self> {
        Self::open_path(&data_dir()?.join(file))
    }

    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Habits ===

    pub fn insert_habit(&self, habit: &Habit) -> rusqlite::Result<()> {
        self.conn.execute(
            &format!("INSERT INTO habits ({HABIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
            params![
                habit.id,
                habit.owner,
                habit.name,
                habit.habit_type,
                habit.target_value,
                habit.sort_order,
                habit.created_at,
                habit.paused_at.as_ref().map(format_timestamp),
                habit.archived_at.as_ref().map(format_timestamp),
                format_schedule(habit.scheduled_days.as_ref()),
                habit.frozen_streak,
                habit.streak_frozen_at,
            ],
        )?;
        Ok(())
    }

    /// Fetch a habit owned by `owner`. Other accounts' habits read as absent.
    pub fn get_habit(&self, owner: &str, id: &str) -> rusqlite::Result<Option<Habit>> {
        self.conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND owner = ?2"),
                params![id, owner],
                row_to_habit,
            )
            .optional()
    }

    /// Habits of `owner` ordered by sort order, then name.
    pub fn list_habits(&self, owner: &str, include_archived: bool) -> rusqlite::Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE owner = ?1 AND (?2 OR archived_at IS NULL)
             ORDER BY sort_order, name"
        ))?;
        let rows = stmt.query_map(params![owner, include_archived], row_to_habit)?;
        rows.collect()
    }

    pub fn next_sort_order(&self, owner: &str) -> rusqlite::Result<i64> {
        self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM habits WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )
    }

    /// Persist every mutable column of `habit`.
    pub fn save_habit(&self, habit: &Habit) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE habits SET
                name = ?3, habit_type = ?4, target_value = ?5, sort_order = ?6,
                paused_at = ?7, archived_at = ?8, scheduled_days = ?9,
                frozen_streak = ?10, streak_frozen_at = ?11
             WHERE id = ?1 AND owner = ?2",
            params![
                habit.id,
                habit.owner,
                habit.name,
                habit.habit_type,
                habit.target_value,
                habit.sort_order,
                habit.paused_at.as_ref().map(format_timestamp),
                habit.archived_at.as_ref().map(format_timestamp),
                format_schedule(habit.scheduled_days.as_ref()),
                habit.frozen_streak,
                habit.streak_frozen_at,
            ],
        )?;
        Ok(())
    }

    /// Save `habit` and, when `recompute_target` is given, re-derive every
    /// completion flag of the habit against it. One transaction.
    ///
    /// Returns the number of completion rows recomputed.
    pub fn save_habit_with_recompute(
        &self,
        habit: &Habit,
        recompute_target: Option<i64>,
    ) -> rusqlite::Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        self.save_habit(habit)?;
        let recomputed = match recompute_target {
            Some(target) => self.recompute_completed(&habit.id, target)?,
            None => 0,
        };
        tx.commit()?;
        Ok(recomputed)
    }

    /// Delete a habit. Completions and timer go with it.
    pub fn delete_habit(&self, owner: &str, id: &str) -> rusqlite::Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        Ok(deleted > 0)
    }

    // === Completion ledger ===

    pub fn completion(&self, habit_id: &str, date: LocalDate) -> rusqlite::Result<Option<Completion>> {
        self.conn
            .query_row(
                "SELECT habit_id, date, value, completed FROM habit_completions
                 WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date],
                row_to_completion,
            )
            .optional()
    }

    /// All completions of a habit, ascending by date.
    pub fn completions_for(&self, habit_id: &str) -> rusqlite::Result<Vec<Completion>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, date, value, completed FROM habit_completions
             WHERE habit_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![habit_id], row_to_completion)?;
        rows.collect()
    }

    /// Direct assignment of both fields.
    pub fn upsert_completion(
        &self,
        habit_id: &str,
        date: LocalDate,
        value: i64,
        completed: bool,
    ) -> rusqlite::Result<Completion> {
        self.conn.query_row(
            "INSERT INTO habit_completions (habit_id, date, value, completed)
             VALUES (?1, ?2, MAX(0, ?3), ?4)
             ON CONFLICT(habit_id, date) DO UPDATE SET
                value = excluded.value,
                completed = excluded.completed
             RETURNING habit_id, date, value, completed",
            params![habit_id, date, value, completed],
            row_to_completion,
        )
    }

    /// Flip the completed flag; `value` follows it as 1/0.
    pub fn toggle_completion(&self, habit_id: &str, date: LocalDate) -> rusqlite::Result<Completion> {
        self.conn.query_row(
            "INSERT INTO habit_completions (habit_id, date, value, completed)
             VALUES (?1, ?2, 1, 1)
             ON CONFLICT(habit_id, date) DO UPDATE SET
                completed = NOT completed,
                value = CASE WHEN completed THEN 0 ELSE 1 END
             RETURNING habit_id, date, value, completed",
            params![habit_id, date],
            row_to_completion,
        )
    }

    /// Add `delta` to the stored value in one statement, clamping at zero,
    /// and derive `completed` against `target`.
    pub fn increment_completion(
        &self,
        habit_id: &str,
        date: LocalDate,
        delta: i64,
        target: i64,
    ) -> rusqlite::Result<Completion> {
        self.conn.query_row(
            "INSERT INTO habit_completions (habit_id, date, value, completed)
             VALUES (?1, ?2, MAX(0, ?3), MAX(0, ?3) >= ?4)
             ON CONFLICT(habit_id, date) DO UPDATE SET
                value = MAX(0, value + ?3),
                completed = MAX(0, value + ?3) >= ?4
             RETURNING habit_id, date, value, completed",
            params![habit_id, date, delta, target],
            row_to_completion,
        )
    }

    /// Re-derive `completed = value >= target` for every row of a habit.
    pub fn recompute_completed(&self, habit_id: &str, target: i64) -> rusqlite::Result<usize> {
        self.conn.execute(
            "UPDATE habit_completions SET completed = (value >= ?2) WHERE habit_id = ?1",
            params![habit_id, target],
        )
    }

    // === Active timers ===

    pub fn get_timer(&self, habit_id: &str) -> rusqlite::Result<Option<HabitTimer>> {
        self.conn
            .query_row(
                "SELECT habit_id, date, started_at, accumulated_seconds, is_running
                 FROM active_timers WHERE habit_id = ?1",
                params![habit_id],
                row_to_timer,
            )
            .optional()
    }

    /// Insert or overwrite the single timer row of a habit.
    pub fn save_timer(&self, timer: &HabitTimer) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO active_timers (habit_id, date, started_at, accumulated_seconds, is_running)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(habit_id) DO UPDATE SET
                date = excluded.date,
                started_at = excluded.started_at,
                accumulated_seconds = excluded.accumulated_seconds,
                is_running = excluded.is_running",
            params![
                timer.habit_id,
                timer.date,
                format_timestamp(&timer.started_at),
                timer.accumulated_seconds,
                timer.is_running,
            ],
        )?;
        Ok(())
    }

    pub fn delete_timer(&self, habit_id: &str) -> rusqlite::Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM active_timers WHERE habit_id = ?1", params![habit_id])?;
        Ok(deleted > 0)
    }

    /// Write the timer's total into the ledger and drop the timer, atomically.
    pub fn finish_timer(
        &self,
        timer: &HabitTimer,
        total_seconds: i64,
        completed: bool,
    ) -> rusqlite::Result<Completion> {
        let tx = self.conn.unchecked_transaction()?;
        let completion =
            self.upsert_completion(&timer.habit_id, timer.date, total_seconds, completed)?;
        self.delete_timer(&timer.habit_id)?;
        tx.commit()?;
        Ok(completion)
    }

    // === Holidays and days off ===

    /// Replace the whole holiday table.
    pub fn replace_holidays(&self, holidays: &[Holiday]) -> rusqlite::Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM holidays", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO holidays (date, name) VALUES (?1, ?2)
                 ON CONFLICT(date) DO UPDATE SET name = excluded.name",
            )?;
            for holiday in holidays {
                stmt.execute(params![holiday.date, holiday.name])?;
            }
        }
        let count: usize = tx.query_row("SELECT COUNT(*) FROM holidays", [], |row| row.get(0))?;
        tx.commit()?;
        Ok(count)
    }

    pub fn list_holidays(&self) -> rusqlite::Result<Vec<Holiday>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, name FROM holidays ORDER BY date")?;
        let rows = stmt.query_map([], |row| {
            Ok(Holiday {
                date: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect()
    }

    pub fn add_day_off(&self, owner: &str, day_off: &DayOff) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO day_offs (owner, date, reason) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner, date) DO UPDATE SET reason = excluded.reason",
            params![owner, day_off.date, day_off.reason],
        )?;
        Ok(())
    }

    pub fn remove_day_off(&self, owner: &str, date: LocalDate) -> rusqlite::Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM day_offs WHERE owner = ?1 AND date = ?2",
            params![owner, date],
        )?;
        Ok(deleted > 0)
    }

    pub fn list_day_offs(&self, owner: &str) -> rusqlite::Result<Vec<DayOff>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, reason FROM day_offs WHERE owner = ?1 ORDER BY date")?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(DayOff {
                date: row.get(0)?,
                reason: row.get(1)?,
            })
        })?;
        rows.collect()
    }

    /// Holidays plus `owner`'s days off, ready for the calendar resolver.
    pub fn work_calendar(&self, owner: &str) -> rusqlite::Result<WorkCalendar> {
        let holidays = self.list_holidays()?.into_iter().map(|h| h.date);
        let day_offs = self.list_day_offs(owner)?.into_iter().map(|d| d.date);
        Ok(WorkCalendar::new(holidays, day_offs))
    }
}
