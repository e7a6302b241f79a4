//! Habit timer state machine.
//!
//! The timer is a wall-clock-based state machine with no internal thread.
//! Elapsed time is derived from `started_at` and an instant supplied by the
//! caller, so each command samples "now" exactly once.
//!
//! ## State Transitions
//!
//! ```text
//! Absent -> Running -> Paused -> (Running | Absent)
//! ```
//!
//! `Absent` is the lack of a [`HabitTimer`] (no row in storage). Stopping a
//! timer turns its total into a completion value; that part lives in the
//! service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::LocalDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Running,
    Paused,
}

/// One habit's active timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitTimer {
    pub habit_id: String,
    /// The date elapsed time is credited to.
    pub date: LocalDate,
    /// When the current running span began. Only meaningful while running.
    pub started_at: DateTime<Utc>,
    pub accumulated_seconds: i64,
    pub is_running: bool,
}

impl HabitTimer {
    /// Start a fresh timer, continuing from time already saved for `date`.
    pub fn start(
        habit_id: impl Into<String>,
        date: LocalDate,
        saved_seconds: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            habit_id: habit_id.into(),
            date,
            started_at: now,
            accumulated_seconds: saved_seconds.max(0),
            is_running: true,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.is_running {
            TimerState::Running
        } else {
            TimerState::Paused
        }
    }

    /// Whole seconds in the current running span. Zero while paused, and
    /// never negative if the clock went backwards.
    pub fn running_seconds(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_running {
            return 0;
        }
        (now - self.started_at).num_seconds().max(0)
    }

    /// Accumulated plus running time.
    pub fn total_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.accumulated_seconds
            .saturating_add(self.running_seconds(now))
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            habit_id: self.habit_id.clone(),
            date: self.date,
            state: self.state(),
            accumulated_seconds: self.accumulated_seconds,
            elapsed_seconds: self.total_seconds(now),
            started_at: self.is_running.then_some(self.started_at),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start again on an existing timer, possibly for a different date.
    ///
    /// Accumulated time is kept. Restarting a running timer flushes the
    /// current span first so no elapsed time is lost.
    pub fn restart(&mut self, date: LocalDate, now: DateTime<Utc>) {
        self.flush_elapsed(now);
        self.date = date;
        self.started_at = now;
        self.is_running = true;
    }

    /// Fold the running span into `accumulated_seconds` and stop running.
    ///
    /// Returns `false` when the timer was already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running {
            return false;
        }
        self.flush_elapsed(now);
        self.is_running = false;
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        let elapsed = self.running_seconds(now);
        self.accumulated_seconds = self.accumulated_seconds.saturating_add(elapsed);
        self.started_at = now;
    }
}

/// Timer status as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub habit_id: String,
    pub date: LocalDate,
    pub state: TimerState,
    pub accumulated_seconds: i64,
    /// Accumulated plus the live running span.
    pub elapsed_seconds: i64,
    pub started_at: Option<DateTime<Utc>>,
}
