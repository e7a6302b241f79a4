//! Streak calculation over eligible days.
//!
//! A streak counts consecutive *eligible* days with a completion, walking
//! backward from the most recent one. Weekends, holidays and days off never
//! appear in the eligible list, so they neither extend nor break a streak.
//!
//! ## Pending today
//!
//! If the most recent eligible day is today and it is not completed yet, it
//! is skipped: today is still open, so the streak up to yesterday survives.

pub mod freeze;

use std::collections::HashMap;

use crate::calendar::LocalDate;

pub use freeze::{current_streak, freeze_streak, schedule_changed, FreezeOutcome};

/// Date to completed flag, as read from the completion ledger.
pub type CompletionMap = HashMap<LocalDate, bool>;

/// Length of the current streak.
///
/// `eligible_days` must be ascending. Dates before `baseline` never count.
pub fn calculate_streak(
    completions: &CompletionMap,
    eligible_days: &[LocalDate],
    baseline: LocalDate,
    today: LocalDate,
) -> u32 {
    let is_done = |d: &LocalDate| completions.get(d).copied().unwrap_or(false);

    let mut days = eligible_days.iter().rev().peekable();
    if days.next_if(|d| **d == today && !is_done(*d)).is_some() {
        tracing::trace!(%today, "today pending, skipped");
    }

    let mut streak = 0;
    for day in days {
        if *day < baseline || !is_done(day) {
            break;
        }
        streak += 1;
    }
    streak
}
