//! Completion ledger semantics.
//!
//! One [`Completion`] per (habit, date). Toggle and increment are applied
//! by [`crate::storage::HabitDb`] as single atomic upserts: toggling sets
//! `value` to 1/0 with the flag, increments clamp at zero after every delta
//! and compare against the count target.

use serde::{Deserialize, Serialize};

use crate::calendar::LocalDate;
use crate::habit::Habit;
use crate::streak::CompletionMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub habit_id: String,
    pub date: LocalDate,
    /// 1/0 for boolean, running count for count, seconds for time habits.
    pub value: i64,
    pub completed: bool,
}

/// Whether `seconds` of tracked time completes a time habit.
///
/// Without a target any recorded time counts.
pub fn time_completed(habit: &Habit, seconds: i64) -> bool {
    match habit.time_target_seconds() {
        Some(target) => seconds >= target,
        None => seconds > 0,
    }
}

/// Date to completed flag for the streak calculator.
pub fn completion_map<'a>(completions: impl IntoIterator<Item = &'a Completion>) -> CompletionMap {
    completions
        .into_iter()
        .map(|c| (c.date, c.completed))
        .collect()
}
