//! Per-habit statistics.
//!
//! [`compute_stats`] is the one place a habit's reported numbers are
//! derived: the current streak (freeze aware), today's state and lifetime
//! totals. [`StatsCache`] memoizes results per account for the current day.

mod cache;

use serde::{Deserialize, Serialize};

use crate::calendar::{LocalDate, WorkCalendar};
use crate::habit::{Habit, HabitType};
use crate::ledger::{completion_map, Completion};
use crate::streak::current_streak;

pub use cache::StatsCache;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: String,
    pub current_streak: u32,
    pub completed_today: bool,
    pub total_completions: u64,
    /// Total tracked seconds. Time habits only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<i64>,
    /// Sum of all counts. Count habits only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

/// Stats for `habit` given all of its completions.
pub fn compute_stats(
    habit: &Habit,
    completions: &[Completion],
    calendar: &WorkCalendar,
    today: LocalDate,
) -> HabitStats {
    let map = completion_map(completions);
    let current_streak = current_streak(habit, &map, calendar, today);
    let completed_today = map.get(&today).copied().unwrap_or(false);
    let total_completions = completions.iter().filter(|c| c.completed).count() as u64;
    let value_sum = completions.iter().fold(0i64, |acc, c| acc.saturating_add(c.value));

    HabitStats {
        habit_id: habit.id.clone(),
        current_streak,
        completed_today,
        total_completions,
        total_time: (habit.habit_type == HabitType::Time).then_some(value_sum),
        total_count: (habit.habit_type == HabitType::Count).then_some(value_sum),
    }
}
