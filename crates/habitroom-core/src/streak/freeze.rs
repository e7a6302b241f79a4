//! Streak freeze across schedule changes.
//!
//! When a habit's effective weekly schedule changes, the streak accrued under
//! the old schedule is snapshotted into `frozen_streak` and a new baseline
//! (`streak_frozen_at`, always yesterday) is recorded. Later reads add the
//! streak computed under the new schedule since that baseline.
//!
//! The baseline date itself is excluded from every post-freeze eligible list:
//! its completion is already inside `frozen_streak`, so no date is ever
//! credited twice.

use serde::{Deserialize, Serialize};

use super::{calculate_streak, CompletionMap};
use crate::calendar::{LocalDate, WorkCalendar};
use crate::habit::{effective_schedule, Habit, ScheduledDays};

/// New freeze fields produced by a schedule change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeOutcome {
    /// Streak accrued under the old schedule since the old baseline.
    pub streak_so_far: u32,
    pub frozen_streak: u32,
    pub streak_frozen_at: LocalDate,
}

/// True when the two schedules apply to different weekday sets.
///
/// Order and `None` versus the explicit Monday..Friday set do not matter.
pub fn schedule_changed(old: Option<&ScheduledDays>, new: Option<&ScheduledDays>) -> bool {
    effective_schedule(old) != effective_schedule(new)
}

/// Snapshot the streak of `habit` (in its pre-change state) as of yesterday.
pub fn freeze_streak(
    habit: &Habit,
    completions: &CompletionMap,
    calendar: &WorkCalendar,
    today: LocalDate,
) -> FreezeOutcome {
    let yesterday = today.previous();
    let eligible = post_baseline_days(habit, calendar, yesterday);
    let streak_so_far =
        calculate_streak(completions, &eligible, habit.streak_baseline(), yesterday);

    FreezeOutcome {
        streak_so_far,
        frozen_streak: habit.frozen_streak.saturating_add(streak_so_far),
        streak_frozen_at: yesterday,
    }
}

/// Reported streak: frozen value plus the streak since the frozen baseline.
pub fn current_streak(
    habit: &Habit,
    completions: &CompletionMap,
    calendar: &WorkCalendar,
    today: LocalDate,
) -> u32 {
    let eligible = post_baseline_days(habit, calendar, today);
    let since_base = calculate_streak(completions, &eligible, habit.streak_baseline(), today);
    habit.frozen_streak.saturating_add(since_base)
}

/// Eligible days from the habit's baseline through `end` under its current
/// schedule, minus the frozen baseline date.
fn post_baseline_days(habit: &Habit, calendar: &WorkCalendar, end: LocalDate) -> Vec<LocalDate> {
    let mut days = calendar.eligible_days(habit.streak_baseline(), end, habit.schedule());
    if let Some(frozen_at) = habit.streak_frozen_at {
        days.retain(|d| *d != frozen_at);
    }
    days
}
