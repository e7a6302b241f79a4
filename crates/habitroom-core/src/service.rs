//! Habit service: the operations exposed to callers.
//!
//! [`HabitService`] owns the store, the clock and the stats cache. Every
//! operation is scoped to an owner account; habits of other accounts read as
//! [`CoreError::NotFound`]. Input is validated before anything is written,
//! and every successful write invalidates the owner's cached stats.

use std::collections::HashMap;

use uuid::Uuid;

use crate::calendar::{LocalDate, WorkCalendar};
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result, ValidationError};
use crate::habit::{Habit, HabitPatch, HabitType, NewHabit, ValidatedPatch};
use crate::ledger::{completion_map, time_completed, Completion};
use crate::stats::{compute_stats, HabitStats, StatsCache};
use crate::storage::{DayOff, HabitDb, Holiday};
use crate::streak::{freeze_streak, schedule_changed};
use crate::timer::{HabitTimer, TimerSnapshot};

pub struct HabitService<C = SystemClock> {
    db: HabitDb,
    clock: C,
    cache: Option<StatsCache>,
}

impl HabitService<SystemClock> {
    /// Service on the system clock with stats caching enabled.
    pub fn open(db: HabitDb) -> Self {
        Self::new(db, SystemClock)
    }
}

impl<C: Clock> HabitService<C> {
    pub fn new(db: HabitDb, clock: C) -> Self {
        Self {
            db,
            clock,
            cache: Some(StatsCache::new()),
        }
    }

    /// Enable or disable the per-day stats cache.
    pub fn with_stats_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(StatsCache::new);
        self
    }

    pub fn db(&self) -> &HabitDb {
        &self.db
    }

    pub fn today(&self) -> LocalDate {
        self.clock.today()
    }

    // === Habits ===

    pub fn create_habit(&mut self, owner: &str, new: NewHabit) -> Result<Habit> {
        let (name, scheduled_days) = new.validate()?;
        let sort_order = match new.sort_order {
            Some(order) => order,
            None => self.db.next_sort_order(owner)?,
        };

        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            name,
            habit_type: new.habit_type,
            target_value: new.target_value,
            sort_order,
            created_at: self.clock.today(),
            paused_at: None,
            archived_at: None,
            scheduled_days,
            frozen_streak: 0,
            streak_frozen_at: None,
        };
        self.db.insert_habit(&habit)?;
        tracing::info!(habit_id = %habit.id, owner, habit_type = %habit.habit_type, "habit created");
        self.invalidate(owner);
        Ok(habit)
    }

    pub fn get_habit(&self, owner: &str, id: &str) -> Result<Habit> {
        self.db
            .get_habit(owner, id)?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    pub fn list_habits(&self, owner: &str, include_archived: bool) -> Result<Vec<Habit>> {
        Ok(self.db.list_habits(owner, include_archived)?)
    }

    /// Apply a partial update.
    ///
    /// A change to the effective weekly schedule freezes the streak accrued
    /// so far. A new target on a count habit re-derives every completion
    /// flag. Both land in the same transaction as the habit row.
    pub fn update_habit(&mut self, owner: &str, id: &str, patch: HabitPatch) -> Result<Habit> {
        let patch = ValidatedPatch::try_from(patch)?;
        let old = self.get_habit(owner, id)?;
        let mut updated = patch.apply_to(&old);

        if schedule_changed(old.scheduled_days.as_ref(), updated.scheduled_days.as_ref()) {
            let completions = self.db.completions_for(&old.id)?;
            let calendar = self.db.work_calendar(owner)?;
            let outcome = freeze_streak(
                &old,
                &completion_map(&completions),
                &calendar,
                self.clock.today(),
            );
            updated.frozen_streak = outcome.frozen_streak;
            updated.streak_frozen_at = Some(outcome.streak_frozen_at);
            tracing::info!(
                habit_id = %old.id,
                streak_so_far = outcome.streak_so_far,
                frozen_streak = outcome.frozen_streak,
                frozen_at = %outcome.streak_frozen_at,
                "schedule changed, streak frozen"
            );
        }

        let recompute_target = retarget(&old, &updated);
        let recomputed = self.db.save_habit_with_recompute(&updated, recompute_target)?;
        if let Some(target) = recompute_target {
            tracing::info!(habit_id = %old.id, target, rows = recomputed, "count target changed, completions recomputed");
        }

        if old.habit_type == HabitType::Time
            && updated.habit_type != HabitType::Time
            && self.db.delete_timer(&old.id)?
        {
            tracing::info!(habit_id = %old.id, habit_type = updated.habit_type.as_str(), "habit left time type, timer discarded");
        }

        self.invalidate(owner);
        Ok(updated)
    }

    pub fn pause_habit(&mut self, owner: &str, id: &str) -> Result<Habit> {
        let now = self.clock.now();
        self.modify(owner, id, |habit| {
            habit.paused_at.get_or_insert(now);
        })
    }

    pub fn unpause_habit(&mut self, owner: &str, id: &str) -> Result<Habit> {
        self.modify(owner, id, |habit| habit.paused_at = None)
    }

    pub fn archive_habit(&mut self, owner: &str, id: &str) -> Result<Habit> {
        let now = self.clock.now();
        self.modify(owner, id, |habit| {
            habit.archived_at.get_or_insert(now);
        })
    }

    pub fn unarchive_habit(&mut self, owner: &str, id: &str) -> Result<Habit> {
        self.modify(owner, id, |habit| habit.archived_at = None)
    }

    /// Hard delete. Completions and any active timer go with the habit.
    pub fn delete_habit(&mut self, owner: &str, id: &str) -> Result<()> {
        if !self.db.delete_habit(owner, id)? {
            return Err(CoreError::NotFound(id.to_string()));
        }
        tracing::info!(habit_id = id, owner, "habit deleted");
        self.invalidate(owner);
        Ok(())
    }

    // === Completion ledger ===

    pub fn toggle_completion(&mut self, owner: &str, id: &str, date: LocalDate) -> Result<Completion> {
        let habit = self.habit_of_type(owner, id, HabitType::Boolean, "toggle")?;
        let completion = self.db.toggle_completion(&habit.id, date)?;
        self.invalidate(owner);
        Ok(completion)
    }

    /// Add `delta` (possibly negative) to a count habit's value for `date`.
    pub fn increment_count(
        &mut self,
        owner: &str,
        id: &str,
        date: LocalDate,
        delta: i64,
    ) -> Result<Completion> {
        let habit = self.habit_of_type(owner, id, HabitType::Count, "increment")?;
        let completion =
            self.db
                .increment_completion(&habit.id, date, delta, habit.count_target())?;
        self.invalidate(owner);
        Ok(completion)
    }

    /// Record `seconds` of tracked time for `date`, replacing what was there.
    pub fn set_time_value(
        &mut self,
        owner: &str,
        id: &str,
        date: LocalDate,
        seconds: i64,
    ) -> Result<Completion> {
        let habit = self.habit_of_type(owner, id, HabitType::Time, "set_time_value")?;
        non_negative("seconds", seconds)?;
        let completed = time_completed(&habit, seconds);
        let completion = self.db.upsert_completion(&habit.id, date, seconds, completed)?;
        self.invalidate(owner);
        Ok(completion)
    }

    /// Direct assignment of value and flag, for any habit type.
    pub fn set_completion(
        &mut self,
        owner: &str,
        id: &str,
        date: LocalDate,
        value: i64,
        completed: bool,
    ) -> Result<Completion> {
        non_negative("value", value)?;
        let habit = self.get_habit(owner, id)?;
        let completion = self.db.upsert_completion(&habit.id, date, value, completed)?;
        self.invalidate(owner);
        Ok(completion)
    }

    // === Timer ===

    /// Start (or resume) the habit's timer, crediting time to `date`.
    ///
    /// A fresh timer continues from whatever time is already saved for
    /// `date`. An existing one keeps its accumulated seconds.
    pub fn start_timer(&mut self, owner: &str, id: &str, date: LocalDate) -> Result<TimerSnapshot> {
        let habit = self.habit_of_type(owner, id, HabitType::Time, "start_timer")?;
        let now = self.clock.now();

        let timer = match self.db.get_timer(&habit.id)? {
            Some(mut timer) => {
                timer.restart(date, now);
                timer
            }
            None => {
                let saved = self.db.completion(&habit.id, date)?.map_or(0, |c| c.value);
                HabitTimer::start(&habit.id, date, saved, now)
            }
        };
        self.db.save_timer(&timer)?;
        tracing::debug!(habit_id = %habit.id, %date, accumulated = timer.accumulated_seconds, "timer started");
        Ok(timer.snapshot(now))
    }

    /// Pause a running timer. Pausing a paused timer changes nothing.
    pub fn pause_timer(&mut self, owner: &str, id: &str) -> Result<TimerSnapshot> {
        let habit = self.habit_of_type(owner, id, HabitType::Time, "pause_timer")?;
        let now = self.clock.now();
        let mut timer = self.active_timer(&habit.id)?;
        if timer.pause(now) {
            self.db.save_timer(&timer)?;
        }
        Ok(timer.snapshot(now))
    }

    /// Stop the timer and write its total into the ledger for the timer's date.
    pub fn stop_timer(&mut self, owner: &str, id: &str) -> Result<Completion> {
        let habit = self.habit_of_type(owner, id, HabitType::Time, "stop_timer")?;
        let now = self.clock.now();
        let timer = self.active_timer(&habit.id)?;

        let total = timer.total_seconds(now);
        let completed = time_completed(&habit, total);
        let completion = self.db.finish_timer(&timer, total, completed)?;
        tracing::info!(habit_id = %habit.id, date = %timer.date, total, completed, "timer stopped");
        self.invalidate(owner);
        Ok(completion)
    }

    /// Discard the timer without writing anything. Works whatever the
    /// habit's current type.
    pub fn reset_timer(&mut self, owner: &str, id: &str) -> Result<()> {
        let habit = self.get_habit(owner, id)?;
        if !self.db.delete_timer(&habit.id)? {
            return Err(CoreError::NoActiveTimer { habit_id: habit.id });
        }
        Ok(())
    }

    /// Live timer state, or `None` when the habit has no timer.
    pub fn timer_status(&self, owner: &str, id: &str) -> Result<Option<TimerSnapshot>> {
        let habit = self.get_habit(owner, id)?;
        let now = self.clock.now();
        Ok(self.db.get_timer(&habit.id)?.map(|t| t.snapshot(now)))
    }

    // === Stats ===

    pub fn get_habit_stats(&self, owner: &str, id: &str) -> Result<HabitStats> {
        let habit = self.get_habit(owner, id)?;
        let calendar = self.db.work_calendar(owner)?;
        self.stats_for(&habit, &calendar, self.clock.today())
    }

    /// Stats keyed by habit id. Unknown and foreign ids are left out.
    pub fn batch_get_stats(&self, owner: &str, ids: &[String]) -> Result<HashMap<String, HabitStats>> {
        let calendar = self.db.work_calendar(owner)?;
        let today = self.clock.today();
        let mut stats = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(habit) = self.db.get_habit(owner, id)? {
                stats.insert(habit.id.clone(), self.stats_for(&habit, &calendar, today)?);
            }
        }
        Ok(stats)
    }

    /// Stats for every active habit of `owner`, served from the cache when
    /// it holds today's entry.
    pub fn list_stats(&mut self, owner: &str) -> Result<HashMap<String, HabitStats>> {
        let today = self.clock.today();
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(today, owner)) {
            tracing::debug!(owner, %today, habits = hit.len(), "stats cache hit");
            return Ok(hit);
        }

        let calendar = self.db.work_calendar(owner)?;
        let mut stats = HashMap::new();
        for habit in self.db.list_habits(owner, false)? {
            stats.insert(habit.id.clone(), self.stats_for(&habit, &calendar, today)?);
        }

        if let Some(cache) = self.cache.as_ref() {
            cache.put(today, owner, stats.clone());
        }
        Ok(stats)
    }

    // === Calendar data ===

    pub fn add_day_off(&mut self, owner: &str, day_off: DayOff) -> Result<()> {
        self.db.add_day_off(owner, &day_off)?;
        self.invalidate(owner);
        Ok(())
    }

    /// Returns whether a day off existed on `date`.
    pub fn remove_day_off(&mut self, owner: &str, date: LocalDate) -> Result<bool> {
        let removed = self.db.remove_day_off(owner, date)?;
        if removed {
            self.invalidate(owner);
        }
        Ok(removed)
    }

    pub fn list_day_offs(&self, owner: &str) -> Result<Vec<DayOff>> {
        Ok(self.db.list_day_offs(owner)?)
    }

    /// Replace the global holiday table. Returns the number stored.
    pub fn import_holidays(&mut self, holidays: &[Holiday]) -> Result<usize> {
        let count = self.db.replace_holidays(holidays)?;
        tracing::info!(count, "holidays imported");
        if let Some(cache) = self.cache.as_ref() {
            cache.clear();
        }
        Ok(count)
    }

    pub fn list_holidays(&self) -> Result<Vec<Holiday>> {
        Ok(self.db.list_holidays()?)
    }

    // === Internal ===

    fn habit_of_type(
        &self,
        owner: &str,
        id: &str,
        expected: HabitType,
        operation: &'static str,
    ) -> Result<Habit> {
        let habit = self.get_habit(owner, id)?;
        if habit.habit_type != expected {
            return Err(ValidationError::WrongHabitType {
                operation,
                expected: expected.as_str(),
                actual: habit.habit_type.as_str(),
            }
            .into());
        }
        Ok(habit)
    }

    fn active_timer(&self, habit_id: &str) -> Result<HabitTimer> {
        self.db
            .get_timer(habit_id)?
            .ok_or_else(|| CoreError::NoActiveTimer {
                habit_id: habit_id.to_string(),
            })
    }

    fn modify(&mut self, owner: &str, id: &str, change: impl FnOnce(&mut Habit)) -> Result<Habit> {
        let mut habit = self.get_habit(owner, id)?;
        change(&mut habit);
        self.db.save_habit(&habit)?;
        self.invalidate(owner);
        Ok(habit)
    }

    fn stats_for(&self, habit: &Habit, calendar: &WorkCalendar, today: LocalDate) -> Result<HabitStats> {
        let completions = self.db.completions_for(&habit.id)?;
        Ok(compute_stats(habit, &completions, calendar, today))
    }

    fn invalidate(&mut self, owner: &str) {
        if let Some(cache) = self.cache.as_ref() {
            cache.invalidate(owner);
        }
    }
}

/// Target to recompute completion flags against, if the update changes the
/// effective target of a habit that is and stays a count habit. Clearing the
/// target counts as a move to the default.
fn retarget(old: &Habit, updated: &Habit) -> Option<i64> {
    let stays_count = old.habit_type == HabitType::Count && updated.habit_type == HabitType::Count;
    (stays_count && old.count_target() != updated.count_target()).then(|| updated.count_target())
}

fn non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::invalid(field, format!("must not be negative, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;

    fn d(s: &str) -> LocalDate {
        LocalDate::parse(s).unwrap()
    }

    /// Service whose clock starts at noon on Monday 2024-06-03.
    fn service() -> (HabitService<Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_date(d("2024-06-03")));
        let db = HabitDb::open_memory().unwrap();
        (HabitService::new(db, Arc::clone(&clock)), clock)
    }

    fn boolean(svc: &mut HabitService<Arc<ManualClock>>) -> Habit {
        svc.create_habit("me", NewHabit::new("Stretch", HabitType::Boolean)).unwrap()
    }

    #[test]
    fn create_assigns_id_date_and_order() {
        let (mut svc, _clock) = service();
        let a = boolean(&mut svc);
        let b = svc.create_habit("me", NewHabit::new("Read", HabitType::Count)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, d("2024-06-03"));
        assert_eq!((a.sort_order, b.sort_order), (0, 1));
    }

    #[test]
    fn invalid_input_is_rejected_before_writing() {
        let (mut svc, _clock) = service();
        let bad = NewHabit::new("Walk", HabitType::Boolean).with_schedule(vec![]);
        assert!(matches!(svc.create_habit("me", bad), Err(CoreError::Validation(_))));
        assert!(svc.list_habits("me", true).unwrap().is_empty());

        let habit = boolean(&mut svc);
        let patch = HabitPatch {
            name: Some("renamed".into()),
            scheduled_days: Some(Some(vec![1, 6])),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_habit("me", &habit.id, patch),
            Err(CoreError::Validation(ValidationError::DayOutOfRange(6)))
        ));
        assert_eq!(svc.get_habit("me", &habit.id).unwrap().name, "Stretch");
    }

    #[test]
    fn foreign_owner_reads_not_found() {
        let (mut svc, _clock) = service();
        let habit = boolean(&mut svc);
        let today = svc.today();
        assert!(matches!(svc.get_habit("you", &habit.id), Err(CoreError::NotFound(_))));
        assert!(matches!(
            svc.toggle_completion("you", &habit.id, today),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(svc.delete_habit("you", &habit.id), Err(CoreError::NotFound(_))));
        assert!(svc.batch_get_stats("you", &[habit.id.clone()]).unwrap().is_empty());
    }

    #[test]
    fn wrong_habit_type_is_a_validation_error() {
        let (mut svc, _clock) = service();
        let habit = boolean(&mut svc);
        let today = svc.today();
        let err = svc.increment_count("me", &habit.id, today, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::WrongHabitType { expected: "count", .. })
        ));
        assert!(svc.db().completion(&habit.id, today).unwrap().is_none());
    }

    #[test]
    fn increments_clamp_per_delta() {
        let (mut svc, _clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Pushups", HabitType::Count).with_target(2))
            .unwrap();
        let today = svc.today();
        let values: Vec<i64> = [1, 1, -3, 2]
            .into_iter()
            .map(|delta| svc.increment_count("me", &habit.id, today, delta).unwrap().value)
            .collect();
        assert_eq!(values, vec![1, 2, 0, 2]);
    }

    #[test]
    fn retarget_recomputes_completion_flags() {
        let (mut svc, _clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Glasses", HabitType::Count).with_target(3))
            .unwrap();
        let dates = [d("2024-06-03"), d("2024-06-04"), d("2024-06-05")];
        for (date, value) in dates.into_iter().zip([2, 5, 1]) {
            svc.increment_count("me", &habit.id, date, value).unwrap();
        }
        let flags = |svc: &HabitService<Arc<ManualClock>>| -> Vec<bool> {
            svc.db().completions_for(&habit.id).unwrap().iter().map(|c| c.completed).collect()
        };
        assert_eq!(flags(&svc), vec![false, true, false]);

        let patch = HabitPatch {
            target_value: Some(Some(2)),
            ..Default::default()
        };
        svc.update_habit("me", &habit.id, patch).unwrap();
        assert_eq!(flags(&svc), vec![true, true, false]);
    }

    fn stored_flags(svc: &HabitService<Arc<ManualClock>>, id: &str) -> Vec<bool> {
        svc.db().completions_for(id).unwrap().iter().map(|c| c.completed).collect()
    }

    fn retarget_to(target: Option<i64>) -> HabitPatch {
        HabitPatch {
            target_value: Some(target),
            ..Default::default()
        }
    }

    #[test]
    fn clearing_count_target_recomputes_against_default() {
        let (mut svc, _clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Glasses", HabitType::Count).with_target(3))
            .unwrap();
        let today = svc.today();
        assert!(!svc.increment_count("me", &habit.id, today, 2).unwrap().completed);

        svc.update_habit("me", &habit.id, retarget_to(None)).unwrap();
        let stored = svc.db().completion(&habit.id, today).unwrap().unwrap();
        assert_eq!((stored.value, stored.completed), (2, true));
    }

    #[test]
    fn retarget_leaves_time_and_boolean_flags_alone() {
        let (mut svc, _clock) = service();
        let today = svc.today();
        for habit_type in [HabitType::Time, HabitType::Boolean] {
            let habit = svc
                .create_habit("me", NewHabit::new("x", habit_type).with_target(5))
                .unwrap();
            svc.set_completion("me", &habit.id, today, 1, true).unwrap();

            svc.update_habit("me", &habit.id, retarget_to(Some(50))).unwrap();
            assert_eq!(stored_flags(&svc, &habit.id), vec![true], "{habit_type:?}");
        }
    }

    #[test]
    fn same_target_again_does_not_recompute() {
        let (mut svc, _clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Glasses", HabitType::Count).with_target(3))
            .unwrap();
        let today = svc.today();
        svc.set_completion("me", &habit.id, today, 5, false).unwrap();

        svc.update_habit("me", &habit.id, retarget_to(Some(3))).unwrap();
        assert_eq!(stored_flags(&svc, &habit.id), vec![false]);
    }

    #[test]
    fn type_change_with_new_target_does_not_recompute() {
        let (mut svc, _clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Glasses", HabitType::Count).with_target(3))
            .unwrap();
        let today = svc.today();
        svc.increment_count("me", &habit.id, today, 2).unwrap();

        let patch = HabitPatch {
            habit_type: Some(HabitType::Boolean),
            target_value: Some(Some(1)),
            ..Default::default()
        };
        svc.update_habit("me", &habit.id, patch).unwrap();
        assert_eq!(stored_flags(&svc, &habit.id), vec![false]);
    }

    #[test]
    fn timer_round_trip_writes_elapsed_seconds() {
        let (mut svc, clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Piano", HabitType::Time).with_target(1))
            .unwrap();
        let today = svc.today();

        svc.start_timer("me", &habit.id, today).unwrap();
        clock.advance_secs(90);
        let completion = svc.stop_timer("me", &habit.id).unwrap();

        assert_eq!(completion.value, 90);
        assert!(completion.completed);
        assert!(svc.timer_status("me", &habit.id).unwrap().is_none());
    }

    #[test]
    fn pause_and_resume_accumulate() {
        let (mut svc, clock) = service();
        let habit = svc.create_habit("me", NewHabit::new("Piano", HabitType::Time)).unwrap();
        let today = svc.today();

        svc.start_timer("me", &habit.id, today).unwrap();
        clock.advance_secs(5);
        svc.pause_timer("me", &habit.id).unwrap();
        clock.advance_secs(100);
        svc.start_timer("me", &habit.id, today).unwrap();
        clock.advance_secs(3);
        let snapshot = svc.pause_timer("me", &habit.id).unwrap();
        assert_eq!(snapshot.accumulated_seconds, 8);

        clock.advance_secs(50);
        let again = svc.pause_timer("me", &habit.id).unwrap();
        assert_eq!(again.accumulated_seconds, 8);
    }

    #[test]
    fn fresh_timer_continues_from_saved_value() {
        let (mut svc, clock) = service();
        let habit = svc
            .create_habit("me", NewHabit::new("Piano", HabitType::Time).with_target(1))
            .unwrap();
        let today = svc.today();
        let saved = svc.set_time_value("me", &habit.id, today, 30).unwrap();
        assert!(!saved.completed);

        svc.start_timer("me", &habit.id, today).unwrap();
        clock.advance_secs(40);
        let completion = svc.stop_timer("me", &habit.id).unwrap();
        assert_eq!(completion.value, 70);
        assert!(completion.completed);
    }

    #[test]
    fn timer_commands_without_timer_report_no_active_timer() {
        let (mut svc, _clock) = service();
        let habit = svc.create_habit("me", NewHabit::new("Piano", HabitType::Time)).unwrap();
        for result in [
            svc.pause_timer("me", &habit.id).map(|_| ()),
            svc.stop_timer("me", &habit.id).map(|_| ()),
            svc.reset_timer("me", &habit.id),
        ] {
            assert!(matches!(result, Err(CoreError::NoActiveTimer { .. })));
        }
    }

    #[test]
    fn reset_discards_without_writing() {
        let (mut svc, clock) = service();
        let habit = svc.create_habit("me", NewHabit::new("Piano", HabitType::Time)).unwrap();
        let today = svc.today();
        svc.start_timer("me", &habit.id, today).unwrap();
        clock.advance_secs(60);
        svc.reset_timer("me", &habit.id).unwrap();
        assert!(svc.db().completion(&habit.id, today).unwrap().is_none());
        assert!(svc.timer_status("me", &habit.id).unwrap().is_none());
    }

    #[test]
    fn retyping_away_from_time_discards_timer() {
        let (mut svc, clock) = service();
        let habit = svc.create_habit("me", NewHabit::new("Piano", HabitType::Time)).unwrap();
        let today = svc.today();
        svc.start_timer("me", &habit.id, today).unwrap();
        clock.advance_secs(60);

        let patch = HabitPatch {
            habit_type: Some(HabitType::Count),
            ..Default::default()
        };
        svc.update_habit("me", &habit.id, patch).unwrap();
        assert!(svc.timer_status("me", &habit.id).unwrap().is_none());
        assert!(svc.db().completion(&habit.id, today).unwrap().is_none());
        assert!(matches!(
            svc.reset_timer("me", &habit.id),
            Err(CoreError::NoActiveTimer { .. })
        ));
    }

    #[test]
    fn reset_ignores_habit_type() {
        let (mut svc, _clock) = service();
        let habit = boolean(&mut svc);
        let today = svc.today();
        svc.db().save_timer(&HabitTimer::start(&habit.id, today, 0, svc.clock.now())).unwrap();

        svc.reset_timer("me", &habit.id).unwrap();
        assert!(svc.timer_status("me", &habit.id).unwrap().is_none());
    }

    #[test]
    fn huge_time_totals_saturate() {
        let (mut svc, _clock) = service();
        let habit = svc.create_habit("me", NewHabit::new("Piano", HabitType::Time)).unwrap();
        svc.set_time_value("me", &habit.id, d("2024-06-02"), i64::MAX).unwrap();
        svc.set_time_value("me", &habit.id, d("2024-06-03"), 1).unwrap();

        let stats = svc.get_habit_stats("me", &habit.id).unwrap();
        assert_eq!(stats.total_time, Some(i64::MAX));
    }

    #[test]
    fn schedule_change_freezes_streak_as_of_yesterday() {
        let (mut svc, clock) = service();
        let habit = boolean(&mut svc);
        for day in ["2024-06-03", "2024-06-04", "2024-06-05", "2024-06-06"] {
            svc.toggle_completion("me", &habit.id, d(day)).unwrap();
        }
        clock.advance_days(4);
        assert_eq!(svc.today(), d("2024-06-07"));

        let patch = HabitPatch {
            scheduled_days: Some(Some(vec![1, 3, 5])),
            ..Default::default()
        };
        let updated = svc.update_habit("me", &habit.id, patch).unwrap();
        assert_eq!(updated.frozen_streak, 4);
        assert_eq!(updated.streak_frozen_at, Some(d("2024-06-06")));
        assert_eq!(svc.get_habit_stats("me", &habit.id).unwrap().current_streak, 4);

        svc.toggle_completion("me", &habit.id, d("2024-06-07")).unwrap();
        assert_eq!(svc.get_habit_stats("me", &habit.id).unwrap().current_streak, 5);
    }

    #[test]
    fn reordered_schedule_does_not_freeze() {
        let (mut svc, _clock) = service();
        let habit = boolean(&mut svc);
        let patch = HabitPatch {
            scheduled_days: Some(Some(vec![5, 4, 3, 2, 1])),
            ..Default::default()
        };
        let updated = svc.update_habit("me", &habit.id, patch).unwrap();
        assert_eq!(updated.streak_frozen_at, None);
        assert_eq!(updated.frozen_streak, 0);
    }

    #[test]
    fn archive_hides_and_delete_cascades() {
        let (mut svc, _clock) = service();
        let habit = boolean(&mut svc);
        let today = svc.today();
        svc.toggle_completion("me", &habit.id, today).unwrap();

        svc.archive_habit("me", &habit.id).unwrap();
        assert!(svc.list_habits("me", false).unwrap().is_empty());
        assert_eq!(svc.list_habits("me", true).unwrap().len(), 1);
        assert!(svc.unarchive_habit("me", &habit.id).unwrap().archived_at.is_none());

        svc.delete_habit("me", &habit.id).unwrap();
        assert!(svc.db().completions_for(&habit.id).unwrap().is_empty());
        assert!(matches!(svc.get_habit("me", &habit.id), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn pause_is_stored_and_idempotent() {
        let (mut svc, clock) = service();
        let habit = boolean(&mut svc);
        let first = svc.pause_habit("me", &habit.id).unwrap().paused_at;
        clock.advance_secs(10);
        assert_eq!(svc.pause_habit("me", &habit.id).unwrap().paused_at, first);
        assert!(svc.unpause_habit("me", &habit.id).unwrap().paused_at.is_none());
    }

    #[test]
    fn list_stats_cache_follows_writes_and_days() {
        let (mut svc, clock) = service();
        let habit = boolean(&mut svc);

        assert!(!svc.list_stats("me").unwrap()[&habit.id].completed_today);
        svc.toggle_completion("me", &habit.id, d("2024-06-03")).unwrap();
        let stats = svc.list_stats("me").unwrap();
        assert!(stats[&habit.id].completed_today);
        assert_eq!(stats[&habit.id].current_streak, 1);

        clock.advance_days(1);
        let next_day = svc.list_stats("me").unwrap();
        assert!(!next_day[&habit.id].completed_today);
        assert_eq!(next_day[&habit.id].current_streak, 1);
    }

    #[test]
    fn day_off_keeps_streak_alive() {
        let (mut svc, clock) = service();
        let habit = boolean(&mut svc);
        svc.toggle_completion("me", &habit.id, d("2024-06-03")).unwrap();
        svc.add_day_off("me", DayOff { date: d("2024-06-04"), reason: "dentist".into() })
            .unwrap();
        svc.toggle_completion("me", &habit.id, d("2024-06-05")).unwrap();
        clock.advance_days(2);

        assert_eq!(svc.get_habit_stats("me", &habit.id).unwrap().current_streak, 2);
        assert!(svc.remove_day_off("me", d("2024-06-04")).unwrap());
        assert_eq!(svc.get_habit_stats("me", &habit.id).unwrap().current_streak, 1);
    }
}
