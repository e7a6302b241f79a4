//! Habit model.
//!
//! A habit belongs to one account, has one of three completion semantics
//! ([`HabitType`]) and an optional custom weekly schedule. The streak freeze
//! fields (`frozen_streak`, `streak_frozen_at`) are maintained by
//! [`crate::streak::freeze`] and never edited directly.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{LocalDate, DEFAULT_SCHEDULED_DAYS};
use crate::error::ValidationError;

/// How completions of a habit are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    /// Done / not done.
    Boolean,
    /// Running count against a target number of units.
    Count,
    /// Accumulated seconds against a target number of minutes.
    Time,
}

impl HabitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Boolean => "boolean",
            HabitType::Count => "count",
            HabitType::Time => "time",
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(HabitType::Boolean),
            "count" => Ok(HabitType::Count),
            "time" => Ok(HabitType::Time),
            other => Err(ValidationError::invalid(
                "type",
                format!("unknown habit type '{other}' (expected boolean, count or time)"),
            )),
        }
    }
}

/// A validated custom weekly schedule: a non-empty subset of `1..=5`.
///
/// Stored sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ScheduledDays(Vec<u32>);

impl ScheduledDays {
    pub fn new(days: Vec<u32>) -> Result<Self, ValidationError> {
        if days.is_empty() {
            return Err(ValidationError::EmptySchedule);
        }
        if let Some(bad) = days.iter().find(|d| !(1..=5).contains(*d)) {
            return Err(ValidationError::DayOutOfRange(*bad));
        }
        let normalized: BTreeSet<u32> = days.into_iter().collect();
        Ok(Self(normalized.into_iter().collect()))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl TryFrom<Vec<u32>> for ScheduledDays {
    type Error = ValidationError;

    fn try_from(days: Vec<u32>) -> Result<Self, Self::Error> {
        ScheduledDays::new(days)
    }
}

impl From<ScheduledDays> for Vec<u32> {
    fn from(days: ScheduledDays) -> Self {
        days.0
    }
}

/// The set of weekdays a schedule actually applies to, with `None`
/// normalized to Monday..Friday.
pub fn effective_schedule(days: Option<&ScheduledDays>) -> BTreeSet<u32> {
    match days {
        Some(d) => d.as_slice().iter().copied().collect(),
        None => DEFAULT_SCHEDULED_DAYS.iter().copied().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub habit_type: HabitType,
    /// Count units for count habits, minutes for time habits.
    pub target_value: Option<i64>,
    pub sort_order: i64,
    pub created_at: LocalDate,
    pub paused_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub scheduled_days: Option<ScheduledDays>,
    pub frozen_streak: u32,
    pub streak_frozen_at: Option<LocalDate>,
}

impl Habit {
    /// Earliest date a streak read may count from.
    pub fn streak_baseline(&self) -> LocalDate {
        self.streak_frozen_at.unwrap_or(self.created_at)
    }

    pub fn schedule(&self) -> Option<&[u32]> {
        self.scheduled_days.as_ref().map(ScheduledDays::as_slice)
    }

    pub fn effective_schedule(&self) -> BTreeSet<u32> {
        effective_schedule(self.scheduled_days.as_ref())
    }

    /// Units needed for a count completion. Defaults to 1.
    pub fn count_target(&self) -> i64 {
        self.target_value.unwrap_or(1)
    }

    /// Seconds needed for a time completion, if a target is set.
    pub fn time_target_seconds(&self) -> Option<i64> {
        self.target_value.map(|minutes| minutes.saturating_mul(60))
    }
}

/// Input for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    pub habit_type: HabitType,
    #[serde(default)]
    pub target_value: Option<i64>,
    #[serde(default)]
    pub scheduled_days: Option<Vec<u32>>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl NewHabit {
    pub fn new(name: impl Into<String>, habit_type: HabitType) -> Self {
        Self {
            name: name.into(),
            habit_type,
            target_value: None,
            scheduled_days: None,
            sort_order: None,
        }
    }

    pub fn with_target(mut self, target: i64) -> Self {
        self.target_value = Some(target);
        self
    }

    pub fn with_schedule(mut self, days: Vec<u32>) -> Self {
        self.scheduled_days = Some(days);
        self
    }

    /// Validated name and schedule.
    pub fn validate(&self) -> Result<(String, Option<ScheduledDays>), ValidationError> {
        let name = validate_name(&self.name)?;
        if let Some(target) = self.target_value {
            validate_target(target)?;
        }
        let days = self.scheduled_days.clone().map(ScheduledDays::new).transpose()?;
        Ok((name, days))
    }
}

/// Partial update. `None` leaves a field unchanged; for the nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub habit_type: Option<HabitType>,
    #[serde(default)]
    pub target_value: Option<Option<i64>>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub scheduled_days: Option<Option<Vec<u32>>>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self == &HabitPatch::default()
    }
}

/// A patch that passed validation, ready to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub name: Option<String>,
    pub habit_type: Option<HabitType>,
    pub target_value: Option<Option<i64>>,
    pub sort_order: Option<i64>,
    pub scheduled_days: Option<Option<ScheduledDays>>,
}

impl TryFrom<HabitPatch> for ValidatedPatch {
    type Error = ValidationError;

    fn try_from(patch: HabitPatch) -> Result<Self, Self::Error> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        if let Some(Some(target)) = patch.target_value {
            validate_target(target)?;
        }
        let scheduled_days = match patch.scheduled_days {
            None => None,
            Some(None) => Some(None),
            Some(Some(days)) => Some(Some(ScheduledDays::new(days)?)),
        };
        Ok(Self {
            name,
            habit_type: patch.habit_type,
            target_value: patch.target_value,
            sort_order: patch.sort_order,
            scheduled_days,
        })
    }
}

impl ValidatedPatch {
    /// Apply to a copy of `habit`. Freeze fields are left untouched.
    pub fn apply_to(&self, habit: &Habit) -> Habit {
        let mut updated = habit.clone();
        if let Some(name) = &self.name {
            updated.name.clone_from(name);
        }
        if let Some(habit_type) = self.habit_type {
            updated.habit_type = habit_type;
        }
        if let Some(target) = self.target_value {
            updated.target_value = target;
        }
        if let Some(order) = self.sort_order {
            updated.sort_order = order;
        }
        if let Some(days) = &self.scheduled_days {
            updated.scheduled_days.clone_from(days);
        }
        updated
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_target(target: i64) -> Result<(), ValidationError> {
    if target <= 0 {
        return Err(ValidationError::invalid(
            "target_value",
            format!("must be positive, got {target}"),
        ));
    }
    Ok(())
}
