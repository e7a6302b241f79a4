//! # Habitroom Core Library
//!
//! This library provides the core business logic for Habitroom, a habit
//! tracker built around one question: how many eligible days in a row has
//! this habit been completed, as of now? Every operation is available through
//! the standalone CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Calendar**: resolves which dates are eligible for a habit given
//!   weekends, holidays, personal days off and a weekly schedule
//! - **Ledger**: one completion record per habit and date, with toggle,
//!   set and increment semantics
//! - **Streak**: the streak calculator and the freeze that carries a streak
//!   across schedule changes
//! - **Timer**: a wall-clock-based state machine for time habits
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`HabitService`]: the operations exposed to callers
//! - [`HabitDb`]: habit, ledger, timer and calendar persistence
//! - [`Config`]: application configuration management
//! - [`Clock`]: time source, swapped for [`ManualClock`] in tests

pub mod calendar;
pub mod clock;
pub mod error;
pub mod habit;
pub mod ledger;
pub mod service;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod timer;

pub use calendar::{get_scheduled_working_days, is_scheduled_day, is_working_day, LocalDate, WorkCalendar};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Habit, HabitPatch, HabitType, NewHabit, ScheduledDays};
pub use ledger::Completion;
pub use service::HabitService;
pub use stats::{HabitStats, StatsCache};
pub use storage::{Config, DayOff, HabitDb, Holiday};
pub use streak::{calculate_streak, current_streak, freeze_streak, CompletionMap, FreezeOutcome};
pub use timer::{HabitTimer, TimerSnapshot, TimerState};
