//! Calendar resolver: which dates a habit is eligible on.
//!
//! Pure and deterministic. A date is eligible when it is a scheduled day for
//! the habit *and* a working day (not a weekend, public holiday or personal
//! day off). Weekend exclusion always wins over schedule membership.

mod date;

use std::collections::HashSet;

pub use date::LocalDate;

/// Weekday numbers used when a habit has no custom schedule.
pub const DEFAULT_SCHEDULED_DAYS: [u32; 5] = [1, 2, 3, 4, 5];

/// False on Saturdays and Sundays, and on any holiday or day off.
pub fn is_working_day(
    date: LocalDate,
    holidays: &HashSet<LocalDate>,
    day_offs: &HashSet<LocalDate>,
) -> bool {
    !date.is_weekend() && !holidays.contains(&date) && !day_offs.contains(&date)
}

/// Membership of the date's ISO weekday in `scheduled_days`.
///
/// `None` means the default Monday..Friday schedule.
pub fn is_scheduled_day(date: LocalDate, scheduled_days: Option<&[u32]>) -> bool {
    let weekday = date.weekday_number();
    match scheduled_days {
        None => DEFAULT_SCHEDULED_DAYS.contains(&weekday),
        Some(days) => days.contains(&weekday),
    }
}

/// Every eligible date in `[start, end]`, ascending.
pub fn get_scheduled_working_days(
    start: LocalDate,
    end: LocalDate,
    scheduled_days: Option<&[u32]>,
    holidays: &HashSet<LocalDate>,
    day_offs: &HashSet<LocalDate>,
) -> Vec<LocalDate> {
    start
        .through(end)
        .filter(|d| is_scheduled_day(*d, scheduled_days) && is_working_day(*d, holidays, day_offs))
        .collect()
}

/// Non-working days for one account: global holidays plus personal days off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkCalendar {
    pub holidays: HashSet<LocalDate>,
    pub day_offs: HashSet<LocalDate>,
}

impl WorkCalendar {
    pub fn new(
        holidays: impl IntoIterator<Item = LocalDate>,
        day_offs: impl IntoIterator<Item = LocalDate>,
    ) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
            day_offs: day_offs.into_iter().collect(),
        }
    }

    pub fn eligible_days(
        &self,
        start: LocalDate,
        end: LocalDate,
        scheduled_days: Option<&[u32]>,
    ) -> Vec<LocalDate> {
        get_scheduled_working_days(start, end, scheduled_days, &self.holidays, &self.day_offs)
    }
}
