//! Days off and holidays.

use std::path::PathBuf;

use clap::Subcommand;
use habitroom_core::{DayOff, Holiday, LocalDate};

use super::{print_json, CmdResult, Session};

#[derive(Subcommand)]
pub enum DayOffAction {
    /// Mark a personal day off
    Add {
        date: LocalDate,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Remove a day off
    Remove { date: LocalDate },
    /// List days off
    List,
}

#[derive(Subcommand)]
pub enum HolidayAction {
    /// Replace all holidays with a JSON file of `[{"date": ..., "name": ...}]`
    Import { file: PathBuf },
    /// List holidays
    List,
}

pub fn day_off(action: DayOffAction) -> CmdResult {
    let mut session = Session::open()?;
    let owner = session.account.clone();

    match action {
        DayOffAction::Add { date, reason } => {
            session.service.add_day_off(&owner, DayOff { date, reason })?;
            println!("day off added: {date}");
        }
        DayOffAction::Remove { date } => {
            if !session.service.remove_day_off(&owner, date)? {
                return Err(format!("no day off on {date}").into());
            }
            println!("day off removed: {date}");
        }
        DayOffAction::List => print_json(&session.service.list_day_offs(&owner)?)?,
    }
    Ok(())
}

pub fn holiday(action: HolidayAction) -> CmdResult {
    let mut session = Session::open()?;

    match action {
        HolidayAction::Import { file } => {
            let content = std::fs::read_to_string(&file)?;
            let holidays: Vec<Holiday> = serde_json::from_str(&content)?;
            let imported = session.service.import_holidays(&holidays)?;
            print_json(&serde_json::json!({ "imported": imported }))?;
        }
        HolidayAction::List => print_json(&session.service.list_holidays()?)?,
    }
    Ok(())
}
