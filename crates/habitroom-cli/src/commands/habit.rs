use clap::Subcommand;
use habitroom_core::{HabitPatch, HabitType, NewHabit};

use super::{print_json, CmdResult, Session};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        /// Habit name
        name: String,
        /// boolean, count or time
        #[arg(long = "type", default_value = "boolean")]
        habit_type: HabitType,
        /// Count units, or minutes for time habits
        #[arg(long)]
        target: Option<i64>,
        /// Weekdays as ISO numbers, e.g. 1,3,5 (default Monday..Friday)
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u32>>,
        /// Position in listings
        #[arg(long)]
        order: Option<i64>,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Show one habit
    Show { id: String },
    /// Update a habit
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        habit_type: Option<HabitType>,
        #[arg(long, conflicts_with = "clear_target")]
        target: Option<i64>,
        /// Remove the target
        #[arg(long)]
        clear_target: bool,
        #[arg(long, value_delimiter = ',', conflicts_with = "clear_days")]
        days: Option<Vec<u32>>,
        /// Go back to the Monday..Friday default
        #[arg(long)]
        clear_days: bool,
        #[arg(long)]
        order: Option<i64>,
    },
    /// Pause a habit
    Pause { id: String },
    /// Resume a paused habit
    Unpause { id: String },
    /// Hide a habit from active views, keeping its history
    Archive { id: String },
    /// Bring an archived habit back
    Unarchive { id: String },
    /// Delete a habit and all of its history
    Delete { id: String },
}

pub fn run(action: HabitAction) -> CmdResult {
    let mut session = Session::open()?;
    let owner = session.account.clone();
    let service = &mut session.service;

    match action {
        HabitAction::Add {
            name,
            habit_type,
            target,
            days,
            order,
        } => {
            let new = NewHabit {
                name,
                habit_type,
                target_value: target,
                scheduled_days: days,
                sort_order: order,
            };
            print_json(&service.create_habit(&owner, new)?)?;
        }
        HabitAction::List { all } => {
            print_json(&service.list_habits(&owner, all)?)?;
        }
        HabitAction::Show { id } => {
            print_json(&service.get_habit(&owner, &id)?)?;
        }
        HabitAction::Update {
            id,
            name,
            habit_type,
            target,
            clear_target,
            days,
            clear_days,
            order,
        } => {
            let patch = HabitPatch {
                name,
                habit_type,
                target_value: if clear_target { Some(None) } else { target.map(Some) },
                sort_order: order,
                scheduled_days: if clear_days { Some(None) } else { days.map(Some) },
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            print_json(&service.update_habit(&owner, &id, patch)?)?;
        }
        HabitAction::Pause { id } => print_json(&service.pause_habit(&owner, &id)?)?,
        HabitAction::Unpause { id } => print_json(&service.unpause_habit(&owner, &id)?)?,
        HabitAction::Archive { id } => print_json(&service.archive_habit(&owner, &id)?)?,
        HabitAction::Unarchive { id } => print_json(&service.unarchive_habit(&owner, &id)?)?,
        HabitAction::Delete { id } => {
            service.delete_habit(&owner, &id)?;
            println!("deleted {id}");
        }
    }
    Ok(())
}
