use clap::Subcommand;
use habitroom_core::LocalDate;

use super::{print_json, CmdResult, Session};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume a time habit's timer
    Start {
        id: String,
        /// Day the elapsed time is credited to (default today)
        #[arg(long)]
        date: Option<LocalDate>,
    },
    /// Pause the running timer
    Pause { id: String },
    /// Stop the timer and record its total
    Stop { id: String },
    /// Discard the timer without recording anything
    Reset { id: String },
    /// Print current timer state as JSON
    Status { id: String },
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut session = Session::open()?;
    let owner = session.account.clone();

    match action {
        TimerAction::Start { id, date } => {
            let date = session.date_or_today(date);
            print_json(&session.service.start_timer(&owner, &id, date)?)?;
        }
        TimerAction::Pause { id } => {
            print_json(&session.service.pause_timer(&owner, &id)?)?;
        }
        TimerAction::Stop { id } => {
            print_json(&session.service.stop_timer(&owner, &id)?)?;
        }
        TimerAction::Reset { id } => {
            session.service.reset_timer(&owner, &id)?;
            println!("timer reset");
        }
        TimerAction::Status { id } => match session.service.timer_status(&owner, &id)? {
            Some(snapshot) => print_json(&snapshot)?,
            None => print_json(&serde_json::json!({ "habit_id": id, "state": "absent" }))?,
        },
    }
    Ok(())
}
