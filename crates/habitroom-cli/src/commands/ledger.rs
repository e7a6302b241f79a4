//! Completion commands: `done`, `count` and `time set`.

use clap::Subcommand;
use habitroom_core::LocalDate;

use super::{print_json, CmdResult, Session};

#[derive(Subcommand)]
pub enum TimeAction {
    /// Record tracked seconds for a day, replacing the stored value
    Set {
        id: String,
        seconds: i64,
        /// Day to credit (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<LocalDate>,
    },
}

/// Toggle a boolean habit.
pub fn done(id: String, date: Option<LocalDate>) -> CmdResult {
    let mut session = Session::open()?;
    let date = session.date_or_today(date);
    let completion = session.service.toggle_completion(&session.account, &id, date)?;
    print_json(&completion)
}

/// Add a (possibly negative) delta to a count habit.
pub fn count(id: String, delta: i64, date: Option<LocalDate>) -> CmdResult {
    let mut session = Session::open()?;
    let date = session.date_or_today(date);
    let completion = session
        .service
        .increment_count(&session.account, &id, date, delta)?;
    print_json(&completion)
}

pub fn time(action: TimeAction) -> CmdResult {
    let mut session = Session::open()?;
    match action {
        TimeAction::Set { id, seconds, date } => {
            let date = session.date_or_today(date);
            let completion = session
                .service
                .set_time_value(&session.account, &id, date, seconds)?;
            print_json(&completion)
        }
    }
}
