use std::collections::BTreeMap;

use clap::Subcommand;

use super::{print_json, CmdResult, Session};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Stats for one habit
    Show { id: String },
    /// Stats for several habits; unknown ids are left out
    Batch {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Stats for every active habit
    All,
}

pub fn run(action: StatsAction) -> CmdResult {
    let mut session = Session::open()?;
    let owner = session.account.clone();

    match action {
        StatsAction::Show { id } => {
            print_json(&session.service.get_habit_stats(&owner, &id)?)?;
        }
        StatsAction::Batch { ids } => {
            let stats: BTreeMap<_, _> = session.service.batch_get_stats(&owner, &ids)?.into_iter().collect();
            print_json(&stats)?;
        }
        StatsAction::All => {
            let stats: BTreeMap<_, _> = session.service.list_stats(&owner)?.into_iter().collect();
            print_json(&stats)?;
        }
    }
    Ok(())
}
