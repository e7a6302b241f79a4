pub mod calendar;
pub mod config;
pub mod habit;
pub mod ledger;
pub mod stats;
pub mod timer;

use habitroom_core::{Config, HabitDb, HabitService, LocalDate};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// The service over the configured database and the account it acts for.
pub struct Session {
    pub service: HabitService,
    pub account: String,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = HabitDb::open_in_data_dir(&config.database_file)?;
        Ok(Self {
            service: HabitService::open(db).with_stats_cache(config.stats_cache),
            account: config.account,
        })
    }

    /// `date` if given, otherwise today.
    pub fn date_or_today(&self, date: Option<LocalDate>) -> LocalDate {
        date.unwrap_or_else(|| self.service.today())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
