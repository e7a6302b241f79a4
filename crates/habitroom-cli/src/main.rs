use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use habitroom_core::{Config, LocalDate};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitroom-cli", version, about = "Habitroom CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Toggle a boolean habit for a day
    Done {
        id: String,
        /// YYYY-MM-DD, default today
        #[arg(long)]
        date: Option<LocalDate>,
    },
    /// Add to (or subtract from) a count habit
    Count {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
        /// YYYY-MM-DD, default today
        #[arg(long)]
        date: Option<LocalDate>,
    },
    /// Tracked time for time habits
    Time {
        #[command(subcommand)]
        action: commands::ledger::TimeAction,
    },
    /// Habit timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Habit statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Personal days off
    Dayoff {
        #[command(subcommand)]
        action: commands::calendar::DayOffAction,
    },
    /// Public holidays
    Holiday {
        #[command(subcommand)]
        action: commands::calendar::HolidayAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

/// Log to stderr so stdout stays machine readable. `HABITROOM_LOG` wins over
/// the configured level. Runs before any subscriber exists, so the config is
/// only read, never created.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HABITROOM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Config::configured_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Done { id, date } => commands::ledger::done(id, date),
        Commands::Count { id, delta, date } => commands::ledger::count(id, delta, date),
        Commands::Time { action } => commands::ledger::time(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Dayoff { action } => commands::calendar::day_off(action),
        Commands::Holiday { action } => commands::calendar::holiday(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitroom-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
