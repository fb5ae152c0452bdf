use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "studyminder", version, about = "Studyminder CLI")]
struct Cli {
    /// Profile directory holding study_reminders.json
    #[arg(long, global = true, env = "STUDYMINDER_PROFILE_DIR")]
    profile_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Reminder time management
    Times {
        #[command(subcommand)]
        action: commands::times::TimesAction,
    },
    /// Turn reminders on
    Enable,
    /// Turn reminders off
    Disable,
    /// Set the daily review goal
    Goal {
        /// Cards per day
        goal: u32,
    },
    /// Study streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Send a test notification through the system channel
    TestNotify,
    /// Run the reminder clock in the foreground
    Run(commands::run::RunArgs),
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studyminder=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let result = commands::store(cli.profile_dir).and_then(|store| match cli.command {
        Commands::Config { action } => commands::config::run(&store, action),
        Commands::Times { action } => commands::times::run(&store, action),
        Commands::Enable => commands::config::set_enabled(&store, true),
        Commands::Disable => commands::config::set_enabled(&store, false),
        Commands::Goal { goal } => commands::config::set_goal(&store, goal),
        Commands::Streak { action } => commands::streak::run(&store, action),
        Commands::TestNotify => commands::run::test_notify(store),
        Commands::Run(args) => commands::run::run(store, args),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
