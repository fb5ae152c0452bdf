use chrono::{Local, NaiveDate};
use clap::Subcommand;
use studyminder_core::{ConfigStore, StreakTransition};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a study event
    Record {
        /// Study date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(store: &ConfigStore, action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StreakAction::Show { json } => {
            let config = store.load();
            if json {
                println!("{}", serde_json::to_string(&config.streak)?);
            } else {
                match config.streak.last_study_date {
                    Some(last) => println!(
                        "streak: {} (last studied {last})",
                        config.streak.current()
                    ),
                    None => println!("streak: 0 (never studied)"),
                }
            }
        }
        StreakAction::Record { date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let mut config = store.load();
            let transition = config.streak.record_study_event(today);
            if transition != StreakTransition::Unchanged {
                store.save(&config)?;
            }
            println!("streak: {}", config.streak.current());
        }
    }
    Ok(())
}
