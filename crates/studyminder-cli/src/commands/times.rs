use clap::Subcommand;
use studyminder_core::{ConfigStore, TimeOfDay};

#[derive(Subcommand)]
pub enum TimesAction {
    /// List configured reminder times
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a reminder time (HH:MM)
    Add {
        time: String,
    },
    /// Remove a reminder time (HH:MM)
    Remove {
        time: String,
    },
    /// Replace all reminder times
    Set {
        /// Times in HH:MM
        #[arg(required = true)]
        times: Vec<String>,
    },
}

pub fn run(store: &ConfigStore, action: TimesAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimesAction::List { json } => {
            let config = store.load();
            if json {
                println!("{}", serde_json::to_string(&config.reminder_times)?);
            } else if config.reminder_times.is_empty() {
                println!("no reminder times");
            } else {
                for time in &config.reminder_times {
                    println!("{time}");
                }
            }
        }
        TimesAction::Add { time } => {
            let time: TimeOfDay = time.parse()?;
            let mut config = store.load();
            if config.reminder_times.insert(time) {
                store.save(&config)?;
                println!("added {time}");
            } else {
                println!("{time} already scheduled");
            }
        }
        TimesAction::Remove { time } => {
            let time: TimeOfDay = time.parse()?;
            let mut config = store.load();
            if !config.reminder_times.remove(&time) {
                return Err(format!("{time} is not scheduled").into());
            }
            store.save(&config)?;
            println!("removed {time}");
        }
        TimesAction::Set { times } => {
            let parsed = times
                .iter()
                .map(|t| t.parse::<TimeOfDay>())
                .collect::<Result<_, _>>()?;
            let mut config = store.load();
            config.reminder_times = parsed;
            store.save(&config)?;
            println!("{} reminder times set", config.reminder_times.len());
        }
    }
    Ok(())
}
