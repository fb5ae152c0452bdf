use clap::Subcommand;
use studyminder_core::{ConfigError, ConfigStore, ReminderConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "min_cards_due", "notification_title")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (JSON array for reminder_times)
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(store: &ConfigStore, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = store.load();
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = store.load();
            config.set(&key, &value)?;
            store.save(&config)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = store.load();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.save(&ReminderConfig::default())?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

pub fn set_enabled(store: &ConfigStore, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = store.load();
    config.enabled = enabled;
    store.save(&config)?;
    println!("reminders {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

pub fn set_goal(store: &ConfigStore, goal: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = store.load();
    config.daily_goal = goal;
    store.save(&config)?;
    println!("daily goal: {goal} cards");
    Ok(())
}
