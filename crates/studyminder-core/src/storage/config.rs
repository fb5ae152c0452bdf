//! JSON-based reminder configuration.
//!
//! Stores, per user profile:
//! - Whether reminders are enabled and at which times of day
//! - The due-card threshold and daily goal
//! - Notification title and message template
//! - Streak state (last study date, current streak)
//!
//! Configuration is stored at `<profile>/study_reminders.json`. Saved keys
//! are merged over the defaults on load, so a file written by an older
//! version (or edited by hand) keeps working. A corrupt file is treated as
//! if nothing had been saved.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::schedule::TimeOfDay;
use crate::streak::StreakState;

/// File name of the reminder document inside a profile directory.
pub const CONFIG_FILE: &str = "study_reminders.json";

/// Used when no profile directory is known.
const FALLBACK_FILE: &str = ".study_reminders.json";

/// Reminder configuration for one user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Configured reminder times. Malformed entries are dropped on load.
    #[serde(deserialize_with = "deserialize_times_lenient")]
    pub reminder_times: BTreeSet<TimeOfDay>,
    /// Minimum actionable cards before a reminder is shown.
    pub min_cards_due: u32,
    pub daily_goal: u32,
    pub notification_title: String,
    /// Reminder text; `{cards}` is replaced with the actionable card count.
    #[serde(rename = "notification_message")]
    pub message_template: String,
    pub streak_enabled: bool,
    #[serde(flatten)]
    pub streak: StreakState,
}

fn default_reminder_times() -> BTreeSet<TimeOfDay> {
    [(9, 0), (14, 0), (19, 0)]
        .into_iter()
        .filter_map(|(hour, minute)| TimeOfDay::new(hour, minute))
        .collect()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_times: default_reminder_times(),
            min_cards_due: 5,
            daily_goal: 20,
            notification_title: "📚 Study Reminder".into(),
            message_template: "You have {cards} cards to review!".into(),
            streak_enabled: true,
            streak: StreakState::default(),
        }
    }
}

fn deserialize_times_lenient<'de, D>(deserializer: D) -> Result<BTreeSet<TimeOfDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|entry| match entry.as_str().map(str::parse::<TimeOfDay>) {
            Some(Ok(time)) => Some(time),
            _ => {
                tracing::warn!(%entry, "dropping malformed reminder time");
                None
            }
        })
        .collect())
}

impl ReminderConfig {
    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, keeping the type of the existing value.
    ///
    /// Does not persist; hand the result to [`ConfigStore::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            Value::Bool(_) => Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            Value::Number(_) => Value::Number(
                value
                    .parse::<u32>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a count")))?
                    .into(),
            ),
            Value::Array(_) => {
                let items: Vec<String> =
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?;
                // Strict here: silently dropping user input belongs to load only.
                for item in &items {
                    item.parse::<TimeOfDay>()
                        .map_err(|e| invalid(e.to_string()))?;
                }
                Value::from(items)
            }
            _ if key == "last_study_date" && (value.is_empty() || value == "null") => Value::Null,
            _ => Value::String(value.into()),
        };

        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

/// Loads and persists a [`ReminderConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `<profile_dir>/study_reminders.json`.
    pub fn for_profile(profile_dir: &Path) -> Self {
        Self::new(profile_dir.join(CONFIG_FILE))
    }

    /// Store in the home directory, for hosts without a profile.
    pub fn fallback() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(FALLBACK_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved keys merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when nothing has been saved yet and
    /// [`ConfigError::LoadFailed`] when the file is unreadable or corrupt.
    pub fn try_load(&self) -> Result<ReminderConfig, ConfigError> {
        let failed = |message: String| ConfigError::LoadFailed {
            path: self.path.clone(),
            message,
        };

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(failed(e.to_string())),
        };

        let saved = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(saved)) => saved,
            Ok(_) => return Err(failed("expected a JSON object".into())),
            Err(e) => return Err(failed(e.to_string())),
        };

        let mut merged =
            serde_json::to_value(ReminderConfig::default()).map_err(|e| failed(e.to_string()))?;
        if let Value::Object(base) = &mut merged {
            base.extend(saved);
        }
        serde_json::from_value(merged).map_err(|e| failed(e.to_string()))
    }

    /// Load from disk, returning defaults when nothing usable is saved.
    /// This never fails.
    pub fn load(&self) -> ReminderConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(ConfigError::Missing { path }) => {
                tracing::debug!(path = %path.display(), "no saved reminder config, using defaults");
                ReminderConfig::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unusable reminder config");
                ReminderConfig::default()
            }
        }
    }

    /// Persist to disk, creating the profile directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self, config: &ReminderConfig) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: self.path.clone(),
            message,
        };

        let content = serde_json::to_string_pretty(config).map_err(|e| failed(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        std::fs::write(&self.path, content).map_err(|e| failed(e.to_string()))
    }
}
