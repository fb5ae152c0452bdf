pub mod config;
pub mod run;
pub mod streak;
pub mod times;

use std::path::PathBuf;

use studyminder_core::storage::data_dir;
use studyminder_core::ConfigStore;

/// Resolve the profile's config store; `--profile-dir` wins over the
/// default data directory, and `~/.study_reminders.json` is used when that
/// directory cannot be created.
pub fn store(profile_dir: Option<PathBuf>) -> Result<ConfigStore, Box<dyn std::error::Error>> {
    match profile_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Ok(ConfigStore::for_profile(&dir))
        }
        None => match data_dir() {
            Ok(dir) => Ok(ConfigStore::for_profile(&dir)),
            Err(e) => {
                tracing::warn!(error = %e, "no profile directory, using home fallback");
                Ok(ConfigStore::fallback())
            }
        },
    }
}
