mod config;

pub use config::{ConfigStore, ReminderConfig, CONFIG_FILE};

use std::path::PathBuf;

/// Returns the default profile directory.
///
/// `STUDYMINDER_PROFILE_DIR` wins when set. Otherwise this is
/// `~/.config/studyminder[-dev]/`, with `STUDYMINDER_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("STUDYMINDER_PROFILE_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("STUDYMINDER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyminder-dev")
            } else {
                base_dir.join("studyminder")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
