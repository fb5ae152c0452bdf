//! Core error types for studyminder-core.
//!
//! Nothing in the reminder loop surfaces these to the host as a crash.
//! The scheduler logs and recovers; lower-level APIs still return them
//! so callers like the CLI can report what went wrong.

use std::path::PathBuf;
use thiserror::Error;

use crate::dispatch::ChannelKind;

/// Core error type for studyminder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification channel errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The study engine or presentation layer is not initialized yet
    #[error("Study host unavailable: {0}")]
    HostUnavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No saved configuration exists yet
    #[error("No configuration saved at {path}")]
    Missing { path: PathBuf },

    /// Saved configuration exists but is unreadable or corrupt
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key is not part of the reminder configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Delivery channel errors.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The channel is not supported by the host environment
    #[error("{channel} channel is unavailable")]
    Unavailable { channel: ChannelKind },

    /// The channel exists but delivery failed
    #[error("{channel} delivery failed: {message}")]
    DeliveryFailed {
        channel: ChannelKind,
        message: String,
    },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Not a 24-hour `HH:MM` string
    #[error("Invalid reminder time '{value}': expected 24-hour HH:MM")]
    InvalidTime { value: String },

    /// Message template could not be formatted
    #[error("Invalid message template: {message}")]
    InvalidTemplate { message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
