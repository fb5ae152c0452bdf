//! Collaborator interfaces implemented by the host application.
//!
//! The core decides *when* and *what* to notify; the host owns the study
//! engine and all rendering.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::{ChannelKind, Modal, ModalAction};
use crate::error::{CoreError, NotificationError};

/// Current card counts reported by the study engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyCounts {
    pub new: u32,
    pub learning: u32,
    pub due: u32,
}

impl StudyCounts {
    /// Everything the user could act on right now.
    pub fn total(&self) -> u32 {
        self.new
            .saturating_add(self.learning)
            .saturating_add(self.due)
    }
}

/// The host's study engine.
pub trait StudyHost: Send + Sync {
    /// `false` until the host has opened a collection. Ticks are no-ops
    /// while the host is not ready.
    fn is_ready(&self) -> bool;

    fn counts(&self) -> Result<StudyCounts, CoreError>;

    /// Move the host UI into its studying state.
    fn transition_to_study_mode(&self) -> Result<(), CoreError>;
}

/// The host's presentation layer.
///
/// Only [`show_modal`](Presenter::show_modal) and
/// [`show_tooltip`](Presenter::show_tooltip) are required. A host with a
/// system tray icon overrides the native-notification pair.
pub trait Presenter: Send + Sync {
    fn is_ready(&self) -> bool {
        true
    }

    /// Whether [`show_native_notification`](Presenter::show_native_notification)
    /// can deliver (e.g. a tray icon is present).
    fn has_tray_icon(&self) -> bool {
        false
    }

    fn show_native_notification(
        &self,
        _title: &str,
        _body: &str,
        _duration: Duration,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Unavailable {
            channel: ChannelKind::NativeNotification,
        })
    }

    /// Show an actionable in-app modal and block until the user picks one
    /// of `modal.actions`.
    fn show_modal(&self, modal: &Modal) -> Result<ModalAction, NotificationError>;

    /// Show a transient, auto-dismissing tooltip.
    fn show_tooltip(&self, text: &str, duration: Duration) -> Result<(), NotificationError>;
}
