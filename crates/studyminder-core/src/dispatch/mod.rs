//! Notification dispatch.
//!
//! A fire is delivered on two independent layers:
//!
//! - the **system** layer, a passive nudge (native notification, or a
//!   tooltip when none is available)
//! - the **in-app modal**, the actionable surface ("start studying" /
//!   "remind me later", or a single acknowledgement when celebrating)
//!
//! A failure on one layer is logged and never stops the other.

mod channel;
mod message;

pub use channel::{
    ChannelKind, DesktopNotifier, NativeNotifier, SystemChannel, TrayNotifier,
};
pub use message::{
    format_template, render, FireDecision, MessageKind, RenderedMessage, CELEBRATION_BODY,
    CELEBRATION_TITLE, FALLBACK_BODY, FALLBACK_TITLE,
};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::NotificationError;
use crate::host::Presenter;
use crate::storage::ReminderConfig;

/// How long system notifications and tooltips stay up.
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_secs(5);

pub const TEST_NOTIFICATION_TITLE: &str = "🧪 Test Notification";
pub const TEST_NOTIFICATION_BODY: &str =
    "Notifications are working! You'll receive study reminders.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalAction {
    StartStudying,
    RemindLater,
    Acknowledge,
}

impl ModalAction {
    pub fn label(&self) -> &'static str {
        match self {
            ModalAction::StartStudying => "📖 Start Studying",
            ModalAction::RemindLater => "⏰ Remind Me Later",
            ModalAction::Acknowledge => "✨ Awesome!",
        }
    }
}

/// What the presenter is asked to show in-app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub kind: MessageKind,
    pub icon: &'static str,
    pub title: String,
    pub body: String,
    pub actions: Vec<ModalAction>,
}

impl Modal {
    pub fn for_message(message: &RenderedMessage) -> Self {
        let actions = match message.kind {
            MessageKind::Reminder => vec![ModalAction::RemindLater, ModalAction::StartStudying],
            MessageKind::Celebration => vec![ModalAction::Acknowledge],
        };
        Self {
            kind: message.kind,
            icon: message.icon(),
            title: message.title.clone(),
            body: message.body.clone(),
            actions,
        }
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// System-layer channel that delivered, if any did.
    pub system_channel: Option<ChannelKind>,
    pub modal_shown: bool,
    /// Action the user picked in the modal.
    pub action: Option<ModalAction>,
}

/// Renders fire decisions and delivers them through the host's channels.
pub struct NotificationDispatcher {
    presenter: Arc<dyn Presenter>,
    system: SystemChannel,
    display_duration: Duration,
}

impl NotificationDispatcher {
    /// Build a dispatcher, probing for the best system channel.
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        let system = SystemChannel::probe(&presenter);
        tracing::info!(channel = ?system, "selected system notification channel");
        Self::with_system_channel(presenter, system)
    }

    pub fn with_system_channel(presenter: Arc<dyn Presenter>, system: SystemChannel) -> Self {
        Self {
            presenter,
            system,
            display_duration: DEFAULT_DISPLAY_DURATION,
        }
    }

    pub fn with_display_duration(mut self, duration: Duration) -> Self {
        self.display_duration = duration;
        self
    }

    pub fn system_channel(&self) -> ChannelKind {
        self.system.kind()
    }

    pub fn presenter_ready(&self) -> bool {
        self.presenter.is_ready()
    }

    /// Render `decision` against `config` and deliver it.
    pub fn dispatch(&self, decision: &FireDecision, config: &ReminderConfig) -> DispatchOutcome {
        self.deliver(&render(decision, config))
    }

    /// Deliver an already rendered message on both layers.
    pub fn deliver(&self, message: &RenderedMessage) -> DispatchOutcome {
        let system_channel = self.notify_system(&message.title, &message.body);

        let modal = Modal::for_message(message);
        let shown = guarded(ChannelKind::InAppModal, || self.presenter.show_modal(&modal));
        let (modal_shown, action) = match shown {
            Ok(action) if modal.actions.contains(&action) => (true, Some(action)),
            Ok(action) => {
                tracing::warn!(?action, "presenter returned an action the modal did not offer");
                (true, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "in-app reminder failed");
                (false, None)
            }
        };

        DispatchOutcome {
            system_channel,
            modal_shown,
            action,
        }
    }

    /// System layer only: native notification, falling back to a tooltip.
    pub fn notify_system(&self, title: &str, body: &str) -> Option<ChannelKind> {
        if let SystemChannel::Native(notifier) = &self.system {
            let sent = guarded(ChannelKind::NativeNotification, || {
                notifier.notify(title, body, self.display_duration)
            });
            match sent {
                Ok(()) => return Some(ChannelKind::NativeNotification),
                Err(e) => tracing::warn!(
                    notifier = notifier.name(),
                    error = %e,
                    "native notification failed, falling back to tooltip"
                ),
            }
        }

        if self.show_tooltip(&format!("{title}\n{body}")) {
            Some(ChannelKind::Tooltip)
        } else {
            None
        }
    }

    /// Show a transient tooltip. Returns whether it was delivered.
    pub fn show_tooltip(&self, text: &str) -> bool {
        match guarded(ChannelKind::Tooltip, || {
            self.presenter.show_tooltip(text, self.display_duration)
        }) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "tooltip failed");
                false
            }
        }
    }

    /// Push a fixed message through the system layer only.
    pub fn send_test_notification(&self) -> Option<ChannelKind> {
        self.notify_system(TEST_NOTIFICATION_TITLE, TEST_NOTIFICATION_BODY)
    }
}

/// Run host presentation code, turning a panic into a delivery failure.
fn guarded<T>(
    channel: ChannelKind,
    f: impl FnOnce() -> Result<T, NotificationError>,
) -> Result<T, NotificationError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        Err(NotificationError::DeliveryFailed {
            channel,
            message: "presenter panicked".into(),
        })
    })
}
