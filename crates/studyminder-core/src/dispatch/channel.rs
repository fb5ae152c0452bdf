//! System-level notification channels.
//!
//! The system channel is chosen once, when the dispatcher is built:
//!
//! 1. the presenter's tray icon, if it has one
//! 2. the OS notification service, when one answers
//! 3. otherwise a tooltip

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use notify_rust::{Notification, Timeout};
use serde::{Deserialize, Serialize};

use crate::error::NotificationError;
use crate::host::Presenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    NativeNotification,
    InAppModal,
    Tooltip,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelKind::NativeNotification => "native notification",
            ChannelKind::InAppModal => "in-app modal",
            ChannelKind::Tooltip => "tooltip",
        })
    }
}

/// An OS-level notification backend.
pub trait NativeNotifier: Send + Sync {
    fn name(&self) -> &str;

    /// Fire-and-forget: returns once the notification was handed off.
    fn notify(&self, title: &str, body: &str, duration: Duration) -> Result<(), NotificationError>;
}

/// Delivers through the presenter's system tray icon.
pub struct TrayNotifier {
    presenter: Arc<dyn Presenter>,
}

impl TrayNotifier {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self { presenter }
    }
}

impl NativeNotifier for TrayNotifier {
    fn name(&self) -> &str {
        "tray"
    }

    fn notify(&self, title: &str, body: &str, duration: Duration) -> Result<(), NotificationError> {
        self.presenter.show_native_notification(title, body, duration)
    }
}

/// Delivers through the OS notification service: D-Bus on Linux and the
/// BSDs, Notification Center on macOS, toasts on Windows.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    appname: String,
}

impl DesktopNotifier {
    pub const DEFAULT_APPNAME: &'static str = "Studyminder";

    pub fn new(appname: impl Into<String>) -> Self {
        Self {
            appname: appname.into(),
        }
    }

    /// A notifier, if the platform's notification service is reachable.
    pub fn probe() -> Option<Self> {
        desktop_service_available().then(Self::default)
    }

    fn notification(&self, title: &str, body: &str, duration: Duration) -> Notification {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        let mut notification = Notification::new();
        notification
            .appname(&self.appname)
            .summary(title)
            .body(body)
            .timeout(Timeout::Milliseconds(millis));
        notification
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_APPNAME)
    }
}

impl NativeNotifier for DesktopNotifier {
    fn name(&self) -> &str {
        "desktop"
    }

    fn notify(&self, title: &str, body: &str, duration: Duration) -> Result<(), NotificationError> {
        self.notification(title, body, duration)
            .show()
            .map(|_| ())
            .map_err(|e| NotificationError::DeliveryFailed {
                channel: ChannelKind::NativeNotification,
                message: e.to_string(),
            })
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn desktop_service_available() -> bool {
    match notify_rust::get_server_information() {
        Ok(info) => {
            tracing::debug!(server = %info.name, "desktop notification server found");
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "no desktop notification server");
            false
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn desktop_service_available() -> bool {
    true
}

/// The system-level channel picked at startup.
pub enum SystemChannel {
    Native(Box<dyn NativeNotifier>),
    Tooltip,
}

impl SystemChannel {
    /// Probe the host environment once.
    pub fn probe(presenter: &Arc<dyn Presenter>) -> Self {
        if presenter.has_tray_icon() {
            return SystemChannel::Native(Box::new(TrayNotifier::new(Arc::clone(presenter))));
        }
        match DesktopNotifier::probe() {
            Some(notifier) => SystemChannel::Native(Box::new(notifier)),
            None => SystemChannel::Tooltip,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            SystemChannel::Native(_) => ChannelKind::NativeNotification,
            SystemChannel::Tooltip => ChannelKind::Tooltip,
        }
    }
}

impl fmt::Debug for SystemChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemChannel::Native(notifier) => {
                f.debug_tuple("Native").field(&notifier.name()).finish()
            }
            SystemChannel::Tooltip => f.write_str("Tooltip"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Modal, ModalAction};

    struct TrayPresenter;

    impl Presenter for TrayPresenter {
        fn has_tray_icon(&self) -> bool {
            true
        }

        fn show_modal(&self, _modal: &Modal) -> Result<ModalAction, NotificationError> {
            Ok(ModalAction::Acknowledge)
        }

        fn show_tooltip(&self, _text: &str, _duration: Duration) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    #[test]
    fn tray_icon_wins_the_probe() {
        let presenter: Arc<dyn Presenter> = Arc::new(TrayPresenter);
        let channel = SystemChannel::probe(&presenter);
        assert_eq!(channel.kind(), ChannelKind::NativeNotification);
        assert_eq!(format!("{channel:?}"), "Native(\"tray\")");
    }

    #[test]
    fn desktop_notification_carries_title_body_and_timeout() {
        let notifier = DesktopNotifier::default();
        let notification = notifier.notification("Title", "Body", Duration::from_secs(5));
        assert_eq!(notification.summary, "Title");
        assert_eq!(notification.body, "Body");
        assert_eq!(notification.appname, DesktopNotifier::DEFAULT_APPNAME);
        assert_eq!(notification.timeout, Timeout::Milliseconds(5000));
        assert_eq!(notifier.name(), "desktop");
    }

    #[test]
    fn oversized_timeout_saturates() {
        let notifier = DesktopNotifier::new("test");
        let notification = notifier.notification("t", "b", Duration::from_secs(u64::MAX));
        assert_eq!(notification.timeout, Timeout::Milliseconds(u32::MAX));
        assert_eq!(notification.appname, "test");
    }
}
