//! # Studyminder Core Library
//!
//! Decides *when* to remind a user to study, keeps a consecutive-day study
//! streak, and delivers the reminder through whatever channels the host
//! environment offers.
//!
//! ## Architecture
//!
//! - **Reminder Clock**: a periodic tick source; the caller-facing
//!   [`StudyReminder::tick`] is a plain synchronous function
//! - **Storage**: a JSON document per user profile, merged over defaults
//! - **Streak**: a pure date-delta state machine
//! - **Dispatch**: message rendering plus channel selection with fallback
//! - **Snooze**: one-shot deferred schedule entries
//!
//! ## Key Components
//!
//! - [`StudyReminder`]: the scheduler object owned by the host
//! - [`ReminderClock`]: Idle/Armed periodic ticker
//! - [`ConfigStore`]: profile-scoped persistence
//! - [`NotificationDispatcher`]: rendering and delivery
//! - [`StudyHost`] / [`Presenter`]: traits the host implements

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod reminder;
pub mod schedule;
pub mod snooze;
pub mod storage;
pub mod streak;

pub use clock::{
    ClockState, FiredMinute, MinuteGate, ReminderClock, DEFAULT_TICK_PERIOD, MIN_TICK_PERIOD,
};
pub use dispatch::{
    ChannelKind, DispatchOutcome, FireDecision, MessageKind, Modal, ModalAction,
    NotificationDispatcher, RenderedMessage, SystemChannel, FALLBACK_BODY,
};
pub use error::{ConfigError, CoreError, NotificationError, ValidationError};
pub use host::{Presenter, StudyCounts, StudyHost};
pub use reminder::StudyReminder;
pub use schedule::{EntryOrigin, ScheduleEntry, TimeOfDay};
pub use snooze::{SnoozeManager, DEFAULT_SNOOZE_MINUTES};
pub use storage::{ConfigStore, ReminderConfig};
pub use streak::{StreakState, StreakTransition};
