//! Reminder clock.
//!
//! The clock is a periodic tick source plus the de-duplication marker that
//! keeps a scheduled minute from firing twice. It does not look at counts
//! or render anything; on every period it hands the current wall-clock time
//! to a plain synchronous callback.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start()--> Armed --stop()--> Idle
//! ```
//!
//! At most one tick runs at a time. A period that elapses while the
//! previous tick is still running (for example, waiting on a modal) is
//! dropped. A period longer than a minute can skip a scheduled minute
//! entirely; there is no catch-up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::schedule::TimeOfDay;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

/// Shortest accepted period; `tokio::time::interval` rejects zero.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Armed,
}

/// A calendar minute: the date plus its `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredMinute {
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

impl FiredMinute {
    pub fn of(now: NaiveDateTime) -> Self {
        Self {
            date: now.date(),
            time: TimeOfDay::of(&now),
        }
    }
}

/// Remembers the last minute that fired.
///
/// The marker is a single minute shared by every schedule entry, so two
/// entries on the same `HH:MM` fire once combined.
#[derive(Debug, Clone, Default)]
pub struct MinuteGate {
    last_fired: Option<FiredMinute>,
}

impl MinuteGate {
    /// `true` if `minute` may fire; marks it as fired.
    pub fn try_fire(&mut self, minute: FiredMinute) -> bool {
        if self.last_fired == Some(minute) {
            return false;
        }
        self.last_fired = Some(minute);
        true
    }

    pub fn last_fired(&self) -> Option<FiredMinute> {
        self.last_fired
    }
}

/// Clears the in-flight flag when a tick finishes, even by panicking.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic tick source.
pub struct ReminderClock {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl ReminderClock {
    /// `period` is raised to [`MIN_TICK_PERIOD`] if shorter.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_TICK_PERIOD),
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> ClockState {
        if self.task.is_some() {
            ClockState::Armed
        } else {
            ClockState::Idle
        }
    }

    /// Start ticking on `runtime`. Does nothing if already armed.
    ///
    /// Each tick runs `on_tick` on the blocking pool so the timer keeps
    /// its schedule, but a new tick is only started once the previous one
    /// has returned.
    pub fn start<F>(&mut self, runtime: &Handle, on_tick: F)
    where
        F: Fn(NaiveDateTime) + Send + Sync + 'static,
    {
        if self.task.is_some() {
            return;
        }

        let period = self.period;
        let on_tick = Arc::new(on_tick);
        let busy = Arc::new(AtomicBool::new(false));
        self.task = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if busy.swap(true, Ordering::AcqRel) {
                    tracing::trace!("previous tick still running, skipping");
                    continue;
                }
                let now = Local::now().naive_local();
                let on_tick = Arc::clone(&on_tick);
                let in_flight = InFlight(Arc::clone(&busy));
                tokio::task::spawn_blocking(move || {
                    let _in_flight = in_flight;
                    on_tick(now);
                });
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "reminder clock armed");
    }

    /// Stop future ticks. A tick already running finishes. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("reminder clock stopped");
        }
    }
}

impl Default for ReminderClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl Drop for ReminderClock {
    fn drop(&mut self) {
        self.stop();
    }
}
