//! One-shot deferred reminders.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};

use crate::schedule::TimeOfDay;

pub const DEFAULT_SNOOZE_MINUTES: u32 = 30;

/// The minute a snooze started at `now` fires at. Wraps past midnight.
pub fn snooze_target(now: NaiveDateTime, minutes: u32) -> TimeOfDay {
    TimeOfDay::of(&(now + Duration::minutes(i64::from(minutes))))
}

/// Ephemeral snoozed entries. Lives in memory only.
#[derive(Debug, Clone, Default)]
pub struct SnoozeManager {
    entries: BTreeSet<TimeOfDay>,
}

impl SnoozeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject an entry `minutes` after `now` unless that minute is already
    /// scheduled, either as a configured time or an earlier snooze.
    ///
    /// Returns the new entry, or `None` on collision.
    pub fn snooze(
        &mut self,
        now: NaiveDateTime,
        minutes: u32,
        configured: &BTreeSet<TimeOfDay>,
    ) -> Option<TimeOfDay> {
        let target = snooze_target(now, minutes.max(1));
        if configured.contains(&target) || !self.entries.insert(target) {
            return None;
        }
        Some(target)
    }

    /// Remove `time` after it fired. Returns whether it was snoozed.
    pub fn take(&mut self, time: TimeOfDay) -> bool {
        self.entries.remove(&time)
    }

    pub fn entries(&self) -> &BTreeSet<TimeOfDay> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
