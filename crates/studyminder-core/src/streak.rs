//! Consecutive-day study streak.
//!
//! The streak is a pure function of calendar-date deltas. `today` is always
//! injected by the caller; nothing in here reads the wall clock.
//!
//! ```text
//! last == today       -> unchanged
//! last == today - 1   -> streak + 1
//! otherwise           -> streak = 1
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a study event changed the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// Already studied today.
    Unchanged,
    /// Studied yesterday too.
    Extended,
    /// First study ever, or the previous streak was broken.
    Restarted,
}

/// Persisted streak state, stored alongside the reminder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakState {
    /// Calendar date of the most recent study event.
    pub last_study_date: Option<NaiveDate>,
    pub current_streak: u32,
}

impl StreakState {
    pub fn current(&self) -> u32 {
        self.current_streak
    }

    /// Record that the user studied on `today`.
    pub fn record_study_event(&mut self, today: NaiveDate) -> StreakTransition {
        let transition = match self.last_study_date {
            Some(last) if last == today => return StreakTransition::Unchanged,
            Some(last) if last.succ_opt() == Some(today) => {
                self.current_streak = self.current_streak.saturating_add(1);
                StreakTransition::Extended
            }
            _ => {
                self.current_streak = 1;
                StreakTransition::Restarted
            }
        };
        self.last_study_date = Some(today);
        transition
    }

    /// Zero the streak if more than one day has passed since the last study
    /// event. Returns `true` when the state changed.
    pub fn expire(&mut self, today: NaiveDate) -> bool {
        if self.current_streak == 0 {
            return false;
        }
        let broken = match self.last_study_date {
            Some(last) => (today - last).num_days() > 1,
            None => true,
        };
        if broken {
            self.current_streak = 0;
        }
        broken
    }
}
