//! Reminder schedule primitives.
//!
//! A schedule is the union of the configured reminder times (persisted in
//! [`ReminderConfig`](crate::ReminderConfig)) and the ephemeral snoozed
//! times held by the [`SnoozeManager`](crate::SnoozeManager). Both are keyed
//! by the minute they fire at, so the union never holds two entries for
//! the same `HH:MM`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::Timelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A wall-clock minute in 24-hour form, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Returns `None` unless `hour < 24` and `minute < 60`.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Truncate any clock value to its minute.
    pub fn of<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Strict `HH:MM`: two digits, a colon, two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime {
            value: s.to_string(),
        };

        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let hour = (digits[0] - b'0') * 10 + (digits[1] - b'0');
        let minute = (digits[2] - b'0') * 10 + (digits[3] - b'0');
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a schedule entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    /// Persisted reminder time from the user's configuration.
    Configured,
    /// One-shot entry injected by a snooze; never persisted.
    Snoozed,
}

/// One time-of-day the reminder clock fires at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: TimeOfDay,
    pub origin: EntryOrigin,
}

/// All active entries, ordered by time of day.
///
/// A snoozed time that collides with a configured one is reported once,
/// as configured.
pub fn active_entries(
    configured: &BTreeSet<TimeOfDay>,
    snoozed: &BTreeSet<TimeOfDay>,
) -> Vec<ScheduleEntry> {
    let mut entries: Vec<ScheduleEntry> = configured
        .iter()
        .map(|&time| ScheduleEntry {
            time,
            origin: EntryOrigin::Configured,
        })
        .chain(
            snoozed
                .difference(configured)
                .map(|&time| ScheduleEntry {
                    time,
                    origin: EntryOrigin::Snoozed,
                }),
        )
        .collect();
    entries.sort_by_key(|entry| entry.time);
    entries
}

/// The entry scheduled at `minute`, if any. Configured entries win.
pub fn find_entry(
    configured: &BTreeSet<TimeOfDay>,
    snoozed: &BTreeSet<TimeOfDay>,
    minute: TimeOfDay,
) -> Option<ScheduleEntry> {
    if configured.contains(&minute) {
        Some(ScheduleEntry {
            time: minute,
            origin: EntryOrigin::Configured,
        })
    } else if snoozed.contains(&minute) {
        Some(ScheduleEntry {
            time: minute,
            origin: EntryOrigin::Snoozed,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_well_formed_times() {
        assert_eq!(t("09:00"), TimeOfDay::new(9, 0).unwrap());
        assert_eq!(t("23:59"), TimeOfDay::new(23, 59).unwrap());
        assert_eq!(t("00:00").to_string(), "00:00");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["9:00", "24:00", "12:60", "12-30", "ab:cd", "", "12:300", " 9:00", "+9:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn truncates_clock_to_minute() {
        let time = NaiveTime::from_hms_opt(14, 3, 59).unwrap();
        assert_eq!(TimeOfDay::of(&time).to_string(), "14:03");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&t("07:05")).unwrap();
        assert_eq!(json, "\"07:05\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("07:05"));
        assert!(serde_json::from_str::<TimeOfDay>("\"7:5\"").is_err());
    }

    #[test]
    fn configured_entry_wins_on_collision() {
        let configured = BTreeSet::from([t("09:00"), t("14:00")]);
        let snoozed = BTreeSet::from([t("09:00"), t("09:30")]);

        let entries = active_entries(&configured, &snoozed);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].origin, EntryOrigin::Configured);
        assert_eq!(entries[1].time, t("09:30"));
        assert_eq!(entries[1].origin, EntryOrigin::Snoozed);

        let hit = find_entry(&configured, &snoozed, t("09:00")).unwrap();
        assert_eq!(hit.origin, EntryOrigin::Configured);
        assert!(find_entry(&configured, &snoozed, t("10:00")).is_none());
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(hour in 0u8..24, minute in 0u8..60) {
            let time = TimeOfDay::new(hour, minute).unwrap();
            prop_assert_eq!(time.to_string().parse::<TimeOfDay>().unwrap(), time);
        }

        #[test]
        fn out_of_range_is_rejected(hour in 24u8..100, minute in 0u8..100) {
            let s = format!("{hour:02}:{minute:02}");
            prop_assert!(s.parse::<TimeOfDay>().is_err());
        }
    }
}
