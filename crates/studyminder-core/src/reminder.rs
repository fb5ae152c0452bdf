//! The study reminder scheduler.
//!
//! [`StudyReminder`] owns the reminder configuration, the snoozed entries
//! and the de-duplication marker behind one mutex. The host builds it once
//! at startup and shares it (usually as `Arc<StudyReminder>`) with whatever
//! records study events, and with the [`ReminderClock`](crate::ReminderClock)
//! that drives [`tick`](StudyReminder::tick).
//!
//! Lock discipline: the state mutex is held for one read-or-mutate step and
//! never across I/O. Persistence happens after the guard is released, on a
//! fresh snapshot.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::clock::{FiredMinute, MinuteGate};
use crate::dispatch::{
    ChannelKind, DispatchOutcome, FireDecision, ModalAction, NotificationDispatcher,
    RenderedMessage,
};
use crate::host::{Presenter, StudyHost};
use crate::schedule::{self, EntryOrigin, ScheduleEntry, TimeOfDay};
use crate::snooze::{SnoozeManager, DEFAULT_SNOOZE_MINUTES};
use crate::storage::{ConfigStore, ReminderConfig};
use crate::streak::StreakTransition;

struct ReminderState {
    config: ReminderConfig,
    snoozes: SnoozeManager,
    gate: MinuteGate,
}

pub struct StudyReminder {
    store: ConfigStore,
    host: Arc<dyn StudyHost>,
    dispatcher: NotificationDispatcher,
    state: Mutex<ReminderState>,
    /// Serializes saves so the file always ends with the newest snapshot.
    save_lock: Mutex<()>,
}

impl StudyReminder {
    /// Load the profile's configuration and probe notification channels.
    pub fn new(
        store: ConfigStore,
        host: Arc<dyn StudyHost>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self::with_dispatcher(store, host, NotificationDispatcher::new(presenter))
    }

    pub fn with_dispatcher(
        store: ConfigStore,
        host: Arc<dyn StudyHost>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        let config = store.load();
        tracing::info!(
            path = %store.path().display(),
            enabled = config.enabled,
            times = config.reminder_times.len(),
            "study reminder loaded"
        );
        Self {
            store,
            host,
            dispatcher,
            state: Mutex::new(ReminderState {
                config,
                snoozes: SnoozeManager::new(),
                gate: MinuteGate::default(),
            }),
            save_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReminderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the current configuration. Failures are logged; the next
    /// mutation retries.
    fn persist(&self) {
        let _saving = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.lock().config.clone();
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!(error = %e, "failed to save reminder config");
        }
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut ReminderConfig) -> R) -> R {
        let result = f(&mut self.lock().config);
        self.persist();
        result
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ReminderConfig {
        self.lock().config.clone()
    }

    /// Configured and snoozed entries, ordered by time.
    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        let state = self.lock();
        schedule::active_entries(&state.config.reminder_times, state.snoozes.entries())
    }

    pub fn streak(&self) -> u32 {
        self.lock().config.streak.current()
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn set_enabled(&self, enabled: bool) {
        self.mutate(|config| config.enabled = enabled);
    }

    pub fn set_reminder_times(&self, times: impl IntoIterator<Item = TimeOfDay>) {
        let times: BTreeSet<TimeOfDay> = times.into_iter().collect();
        self.mutate(|config| config.reminder_times = times);
    }

    /// Returns `false` if the time was already configured.
    pub fn add_reminder_time(&self, time: TimeOfDay) -> bool {
        self.mutate(|config| config.reminder_times.insert(time))
    }

    /// Returns `false` if the time was not configured.
    pub fn remove_reminder_time(&self, time: TimeOfDay) -> bool {
        self.mutate(|config| config.reminder_times.remove(&time))
    }

    pub fn set_daily_goal(&self, goal: u32) {
        self.mutate(|config| config.daily_goal = goal);
    }

    pub fn set_min_cards_due(&self, min: u32) {
        self.mutate(|config| config.min_cards_due = min);
    }

    // ── Streak ───────────────────────────────────────────────────────

    /// Record a study event on `today` and return the new streak.
    pub fn record_study_event(&self, today: NaiveDate) -> u32 {
        let (transition, streak) = {
            let mut state = self.lock();
            let transition = state.config.streak.record_study_event(today);
            (transition, state.config.streak.current())
        };
        if transition != StreakTransition::Unchanged {
            tracing::info!(?transition, streak, "study streak updated");
            self.persist();
        }
        streak
    }

    /// Hook for the host's "card answered" event.
    pub fn mark_studied_today(&self) -> u32 {
        self.record_study_event(Local::now().date_naive())
    }

    // ── Snooze ───────────────────────────────────────────────────────

    /// Schedule a one-shot reminder `minutes` after `now`.
    ///
    /// Snoozed entries are not persisted. Returns the new entry, or `None`
    /// if that minute was already scheduled.
    pub fn snooze(&self, now: NaiveDateTime, minutes: u32) -> Option<TimeOfDay> {
        let added = {
            let mut guard = self.lock();
            let state = &mut *guard;
            state
                .snoozes
                .snooze(now, minutes, &state.config.reminder_times)
        };
        match added {
            Some(time) => {
                tracing::info!(%time, minutes, "reminder snoozed");
                self.dispatcher
                    .show_tooltip(&format!("⏰ Reminder snoozed for {minutes} minutes"));
            }
            None => tracing::debug!(minutes, "snooze target already scheduled"),
        }
        added
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Evaluate the schedule at `now` and, on a match, notify.
    ///
    /// Never fails. Returns the dispatch outcome when a notification was
    /// attempted.
    pub fn tick(&self, now: NaiveDateTime) -> Option<DispatchOutcome> {
        if !self.host.is_ready() || !self.dispatcher.presenter_ready() {
            tracing::trace!("host not ready, skipping tick");
            return None;
        }

        let minute = FiredMinute::of(now);
        let (entry, config, streak_expired) = {
            let mut state = self.lock();
            if !state.config.enabled {
                return None;
            }
            let entry = schedule::find_entry(
                &state.config.reminder_times,
                state.snoozes.entries(),
                minute.time,
            )?;
            if !state.gate.try_fire(minute) {
                tracing::debug!(time = %minute.time, "already fired this minute");
                return None;
            }
            // Snoozed entries are one-shot. A configured entry on the same
            // minute also consumes a stale snooze.
            state.snoozes.take(entry.time);
            let streak_expired = state.config.streak.expire(minute.date);
            (entry, state.config.clone(), streak_expired)
        };

        if streak_expired {
            tracing::info!("study streak expired");
            self.persist();
        }

        let message = match self.host.counts() {
            Ok(counts) => {
                let decision = FireDecision::from_counts(counts);
                if !decision.should_celebrate && decision.actionable() < config.min_cards_due {
                    tracing::debug!(
                        time = %entry.time,
                        actionable = decision.actionable(),
                        min = config.min_cards_due,
                        "below due threshold, not reminding"
                    );
                    return None;
                }
                crate::dispatch::render(&decision, &config)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read study counts, sending generic reminder");
                RenderedMessage::fallback()
            }
        };

        tracing::info!(
            time = %entry.time,
            snoozed = entry.origin == EntryOrigin::Snoozed,
            kind = ?message.kind,
            "firing study reminder"
        );
        let shown_at = Instant::now();
        let outcome = self.dispatcher.deliver(&message);

        match outcome.action {
            Some(ModalAction::StartStudying) => {
                if let Err(e) = self.host.transition_to_study_mode() {
                    tracing::warn!(error = %e, "could not start study session");
                }
            }
            Some(ModalAction::RemindLater) => {
                // Snooze from when the user answered, not when the modal opened.
                let waited = chrono::Duration::from_std(shown_at.elapsed())
                    .unwrap_or_else(|_| chrono::Duration::zero());
                self.snooze(now + waited, DEFAULT_SNOOZE_MINUTES);
            }
            Some(ModalAction::Acknowledge) | None => {}
        }

        Some(outcome)
    }

    /// Push a test message through the system layer.
    pub fn send_test_notification(&self) -> Option<ChannelKind> {
        self.dispatcher.send_test_notification()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Modal, SystemChannel};
    use crate::error::{CoreError, NotificationError};
    use crate::host::StudyCounts;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct FakeHost {
        ready: AtomicBool,
        counts: Mutex<Option<StudyCounts>>,
        study_sessions: AtomicUsize,
    }

    impl FakeHost {
        fn with_counts(due: u32, new: u32, learning: u32) -> Arc<Self> {
            Arc::new(Self {
                ready: AtomicBool::new(true),
                counts: Mutex::new(Some(StudyCounts { new, learning, due })),
                study_sessions: AtomicUsize::new(0),
            })
        }
    }

    impl StudyHost for FakeHost {
        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        fn counts(&self) -> Result<StudyCounts, CoreError> {
            self.counts
                .lock()
                .unwrap()
                .ok_or_else(|| CoreError::HostUnavailable("no collection".into()))
        }

        fn transition_to_study_mode(&self) -> Result<(), CoreError> {
            self.study_sessions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ScriptedPresenter {
        answer: ModalAction,
        modals: Mutex<Vec<Modal>>,
        tooltips: Mutex<Vec<String>>,
    }

    impl ScriptedPresenter {
        fn answering(answer: ModalAction) -> Arc<Self> {
            Arc::new(Self {
                answer,
                modals: Mutex::new(Vec::new()),
                tooltips: Mutex::new(Vec::new()),
            })
        }
    }

    impl Presenter for ScriptedPresenter {
        fn show_modal(&self, modal: &Modal) -> Result<ModalAction, NotificationError> {
            self.modals.lock().unwrap().push(modal.clone());
            Ok(if modal.actions.contains(&self.answer) {
                self.answer
            } else {
                modal.actions[0]
            })
        }

        fn show_tooltip(&self, text: &str, _duration: Duration) -> Result<(), NotificationError> {
            self.tooltips.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn reminder(
        dir: &TempDir,
        host: Arc<FakeHost>,
        presenter: Arc<ScriptedPresenter>,
    ) -> StudyReminder {
        let dispatcher =
            NotificationDispatcher::with_system_channel(presenter, SystemChannel::Tooltip);
        StudyReminder::with_dispatcher(ConfigStore::for_profile(dir.path()), host, dispatcher)
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn disabled_never_fires() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, FakeHost::with_counts(50, 0, 0), presenter.clone());
        reminder.set_enabled(false);

        assert!(reminder.tick(at("2024-06-01 09:00:00")).is_none());
        assert!(presenter.modals.lock().unwrap().is_empty());
    }

    #[test]
    fn host_not_ready_is_a_no_op_and_keeps_the_minute() {
        let dir = TempDir::new().unwrap();
        let host = FakeHost::with_counts(50, 0, 0);
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, host.clone(), presenter);

        host.ready.store(false, Ordering::SeqCst);
        assert!(reminder.tick(at("2024-06-01 09:00:00")).is_none());

        host.ready.store(true, Ordering::SeqCst);
        assert!(reminder.tick(at("2024-06-01 09:00:30")).is_some());
    }

    #[test]
    fn below_threshold_is_suppressed() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, FakeHost::with_counts(2, 1, 0), presenter.clone());

        assert!(reminder.tick(at("2024-06-01 09:00:00")).is_none());
        assert!(presenter.modals.lock().unwrap().is_empty());
    }

    #[test]
    fn nothing_to_study_celebrates_despite_threshold() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, FakeHost::with_counts(0, 0, 0), presenter.clone());

        let outcome = reminder.tick(at("2024-06-01 14:00:00")).unwrap();
        assert_eq!(outcome.action, Some(ModalAction::Acknowledge));
        let modals = presenter.modals.lock().unwrap();
        assert_eq!(modals[0].kind, crate::MessageKind::Celebration);
    }

    #[test]
    fn start_studying_moves_host_to_study_mode() {
        let dir = TempDir::new().unwrap();
        let host = FakeHost::with_counts(9, 0, 0);
        let presenter = ScriptedPresenter::answering(ModalAction::StartStudying);
        let reminder = reminder(&dir, host.clone(), presenter);

        reminder.tick(at("2024-06-01 19:00:00")).unwrap();
        assert_eq!(host.study_sessions.load(Ordering::SeqCst), 1);
        assert!(reminder.schedule().iter().all(|e| e.origin == EntryOrigin::Configured));
    }

    #[test]
    fn remind_later_snoozes_and_fires_once() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::RemindLater);
        let reminder = reminder(&dir, FakeHost::with_counts(9, 0, 0), presenter.clone());

        reminder.tick(at("2024-06-01 14:00:00")).unwrap();
        let snoozed: Vec<_> = reminder
            .schedule()
            .into_iter()
            .filter(|e| e.origin == EntryOrigin::Snoozed)
            .collect();
        assert_eq!(snoozed.len(), 1);
        assert_eq!(snoozed[0].time, t("14:30"));
        assert!(presenter.tooltips.lock().unwrap().iter().any(|s| s.contains("snoozed for 30")));

        // The snoozed entry fires, is consumed, and snoozing again re-adds it.
        reminder.tick(at("2024-06-01 14:30:00")).unwrap();
        let snoozed: Vec<_> = reminder
            .schedule()
            .into_iter()
            .filter(|e| e.origin == EntryOrigin::Snoozed)
            .map(|e| e.time)
            .collect();
        assert_eq!(snoozed, vec![t("15:00")]);
    }

    #[test]
    fn snoozed_entries_are_not_persisted() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let host = FakeHost::with_counts(9, 0, 0);
        let first = reminder(&dir, host.clone(), presenter.clone());
        first.add_reminder_time(t("06:45"));
        assert_eq!(first.snooze(at("2024-06-01 10:00:00"), 30), Some(t("10:30")));

        let second = reminder(&dir, host, presenter);
        let times: Vec<_> = second.schedule().into_iter().map(|e| e.time).collect();
        assert!(times.contains(&t("06:45")));
        assert!(!times.contains(&t("10:30")));
    }

    #[test]
    fn counts_failure_sends_generic_reminder() {
        let dir = TempDir::new().unwrap();
        let host = FakeHost::with_counts(0, 0, 0);
        *host.counts.lock().unwrap() = None;
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, host, presenter.clone());

        let outcome = reminder.tick(at("2024-06-01 09:00:00")).unwrap();
        assert!(outcome.modal_shown);
        let modals = presenter.modals.lock().unwrap();
        assert_eq!(modals[0].body, crate::FALLBACK_BODY);
    }

    #[test]
    fn stale_streak_is_reset_when_firing() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, FakeHost::with_counts(9, 0, 0), presenter.clone());

        reminder.record_study_event("2024-05-28".parse().unwrap());
        reminder.record_study_event("2024-05-29".parse().unwrap());
        assert_eq!(reminder.streak(), 2);

        reminder.tick(at("2024-06-01 09:00:00")).unwrap();
        assert_eq!(reminder.streak(), 0);
        assert!(!presenter.modals.lock().unwrap()[0].body.contains("streak"));

        let saved = ConfigStore::for_profile(dir.path()).try_load().unwrap();
        assert_eq!(saved.streak.current_streak, 0);
    }

    #[test]
    fn live_streak_is_advertised() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, FakeHost::with_counts(9, 0, 0), presenter.clone());

        reminder.record_study_event("2024-05-31".parse().unwrap());
        reminder.tick(at("2024-06-01 09:00:00")).unwrap();
        assert!(presenter.modals.lock().unwrap()[0]
            .body
            .contains("🔥 Current streak: 1 day"));
    }

    #[test]
    fn setters_persist_immediately() {
        let dir = TempDir::new().unwrap();
        let presenter = ScriptedPresenter::answering(ModalAction::Acknowledge);
        let reminder = reminder(&dir, FakeHost::with_counts(9, 0, 0), presenter);

        reminder.set_reminder_times([t("07:15"), t("21:00")]);
        reminder.set_daily_goal(42);
        reminder.set_min_cards_due(1);
        assert!(reminder.remove_reminder_time(t("21:00")));
        assert!(!reminder.remove_reminder_time(t("21:00")));
        assert!(!reminder.add_reminder_time(t("07:15")));

        let saved = ConfigStore::for_profile(dir.path()).try_load().unwrap();
        assert_eq!(saved.reminder_times, BTreeSet::from([t("07:15")]));
        assert_eq!(saved.daily_goal, 42);
        assert_eq!(saved.min_cards_due, 1);
        assert_eq!(saved, reminder.config());
    }
}
