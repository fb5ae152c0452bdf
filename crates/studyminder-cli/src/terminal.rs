//! Terminal stand-ins for the host application.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use studyminder_core::{
    ChannelKind, CoreError, Modal, ModalAction, NotificationError, Presenter, StudyCounts,
    StudyHost,
};

/// Study engine reporting fixed counts.
pub struct StaticHost {
    counts: StudyCounts,
}

impl StaticHost {
    pub fn new(counts: StudyCounts) -> Self {
        Self { counts }
    }
}

impl StudyHost for StaticHost {
    fn is_ready(&self) -> bool {
        true
    }

    fn counts(&self) -> Result<StudyCounts, CoreError> {
        Ok(self.counts)
    }

    fn transition_to_study_mode(&self) -> Result<(), CoreError> {
        println!("📖 starting study session");
        Ok(())
    }
}

/// Prints tooltips and modals to stdout; modal choices are read from stdin.
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn show_modal(&self, modal: &Modal) -> Result<ModalAction, NotificationError> {
        let failed = |message: String| NotificationError::DeliveryFailed {
            channel: ChannelKind::InAppModal,
            message,
        };

        let mut out = io::stdout().lock();
        let written = (|| -> io::Result<()> {
            writeln!(out, "\n{} {}", modal.icon, modal.title)?;
            writeln!(out, "{}", modal.body)?;
            for (i, action) in modal.actions.iter().enumerate() {
                writeln!(out, "  [{}] {}", i + 1, action.label())?;
            }
            write!(out, "> ")?;
            out.flush()
        })();
        drop(out);
        written.map_err(|e| failed(e.to_string()))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| failed(e.to_string()))?;
        if read == 0 {
            return Err(failed("stdin closed".to_string()));
        }

        line.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| modal.actions.get(i).copied())
            .ok_or_else(|| failed(format!("no such choice: {}", line.trim())))
    }

    fn show_tooltip(&self, text: &str, _duration: Duration) -> Result<(), NotificationError> {
        println!("💬 {text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_host_reports_its_counts() {
        let counts = StudyCounts {
            new: 3,
            learning: 1,
            due: 12,
        };
        let host = StaticHost::new(counts);
        assert!(host.is_ready());
        assert_eq!(host.counts().unwrap(), counts);
        assert_eq!(host.counts().unwrap().total(), 16);
    }

    #[test]
    fn terminal_presenter_has_no_tray() {
        assert!(!TerminalPresenter.has_tray_icon());
        assert!(TerminalPresenter.is_ready());
    }
}
