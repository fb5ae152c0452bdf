use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use studyminder_core::{
    ConfigStore, ReminderClock, StudyCounts, StudyReminder, DEFAULT_TICK_PERIOD,
};

use crate::terminal::{StaticHost, TerminalPresenter};

#[derive(Args)]
pub struct RunArgs {
    /// Cards due for review
    #[arg(long, default_value_t = 0)]
    due: u32,
    /// New cards to learn
    #[arg(long, default_value_t = 0)]
    new: u32,
    /// Cards in learning
    #[arg(long, default_value_t = 0)]
    learning: u32,
    /// Seconds between schedule checks
    #[arg(long, default_value_t = DEFAULT_TICK_PERIOD.as_secs())]
    interval_secs: u64,
}

fn reminder(store: ConfigStore, counts: StudyCounts) -> StudyReminder {
    StudyReminder::new(
        store,
        Arc::new(StaticHost::new(counts)),
        Arc::new(TerminalPresenter),
    )
}

pub fn run(store: ConfigStore, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let counts = StudyCounts {
        new: args.new,
        learning: args.learning,
        due: args.due,
    };
    let reminder = Arc::new(reminder(store, counts));
    let runtime = tokio::runtime::Runtime::new()?;

    let times: Vec<String> = reminder
        .schedule()
        .iter()
        .map(|entry| entry.time.to_string())
        .collect();
    println!(
        "studyminder running [{}] via {}; press Ctrl-C to stop",
        times.join(", "),
        reminder.dispatcher().system_channel()
    );

    let mut clock = ReminderClock::new(Duration::from_secs(args.interval_secs.max(1)));
    let ticking = Arc::clone(&reminder);
    clock.start(runtime.handle(), move |now| {
        ticking.tick(now);
    });

    runtime.block_on(tokio::signal::ctrl_c())?;
    clock.stop();
    tracing::info!("stopped");
    Ok(())
}

pub fn test_notify(store: ConfigStore) -> Result<(), Box<dyn std::error::Error>> {
    let reminder = reminder(store, StudyCounts::default());
    match reminder.send_test_notification() {
        Some(channel) => {
            println!("test notification sent via {channel}");
            Ok(())
        }
        None => Err("no notification channel delivered".into()),
    }
}
