//! Reminder delivery.
//!
//! The poller asks the store for due reminders, hands each to a [`Notifier`]
//! and marks it delivered once the notifier accepts it. The delivered flag is
//! persisted, so a reminder fires once even across restarts. A notifier
//! failure leaves the event undelivered and it is retried on the next poll.

use crate::errors::AppResult;
use crate::event::Event;
use crate::store::EventStore;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A reminder ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub event_id: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
    pub body: String,
}

impl Reminder {
    /// Builds the reminder text for `event`.
    ///
    /// # Examples
    ///
    /// ```
    /// use btodo::event::{date_from_ymd, time_from_hm, Event, EventDraft};
    /// use btodo::notify::Reminder;
    ///
    /// let draft = EventDraft::new("Meeting").at(time_from_hm(14, 0).unwrap()).with_description("Room 4");
    /// let event = Event::new("id", date_from_ymd(2025, 5, 5).unwrap(), draft).unwrap();
    /// let reminder = Reminder::from_event(&event);
    ///
    /// assert_eq!(reminder.title, "Reminder: Meeting");
    /// assert_eq!(reminder.body, "Event on 2025-05-05 at 14:00\nRoom 4");
    /// ```
    pub fn from_event(event: &Event) -> Self {
        let mut body = format!("Event on {}", event.date().format("%Y-%m-%d"));
        if let Some(time) = event.time() {
            body.push_str(&format!(" at {}", time.format("%H:%M")));
        }
        if let Some(description) = event.description() {
            body.push('\n');
            body.push_str(description);
        }

        Reminder {
            event_id: event.id().to_string(),
            date: event.date(),
            time: event.time(),
            title: format!("Reminder: {}", event.title()),
            body,
        }
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.title, self.body)
    }
}

/// Something that can show a reminder to the user.
pub trait Notifier {
    /// Delivers one reminder. An error leaves the event undelivered.
    fn notify(&mut self, reminder: &Reminder) -> AppResult<()>;
}

/// Emits reminders as `tracing` events.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, reminder: &Reminder) -> AppResult<()> {
        info!(
            event_id = %reminder.event_id,
            date = %reminder.date,
            "{}: {}",
            reminder.title,
            reminder.body.replace('\n', " | ")
        );
        Ok(())
    }
}

/// Prints reminders to standard output.
#[derive(Debug, Default)]
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&mut self, reminder: &Reminder) -> AppResult<()> {
        println!("{}\n", reminder);
        Ok(())
    }
}

/// Delivers every reminder due at `now` and returns how many were delivered.
///
/// # Errors
///
/// Returns an error if recording a delivery fails; reminders delivered before
/// that point stay recorded.
pub fn poll_once(
    store: &mut EventStore,
    now: NaiveDateTime,
    notifier: &mut dyn Notifier,
) -> AppResult<usize> {
    let due = store.events_due_for_notification(now);
    debug!("{} reminders due at {}", due.len(), now);

    let mut delivered = 0;
    for event in due {
        let reminder = Reminder::from_event(&event);
        if let Err(e) = notifier.notify(&reminder) {
            warn!("Reminder for {} on {} not delivered: {}", event.id(), event.date(), e);
            continue;
        }
        store.mark_delivered(event.date(), event.id())?;
        delivered += 1;
    }
    Ok(delivered)
}

/// Polls every `interval` on the calling thread until `should_stop` is true.
///
/// `should_stop` is checked after each poll. Store errors are logged and the
/// loop continues. Returns the total number of reminders delivered.
pub fn run_poller(
    store: &mut EventStore,
    notifier: &mut dyn Notifier,
    interval: Duration,
    mut should_stop: impl FnMut() -> bool,
) -> usize {
    info!("Watching for reminders every {:?}", interval);
    let mut total = 0;
    loop {
        match poll_once(store, Local::now().naive_local(), notifier) {
            Ok(count) => total += count,
            Err(e) => error!("Reminder poll failed: {}", e),
        }
        if should_stop() {
            break;
        }
        thread::sleep(interval);
    }
    info!("Stopped watching; {} reminders delivered", total);
    total
}
