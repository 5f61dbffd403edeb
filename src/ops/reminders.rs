//! Due-reminder listing and the reminder watcher.

use crate::errors::{AppResult, ValidationError};
use crate::event::parse_date;
use crate::notify::{self, LogNotifier, Notifier, PrintNotifier, Reminder};
use crate::store::EventStore;
use chrono::{Local, NaiveDateTime, NaiveTime};
use std::io::Write;
use std::time::Duration;
use tracing::info;

const REFERENCE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Prints reminders due at `at` (or `now`) and optionally records them as
/// delivered. Returns the number of reminders listed.
pub fn show_due(
    store: &mut EventStore,
    at: Option<&str>,
    now: NaiveDateTime,
    mark: bool,
    out: &mut dyn Write,
) -> AppResult<usize> {
    let reference = match at {
        Some(raw) => parse_reference_time(raw)?,
        None => now,
    };

    let due = store.events_due_for_notification(reference);
    if due.is_empty() {
        writeln!(out, "No reminders due.")?;
        return Ok(0);
    }

    for event in &due {
        writeln!(out, "{}  [{}]\n", Reminder::from_event(event), event.id())?;
        if mark {
            store.mark_delivered(event.date(), event.id())?;
        }
    }
    if mark {
        info!("Marked {} reminders as delivered", due.len());
    }
    Ok(due.len())
}

/// Prints reminders as they fall due, polling every `interval`.
///
/// With `once` a single poll runs at the current time. Otherwise the watcher
/// runs until the process is interrupted. `log_only` routes reminders through
/// `tracing` instead of standard output.
pub fn watch(
    store: &mut EventStore,
    interval: Duration,
    once: bool,
    log_only: bool,
) -> AppResult<usize> {
    let mut notifier: Box<dyn Notifier> = if log_only {
        Box::new(LogNotifier)
    } else {
        Box::new(PrintNotifier)
    };
    if once {
        return notify::poll_once(store, Local::now().naive_local(), notifier.as_mut());
    }
    Ok(notify::run_poller(store, notifier.as_mut(), interval, || false))
}

/// Parses `YYYY-MM-DD HH:MM`; a bare date means midnight.
fn parse_reference_time(raw: &str) -> AppResult<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in REFERENCE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    match parse_date(trimmed) {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN)),
        Err(_) => Err(ValidationError::InvalidDate(raw.to_string()).into()),
    }
}
