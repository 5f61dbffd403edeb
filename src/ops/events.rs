//! Adding, listing, editing, moving and deleting events, and reading their
//! attachments back out.

use crate::cli::{EventFields, EventTarget};
use crate::constants::DATE_FORMAT_ISO;
use crate::errors::{AppError, AppResult, ValidationError};
use crate::event::{date_from_ymd, parse_date, parse_time, Attachment, Event, EventDraft};
use crate::store::atomic::write_atomic;
use crate::store::EventStore;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Creates an event from command-line fields.
pub fn add_event(
    store: &mut EventStore,
    date: &str,
    title: &str,
    fields: &EventFields,
) -> AppResult<Event> {
    let date = parse_date(date)?;
    let draft = apply_fields(EventDraft::new(title), fields)?;
    store.create_event(date, draft)
}

/// Prints the events of one day, or of a month when `month` is given.
///
/// With neither argument the events of `today` are listed. Returns the number
/// of events printed.
pub fn list_events(
    store: &EventStore,
    date: Option<&str>,
    month: Option<&str>,
    today: NaiveDate,
    out: &mut dyn Write,
) -> AppResult<usize> {
    let events: Vec<&Event> = match (date, month) {
        (_, Some(month)) => {
            let (year, month) = parse_month(month)?;
            store.events_in_month(year, month)?
        }
        (Some(date), None) => store.events_on(parse_date(date)?).iter().collect(),
        (None, None) => store.events_on(today).iter().collect(),
    };
    debug!("Listing {} events", events.len());

    if events.is_empty() {
        writeln!(out, "No events.")?;
        return Ok(0);
    }

    let mut current_day = None;
    for event in &events {
        if current_day != Some(event.date()) {
            current_day = Some(event.date());
            writeln!(out, "{}", event.date().format(DATE_FORMAT_ISO))?;
        }
        write!(out, "  {}  [{}]", event, event.id())?;
        if event.notify() {
            write!(out, "  (reminder {} min before", event.notify_minutes_before())?;
            if event.is_delivered() {
                write!(out, ", delivered")?;
            }
            write!(out, ")")?;
        }
        writeln!(out)?;
        if let Some(description) = event.description() {
            writeln!(out, "      {}", description)?;
        }
        if !event.attachments().is_empty() {
            let names: Vec<&str> = event.attachments().iter().map(Attachment::filename).collect();
            writeln!(out, "      Attachments: {}", names.join(", "))?;
        }
    }
    Ok(events.len())
}

/// Applies the given changes to an existing event; unspecified fields keep
/// their current values.
pub fn edit_event(
    store: &mut EventStore,
    target: &EventTarget,
    title: Option<&str>,
    fields: &EventFields,
) -> AppResult<Event> {
    let date = parse_date(&target.date)?;
    let mut draft = current_draft(store, date, &target.id)?;
    if let Some(title) = title {
        draft.title = title.to_string();
    }
    let draft = apply_fields(draft, fields)?;
    store.update_event(date, &target.id, draft)
}

pub fn move_event(store: &mut EventStore, target: &EventTarget, to: &str) -> AppResult<Event> {
    let from = parse_date(&target.date)?;
    let to = parse_date(to)?;
    let draft = current_draft(store, from, &target.id)?;
    store.move_event(from, &target.id, to, draft)
}

pub fn delete_event(store: &mut EventStore, target: &EventTarget) -> AppResult<()> {
    let date = parse_date(&target.date)?;
    store.delete_event(date, &target.id)
}

/// Writes the contents of the attachment `name` to `output`. Returns the
/// number of bytes written.
pub fn extract_attachment(
    store: &EventStore,
    target: &EventTarget,
    name: &str,
    output: &Path,
    out: &mut dyn Write,
) -> AppResult<usize> {
    let date = parse_date(&target.date)?;
    let event = store.event(date, &target.id).ok_or_else(|| AppError::NotFound {
        date,
        id: target.id.clone(),
    })?;
    let attachment = event
        .attachments()
        .iter()
        .find(|a| a.filename() == name)
        .ok_or_else(|| ValidationError::UnknownAttachment(name.to_string()))?;

    write_atomic(output, attachment.data())?;
    info!("Extracted attachment {} of event {} to {:?}", name, target.id, output);
    writeln!(out, "Wrote {} ({} bytes) to {}", name, attachment.size(), output.display())?;
    Ok(attachment.size())
}

fn current_draft(store: &EventStore, date: NaiveDate, id: &str) -> AppResult<EventDraft> {
    store
        .event(date, id)
        .map(Event::to_draft)
        .ok_or_else(|| AppError::NotFound {
            date,
            id: id.to_string(),
        })
}

/// Overlays command-line fields on a draft.
fn apply_fields(mut draft: EventDraft, fields: &EventFields) -> AppResult<EventDraft> {
    if let Some(time) = &fields.time {
        draft.time = Some(parse_time(time)?);
    }
    if fields.all_day {
        draft.time = None;
    }
    if let Some(description) = &fields.description {
        draft.description = Some(description.clone());
    }
    if fields.clear_description {
        draft.description = None;
    }
    if let Some(minutes) = fields.remind {
        draft = draft.remind(minutes);
    }
    if fields.no_remind {
        draft.notify = false;
    }
    for name in &fields.detach {
        let before = draft.attachments.len();
        draft.attachments.retain(|a| a.filename() != name);
        if draft.attachments.len() == before {
            return Err(ValidationError::UnknownAttachment(name.clone()).into());
        }
    }
    for path in &fields.attach {
        draft = draft.attach(read_attachment(path)?);
    }
    Ok(draft)
}

/// Reads a file into an attachment named after its last path component.
fn read_attachment(path: &Path) -> AppResult<Attachment> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ValidationError::InvalidAttachmentName(path.display().to_string()))?;
    let data = fs::read(path)?;
    debug!("Read {} byte attachment {}", data.len(), filename);
    Ok(Attachment::new(filename, data)?)
}

/// Parses `YYYY-MM` into a year and month.
pub fn parse_month(input: &str) -> Result<(i32, u32), ValidationError> {
    let invalid = || ValidationError::InvalidDate(input.to_string());
    let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    date_from_ymd(year, month, 1).map_err(|_| invalid())?;
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secret;
    use tempfile::{tempdir, TempDir};

    fn open_temp() -> (TempDir, EventStore) {
        let dir = tempdir().unwrap();
        let store = EventStore::open(dir.path().join("store.enc"), &Secret::new("abc").unwrap())
            .unwrap();
        (dir, store)
    }

    fn timed(time: &str) -> EventFields {
        EventFields {
            time: Some(time.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-05").unwrap(), (2025, 5));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("May 2025").is_err());
    }

    #[test]
    fn test_add_and_list() {
        let (_dir, mut store) = open_temp();
        add_event(&mut store, "2025-05-05", "Meeting", &timed("2:00 pm")).unwrap();
        add_event(&mut store, "20250505", "Holiday", &EventFields::default()).unwrap();

        let mut out = Vec::new();
        let today = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let count = list_events(&store, None, None, today, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(count, 2);
        assert!(text.starts_with("2025-05-05\n"));
        assert!(text.contains("14:00 - Meeting"));
        assert!(text.contains("All Day - Holiday"));
    }

    #[test]
    fn test_list_empty_day() {
        let (_dir, store) = open_temp();
        let mut out = Vec::new();
        let count = list_events(&store, Some("2025-05-05"), None, NaiveDate::MIN, &mut out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "No events.\n");
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let (_dir, mut store) = open_temp();
        let fields = EventFields {
            time: Some("09:30".to_string()),
            description: Some("Bring notes".to_string()),
            remind: Some(10),
            ..Default::default()
        };
        let event = add_event(&mut store, "2025-05-05", "Standup", &fields).unwrap();
        let target = EventTarget {
            date: "2025-05-05".to_string(),
            id: event.id().to_string(),
        };

        let edited = edit_event(&mut store, &target, Some("Daily standup"), &EventFields::default())
            .unwrap();
        assert_eq!(edited.title(), "Daily standup");
        assert_eq!(edited.time(), event.time());
        assert_eq!(edited.description(), Some("Bring notes"));
        assert_eq!(edited.notify_minutes_before(), 10);

        let cleared = EventFields {
            all_day: true,
            clear_description: true,
            no_remind: true,
            ..Default::default()
        };
        let edited = edit_event(&mut store, &target, None, &cleared).unwrap();
        assert!(edited.is_all_day());
        assert!(edited.description().is_none());
        assert!(!edited.notify());
    }

    #[test]
    fn test_attach_list_extract_detach() {
        let (dir, mut store) = open_temp();
        let source = dir.path().join("r.png");
        fs::write(&source, b"hello").unwrap();

        let fields = EventFields {
            attach: vec![source],
            ..Default::default()
        };
        let event = add_event(&mut store, "2025-05-05", "Checkup", &fields).unwrap();
        assert_eq!(event.attachments()[0].filename(), "r.png");
        let target = EventTarget {
            date: "2025-05-05".to_string(),
            id: event.id().to_string(),
        };

        let mut out = Vec::new();
        list_events(&store, Some("2025-05-05"), None, NaiveDate::MIN, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Attachments: r.png"));

        let copy = dir.path().join("copy.png");
        let mut out = Vec::new();
        assert_eq!(extract_attachment(&store, &target, "r.png", &copy, &mut out).unwrap(), 5);
        assert_eq!(fs::read(&copy).unwrap(), b"hello");
        assert!(matches!(
            extract_attachment(&store, &target, "missing.png", &copy, &mut out),
            Err(AppError::Validation(ValidationError::UnknownAttachment(_)))
        ));

        let detach = EventFields {
            detach: vec!["r.png".to_string()],
            ..Default::default()
        };
        let edited = edit_event(&mut store, &target, None, &detach).unwrap();
        assert!(edited.attachments().is_empty());
        assert!(matches!(
            edit_event(&mut store, &target, None, &detach),
            Err(AppError::Validation(ValidationError::UnknownAttachment(_)))
        ));
    }

    #[test]
    fn test_missing_attachment_file_adds_nothing() {
        let (dir, mut store) = open_temp();
        let fields = EventFields {
            attach: vec![dir.path().join("nope.pdf")],
            ..Default::default()
        };
        assert!(matches!(
            add_event(&mut store, "2025-05-05", "Checkup", &fields),
            Err(AppError::Io(_))
        ));
        assert_eq!(store.event_count(), 0);
    }

    #[test]
    fn test_move_and_delete_by_target() {
        let (_dir, mut store) = open_temp();
        let event = add_event(&mut store, "2025-05-05", "Trip", &EventFields::default()).unwrap();
        let target = EventTarget {
            date: "2025-05-05".to_string(),
            id: event.id().to_string(),
        };

        let moved = move_event(&mut store, &target, "2025-05-09").unwrap();
        assert_eq!(moved.date(), NaiveDate::from_ymd_opt(2025, 5, 9).unwrap());
        assert!(matches!(
            delete_event(&mut store, &target),
            Err(AppError::NotFound { .. })
        ));

        let moved_target = EventTarget {
            date: "2025-05-09".to_string(),
            id: moved.id().to_string(),
        };
        delete_event(&mut store, &moved_target).unwrap();
        assert_eq!(store.event_count(), 0);
    }
}
