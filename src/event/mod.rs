//! Calendar event model and input validation.
//!
//! This module contains pure logic with no I/O: the validated [`Event`] value
//! type, the user-editable [`EventDraft`], files carried by an event as
//! [`Attachment`]s, and parsers that turn user input into calendar dates and
//! times.
//!
//! Fields of an `Event` are private. Events are created and changed only by the
//! store, which re-validates and re-persists on every change.

use crate::constants::{
    ALL_DAY_REMINDER_HOUR, DATE_FORMAT_COMPACT, DATE_FORMAT_ISO, DEFAULT_NOTIFY_MINUTES,
    MAX_NOTIFY_MINUTES, TIME_FORMAT_12H, TIME_FORMAT_24H,
};
use crate::errors::ValidationError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// The user-editable part of an event.
///
/// # Examples
///
/// ```
/// use btodo::event::{time_from_hm, EventDraft};
///
/// let draft = EventDraft::new("Meeting")
///     .at(time_from_hm(14, 0).unwrap())
///     .with_description("Room 4")
///     .remind(15);
/// assert!(draft.notify);
/// assert_eq!(draft.notify_minutes_before, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Short title, required.
    pub title: String,
    /// Time of day; `None` means all-day.
    pub time: Option<NaiveTime>,
    /// Optional free text.
    pub description: Option<String>,
    /// Whether a reminder should fire.
    pub notify: bool,
    /// Reminder lead time in minutes.
    pub notify_minutes_before: u32,
    /// Files stored with the event, in the order they were added.
    pub attachments: Vec<Attachment>,
}

impl Default for EventDraft {
    fn default() -> Self {
        EventDraft {
            title: String::new(),
            time: None,
            description: None,
            notify: false,
            notify_minutes_before: DEFAULT_NOTIFY_MINUTES,
            attachments: Vec::new(),
        }
    }
}

impl EventDraft {
    /// Creates an all-day draft without a reminder.
    pub fn new(title: impl Into<String>) -> Self {
        EventDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the time of day.
    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enables the reminder with the given lead time.
    pub fn remind(mut self, minutes_before: u32) -> Self {
        self.notify = true;
        self.notify_minutes_before = minutes_before;
        self
    }

    /// Adds a file to the event.
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Trims text fields and checks the invariants shared by all events.
    fn normalize(self) -> Result<Self, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        if self.notify_minutes_before > MAX_NOTIFY_MINUTES {
            return Err(ValidationError::LeadTimeTooLong {
                minutes: self.notify_minutes_before,
                max: MAX_NOTIFY_MINUTES,
            });
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(EventDraft {
            title,
            description,
            ..self
        })
    }
}

/// A file stored with an event.
///
/// The name is a plain file name without directories; the contents are kept
/// as raw bytes.
///
/// # Examples
///
/// ```
/// use btodo::event::Attachment;
///
/// let attachment = Attachment::new("notes.txt", b"agenda".to_vec()).unwrap();
/// assert_eq!(attachment.filename(), "notes.txt");
/// assert_eq!(attachment.size(), 6);
///
/// assert!(Attachment::new("../notes.txt", Vec::new()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    data: Vec<u8>,
}

impl Attachment {
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidAttachmentName` for a blank name, one
    /// containing `/` or `\`, or `.`/`..`.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Result<Self, ValidationError> {
        let filename = filename.into();
        let plain = !filename.trim().is_empty()
            && !filename.contains(['/', '\\'])
            && filename != "."
            && filename != "..";
        if !plain {
            return Err(ValidationError::InvalidAttachmentName(filename));
        }
        Ok(Attachment { filename, data })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the contents in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("size", &self.data.len())
            .finish()
    }
}

/// A validated calendar entry owned by the store.
///
/// Invariants: the title is non-empty and trimmed, the description is either
/// absent or non-empty, and the lead time is within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: String,
    date: NaiveDate,
    time: Option<NaiveTime>,
    title: String,
    description: Option<String>,
    notify: bool,
    notify_minutes_before: u32,
    attachments: Vec<Attachment>,
    delivered: bool,
}

impl Event {
    /// Builds a new, undelivered event from a draft.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTitle` when the title is blank, or
    /// `ValidationError::LeadTimeTooLong` when the lead time is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use btodo::event::{date_from_ymd, Event, EventDraft};
    ///
    /// let date = date_from_ymd(2025, 5, 5).unwrap();
    /// let event = Event::new("id-1", date, EventDraft::new("  Dentist ")).unwrap();
    /// assert_eq!(event.title(), "Dentist");
    /// assert!(event.is_all_day());
    ///
    /// assert!(Event::new("id-2", date, EventDraft::new("   ")).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        draft: EventDraft,
    ) -> Result<Self, ValidationError> {
        let draft = draft.normalize()?;
        Ok(Event {
            id: id.into(),
            date,
            time: draft.time,
            title: draft.title,
            description: draft.description,
            notify: draft.notify,
            notify_minutes_before: draft.notify_minutes_before,
            attachments: draft.attachments,
            delivered: false,
        })
    }

    /// Rebuilds a stored event, keeping its delivered flag.
    pub(crate) fn restore(
        id: String,
        date: NaiveDate,
        draft: EventDraft,
        delivered: bool,
    ) -> Result<Self, ValidationError> {
        let mut event = Event::new(id, date, draft)?;
        event.delivered = delivered;
        Ok(event)
    }

    /// Replaces the editable fields.
    ///
    /// The delivered flag is cleared when the reminder would now fire at a
    /// different instant, so a rescheduled reminder fires again.
    pub(crate) fn apply(&mut self, draft: EventDraft) -> Result<(), ValidationError> {
        let draft = draft.normalize()?;
        let previous_schedule = self.reminder_schedule();

        self.time = draft.time;
        self.title = draft.title;
        self.description = draft.description;
        self.notify = draft.notify;
        self.notify_minutes_before = draft.notify_minutes_before;
        self.attachments = draft.attachments;

        if self.reminder_schedule() != previous_schedule {
            self.delivered = false;
        }
        Ok(())
    }

    /// Moves the event to another day, clearing delivery when the day changes.
    pub(crate) fn relocate(&mut self, date: NaiveDate) {
        if self.date != date {
            self.date = date;
            self.delivered = false;
        }
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub(crate) fn mark_delivered(&mut self) {
        self.delivered = true;
    }

    /// Identifier, unique within the event's day.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The day this event belongs to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Time of day, or `None` for all-day events.
    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether a reminder should fire for this event.
    pub fn notify(&self) -> bool {
        self.notify
    }

    pub fn notify_minutes_before(&self) -> u32 {
        self.notify_minutes_before
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Whether the reminder has already been shown.
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    /// Returns a draft holding this event's editable fields.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            time: self.time,
            description: self.description.clone(),
            notify: self.notify,
            notify_minutes_before: self.notify_minutes_before,
            attachments: self.attachments.clone(),
        }
    }

    /// The nominal start used for scheduling: the event time, or 09:00 for
    /// all-day events.
    pub fn scheduled_start(&self) -> NaiveDateTime {
        let time = self.time.unwrap_or_else(all_day_reminder_time);
        self.date.and_time(time)
    }

    /// The instant at which the reminder becomes due.
    ///
    /// # Examples
    ///
    /// ```
    /// use btodo::event::{date_from_ymd, time_from_hm, Event, EventDraft};
    ///
    /// let date = date_from_ymd(2025, 5, 5).unwrap();
    /// let draft = EventDraft::new("Meeting").at(time_from_hm(14, 0).unwrap()).remind(30);
    /// let event = Event::new("id", date, draft).unwrap();
    /// assert_eq!(event.remind_at(), date.and_time(time_from_hm(13, 30).unwrap()));
    /// ```
    ///
    /// Saturates at the earliest representable instant for events at the very
    /// start of the calendar.
    pub fn remind_at(&self) -> NaiveDateTime {
        self.scheduled_start()
            .checked_sub_signed(Duration::minutes(i64::from(self.notify_minutes_before)))
            .unwrap_or(NaiveDateTime::MIN)
    }

    fn reminder_schedule(&self) -> Option<NaiveDateTime> {
        self.notify.then(|| self.remind_at())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} - {}", time.format(TIME_FORMAT_24H), self.title),
            None => write!(f, "All Day - {}", self.title),
        }
    }
}

fn all_day_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(ALL_DAY_REMINDER_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Builds a date from its parts, rejecting days that do not exist.
///
/// # Examples
///
/// ```
/// use btodo::event::date_from_ymd;
///
/// assert!(date_from_ymd(2024, 2, 29).is_ok());
/// assert!(date_from_ymd(2025, 2, 29).is_err());
/// ```
pub fn date_from_ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ValidationError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))
}

/// Parses a date in `YYYY-MM-DD` or `YYYYMMDD` format.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT_ISO)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, DATE_FORMAT_COMPACT))
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

/// Builds a time of day from hours and minutes.
pub fn time_from_hm(hour: u32, minute: u32) -> Result<NaiveTime, ValidationError> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ValidationError::InvalidTime(format!("{:02}:{:02}", hour, minute)))
}

/// Parses a time in `HH:MM` (24-hour) or `hh:mm AM/PM` format.
///
/// # Examples
///
/// ```
/// use btodo::event::{parse_time, time_from_hm};
///
/// assert_eq!(parse_time("14:05").unwrap(), time_from_hm(14, 5).unwrap());
/// assert_eq!(parse_time("02:05 PM").unwrap(), time_from_hm(14, 5).unwrap());
/// assert!(parse_time("24:10").is_err());
/// ```
pub fn parse_time(input: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT_24H)
        .or_else(|_| NaiveTime::parse_from_str(&trimmed.to_uppercase(), TIME_FORMAT_12H))
        .map_err(|_| ValidationError::InvalidTime(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    #[test]
    fn test_new_event_normalizes_fields() {
        let draft = EventDraft::new("  Standup  ").with_description("   ");
        let event = Event::new("a", may_5(), draft).unwrap();

        assert_eq!(event.title(), "Standup");
        assert_eq!(event.description(), None);
        assert!(!event.is_delivered());
        assert!(!event.notify());
        assert_eq!(event.notify_minutes_before(), DEFAULT_NOTIFY_MINUTES);
    }

    #[test]
    fn test_empty_title_rejected() {
        let result = Event::new("a", may_5(), EventDraft::new(""));
        assert_eq!(result.unwrap_err(), ValidationError::EmptyTitle);

        let result = Event::new("a", may_5(), EventDraft::new(" \t\n"));
        assert_eq!(result.unwrap_err(), ValidationError::EmptyTitle);
    }

    #[test]
    fn test_lead_time_bounds() {
        let ok = EventDraft::new("Trip").remind(MAX_NOTIFY_MINUTES);
        assert!(Event::new("a", may_5(), ok).is_ok());

        let too_long = EventDraft::new("Trip").remind(MAX_NOTIFY_MINUTES + 1);
        assert!(matches!(
            Event::new("a", may_5(), too_long),
            Err(ValidationError::LeadTimeTooLong { .. })
        ));
    }

    #[test]
    fn test_all_day_reminder_uses_nominal_hour() {
        let event = Event::new("a", may_5(), EventDraft::new("Birthday").remind(60)).unwrap();
        let expected = may_5().and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(event.remind_at(), expected);
    }

    #[test]
    fn test_reminder_can_fall_on_previous_day() {
        let draft = EventDraft::new("Early flight")
            .at(time_from_hm(0, 15).unwrap())
            .remind(30);
        let event = Event::new("a", may_5(), draft).unwrap();
        assert_eq!(
            event.remind_at(),
            NaiveDate::from_ymd_opt(2025, 5, 4)
                .unwrap()
                .and_hms_opt(23, 45, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_reminder_before_first_day_saturates() {
        let draft = EventDraft::new("Epoch").remind(MAX_NOTIFY_MINUTES);
        let event = Event::new("a", NaiveDate::MIN, draft).unwrap();
        assert_eq!(event.remind_at(), NaiveDateTime::MIN);

        let timed = EventDraft::new("Epoch").at(time_from_hm(0, 0).unwrap()).remind(1);
        let event = Event::new("b", NaiveDate::MIN, timed).unwrap();
        assert_eq!(event.remind_at(), NaiveDateTime::MIN);
    }

    #[test]
    fn test_apply_resets_delivery_only_when_schedule_changes() {
        let draft = EventDraft::new("Call").at(time_from_hm(10, 0).unwrap()).remind(10);
        let mut event = Event::new("a", may_5(), draft.clone()).unwrap();
        event.mark_delivered();

        event
            .apply(draft.clone().with_description("agenda attached"))
            .unwrap();
        assert!(event.is_delivered());

        event.apply(draft.at(time_from_hm(11, 0).unwrap())).unwrap();
        assert!(!event.is_delivered());
    }

    #[test]
    fn test_apply_rejects_invalid_draft_without_changes() {
        let mut event = Event::new("a", may_5(), EventDraft::new("Call")).unwrap();
        let before = event.clone();

        assert!(event.apply(EventDraft::new("")).is_err());
        assert_eq!(event, before);
    }

    #[test]
    fn test_relocate_clears_delivery() {
        let mut event = Event::new("a", may_5(), EventDraft::new("Call").remind(5)).unwrap();
        event.mark_delivered();

        event.relocate(may_5());
        assert!(event.is_delivered());

        event.relocate(NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
        assert!(!event.is_delivered());
    }

    #[test]
    fn test_attachment_names_must_be_plain() {
        assert!(Attachment::new("scan 01.pdf", vec![1, 2, 3]).is_ok());
        for name in ["", "  ", "docs/scan.pdf", "C:\\scan.pdf", ".", ".."] {
            assert_eq!(
                Attachment::new(name, Vec::new()).unwrap_err(),
                ValidationError::InvalidAttachmentName(name.to_string())
            );
        }
    }

    #[test]
    fn test_attachments_follow_edits_without_rearming() {
        let photo = Attachment::new("r.png", b"hello".to_vec()).unwrap();
        let draft = EventDraft::new("Checkup").remind(15).attach(photo.clone());
        let mut event = Event::new("a", may_5(), draft).unwrap();
        event.mark_delivered();
        assert_eq!(event.attachments(), &[photo.clone()]);

        let notes = Attachment::new("notes.txt", b"bring card".to_vec()).unwrap();
        event.apply(event.to_draft().attach(notes)).unwrap();
        let names: Vec<_> = event.attachments().iter().map(Attachment::filename).collect();
        assert_eq!(names, vec!["r.png", "notes.txt"]);
        assert!(event.is_delivered());

        let debug = format!("{:?}", photo);
        assert!(debug.contains("size: 5"));
        assert!(!debug.contains("104"));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-05-05").unwrap(), may_5());
        assert_eq!(parse_date("20250505").unwrap(), may_5());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_date_from_ymd_rejects_impossible_dates() {
        assert!(date_from_ymd(2025, 4, 31).is_err());
        assert!(date_from_ymd(2025, 0, 1).is_err());
        assert_eq!(date_from_ymd(2025, 5, 5).unwrap(), may_5());
    }

    #[test]
    fn test_parse_time_formats() {
        let two_pm = time_from_hm(14, 0).unwrap();
        assert_eq!(parse_time("14:00").unwrap(), two_pm);
        assert_eq!(parse_time("02:00 PM").unwrap(), two_pm);
        assert_eq!(parse_time("02:00 pm").unwrap(), two_pm);
        assert_eq!(parse_time("12:30 AM").unwrap(), time_from_hm(0, 30).unwrap());
        assert!(parse_time("14:60").is_err());
        assert!(parse_time("").is_err());
        assert!(time_from_hm(24, 0).is_err());
    }

    #[test]
    fn test_display() {
        let timed = Event::new(
            "a",
            may_5(),
            EventDraft::new("Meeting").at(time_from_hm(9, 5).unwrap()),
        )
        .unwrap();
        assert_eq!(timed.to_string(), "09:05 - Meeting");

        let all_day = Event::new("b", may_5(), EventDraft::new("Holiday")).unwrap();
        assert_eq!(all_day.to_string(), "All Day - Holiday");
    }
}
