//! iCalendar export.
//!
//! Produces an RFC 5545 document with one `VEVENT` per stored event. All-day
//! events use `VALUE=DATE` start and end (end exclusive, the next day); timed
//! events are written as floating local times lasting one hour. Events with a
//! reminder carry a display `VALARM`.

use crate::constants::{DATE_FORMAT_COMPACT, ICS_PRODID, ICS_TIMED_EVENT_MINUTES, ICS_UID_DOMAIN};
use crate::errors::{AppError, AppResult};
use crate::event::Event;
use crate::store::{Calendar, DateRange};
use chrono::{Duration, Utc};
use icalendar::{Alarm, Component, EventLike, Property, Trigger, ValueType};
use tracing::debug;

const DATETIME_FORMAT_FLOATING: &str = "%Y%m%dT%H%M%S";
const DATETIME_FORMAT_UTC: &str = "%Y%m%dT%H%M%SZ";

/// Renders every event of `calendar` within `range` as an `.ics` document.
///
/// # Errors
///
/// Returns `AppError::Export` if an event's end falls outside the representable
/// date range.
pub fn to_ics(calendar: &Calendar, range: DateRange) -> AppResult<String> {
    let dtstamp = Utc::now().format(DATETIME_FORMAT_UTC).to_string();
    let mut ics = icalendar::Calendar::new();

    let mut count = 0;
    for event in calendar.events_in(range) {
        ics.push(to_vevent(event, &dtstamp)?);
        count += 1;
    }

    debug!("Exported {} events", count);
    Ok(set_prodid(&ics.done().to_string()))
}

fn to_vevent(event: &Event, dtstamp: &str) -> AppResult<icalendar::Event> {
    let mut vevent = icalendar::Event::new();
    vevent.uid(&format!("{}@{}", event.id(), ICS_UID_DOMAIN));
    vevent.add_property("DTSTAMP", dtstamp);
    vevent.summary(event.title());

    if event.is_all_day() {
        let end = event.date().succ_opt().ok_or_else(|| out_of_range(event))?;
        vevent.append_property(date_property("DTSTART", event.date().format(DATE_FORMAT_COMPACT)));
        vevent.append_property(date_property("DTEND", end.format(DATE_FORMAT_COMPACT)));
    } else {
        let start = event.scheduled_start();
        let end = start
            .checked_add_signed(Duration::minutes(ICS_TIMED_EVENT_MINUTES))
            .ok_or_else(|| out_of_range(event))?;
        vevent.add_property("DTSTART", start.format(DATETIME_FORMAT_FLOATING).to_string());
        vevent.add_property("DTEND", end.format(DATETIME_FORMAT_FLOATING).to_string());
    }

    if let Some(description) = event.description() {
        vevent.description(description);
    }

    if event.notify() {
        let lead = Duration::minutes(i64::from(event.notify_minutes_before()));
        vevent.alarm(Alarm::display(event.title(), Trigger::before_start(lead)));
    }

    Ok(vevent.done())
}

fn date_property(name: &str, value: impl ToString) -> Property {
    let mut property = Property::new(name, value.to_string());
    property.append_parameter(ValueType::Date);
    property
}

/// Replaces the library's default product identifier with ours.
fn set_prodid(ics: &str) -> String {
    let mut output = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            output.push_str("PRODID:");
            output.push_str(ICS_PRODID);
        } else {
            output.push_str(line);
        }
        output.push_str("\r\n");
    }
    output
}

fn out_of_range(event: &Event) -> AppError {
    AppError::Export(format!(
        "event {} on {} ends outside the supported date range",
        event.id(),
        event.date()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{date_from_ymd, time_from_hm, EventDraft};
    use chrono::NaiveDate;
    use icalendar::parser::{self, read_calendar, unfold};
    use icalendar::{CalendarDateTime, DatePerhapsTime};

    fn time_prop(component: &parser::Component<'_>, name: &str) -> Option<DatePerhapsTime> {
        component
            .find_prop(name)
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
    }

    fn calendar_with(events: Vec<(NaiveDate, EventDraft)>) -> Calendar {
        let mut calendar = Calendar::new();
        for (date, draft) in events {
            let id = calendar.fresh_id(date);
            calendar.insert(Event::new(id, date, draft).unwrap()).unwrap();
        }
        calendar
    }

    #[test]
    fn test_all_day_and_timed_events() {
        let may_5 = date_from_ymd(2025, 5, 5).unwrap();
        let calendar = calendar_with(vec![
            (may_5, EventDraft::new("Holiday")),
            (
                may_5,
                EventDraft::new("Meeting")
                    .at(time_from_hm(14, 0).unwrap())
                    .with_description("Room 4"),
            ),
        ]);

        let ics = to_ics(&calendar, DateRange::all()).unwrap();
        let unfolded = unfold(&ics);
        let parsed = read_calendar(&unfolded).unwrap();
        let vevents: Vec<_> = parsed
            .components
            .iter()
            .filter(|c| c.name == "VEVENT")
            .collect();
        assert_eq!(vevents.len(), 2);

        let holiday = vevents[0];
        assert!(matches!(time_prop(holiday, "DTSTART"), Some(DatePerhapsTime::Date(d)) if d == may_5));
        assert!(matches!(
            time_prop(holiday, "DTEND"),
            Some(DatePerhapsTime::Date(d)) if d == date_from_ymd(2025, 5, 6).unwrap()
        ));

        let meeting = vevents[1];
        let start = may_5.and_hms_opt(14, 0, 0).unwrap();
        assert!(matches!(
            time_prop(meeting, "DTSTART"),
            Some(DatePerhapsTime::DateTime(CalendarDateTime::Floating(t))) if t == start
        ));
        assert!(matches!(
            time_prop(meeting, "DTEND"),
            Some(DatePerhapsTime::DateTime(CalendarDateTime::Floating(t))) if t == start + Duration::hours(1)
        ));
        assert_eq!(meeting.find_prop("SUMMARY").unwrap().val.to_string(), "Meeting");
        assert_eq!(meeting.find_prop("DESCRIPTION").unwrap().val.to_string(), "Room 4");
        assert!(holiday.find_prop("DESCRIPTION").is_none());
    }

    #[test]
    fn test_uid_and_prodid() {
        let date = date_from_ymd(2025, 5, 5).unwrap();
        let calendar = calendar_with(vec![(date, EventDraft::new("Meeting"))]);
        let id = calendar.events_on(date)[0].id().to_string();

        let ics = to_ics(&calendar, DateRange::all()).unwrap();
        let unfolded = unfold(&ics);
        let parsed = read_calendar(&unfolded).unwrap();
        let vevent = parsed.components.iter().find(|c| c.name == "VEVENT").unwrap();

        assert_eq!(
            vevent.find_prop("UID").unwrap().val.to_string(),
            format!("{}@btodo.local", id)
        );
        assert!(vevent.find_prop("DTSTAMP").is_some());
        assert!(unfolded.contains("PRODID:-//bToDo//EN"));
    }

    #[test]
    fn test_reminder_becomes_alarm() {
        let date = date_from_ymd(2025, 5, 5).unwrap();
        let calendar = calendar_with(vec![
            (date, EventDraft::new("With alarm").at(time_from_hm(9, 0).unwrap()).remind(15)),
            (date, EventDraft::new("Silent").at(time_from_hm(10, 0).unwrap())),
        ]);

        let ics = to_ics(&calendar, DateRange::all()).unwrap();
        let unfolded = unfold(&ics);
        let parsed = read_calendar(&unfolded).unwrap();
        let alarms: Vec<usize> = parsed
            .components
            .iter()
            .filter(|c| c.name == "VEVENT")
            .map(|v| v.components.iter().filter(|c| c.name == "VALARM").count())
            .collect();

        assert_eq!(alarms, vec![1, 0]);
        assert!(unfolded.contains("TRIGGER"));
    }

    #[test]
    fn test_range_limits_events() {
        let calendar = calendar_with(vec![
            (date_from_ymd(2025, 4, 30).unwrap(), EventDraft::new("April")),
            (date_from_ymd(2025, 5, 1).unwrap(), EventDraft::new("May")),
        ]);
        let range = DateRange::starting(date_from_ymd(2025, 5, 1).unwrap());

        let ics = to_ics(&calendar, range).unwrap();
        assert!(ics.contains("SUMMARY:May"));
        assert!(!ics.contains("SUMMARY:April"));
    }

    #[test]
    fn test_empty_calendar_is_valid() {
        let ics = to_ics(&Calendar::new(), DateRange::all()).unwrap();
        let unfolded = unfold(&ics);
        let parsed = read_calendar(&unfolded).unwrap();
        assert!(parsed.components.iter().all(|c| c.name != "VEVENT"));
    }
}
