//! In-memory event collection organized by day.
//!
//! `Calendar` is the plain data behind the store: day buckets in creation
//! order plus settings. It performs no I/O; the [`EventStore`](super::EventStore)
//! wraps it with persistence.
//!
//! A bucket is removed as soon as its last event is deleted, so a calendar never
//! holds empty buckets.

use crate::errors::{AppError, AppResult, ValidationError};
use crate::event::{date_from_ymd, Event};
use crate::store::Settings;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use uuid::Uuid;

/// An inclusive range of days used for exports and range queries.
///
/// # Examples
///
/// ```
/// use btodo::event::date_from_ymd;
/// use btodo::store::DateRange;
///
/// let may = DateRange::between(date_from_ymd(2025, 5, 1).unwrap(), date_from_ymd(2025, 5, 31).unwrap()).unwrap();
/// assert!(may.contains(date_from_ymd(2025, 5, 31).unwrap()));
/// assert!(!may.contains(date_from_ymd(2025, 6, 1).unwrap()));
/// assert!(DateRange::all().contains(date_from_ymd(1999, 1, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// A range without bounds.
    pub fn all() -> Self {
        DateRange::default()
    }

    /// Days from `start` through `end`, both included.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(DateRange {
            start: Some(start),
            end: Some(end),
        })
    }

    /// Every day from `start` on.
    pub fn starting(start: NaiveDate) -> Self {
        DateRange {
            start: Some(start),
            end: None,
        }
    }

    /// Every day up to and including `end`.
    pub fn through(end: NaiveDate) -> Self {
        DateRange {
            start: None,
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Day buckets and settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    buckets: BTreeMap<NaiveDate, Vec<Event>>,
    settings: Settings,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Events on `date` in creation order; empty when there are none.
    pub fn events_on(&self, date: NaiveDate) -> &[Event] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up a single event.
    pub fn event(&self, date: NaiveDate, id: &str) -> Option<&Event> {
        self.events_on(date).iter().find(|e| e.id() == id)
    }

    /// All events of a month, by day then creation order.
    pub fn events_in_month(&self, year: i32, month: u32) -> Result<Vec<&Event>, ValidationError> {
        Ok(self
            .month_buckets(year, month)?
            .flat_map(|(_, events)| events.iter())
            .collect())
    }

    /// Days of a month holding at least one event.
    pub fn days_with_events(&self, year: i32, month: u32) -> Result<Vec<NaiveDate>, ValidationError> {
        Ok(self.month_buckets(year, month)?.map(|(date, _)| *date).collect())
    }

    fn month_buckets(
        &self,
        year: i32,
        month: u32,
    ) -> Result<impl Iterator<Item = (&NaiveDate, &Vec<Event>)> + '_, ValidationError> {
        let first = date_from_ymd(year, month, 1)?;
        Ok(self
            .buckets
            .range(first..)
            .take_while(move |(date, _)| date.year() == year && date.month() == month))
    }

    /// Every event, by day then creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.buckets.values().flatten()
    }

    /// Events whose day falls inside `range`.
    pub fn events_in(&self, range: DateRange) -> impl Iterator<Item = &Event> {
        self.buckets
            .iter()
            .filter(move |(date, _)| range.contains(**date))
            .flat_map(|(_, events)| events.iter())
    }

    /// Undelivered reminders due at or before `now`, earliest first.
    pub fn due_for_notification(&self, now: NaiveDateTime) -> Vec<&Event> {
        let mut due: Vec<&Event> = self
            .iter()
            .filter(|e| e.notify() && !e.is_delivered() && e.remind_at() <= now)
            .collect();
        due.sort_by_key(|e| e.remind_at());
        due
    }

    /// Number of events across all days.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Generates an id not yet used on `date`.
    pub(crate) fn fresh_id(&self, date: NaiveDate) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.event(date, &id).is_none() {
                return id;
            }
        }
    }

    /// Appends an event to its day bucket.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the id is already used on that day.
    pub(crate) fn insert(&mut self, event: Event) -> Result<(), ValidationError> {
        if self.event(event.date(), event.id()).is_some() {
            return Err(ValidationError::DuplicateId {
                date: event.date(),
                id: event.id().to_string(),
            });
        }
        self.buckets.entry(event.date()).or_default().push(event);
        Ok(())
    }

    pub(crate) fn event_mut(&mut self, date: NaiveDate, id: &str) -> AppResult<&mut Event> {
        self.buckets
            .get_mut(&date)
            .and_then(|events| events.iter_mut().find(|e| e.id() == id))
            .ok_or_else(|| not_found(date, id))
    }

    /// Removes an event, dropping the bucket when it becomes empty.
    pub(crate) fn remove(&mut self, date: NaiveDate, id: &str) -> AppResult<Event> {
        let events = self.buckets.get_mut(&date).ok_or_else(|| not_found(date, id))?;
        let index = events
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| not_found(date, id))?;
        let removed = events.remove(index);
        if events.is_empty() {
            self.buckets.remove(&date);
        }
        Ok(removed)
    }
}

fn not_found(date: NaiveDate, id: &str) -> AppError {
    AppError::NotFound {
        date,
        id: id.to_string(),
    }
}
