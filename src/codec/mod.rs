//! Versioned serialization of the calendar.
//!
//! The store's plaintext is a JSON document of the form
//!
//! ```text
//! {
//!   "version": 2,
//!   "settings": { "theme": "light", "style_name": "Default Light", "accent_color": "#2A82DA" },
//!   "events": { "2025-05-05": [ { "id": "...", "title": "Meeting", "time": "14:00", ... } ] }
//! }
//! ```
//!
//! Attachment contents are standard base64 strings next to their file name.
//!
//! Date keys are canonical `YYYY-MM-DD` strings so the document sorts the same
//! way everywhere. Documents from older releases are upgraded by the migration
//! chain in [`migrate`] before parsing; documents from newer releases are
//! refused.

pub mod migrate;

use crate::constants::{DATE_FORMAT_ISO, LEGACY_SCHEMA_VERSION, SCHEMA_VERSION, TIME_FORMAT_24H};
use crate::errors::{AppResult, SchemaError};
use crate::event::{Attachment, Event, EventDraft};
use crate::store::{Calendar, Settings, Theme};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// The serialized form of a whole calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u32,
    pub settings: SettingsRecord,
    pub events: BTreeMap<String, Vec<EventRecord>>,
}

/// Serialized settings.
///
/// `theme` is written for readers that only care about light/dark; it is
/// recomputed from `style_name` on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub theme: Theme,
    pub style_name: String,
    pub accent_color: String,
}

/// Serialized event. The owning date is the bucket key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    /// `HH:MM`, or null for all-day events
    pub time: Option<String>,
    pub description: Option<String>,
    pub notify: bool,
    pub notify_minutes_before: u32,
    /// Absent in documents written before attachments were kept
    #[serde(default)]
    pub attachments: Vec<AttachmentRecord>,
    pub delivered: bool,
}

/// Serialized attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub filename: String,
    /// Standard base64 with padding
    pub data: String,
}

impl From<&Attachment> for AttachmentRecord {
    fn from(attachment: &Attachment) -> Self {
        AttachmentRecord {
            filename: attachment.filename().to_string(),
            data: BASE64.encode(attachment.data()),
        }
    }
}

impl AttachmentRecord {
    fn into_attachment(self) -> AppResult<Attachment> {
        let data = BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| malformed(format!("attachment '{}' is not base64: {}", self.filename, e)))?;
        Attachment::new(self.filename, data).map_err(|e| malformed(e.to_string()))
    }
}

/// Converts a calendar into its current-version document.
pub fn encode(calendar: &Calendar) -> StoreDocument {
    let mut events: BTreeMap<String, Vec<EventRecord>> = BTreeMap::new();
    for event in calendar.iter() {
        events
            .entry(event.date().format(DATE_FORMAT_ISO).to_string())
            .or_default()
            .push(EventRecord::from(event));
    }

    let settings = calendar.settings();
    StoreDocument {
        version: SCHEMA_VERSION,
        settings: SettingsRecord {
            theme: settings.theme(),
            style_name: settings.style_name().to_string(),
            accent_color: settings.accent_color().to_string(),
        },
        events,
    }
}

/// Parses a document of any supported version into a calendar.
///
/// A missing `version` field marks the legacy layout (version 1).
///
/// # Errors
///
/// - `SchemaError::UnsupportedVersion` if the document is newer than this build.
/// - `SchemaError::Malformed` if fields are missing, mistyped or invalid.
pub fn decode(document: Value) -> AppResult<Calendar> {
    let version = read_version(&document)?;
    if version > SCHEMA_VERSION {
        return Err(SchemaError::UnsupportedVersion {
            found: version,
            supported: SCHEMA_VERSION,
        }
        .into());
    }

    let document = migrate::upgrade(document, version)?;
    let document: StoreDocument = serde_json::from_value(document)
        .map_err(|e| SchemaError::Malformed(e.to_string()))?;
    document.into_calendar()
}

/// Serializes a calendar to JSON bytes.
pub fn to_bytes(calendar: &Calendar) -> AppResult<Vec<u8>> {
    serde_json::to_vec(&encode(calendar))
        .map_err(|e| SchemaError::Malformed(format!("failed to serialize store: {}", e)).into())
}

/// Parses JSON bytes into a calendar.
pub fn from_bytes(bytes: &[u8]) -> AppResult<Calendar> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| SchemaError::Malformed(format!("store is not valid JSON: {}", e)))?;
    decode(document)
}

fn read_version(document: &Value) -> AppResult<u32> {
    let object = document
        .as_object()
        .ok_or_else(|| malformed("top level is not an object"))?;

    match object.get("version") {
        None => Ok(LEGACY_SCHEMA_VERSION),
        Some(value) => {
            let version = value
                .as_u64()
                .ok_or_else(|| malformed("version is not a non-negative integer"))?;
            if version < u64::from(LEGACY_SCHEMA_VERSION) {
                return Err(malformed(format!("unknown version {}", version)));
            }
            Ok(u32::try_from(version).unwrap_or(u32::MAX))
        }
    }
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        EventRecord {
            id: event.id().to_string(),
            title: event.title().to_string(),
            time: event.time().map(|t| t.format(TIME_FORMAT_24H).to_string()),
            description: event.description().map(str::to_string),
            notify: event.notify(),
            notify_minutes_before: event.notify_minutes_before(),
            attachments: event.attachments().iter().map(AttachmentRecord::from).collect(),
            delivered: event.is_delivered(),
        }
    }
}

impl EventRecord {
    fn into_event(self, date: NaiveDate) -> AppResult<Event> {
        let time = self
            .time
            .as_deref()
            .map(|t| NaiveTime::parse_from_str(t, TIME_FORMAT_24H))
            .transpose()
            .map_err(|_| malformed(format!("event '{}' has an invalid time", self.id)))?;

        if self.id.is_empty() {
            return Err(malformed(format!("event on {} has an empty id", date)));
        }

        let attachments = self
            .attachments
            .into_iter()
            .map(AttachmentRecord::into_attachment)
            .collect::<AppResult<Vec<_>>>()?;

        let draft = EventDraft {
            title: self.title,
            time,
            description: self.description,
            notify: self.notify,
            notify_minutes_before: self.notify_minutes_before,
            attachments,
        };
        let id = self.id;
        Event::restore(id.clone(), date, draft, self.delivered)
            .map_err(|e| malformed(format!("event '{}' on {}: {}", id, date, e)))
    }
}

impl StoreDocument {
    fn into_calendar(self) -> AppResult<Calendar> {
        let mut calendar = Calendar::new();
        calendar.set_settings(
            Settings::new(&self.settings.style_name, &self.settings.accent_color)
                .map_err(|e| malformed(e.to_string()))?,
        );

        for (key, records) in self.events {
            let date = NaiveDate::parse_from_str(&key, DATE_FORMAT_ISO)
                .map_err(|_| malformed(format!("invalid date key '{}'", key)))?;
            if records.is_empty() {
                debug!("Dropping empty bucket for {}", date);
                continue;
            }
            for record in records {
                let event = record.into_event(date)?;
                calendar
                    .insert(event)
                    .map_err(|e| malformed(e.to_string()))?;
            }
        }

        debug!("Decoded {} events", calendar.len());
        Ok(calendar)
    }
}

fn malformed(message: impl Into<String>) -> crate::errors::AppError {
    SchemaError::Malformed(message.into()).into()
}
