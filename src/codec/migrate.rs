//! Forward migrations between store document versions.
//!
//! Each step is a pure function taking a document of version `n` to version
//! `n + 1`. [`upgrade`] applies the steps in order until the document reaches
//! the current version.
//!
//! # Version history
//!
//! - **1** (legacy, no `version` field): a flat `events` list where every
//!   record carries its own `date`, times are 12-hour strings (`"02:00 PM"`),
//!   absent values are empty strings, and settings may be partial. Events
//!   may carry `attachments` as `{filename, data}` objects with base64 data.
//! - **2**: events bucketed by `YYYY-MM-DD`, 24-hour times, explicit nulls,
//!   persisted `delivered` flag, complete settings.

use crate::constants::{
    DATE_FORMAT_ISO, DEFAULT_ACCENT_COLOR, DEFAULT_NOTIFY_MINUTES, DEFAULT_STYLE,
    LEGACY_SCHEMA_VERSION, MAX_NOTIFY_MINUTES, SCHEMA_VERSION, TIME_FORMAT_24H,
};
use crate::errors::{AppError, AppResult, SchemaError};
use crate::event::{parse_time, Attachment};
use crate::store::settings::{is_hex_color, is_known_style};
use crate::store::Settings;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A single migration step.
type Step = fn(Value) -> AppResult<Value>;

/// Migration steps indexed by the version they upgrade from.
const STEPS: &[(u32, Step)] = &[(1, v1_to_v2)];

/// Title given to legacy records saved without one.
const UNTITLED: &str = "No Title";

/// Upgrades `document` from `version` to the current schema version.
///
/// Documents already at the current version are returned unchanged.
///
/// # Errors
///
/// Returns `SchemaError::Malformed` if a step cannot interpret its input or no
/// step exists for an intermediate version.
pub fn upgrade(mut document: Value, mut version: u32) -> AppResult<Value> {
    while version < SCHEMA_VERSION {
        let step = STEPS
            .iter()
            .find(|(from, _)| *from == version)
            .map(|(_, step)| *step)
            .ok_or_else(|| malformed(format!("no migration from version {}", version)))?;

        info!("Migrating store document from version {} to {}", version, version + 1);
        document = step(document)?;
        version += 1;
    }
    Ok(document)
}

/// Buckets the flat legacy event list by date and normalizes every field.
fn v1_to_v2(document: Value) -> AppResult<Value> {
    let object = document
        .as_object()
        .ok_or_else(|| malformed("legacy document is not an object"))?;

    let records = match object.get("events") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(records)) => records.clone(),
        Some(_) => return Err(malformed("legacy 'events' is not a list")),
    };

    let mut buckets: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for record in records {
        let record = record
            .as_object()
            .ok_or_else(|| malformed("legacy event is not an object"))?;
        let (date_key, converted) = convert_v1_event(record, &mut seen)?;
        buckets.entry(date_key).or_default().push(converted);
    }

    let settings = object
        .get("settings")
        .and_then(Value::as_object)
        .map(convert_v1_settings)
        .unwrap_or_else(|| convert_v1_settings(&Map::new()));

    debug!("Migrated {} legacy day buckets", buckets.len());
    Ok(json!({
        "version": LEGACY_SCHEMA_VERSION + 1,
        "settings": settings,
        "events": buckets,
    }))
}

fn convert_v1_event(
    record: &Map<String, Value>,
    seen: &mut HashSet<(String, String)>,
) -> AppResult<(String, Value)> {
    let date_text = record
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("legacy event has no date"))?;
    let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT_ISO)
        .map_err(|_| malformed(format!("legacy event has invalid date '{}'", date_text)))?;
    let date_key = date.format(DATE_FORMAT_ISO).to_string();

    let title = non_empty_str(record, "title").unwrap_or(UNTITLED).to_string();

    let time = match non_empty_str(record, "time") {
        Some(text) => Some(
            parse_time(text)
                .map_err(|_| malformed(format!("legacy event has invalid time '{}'", text)))?
                .format(TIME_FORMAT_24H)
                .to_string(),
        ),
        None => None,
    };

    let description = non_empty_str(record, "description").map(str::to_string);
    let notify = record.get("notify").and_then(Value::as_bool).unwrap_or(false);
    let notify_minutes_before = legacy_lead_time(record.get("notify_minutes"));
    let attachments = convert_v1_attachments(record.get("attachments"));

    let mut id = non_empty_str(record, "id").map(str::to_string);
    if let Some(existing) = &id {
        if seen.contains(&(date_key.clone(), existing.clone())) {
            id = None;
        }
    }
    let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
    seen.insert((date_key.clone(), id.clone()));

    Ok((
        date_key,
        json!({
            "id": id,
            "title": title,
            "time": time,
            "description": description,
            "notify": notify,
            "notify_minutes_before": notify_minutes_before,
            "attachments": attachments,
            "delivered": false,
        }),
    ))
}

/// Fills missing or unusable legacy settings from defaults.
fn convert_v1_settings(settings: &Map<String, Value>) -> Value {
    let style_name = settings
        .get("style_name")
        .and_then(Value::as_str)
        .filter(|s| is_known_style(s))
        .unwrap_or(DEFAULT_STYLE);
    let accent_color = settings
        .get("accent_color")
        .and_then(Value::as_str)
        .filter(|c| is_hex_color(c))
        .unwrap_or(DEFAULT_ACCENT_COLOR);

    let normalized = Settings::new(style_name, accent_color).unwrap_or_default();
    json!({
        "theme": normalized.theme(),
        "style_name": normalized.style_name(),
        "accent_color": normalized.accent_color(),
    })
}

/// Keeps every legacy attachment that has a usable name and base64 data.
fn convert_v1_attachments(value: Option<&Value>) -> Vec<Value> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        let filename = entry.get("filename").and_then(Value::as_str).unwrap_or_default();
        let data = entry.get("data").and_then(Value::as_str).unwrap_or_default();
        let usable = !data.is_empty()
            && BASE64.decode(data.as_bytes()).is_ok()
            && Attachment::new(filename, Vec::new()).is_ok();
        if usable {
            kept.push(json!({ "filename": filename, "data": data }));
        } else {
            warn!("Skipping unreadable legacy attachment '{}'", filename);
        }
    }
    kept
}

/// Legacy lead times were unbounded. Oversized values are clamped to the
/// maximum; negative or non-integer values fall back to the default.
fn legacy_lead_time(value: Option<&Value>) -> u32 {
    match value.and_then(Value::as_u64) {
        Some(minutes) => u32::try_from(minutes)
            .unwrap_or(u32::MAX)
            .min(MAX_NOTIFY_MINUTES),
        None => DEFAULT_NOTIFY_MINUTES,
    }
}

fn non_empty_str<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn malformed(message: impl Into<String>) -> AppError {
    SchemaError::Malformed(message.into()).into()
}
