//! The encrypted event store.
//!
//! [`EventStore`] owns the in-memory [`Calendar`], the path of the encrypted
//! file and the derived [`StoreKey`]. Every mutation is written through to disk
//! before it returns; if the write fails the mutation is undone, so memory and
//! disk never disagree.
//!
//! # Lifecycle
//!
//! `EventStore::open` yields a loaded store. [`EventStore::close`] consumes it
//! after a final write, so a closed store cannot be used again.
//!
//! # Example
//!
//! ```no_run
//! use btodo::crypto::Secret;
//! use btodo::event::{date_from_ymd, time_from_hm, EventDraft};
//! use btodo::store::EventStore;
//!
//! let secret = Secret::new("abc")?;
//! let mut store = EventStore::open("/tmp/btodo/btodo_data.enc", &secret)?;
//!
//! let date = date_from_ymd(2025, 5, 5)?;
//! let event = store.create_event(date, EventDraft::new("Meeting").at(time_from_hm(14, 0)?))?;
//! assert_eq!(store.events_on(date)[0].id(), event.id());
//!
//! store.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod atomic;
pub mod calendar;
pub mod settings;

pub use self::calendar::{Calendar, DateRange};
pub use self::settings::{Settings, Theme};

use crate::codec;
use crate::constants::STORE_MAGIC;
use crate::crypto::{legacy, Secret, StoreKey};
use crate::errors::AppResult;
use crate::event::{Event, EventDraft};
use crate::export;
use atomic::write_atomic;
use blake3::Hasher;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Report of a completed or verified backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Where the backup was written
    pub path: PathBuf,
    /// Size of the encrypted backup in bytes
    pub size: u64,
    /// BLAKE3 checksum of the encrypted backup, hex encoded
    pub checksum: String,
    /// Number of events in the backup
    pub events: usize,
}

/// An unlocked calendar bound to its encrypted file.
pub struct EventStore {
    path: PathBuf,
    key: StoreKey,
    calendar: Calendar,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("path", &self.path)
            .field("events", &self.calendar.len())
            .finish_non_exhaustive()
    }
}

impl EventStore {
    /// Opens the store at `path`, decrypting it with `secret`.
    ///
    /// A missing file yields an empty store; nothing is written until the
    /// first mutation or [`persist`](Self::persist). A file from the first
    /// release is read with its built-in key, and the next save re-encrypts it
    /// under `secret`.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Authentication` for a wrong secret or a damaged file
    /// - `SchemaError::Malformed` / `SchemaError::UnsupportedVersion` for
    ///   contents this build cannot read
    /// - `AppError::Io` if the file cannot be read, or its existence cannot be
    ///   checked
    ///
    /// The file is never modified or replaced when opening fails.
    pub fn open(path: impl Into<PathBuf>, secret: &Secret) -> AppResult<Self> {
        let path = path.into();

        if !path.try_exists()? {
            info!("No store at {:?}; starting an empty calendar", path);
            return Ok(EventStore {
                key: StoreKey::generate(secret)?,
                calendar: Calendar::new(),
                path,
            });
        }

        debug!("Reading store from {:?}", path);
        let sealed = fs::read(&path)?;
        let (key, plaintext) = if legacy::is_legacy(&sealed) {
            info!(
                "Store at {:?} uses the first-release layout; the next save re-encrypts it",
                path
            );
            (StoreKey::generate(secret)?, legacy::decrypt(&sealed)?)
        } else {
            StoreKey::unlock(secret, &sealed)?
        };
        let plaintext = Zeroizing::new(plaintext);
        let calendar = codec::from_bytes(&plaintext)?;

        info!("Opened store with {} events", calendar.len());
        Ok(EventStore {
            path,
            key,
            calendar,
        })
    }

    /// Whether opening `path` takes a secret the user has not chosen yet.
    ///
    /// True when there is no store file, or when the file predates
    /// user secrets and will be re-encrypted under the one given to `open`.
    pub fn needs_new_secret(path: &Path) -> AppResult<bool> {
        if !path.try_exists()? {
            return Ok(true);
        }
        let mut magic = [0u8; STORE_MAGIC.len()];
        let read = fs::File::open(path)?.read(&mut magic)?;
        Ok(legacy::is_legacy(&magic[..read]))
    }

    /// Path of the encrypted file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read access to the whole calendar.
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Adds an event to `date` under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an invalid draft, or `AppError::Io` if the
    /// write fails (the event is then not added).
    pub fn create_event(&mut self, date: NaiveDate, draft: EventDraft) -> AppResult<Event> {
        let event = self.mutate(|calendar| {
            let event = Event::new(calendar.fresh_id(date), date, draft)?;
            calendar.insert(event.clone())?;
            Ok(event)
        })?;
        info!("Created event {} on {}", event.id(), date);
        Ok(event)
    }

    /// Replaces the editable fields of an existing event.
    ///
    /// The delivered flag is cleared when the reminder instant changes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no such event exists on `date`.
    pub fn update_event(&mut self, date: NaiveDate, id: &str, draft: EventDraft) -> AppResult<Event> {
        let event = self.mutate(|calendar| {
            let event = calendar.event_mut(date, id)?;
            event.apply(draft)?;
            Ok(event.clone())
        })?;
        info!("Updated event {} on {}", id, date);
        Ok(event)
    }

    /// Moves an event to another day, applying `draft` on the way.
    ///
    /// The event keeps its id unless that id is already taken on the target day.
    /// Moving to the same day is an update.
    pub fn move_event(
        &mut self,
        from: NaiveDate,
        id: &str,
        to: NaiveDate,
        draft: EventDraft,
    ) -> AppResult<Event> {
        if from == to {
            return self.update_event(from, id, draft);
        }

        let event = self.mutate(|calendar| {
            let mut event = calendar.remove(from, id)?;
            event.apply(draft)?;
            event.relocate(to);
            if calendar.event(to, event.id()).is_some() {
                event.set_id(calendar.fresh_id(to));
            }
            calendar.insert(event.clone())?;
            Ok(event)
        })?;
        info!("Moved event {} from {} to {} as {}", id, from, to, event.id());
        Ok(event)
    }

    /// Deletes an event.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the event does not exist, including when
    /// it was already deleted.
    pub fn delete_event(&mut self, date: NaiveDate, id: &str) -> AppResult<()> {
        self.mutate(|calendar| calendar.remove(date, id).map(|_| ()))?;
        info!("Deleted event {} on {}", id, date);
        Ok(())
    }

    /// Events on `date` in creation order.
    pub fn events_on(&self, date: NaiveDate) -> &[Event] {
        self.calendar.events_on(date)
    }

    pub fn event(&self, date: NaiveDate, id: &str) -> Option<&Event> {
        self.calendar.event(date, id)
    }

    pub fn events_in_month(&self, year: i32, month: u32) -> AppResult<Vec<&Event>> {
        Ok(self.calendar.events_in_month(year, month)?)
    }

    pub fn days_with_events(&self, year: i32, month: u32) -> AppResult<Vec<NaiveDate>> {
        Ok(self.calendar.days_with_events(year, month)?)
    }

    pub fn event_count(&self) -> usize {
        self.calendar.len()
    }

    /// Undelivered reminders due at or before `now`, earliest first.
    pub fn events_due_for_notification(&self, now: NaiveDateTime) -> Vec<Event> {
        self.calendar
            .due_for_notification(now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Records that the reminder for an event has been shown.
    pub fn mark_delivered(&mut self, date: NaiveDate, id: &str) -> AppResult<()> {
        if self.calendar.event(date, id).is_some_and(Event::is_delivered) {
            return Ok(());
        }
        self.mutate(|calendar| {
            calendar.event_mut(date, id)?.mark_delivered();
            Ok(())
        })?;
        debug!("Marked reminder for {} on {} as delivered", id, date);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        self.calendar.settings()
    }

    /// Validates and stores new display settings.
    pub fn update_settings(&mut self, style_name: &str, accent_color: &str) -> AppResult<Settings> {
        let settings = Settings::new(style_name, accent_color)?;
        self.mutate(|calendar| {
            calendar.set_settings(settings.clone());
            Ok(())
        })?;
        info!("Settings updated: style '{}', theme {}", settings.style_name(), settings.theme());
        Ok(settings)
    }

    /// Encodes, encrypts and atomically writes the calendar.
    pub fn persist(&self) -> AppResult<()> {
        let plaintext = Zeroizing::new(codec::to_bytes(&self.calendar)?);
        let sealed = self.key.seal(&plaintext)?;
        write_atomic(&self.path, &sealed)?;
        debug!("Persisted {} events to {:?}", self.calendar.len(), self.path);
        Ok(())
    }

    /// Writes the store one last time and releases it.
    pub fn close(self) -> AppResult<()> {
        self.persist()?;
        info!("Closed store at {:?}", self.path);
        Ok(())
    }

    /// Writes an encrypted copy of the store to `destination`.
    ///
    /// The backup is protected by the same secret as the store.
    pub fn backup_to(&self, destination: &Path) -> AppResult<BackupReport> {
        self.persist()?;
        let sealed = fs::read(&self.path)?;
        write_atomic(destination, &sealed)?;

        let report = BackupReport {
            path: destination.to_path_buf(),
            size: sealed.len() as u64,
            checksum: checksum(&sealed),
            events: self.calendar.len(),
        };
        info!(
            "Backup written to {:?}: {} events, {} bytes, checksum {}",
            report.path, report.events, report.size, report.checksum
        );
        Ok(report)
    }

    /// Decrypts and decodes a backup without touching any store.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open) for an existing file.
    pub fn verify_backup(path: &Path, secret: &Secret) -> AppResult<BackupReport> {
        let sealed = fs::read(path)?;
        let (_, plaintext) = StoreKey::unlock(secret, &sealed)?;
        let calendar = codec::from_bytes(&Zeroizing::new(plaintext))?;

        Ok(BackupReport {
            path: path.to_path_buf(),
            size: sealed.len() as u64,
            checksum: checksum(&sealed),
            events: calendar.len(),
        })
    }

    /// Renders events within `range` as an iCalendar document.
    pub fn export_ics(&self, range: DateRange) -> AppResult<String> {
        export::to_ics(&self.calendar, range)
    }

    /// Applies `change` and persists, restoring the previous calendar on failure.
    fn mutate<T>(&mut self, change: impl FnOnce(&mut Calendar) -> AppResult<T>) -> AppResult<T> {
        let snapshot = self.calendar.clone();
        let outcome = change(&mut self.calendar).and_then(|value| {
            self.persist()?;
            Ok(value)
        });
        if outcome.is_err() {
            self.calendar = snapshot;
        }
        outcome
    }
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize().to_hex().to_string()
}
