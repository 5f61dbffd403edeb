//! High-level operations behind each command.
//!
//! Every operation takes an unlocked [`EventStore`](crate::store::EventStore)
//! and parses its textual arguments itself, so bad input surfaces as a
//! `ValidationError` before anything is written. Output goes to a caller
//! supplied writer.

pub mod backup;
pub mod events;
pub mod export;
pub mod reminders;
pub mod settings;

pub use backup::{create_backup, verify_backup};
pub use events::{
    add_event, delete_event, edit_event, extract_attachment, list_events, move_event, parse_month,
};
pub use export::export_calendar;
pub use reminders::{show_due, watch};
pub use settings::{show_settings, update_settings};
