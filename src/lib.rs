/*!
# bToDo

bToDo keeps a calendar of events with optional reminders in a single encrypted
file. The whole store is sealed with a key derived from the user's secret, so
nothing is readable on disk without it.

## Core Features

- Create, edit, move and delete events per day, timed or all-day
- Files attached to events, stored inside the encrypted file
- Reminders that fire once, even across restarts
- Month views and per-day listings
- Display settings stored alongside the events
- Encrypted backups with a BLAKE3 checksum
- iCalendar (`.ics`) export
- Transparent upgrade of store files from the first release

## Architecture

- `cli`: Command-line interface handling using clap
- `config`: Configuration loading from the environment
- `crypto`: Key derivation and the authenticated store envelope
- `codec`: Versioned JSON document format and schema upgrades
- `event`: The event model and date/time parsing
- `store`: The unlocked calendar bound to its encrypted file
- `notify`: Reminder delivery and the polling loop
- `export`: iCalendar rendering
- `ops`: The operation behind each command
- `errors`: Error handling infrastructure

## Usage Example

```rust,no_run
use btodo::crypto::Secret;
use btodo::event::{date_from_ymd, time_from_hm, EventDraft};
use btodo::EventStore;

fn main() -> btodo::AppResult<()> {
    let secret = Secret::new("correct horse")?;
    let mut store = EventStore::open("/home/me/.local/share/btodo/btodo_data.enc", &secret)?;

    let draft = EventDraft::new("Meeting").at(time_from_hm(14, 0)?).remind(30);
    store.create_event(date_from_ymd(2025, 5, 5)?, draft)?;
    store.close()
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// JSON document format and legacy upgrades
pub mod codec;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Store encryption
pub mod crypto;
/// Error types and utilities for error handling
pub mod errors;
/// Events and date/time parsing
pub mod event;
/// iCalendar export
pub mod export;
/// Reminder delivery
pub mod notify;
/// Command operations
pub mod ops;
/// The encrypted event store
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use event::{Event, EventDraft};
pub use store::EventStore;
