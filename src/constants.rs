//! Constants used throughout the application.
//!
//! This module contains all constants used in btodo, organized into logical
//! groups. Having constants centralized makes them easier to find, modify, and
//! reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "btodo";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A calendar and reminder keeper with an encrypted local store";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for overriding the store file location.
pub const ENV_VAR_DATA_FILE: &str = "BTODO_DATA_FILE";
/// Environment variable for the reminder poll interval in seconds.
pub const ENV_VAR_POLL_INTERVAL: &str = "BTODO_POLL_INTERVAL";
/// Environment variable selecting the log format (`text` or `json`).
pub const ENV_VAR_LOG_FORMAT: &str = "BTODO_LOG_FORMAT";
/// Environment variable supplying the store secret for non-interactive runs.
pub const ENV_VAR_TEST_SECRET: &str = "BTODO_TEST_SECRET";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default store location relative to the user's home directory.
pub const DEFAULT_DATA_SUBPATH: &str = ".local/share/btodo/btodo_data.enc";
/// Default reminder poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for the store file (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Store File Envelope
/// Magic bytes at the start of every encrypted store file.
pub const STORE_MAGIC: &[u8; 4] = b"BTDO";
/// Envelope format revision written by this build.
pub const STORE_FORMAT: u8 = 1;
/// Length of the random Argon2 salt stored in the envelope.
pub const SALT_LEN: usize = 16;
/// Length of the AES-GCM nonce stored in the envelope.
pub const NONCE_LEN: usize = 12;
/// Length of the derived symmetric key.
pub const KEY_LEN: usize = 32;
/// Argon2id memory cost in KiB.
pub const KDF_MEMORY_KIB: u32 = 19_456;
/// Argon2id iteration count.
pub const KDF_ITERATIONS: u32 = 2;
/// Argon2id lane count.
pub const KDF_PARALLELISM: u32 = 1;

// Legacy Store File
/// Passphrase the first release derived its fixed store key from.
pub const LEGACY_PASSPHRASE: &str = "BrittonCalendarDefaultKey";
/// PBKDF2 salt of the legacy store key.
pub const LEGACY_SALT: &[u8] = b"britton_calendar_salt";
/// PBKDF2-HMAC-SHA256 round count of the legacy store key.
pub const LEGACY_KDF_ROUNDS: u32 = 100_000;
/// Length of the AES-EAX nonce at the start of a legacy file.
pub const LEGACY_NONCE_LEN: usize = 16;
/// Length of the AES-EAX tag following the nonce.
pub const LEGACY_TAG_LEN: usize = 16;

// Schema
/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 2;
/// Schema version assumed for documents without a version tag.
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD), also used for bucket keys.
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";
/// Canonical 24-hour time format.
pub const TIME_FORMAT_24H: &str = "%H:%M";
/// 12-hour time format used by legacy records.
pub const TIME_FORMAT_12H: &str = "%I:%M %p";
/// Default reminder lead time in minutes.
pub const DEFAULT_NOTIFY_MINUTES: u32 = 30;
/// Largest accepted reminder lead time (one week).
pub const MAX_NOTIFY_MINUTES: u32 = 7 * 24 * 60;
/// Nominal hour used to schedule reminders for all-day events.
pub const ALL_DAY_REMINDER_HOUR: u32 = 9;

// Settings
/// Style names the front end knows how to render.
pub const STYLE_DEFAULT_LIGHT: &str = "Default Light";
/// Dark variant of the default style.
pub const STYLE_DEFAULT_DARK: &str = "Default Dark";
/// Graphite dark stylesheet.
pub const STYLE_GRAPHITE_DARK: &str = "Graphite Dark (QSS)";
/// Ocean breeze stylesheet.
pub const STYLE_OCEAN_BREEZE: &str = "Ocean Breeze (QSS)";
/// Minty light stylesheet.
pub const STYLE_MINTY_LIGHT: &str = "Minty Light (QSS)";
/// All known styles, in menu order.
pub const KNOWN_STYLES: &[&str] = &[
    STYLE_DEFAULT_LIGHT,
    STYLE_DEFAULT_DARK,
    STYLE_GRAPHITE_DARK,
    STYLE_OCEAN_BREEZE,
    STYLE_MINTY_LIGHT,
];
/// Styles that imply the dark theme.
pub const DARK_STYLES: &[&str] = &[STYLE_DEFAULT_DARK, STYLE_GRAPHITE_DARK];
/// Style used when none is stored.
pub const DEFAULT_STYLE: &str = STYLE_DEFAULT_LIGHT;
/// Accent color used when none is stored.
pub const DEFAULT_ACCENT_COLOR: &str = "#2A82DA";

// Export
/// Domain suffix appended to event ids to form iCalendar UIDs.
pub const ICS_UID_DOMAIN: &str = "btodo.local";
/// Product identifier written to exported calendars.
pub const ICS_PRODID: &str = "-//bToDo//EN";
/// Duration assumed for timed events in exports, in minutes.
pub const ICS_TIMED_EVENT_MINUTES: i64 = 60;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "btodo";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
