//! Error handling utilities for the btodo application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the store and its front end, as
//! well as the convenience type alias `AppResult` for functions that can return
//! these errors.
//!
//! Errors fall into two broad groups:
//!
//! - Recoverable input problems (`Validation`, `NotFound`) that a caller can show
//!   inline while keeping its editing state.
//! - Unlock failures (`Crypto`, `Schema`) raised when opening the store. These
//!   must be surfaced to the user; the store is never silently reset.

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Represents invalid user input rejected before anything is stored.
///
/// # Examples
///
/// ```
/// use btodo::errors::ValidationError;
///
/// let error = ValidationError::EmptyTitle;
/// assert!(format!("{}", error).contains("title"));
///
/// let error = ValidationError::InvalidTime("25:00".to_string());
/// assert!(format!("{}", error).contains("25:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The event title is empty or only whitespace.
    #[error("Event title cannot be empty.")]
    EmptyTitle,

    /// The given date does not exist on the calendar or could not be parsed.
    #[error("Invalid date '{0}'. Use YYYY-MM-DD or YYYYMMDD with a real calendar day.")]
    InvalidDate(String),

    /// The given time of day could not be parsed or is out of range.
    #[error("Invalid time '{0}'. Use HH:MM (24-hour) or hh:mm AM/PM.")]
    InvalidTime(String),

    /// An event id is already used on that day.
    #[error("Event id '{id}' is already used on {date}.")]
    DuplicateId {
        /// Day bucket holding the clash
        date: NaiveDate,
        /// The clashing id
        id: String,
    },

    /// A date range ends before it starts.
    #[error("Invalid date range: {start} is after {end}.")]
    InvalidRange {
        /// First day of the range
        start: NaiveDate,
        /// Last day of the range
        end: NaiveDate,
    },

    /// The reminder lead time exceeds the supported maximum.
    #[error("Reminder lead time of {minutes} minutes exceeds the maximum of {max} minutes.")]
    LeadTimeTooLong {
        /// Requested lead time
        minutes: u32,
        /// Largest accepted lead time
        max: u32,
    },

    /// The style name is not one of the known styles.
    #[error("Unknown style '{0}'.")]
    UnknownStyle(String),

    /// The accent color is not a `#RRGGBB` hex string.
    #[error("Invalid accent color '{0}'. Expected a hex color like #2A82DA.")]
    InvalidAccentColor(String),

    /// The store secret is empty.
    #[error("Secret cannot be empty.")]
    EmptySecret,

    /// An attachment name is blank or contains a path separator.
    #[error("Invalid attachment name '{0}'. Use a plain file name.")]
    InvalidAttachmentName(String),

    /// The event has no attachment with this name.
    #[error("No attachment named '{0}'.")]
    UnknownAttachment(String),
}

/// Represents specific error cases that can occur during cryptographic operations.
///
/// `Authentication` deliberately covers every way an encrypted store can fail
/// to verify: wrong secret, truncated file, flipped bits or a foreign file.
///
/// # Examples
///
/// ```
/// use btodo::errors::CryptoError;
///
/// let error = CryptoError::Authentication;
/// let message = format!("{}", error);
/// assert!(message.contains("secret"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Integrity check failed: wrong secret or corrupted/tampered data.
    #[error("Cannot unlock data: the secret is wrong or the data file is corrupted.")]
    Authentication,

    /// The key derivation function rejected its input.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// The cipher failed to encrypt.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Reading the secret from the terminal failed.
    #[error("Failed to read secret: {0}")]
    SecretPrompt(String),

    /// The confirmation did not match the new secret.
    #[error("Secrets do not match.")]
    SecretMismatch,
}

/// Represents problems with decrypted data that does not match a known schema.
///
/// # Examples
///
/// ```
/// use btodo::errors::SchemaError;
///
/// let error = SchemaError::UnsupportedVersion { found: 9, supported: 2 };
/// assert!(format!("{}", error).contains("9"));
/// ```
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Decryption succeeded but fields are missing or mistyped.
    #[error("Malformed store data: {0}")]
    Malformed(String),

    /// The file was written by a newer release.
    #[error("Store data version {found} is newer than this build supports (up to {supported}). Please upgrade btodo.")]
    UnsupportedVersion {
        /// Version tag found in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

/// Represents all possible errors that can occur in the btodo application.
///
/// This enum is the central error type used across the crate, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error`
/// trait implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use btodo::errors::AppError;
///
/// let error = AppError::Config("Missing data file".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing data file");
/// ```
///
/// Converting from an IO error:
/// ```
/// use btodo::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid input fields.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced event does not exist in its day bucket.
    #[error("Event '{id}' not found on {date}")]
    NotFound {
        /// Day bucket that was searched
        date: NaiveDate,
        /// Identifier that was not found
        id: String,
    },

    /// Errors related to cryptographic operations.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors related to the decrypted store layout.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Errors while producing calendar interchange output.
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// Returns `true` for errors a caller can show inline and recover from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::NotFound { .. })
    }

    /// Returns `true` when the store could not be unlocked or understood.
    ///
    /// Callers must not fall back to a fresh store when this is set.
    pub fn is_unlock_failure(&self) -> bool {
        matches!(self, AppError::Crypto(CryptoError::Authentication) | AppError::Schema(_))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use btodo::errors::{AppResult, ValidationError};
///
/// fn might_fail(title: &str) -> AppResult<String> {
///     if title.is_empty() {
///         return Err(ValidationError::EmptyTitle.into());
///     }
///     Ok(title.to_string())
/// }
/// assert!(might_fail("").is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;
