//! The user secret that protects the store, and how it is obtained.
//!
//! The secret is held in zeroizing memory and never printed. It is read from
//! the terminal with `rpassword`, or from `BTODO_TEST_SECRET` for
//! non-interactive runs.

use crate::constants::ENV_VAR_TEST_SECRET;
use crate::errors::{AppResult, CryptoError, ValidationError};
use std::fmt;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// A non-empty user secret.
///
/// # Examples
///
/// ```
/// use btodo::crypto::Secret;
///
/// let secret = Secret::new("abc").unwrap();
/// assert_eq!(format!("{:?}", secret), "Secret([REDACTED])");
/// assert!(Secret::new("").is_err());
/// ```
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wraps a secret string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptySecret` for an empty string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = Zeroizing::new(value.into());
        if value.is_empty() {
            return Err(ValidationError::EmptySecret);
        }
        Ok(Secret(value))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Obtains the store secret, prompting on the terminal when needed.
///
/// A new store (`store_exists == false`) asks for the secret twice.
///
/// # Testing
///
/// For non-interactive runs, set `BTODO_TEST_SECRET`; its value is used
/// without prompting.
///
/// # Errors
///
/// Returns `CryptoError::SecretPrompt` if the terminal cannot be read,
/// `CryptoError::SecretMismatch` if the confirmation differs, and
/// `ValidationError::EmptySecret` for an empty entry.
pub fn obtain_secret(store_exists: bool) -> AppResult<Secret> {
    if let Ok(value) = std::env::var(ENV_VAR_TEST_SECRET) {
        debug!("Using {} for non-interactive unlock", ENV_VAR_TEST_SECRET);
        return Ok(Secret::new(value)?);
    }

    if store_exists {
        prompt_for_existing_secret()
    } else {
        prompt_for_new_secret()
    }
}

fn prompt_for_new_secret() -> AppResult<Secret> {
    debug!("Prompting for new secret");

    println!("\nCreating a new encrypted calendar.");
    println!("Choose a secret to protect your events.\n");

    let secret = read_secret("Enter secret: ")?;
    let confirmation = read_secret("Confirm secret: ")?;

    if *secret != *confirmation {
        return Err(CryptoError::SecretMismatch.into());
    }

    let secret = Secret::new(secret.as_str())?;
    info!("New secret set");
    Ok(secret)
}

fn prompt_for_existing_secret() -> AppResult<Secret> {
    debug!("Prompting for existing secret");
    let secret = read_secret("Enter secret: ")?;
    Ok(Secret::new(secret.as_str())?)
}

fn read_secret(prompt: &str) -> AppResult<Zeroizing<String>> {
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::SecretPrompt(e.to_string()).into())
}
