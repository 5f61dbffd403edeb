//! Encryption of the store file.
//!
//! The store is sealed with AES-256-GCM under a key derived from the user's
//! secret with Argon2id. A wrong secret and a damaged file both surface as
//! `CryptoError::Authentication`.
//!
//! # Module Structure
//!
//! - `envelope`: the on-disk envelope, [`StoreKey`] and one-shot helpers
//! - `kdf`: Argon2id key derivation
//! - `legacy`: reading files from the first release, which used a built-in key
//! - `secret`: the [`Secret`] type and terminal prompting
//!
//! # Example
//!
//! ```
//! use btodo::crypto::{decrypt, encrypt, Secret};
//!
//! let secret = Secret::new("abc")?;
//! let sealed = encrypt(b"{\"events\":{}}", &secret)?;
//! let opened = decrypt(&sealed, &secret)?;
//! assert_eq!(opened, b"{\"events\":{}}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod envelope;
pub mod kdf;
pub mod legacy;
pub mod secret;

pub use self::envelope::{decrypt, encrypt, StoreKey};
pub use self::secret::{obtain_secret, Secret};
