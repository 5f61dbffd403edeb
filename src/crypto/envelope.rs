//! Authenticated encryption envelope for the store file.
//!
//! Layout (format 1):
//!
//! ```text
//! "BTDO" | format: u8 | salt: [u8; 16] | nonce: [u8; 12] | AES-256-GCM ciphertext + tag
//! ```
//!
//! The 33-byte header is authenticated as associated data, so any change to it
//! fails decryption just like a change to the ciphertext.

use crate::constants::{KEY_LEN, NONCE_LEN, SALT_LEN, STORE_FORMAT, STORE_MAGIC};
use crate::crypto::kdf::derive_key;
use crate::crypto::Secret;
use crate::errors::CryptoError;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

const HEADER_LEN: usize = STORE_MAGIC.len() + 1 + SALT_LEN + NONCE_LEN;
const TAG_LEN: usize = 16;

/// A derived store key together with the salt it was derived from.
///
/// Deriving is deliberately slow, so an unlocked store keeps its `StoreKey`
/// and reuses it for every save. Each [`seal`](StoreKey::seal) draws a fresh
/// nonce.
///
/// # Examples
///
/// ```
/// use btodo::crypto::{Secret, StoreKey};
///
/// let secret = Secret::new("abc").unwrap();
/// let key = StoreKey::generate(&secret).unwrap();
/// let sealed = key.seal(b"{}").unwrap();
///
/// let (reopened, plaintext) = StoreKey::unlock(&secret, &sealed).unwrap();
/// assert_eq!(plaintext, b"{}");
/// assert_eq!(reopened.open(&sealed).unwrap(), b"{}");
/// ```
pub struct StoreKey {
    key: Zeroizing<[u8; KEY_LEN]>,
    salt: [u8; SALT_LEN],
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreKey")
            .field("key", &"[REDACTED]")
            .field("salt", &self.salt)
            .finish()
    }
}

impl StoreKey {
    /// Derives the key for `secret` with a fresh random salt.
    pub fn generate(secret: &Secret) -> Result<Self, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::derive(secret, salt)
    }

    /// Derives the key for `secret` with the given salt.
    pub fn derive(secret: &Secret, salt: [u8; SALT_LEN]) -> Result<Self, CryptoError> {
        let key = derive_key(secret, &salt)?;
        Ok(StoreKey { key, salt })
    }

    /// Reads the salt from an existing envelope, derives the key and decrypts.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Authentication` for a wrong secret and for any
    /// truncated, foreign or modified input.
    pub fn unlock(secret: &Secret, bytes: &[u8]) -> Result<(Self, Vec<u8>), CryptoError> {
        let header = Header::parse(bytes)?;
        let key = Self::derive(secret, header.salt)?;
        let plaintext = key.open(bytes)?;
        Ok((key, plaintext))
    }

    /// Encrypts `plaintext` into a complete envelope.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut envelope = Vec::with_capacity(HEADER_LEN + plaintext.len() + TAG_LEN);
        envelope.extend_from_slice(STORE_MAGIC);
        envelope.push(STORE_FORMAT);
        envelope.extend_from_slice(&self.salt);
        envelope.extend_from_slice(&nonce);

        let ciphertext = self
            .cipher()?
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &envelope,
                },
            )
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        envelope.extend_from_slice(&ciphertext);
        debug!("Sealed {} bytes into {} byte envelope", plaintext.len(), envelope.len());
        Ok(envelope)
    }

    /// Authenticates and decrypts an envelope with this key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Authentication` if the envelope was not sealed by
    /// this key or has been modified.
    pub fn open(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let header = Header::parse(bytes)?;
        if header.salt != self.salt {
            return Err(CryptoError::Authentication);
        }

        self.cipher()?
            .decrypt(
                Nonce::from_slice(&header.nonce),
                Payload {
                    msg: &bytes[HEADER_LEN..],
                    aad: &bytes[..HEADER_LEN],
                },
            )
            .map_err(|_| CryptoError::Authentication)
    }

    fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(&self.key[..]).map_err(|e| CryptoError::Encryption(e.to_string()))
    }
}

struct Header {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
}

impl Header {
    fn parse(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(CryptoError::Authentication);
        }
        let (magic, rest) = bytes.split_at(STORE_MAGIC.len());
        if magic != STORE_MAGIC || rest[0] != STORE_FORMAT {
            return Err(CryptoError::Authentication);
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&rest[1..1 + SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&rest[1 + SALT_LEN..1 + SALT_LEN + NONCE_LEN]);
        Ok(Header { salt, nonce })
    }
}

/// Encrypts `plaintext` under `secret` with a fresh salt and nonce.
///
/// # Examples
///
/// ```
/// use btodo::crypto::{decrypt, encrypt, Secret};
///
/// let secret = Secret::new("abc").unwrap();
/// let sealed = encrypt(b"hello", &secret).unwrap();
/// assert_eq!(decrypt(&sealed, &secret).unwrap(), b"hello");
/// assert!(decrypt(&sealed, &Secret::new("wrong").unwrap()).is_err());
/// ```
pub fn encrypt(plaintext: &[u8], secret: &Secret) -> Result<Vec<u8>, CryptoError> {
    StoreKey::generate(secret)?.seal(plaintext)
}

/// Decrypts an envelope produced by [`encrypt`] or [`StoreKey::seal`].
///
/// # Errors
///
/// Returns `CryptoError::Authentication` on any integrity failure.
pub fn decrypt(bytes: &[u8], secret: &Secret) -> Result<Vec<u8>, CryptoError> {
    StoreKey::unlock(secret, bytes).map(|(_, plaintext)| plaintext)
}
