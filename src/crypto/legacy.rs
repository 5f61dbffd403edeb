//! Read-only support for store files written by the first release.
//!
//! Those files carry no user secret. They were sealed with AES-256-EAX under a
//! key derived by PBKDF2-HMAC-SHA256 from a passphrase built into the
//! application:
//!
//! ```text
//! nonce: [u8; 16] | tag: [u8; 16] | AES-256-EAX ciphertext
//! ```
//!
//! The plaintext is the version 1 JSON document. Nothing is ever written in
//! this layout; the store re-seals the calendar in the current envelope on its
//! next save.

use crate::constants::{
    KEY_LEN, LEGACY_KDF_ROUNDS, LEGACY_NONCE_LEN, LEGACY_PASSPHRASE, LEGACY_SALT, LEGACY_TAG_LEN,
    STORE_MAGIC,
};
use crate::errors::CryptoError;
use aes::Aes256;
use eax::aead::generic_array::GenericArray;
use eax::aead::{Aead, KeyInit};
use eax::Eax;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

type LegacyCipher = Eax<Aes256>;

/// Whether `bytes` should be read as a legacy file rather than an envelope.
pub fn is_legacy(bytes: &[u8]) -> bool {
    !bytes.starts_with(STORE_MAGIC)
}

/// Authenticates and decrypts a legacy store file.
///
/// # Errors
///
/// Returns `CryptoError::Authentication` for truncated or modified files and
/// for anything that was not written by the first release.
pub fn decrypt(bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if bytes.len() < LEGACY_NONCE_LEN + LEGACY_TAG_LEN {
        return Err(CryptoError::Authentication);
    }
    let (nonce, rest) = bytes.split_at(LEGACY_NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(LEGACY_TAG_LEN);

    // The aead API expects the tag after the ciphertext.
    let mut sealed = Vec::with_capacity(ciphertext.len() + LEGACY_TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let plaintext = cipher()?
        .decrypt(GenericArray::from_slice(nonce), sealed.as_slice())
        .map_err(|_| CryptoError::Authentication)?;
    debug!("Decrypted {} byte legacy store", bytes.len());
    Ok(plaintext)
}

fn cipher() -> Result<LegacyCipher, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(
        LEGACY_PASSPHRASE.as_bytes(),
        LEGACY_SALT,
        LEGACY_KDF_ROUNDS,
        &mut key[..],
    );
    LegacyCipher::new_from_slice(&key[..]).map_err(|e| CryptoError::KeyDerivation(e.to_string()))
}
