//! Argon2id key derivation.

use crate::constants::{KDF_ITERATIONS, KDF_MEMORY_KIB, KDF_PARALLELISM, KEY_LEN, SALT_LEN};
use crate::crypto::Secret;
use crate::errors::CryptoError;
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

/// Derives the 256-bit store key from `secret` and a per-file salt.
///
/// Parameters are fixed for format 1; changing them requires a new format byte.
pub fn derive_key(
    secret: &Secret,
    salt: &[u8; SALT_LEN],
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_PARALLELISM, Some(KEY_LEN))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(secret.as_bytes(), salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic_per_salt() {
        let secret = Secret::new("abc").unwrap();
        let salt = [7u8; SALT_LEN];

        let first = derive_key(&secret, &salt).unwrap();
        let second = derive_key(&secret, &salt).unwrap();
        assert_eq!(*first, *second);

        let other_salt = derive_key(&secret, &[8u8; SALT_LEN]).unwrap();
        assert_ne!(*first, *other_salt);

        let other_secret = derive_key(&Secret::new("abd").unwrap(), &salt).unwrap();
        assert_ne!(*first, *other_secret);
    }
}
