//! Key material handling.
//!
//! A paste is protected by a random symmetric key that only ever travels in
//! the URL fragment. When the author sets a password, the key string is
//! extended with `hex(SHA-256(password))` before stretching, so the server
//! can never open a password-protected paste even with a leaked link.

use crate::envelope::KEY_SIZE_BITS;
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Symmetric key size in bytes (256 bits of CSPRNG output).
pub const SYMMETRIC_KEY_SIZE: usize = 32;
/// Derived AES key size in bytes.
pub const AES_KEY_SIZE: usize = (KEY_SIZE_BITS / 8) as usize;

/// The base64 encoded symmetric key of a paste.
///
/// The encoded string itself (not the decoded bytes) is the PBKDF2 input,
/// which is why this type wraps text.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(String);

impl SymmetricKey {
    /// Wraps an already encoded key, e.g. one parsed from a URL fragment.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Returns true when the password counts as "not set".
pub fn is_blank_password(password: &str) -> bool {
    password.trim().is_empty()
}

/// Key string extended with the password digest.
pub fn password_augmented(key: &str, password: &str) -> Zeroizing<String> {
    let digest = hex::encode(Sha256::digest(password.as_bytes()));
    Zeroizing::new(format!("{key}{digest}"))
}

/// Effective key string used for encryption.
///
/// `key` alone for a blank password, otherwise the password-augmented form.
pub fn effective_key(key: &str, password: &str) -> Zeroizing<String> {
    if is_blank_password(password) {
        Zeroizing::new(key.to_string())
    } else {
        password_augmented(key, password)
    }
}

/// Stretches key material into an AES-256 key with PBKDF2-HMAC-SHA256.
pub fn derive_aes_key(material: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; AES_KEY_SIZE]> {
    let mut out = Zeroizing::new([0u8; AES_KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(material.as_bytes(), salt, iterations, &mut out[..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_password_keeps_key() {
        assert_eq!(effective_key("abc", "").as_str(), "abc");
        assert_eq!(effective_key("abc", "  \t").as_str(), "abc");
    }

    #[test]
    fn password_appends_sha256_hex() {
        let augmented = effective_key("abc", "123456");
        assert_eq!(
            augmented.as_str(),
            "abc8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[test]
    fn debug_does_not_leak() {
        let key = SymmetricKey::from_encoded("c2VjcmV0");
        assert_eq!(format!("{key:?}"), "SymmetricKey(..)");
    }
}
