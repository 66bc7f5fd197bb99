//! Versioned ciphertext envelope.
//!
//! The envelope is the JSON object stored by the server for every encrypted
//! field (`data`, `attachment`, `attachmentname`, `nickname`). Its schema has
//! been stable (`v = 1`) across every payload codec generation, so the same
//! struct parses pastes written by ZeroBin and by PrivateBin 1.x clients.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Envelope schema version.
pub const ENVELOPE_VERSION: u32 = 1;
/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
/// Largest PBKDF2 iteration count an envelope may ask for.
pub const MAX_ITERATIONS: u32 = 1_000_000;
/// AES key size in bits.
pub const KEY_SIZE_BITS: u32 = 256;
/// GCM authentication tag size in bits.
pub const TAG_SIZE_BITS: u32 = 128;
/// IV length in bytes.
pub const IV_SIZE: usize = 16;
/// PBKDF2 salt length in bytes.
pub const SALT_SIZE: usize = 8;

const MODE_GCM: &str = "gcm";
const CIPHER_AES: &str = "aes";

/// An encrypted field as it travels over the wire.
///
/// Field order matches the historical serialization so that re-encoded
/// envelopes are byte-identical to what the server already stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherEnvelope {
    /// Base64 IV.
    pub iv: String,
    /// Schema version.
    pub v: u32,
    /// PBKDF2 iterations.
    pub iter: u32,
    /// Key size in bits.
    pub ks: u32,
    /// Tag size in bits.
    pub ts: u32,
    /// Block cipher mode.
    pub mode: String,
    /// Base64 additional authenticated data.
    #[serde(default)]
    pub adata: String,
    /// Block cipher identifier.
    pub cipher: String,
    /// Base64 PBKDF2 salt.
    pub salt: String,
    /// Base64 ciphertext with the tag appended.
    pub ct: String,
}

impl CipherEnvelope {
    /// Builds an envelope with the current parameter set.
    pub fn new(iv: &[u8], salt: &[u8], iterations: u32, ciphertext: &[u8]) -> Self {
        Self {
            iv: STANDARD.encode(iv),
            v: ENVELOPE_VERSION,
            iter: iterations,
            ks: KEY_SIZE_BITS,
            ts: TAG_SIZE_BITS,
            mode: MODE_GCM.to_string(),
            adata: String::new(),
            cipher: CIPHER_AES.to_string(),
            salt: STANDARD.encode(salt),
            ct: STANDARD.encode(ciphertext),
        }
    }

    /// Parses the JSON wire form.
    pub fn from_json(json: &str) -> CryptoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to the JSON wire form.
    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rejects parameter sets this codec cannot open.
    pub fn validate(&self) -> CryptoResult<()> {
        if self.v != ENVELOPE_VERSION {
            return Err(CryptoError::Unsupported {
                field: "v",
                value: self.v.to_string(),
            });
        }
        if self.cipher != CIPHER_AES {
            return Err(CryptoError::Unsupported {
                field: "cipher",
                value: self.cipher.clone(),
            });
        }
        if self.mode != MODE_GCM {
            return Err(CryptoError::Unsupported {
                field: "mode",
                value: self.mode.clone(),
            });
        }
        if self.ks != KEY_SIZE_BITS {
            return Err(CryptoError::Unsupported {
                field: "ks",
                value: self.ks.to_string(),
            });
        }
        if self.ts != TAG_SIZE_BITS {
            return Err(CryptoError::Unsupported {
                field: "ts",
                value: self.ts.to_string(),
            });
        }
        if self.iter == 0 || self.iter > MAX_ITERATIONS {
            return Err(CryptoError::Unsupported {
                field: "iter",
                value: self.iter.to_string(),
            });
        }
        Ok(())
    }

    pub fn iv_bytes(&self) -> CryptoResult<Vec<u8>> {
        let iv = STANDARD.decode(&self.iv)?;
        if iv.len() != IV_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "iv must be {IV_SIZE} bytes, got {}",
                iv.len()
            )));
        }
        Ok(iv)
    }

    pub fn salt_bytes(&self) -> CryptoResult<Vec<u8>> {
        Ok(STANDARD.decode(&self.salt)?)
    }

    pub fn adata_bytes(&self) -> CryptoResult<Vec<u8>> {
        Ok(STANDARD.decode(&self.adata)?)
    }

    pub fn ciphertext_bytes(&self) -> CryptoResult<Vec<u8>> {
        let ct = STANDARD.decode(&self.ct)?;
        if ct.len() < (TAG_SIZE_BITS / 8) as usize {
            return Err(CryptoError::MalformedEnvelope(
                "ciphertext shorter than authentication tag".to_string(),
            ));
        }
        Ok(ct)
    }
}
