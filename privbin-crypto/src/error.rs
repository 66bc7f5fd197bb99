//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while sealing or opening paste payloads.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("not enough entropy collected yet")]
    EntropyNotReady,

    #[error("random source failed: {0}")]
    RandomSource(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("invalid encoding: {0}")]
    Encoding(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("unsupported envelope parameter {field}: {value}")]
    Unsupported { field: &'static str, value: String },
}

impl From<base64::DecodeError> for CryptoError {
    fn from(e: base64::DecodeError) -> Self {
        CryptoError::Encoding(e.to_string())
    }
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::MalformedEnvelope(e.to_string())
    }
}
