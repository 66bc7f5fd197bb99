//! Client error types.

use crate::transport::{UploadFailure, parse_upload_error};
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// User-facing message for every decryption-class failure.
///
/// Wrong key, wrong password and corrupted data deliberately share it.
pub const DECRYPTION_FAILED_MESSAGE: &str = "Could not decrypt data (Wrong key?)";

/// User-facing message when the location lacks the paste id or key.
pub const MISSING_KEY_MESSAGE: &str = "Cannot decrypt paste: Decryption key missing in URL (Did you use a redirector or an URL shortener which strips part of the URL?)";

/// Errors that can occur while driving the paste lifecycle.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no paste id given")]
    MissingIdentifier,

    #[error("no encryption key given")]
    MissingKey,

    #[error("failed to decipher {0}")]
    Decryption(String),

    #[error("could not {action}: {failure}")]
    Upload {
        action: &'static str,
        failure: UploadFailure,
    },

    #[error("password prompt canceled")]
    PasswordCanceled,

    #[error("no password supplied")]
    PasswordRequired,

    #[error("nothing to send")]
    EmptyContent,

    #[error("no paste is being viewed")]
    NoPaste,

    #[error("cloning a burn after reading paste is not allowed")]
    CloneRefused,

    #[error("attachment error: {0}")]
    Attachment(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("crypto error: {0}")]
    Crypto(#[from] privbin_crypto::CryptoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True for every failure that must surface as the generic decryption
    /// message.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Decryption(_)
                | ClientError::PasswordCanceled
                | ClientError::PasswordRequired
                | ClientError::Crypto(_)
        )
    }

    /// The message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::MissingIdentifier | ClientError::MissingKey => {
                MISSING_KEY_MESSAGE.to_string()
            }
            ClientError::Upload { action, failure } => {
                parse_upload_error(failure.status, failure.message.as_deref(), action).render()
            }
            e if e.is_decryption_failure() => DECRYPTION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
