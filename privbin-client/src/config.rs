//! Client configuration.

use crate::error::{ClientError, ClientResult};
use privbin_crypto::envelope::{DEFAULT_ITERATIONS, MAX_ITERATIONS};
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the paste client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Location of the paste service (e.g., "https://paste.example.org/").
    pub base_url: String,

    /// Upper bound for a single network round trip, in seconds.
    ///
    /// Waiting for entropy or for a password is not bounded by this.
    pub request_timeout_secs: u64,

    /// Expiration sent with new pastes unless the draft overrides it.
    pub default_expiration: String,

    /// Formatter sent with new pastes unless the draft overrides it.
    pub default_formatter: String,

    /// PBKDF2 iterations written into new envelopes.
    pub pbkdf2_iterations: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://paste.example.org/".to_string(),
            request_timeout_secs: 30,
            default_expiration: "1week".to_string(),
            default_formatter: "plaintext".to_string(),
            pbkdf2_iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with every other field defaulted.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Checks that the config can drive a client.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Config("request_timeout_secs must be positive".into()));
        }
        if self.pbkdf2_iterations == 0 || self.pbkdf2_iterations > MAX_ITERATIONS {
            return Err(ClientError::Config(format!(
                "pbkdf2_iterations must be between 1 and {MAX_ITERATIONS}"
            )));
        }
        Ok(())
    }

    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        self.validate()?;
        Ok(Url::parse(&self.base_url)?)
    }
}
