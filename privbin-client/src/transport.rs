//! HTTP transport for the paste service.
//!
//! A [`TransportClient`] holds the parameters of exactly one outstanding
//! request. [`prepare`](TransportClient::prepare) starts over, the setters
//! fill in encrypted and plaintext fields, and [`run`](TransportClient::run)
//! sends them as a form POST and classifies the JSON answer. `run` borrows
//! the client mutably, so a second request cannot be prepared while one is
//! in flight.

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::notify::MessageTemplate;
use privbin_crypto::{CipherCodec, SymmetricKey};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Marks requests as API calls; the server answers them with JSON.
const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "JSONHttpRequest");

/// Response classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStatus {
    Okay = 0,
    /// The server rejected the request and said why.
    Custom = 1,
    /// JSON answer with a status this client does not know.
    Unknown = 2,
    /// No answer, an HTTP error, or a body that is not JSON.
    ServerError = 3,
}

impl UploadStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A request that did not succeed.
#[derive(Clone, Debug)]
pub struct UploadFailure {
    pub status: UploadStatus,
    /// Server message for [`UploadStatus::Custom`], transport detail otherwise.
    pub message: Option<String>,
    /// Parsed response body, when there was one.
    pub body: Option<Value>,
}

impl UploadFailure {
    fn server_error(detail: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::ServerError,
            message: Some(detail.into()),
            body: None,
        }
    }

    /// User-facing message for a failed `action` ("create paste", ...).
    pub fn to_template(&self, action: &str) -> MessageTemplate {
        parse_upload_error(self.status, self.message.as_deref(), action)
    }
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.message) {
            (UploadStatus::Custom, Some(message)) => f.write_str(message),
            (UploadStatus::Unknown, _) => f.write_str("unknown status"),
            (UploadStatus::ServerError, Some(detail)) => {
                write!(f, "server error or not responding ({detail})")
            }
            (UploadStatus::ServerError, None) => f.write_str("server error or not responding"),
            _ => f.write_str("unknown error"),
        }
    }
}

/// A successful response.
#[derive(Clone, Debug)]
pub struct UploadResult {
    pub status: i64,
    pub id: Option<String>,
    pub delete_token: Option<String>,
    pub message: Option<String>,
    /// Key the encrypted fields were sealed with; it was not sent.
    pub encryption_key: Option<SymmetricKey>,
    /// Every field that was sent.
    pub request_data: BTreeMap<String, String>,
    /// The full response body, e.g. a paste for read requests.
    pub body: Value,
}

impl UploadResult {
    fn from_body(body: Value, key: Option<SymmetricKey>, data: BTreeMap<String, String>) -> Self {
        let text = |field: &str| body.get(field).and_then(Value::as_str).map(str::to_owned);
        Self {
            status: 0,
            id: text("id"),
            delete_token: text("deletetoken"),
            message: text("message"),
            encryption_key: key,
            request_data: data,
            body,
        }
    }
}

/// Maps a failure onto its user-facing message.
pub fn parse_upload_error(status: UploadStatus, message: Option<&str>, action: &str) -> MessageTemplate {
    let template = MessageTemplate::new(format!("Could not {action}: %s"));
    match status {
        UploadStatus::Custom => template.arg(message.unwrap_or_default()),
        UploadStatus::Unknown => template.arg("unknown status"),
        UploadStatus::ServerError => template.arg("server error or not responding"),
        UploadStatus::Okay => template.arg("unknown error"),
    }
}

/// Parameters of the one outstanding request.
struct PendingRequest {
    url: String,
    key: Option<SymmetricKey>,
    password: Zeroizing<String>,
    data: BTreeMap<String, String>,
}

impl PendingRequest {
    fn new(url: String) -> Self {
        Self {
            url,
            key: None,
            password: Zeroizing::new(String::new()),
            data: BTreeMap::new(),
        }
    }
}

pub struct TransportClient {
    client: Client,
    codec: CipherCodec,
    base_uri: String,
    request: PendingRequest,
}

impl TransportClient {
    pub fn new(config: &ClientConfig, codec: CipherCodec) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let base_uri = config.parsed_base_url().map(|u| crate::identity::base_uri(&u))?;

        Ok(Self {
            client,
            codec,
            request: PendingRequest::new(base_uri.clone()),
            base_uri,
        })
    }

    pub fn codec(&self) -> &CipherCodec {
        &self.codec
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Location requests go to unless [`set_url`](Self::set_url) overrides it.
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = base_uri.into();
    }

    /// Discards any previously prepared request.
    pub fn prepare(&mut self) {
        self.request = PendingRequest::new(self.base_uri.clone());
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.request.url = url.into();
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    /// Without `key`, one is generated on the first [`set_data`](Self::set_data).
    pub fn set_crypt_parameters(&mut self, password: &str, key: Option<SymmetricKey>) {
        self.request.password = Zeroizing::new(password.to_string());
        if key.is_some() {
            self.request.key = key;
        }
    }

    /// Encrypts `plaintext` and stores the envelope under `field`.
    pub fn set_data(&mut self, field: &str, plaintext: &str) -> ClientResult<()> {
        let key = match &self.request.key {
            Some(key) => key.clone(),
            None => {
                let key = self.codec.symmetric_key()?;
                self.request.key = Some(key.clone());
                key
            }
        };
        let envelope = self
            .codec
            .cipher(key.as_str(), &self.request.password, plaintext)?;
        self.request.data.insert(field.to_string(), envelope.to_json()?);
        Ok(())
    }

    pub fn set_unencrypted_data(&mut self, field: &str, value: impl Into<String>) {
        self.request.data.insert(field.to_string(), value.into());
    }

    pub fn set_unencrypted_bulk_data<K, V>(&mut self, fields: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.request
            .data
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn encryption_key(&self) -> Option<&SymmetricKey> {
        self.request.key.as_ref()
    }

    /// Fields of the prepared request, exactly as they will be sent.
    pub fn request_data(&self) -> &BTreeMap<String, String> {
        &self.request.data
    }

    /// Sends the prepared request. The client is left freshly prepared.
    pub async fn run(&mut self) -> Result<UploadResult, UploadFailure> {
        let fresh = PendingRequest::new(self.base_uri.clone());
        let PendingRequest { url, key, data, .. } = std::mem::replace(&mut self.request, fresh);

        debug!("POST {url} with fields {:?}", data.keys().collect::<Vec<_>>());
        let response = self
            .client
            .post(&url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .form(&data)
            .send()
            .await
            .map_err(|e| {
                warn!("request to {url} failed: {e}");
                UploadFailure::server_error(e.to_string())
            })?;

        if !response.status().is_success() {
            warn!("request to {url} answered HTTP {}", response.status());
            return Err(UploadFailure::server_error(format!("HTTP {}", response.status())));
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!("response from {url} is not JSON: {e}");
            UploadFailure::server_error(e.to_string())
        })?;

        match body.get("status").and_then(Value::as_i64) {
            Some(0) => {
                debug!("request to {url} succeeded");
                Ok(UploadResult::from_body(body, key, data))
            }
            Some(1) => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                debug!("server rejected request to {url}: {message:?}");
                Err(UploadFailure {
                    status: UploadStatus::Custom,
                    message,
                    body: Some(body),
                })
            }
            other => {
                warn!("unknown response status {other:?} from {url}");
                Err(UploadFailure {
                    status: UploadStatus::Unknown,
                    message: None,
                    body: Some(body),
                })
            }
        }
    }
}

impl fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportClient")
            .field("base_uri", &self.base_uri)
            .field("url", &self.request.url)
            .field("fields", &self.request.data.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
