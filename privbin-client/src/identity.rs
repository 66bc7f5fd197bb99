//! Paste id and key resolution from the current location.
//!
//! The paste id is the whole query string and the key is the fragment, which
//! browsers never send to the server. Both are parsed once per location and
//! memoized until [`IdentityResolver::set_location`] replaces it.

use crate::error::{ClientError, ClientResult};
use privbin_crypto::SymmetricKey;
use url::Url;

#[derive(Clone, Debug)]
pub struct IdentityResolver {
    location: Url,
    id: Option<String>,
    key: Option<SymmetricKey>,
}

impl IdentityResolver {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            id: None,
            key: None,
        }
    }

    pub fn parse(location: &str) -> ClientResult<Self> {
        Ok(Self::new(Url::parse(location)?))
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Navigates to a new location and forgets the memoized id and key.
    pub fn set_location(&mut self, location: Url) {
        self.location = location;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.id = None;
        self.key = None;
    }

    /// `?abc123#key` yields `abc123`.
    pub fn paste_id(&mut self) -> ClientResult<String> {
        if let Some(id) = &self.id {
            return Ok(id.clone());
        }
        let id = self.location.query().unwrap_or_default();
        if id.is_empty() {
            return Err(ClientError::MissingIdentifier);
        }
        self.id = Some(id.to_string());
        Ok(id.to_string())
    }

    /// The fragment up to the first `&`; redirectors like to append
    /// tracking parameters after the anchor.
    pub fn paste_key(&mut self) -> ClientResult<SymmetricKey> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        let fragment = self.location.fragment().unwrap_or_default();
        let key = fragment.split('&').next().unwrap_or_default();
        if key.is_empty() {
            return Err(ClientError::MissingKey);
        }
        let key = SymmetricKey::from_encoded(key);
        self.key = Some(key.clone());
        Ok(key)
    }

    pub fn has_fragment(&self) -> bool {
        self.location.fragment().is_some_and(|f| !f.is_empty())
    }

    /// Origin plus path, without query or fragment.
    pub fn base_uri(&self) -> String {
        base_uri(&self.location)
    }
}

/// `http://example.com/path/?aaaa#bbbb` yields `http://example.com/path/`.
pub fn base_uri(location: &Url) -> String {
    format!("{}{}", location.origin().ascii_serialization(), location.path())
}

/// Shareable link; the key rides in the fragment only.
pub fn view_url(base: &str, id: &str, key: &SymmetricKey) -> String {
    format!("{base}?{id}#{}", key.as_str())
}

pub fn delete_url(base: &str, id: &str, delete_token: &str) -> String {
    format!("{base}?pasteid={id}&deletetoken={delete_token}")
}
