//! Wire and view types for pastes and comments.

use crate::error::{ClientError, ClientResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A paste as returned by the server. Every ciphertext field holds a JSON
/// envelope string; the key is never part of this structure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Paste {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachmentname: Option<String>,
    #[serde(default)]
    pub meta: PasteMeta,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Paste {
    pub fn from_json(json: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Attachment ciphertext, treating an empty string as absent.
    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref().filter(|a| !a.is_empty())
    }
}

/// Plaintext paste metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteMeta {
    #[serde(default)]
    pub formatter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postdate: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub opendiscussion: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub burnafterreading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<i64>,
}

/// An encrypted comment as returned by the server.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parentid: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub meta: CommentMeta,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentMeta {
    /// Encrypted nickname envelope, absent for anonymous comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vizhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postdate: Option<i64>,
}

/// Accepts a JSON bool, a number (non-zero is true), a string ("1",
/// "true") or null for a flag.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct FlagVisitor;
    impl<'de> de::Visitor<'de> for FlagVisitor {
        type Value = bool;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a bool, a number or a string-encoded flag")
        }
        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> { Ok(v) }
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> { Ok(v != 0) }
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> { Ok(v != 0) }
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> { Ok(v != 0.0) }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(matches!(v.trim(), "1" | "true" | "on" | "yes"))
        }
        fn visit_unit<E: de::Error>(self) -> Result<bool, E> { Ok(false) }
        fn visit_none<E: de::Error>(self) -> Result<bool, E> { Ok(false) }
    }
    deserializer.deserialize_any(FlagVisitor)
}

/// A file carried by a paste, as a `data:` URL plus its file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub data_url: String,
    pub name: String,
}

impl Attachment {
    /// Encodes raw file contents the way a browser's `readAsDataURL` does.
    pub fn from_bytes(name: impl Into<String>, mime: &str, bytes: &[u8]) -> Self {
        Self {
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            name: name.into(),
        }
    }

    pub async fn from_file(path: impl AsRef<Path>, mime: &str) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Attachment(format!("{} has no file name", path.display())))?;
        Ok(Self::from_bytes(name, mime, &bytes))
    }

    /// MIME type declared in the data URL.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.data_url.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    /// Decodes the file contents.
    pub fn to_bytes(&self) -> ClientResult<Vec<u8>> {
        let (header, body) = self
            .data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| ClientError::Attachment("not a data URL".into()))?;
        if !header.ends_with(";base64") {
            return Err(ClientError::Attachment("data URL is not base64 encoded".into()));
        }
        STANDARD
            .decode(body)
            .map_err(|e| ClientError::Attachment(e.to_string()))
    }
}

/// A fully decrypted paste ready for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptedPaste {
    pub id: String,
    pub text: String,
    pub formatter: String,
    pub attachment: Option<Attachment>,
    pub comments: Vec<DecryptedComment>,
    pub meta: PasteMeta,
}

/// Placeholder shown for a comment that could not be decrypted.
pub const COMMENT_DECRYPTION_FAILED: &str = "comment decryption failed";
/// Nickname shown for comments posted without one.
pub const ANONYMOUS_NICKNAME: &str = "Anonymous";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptedComment {
    pub id: String,
    pub parentid: String,
    /// Plaintext, or [`COMMENT_DECRYPTION_FAILED`].
    pub text: String,
    /// Decrypted nickname, empty when none was set.
    pub nickname: String,
    pub vizhash: Option<String>,
    pub postdate: Option<i64>,
    pub decrypted: bool,
}

impl DecryptedComment {
    pub fn display_nickname(&self) -> &str {
        if self.nickname.is_empty() {
            ANONYMOUS_NICKNAME
        } else {
            &self.nickname
        }
    }
}

/// Approximates a duration for display: `(amount, unit)`.
///
/// Durations under 60 days are shown in days at most; longer ones in
/// 30-day months.
pub fn seconds_to_human(seconds: i64) -> (i64, &'static str) {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    if seconds < MINUTE {
        (seconds, "second")
    } else if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if seconds < 60 * DAY {
        (seconds / DAY, "day")
    } else {
        (seconds / (30 * DAY), "month")
    }
}
