//! User notifications.
//!
//! Operations report progress and failures through a [`NotificationSink`].
//! The controller holds a default sink; operations that own a dedicated
//! status area (posting a comment) accept an override for that one call.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

/// A message with `%s` / `%d` placeholders and their arguments.
///
/// Templates travel unrendered so a translation layer can look up `format`
/// before substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageTemplate {
    pub format: String,
    pub args: Vec<String>,
}

impl MessageTemplate {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Substitutes arguments in order. `%d` of a non-number renders `0`;
    /// `%%` is a literal percent sign; missing arguments render empty.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.format.len());
        let mut args = self.args.iter();
        let mut chars = self.format.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('s') => {
                    chars.next();
                    out.push_str(args.next().map(String::as_str).unwrap_or_default());
                }
                Some('d') => {
                    chars.next();
                    let n = args
                        .next()
                        .and_then(|a| a.trim().parse::<f64>().ok())
                        .filter(|n| n.is_finite())
                        .map_or(0, |n| n.trunc() as i64);
                    out.push_str(&n.to_string());
                }
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                _ => out.push('%'),
            }
        }
        out
    }
}

impl From<&str> for MessageTemplate {
    fn from(format: &str) -> Self {
        Self::new(format)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Something the user should see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Progress or informational status.
    Status(MessageTemplate),
    /// Remaining lifetime of the viewed paste.
    Remaining(MessageTemplate),
    Error(MessageTemplate),
    /// A paste was created; both links carry secrets and are shown once.
    PasteCreated { url: String, delete_url: String },
}

impl Notice {
    pub fn status(template: impl Into<MessageTemplate>) -> Self {
        Notice::Status(template.into())
    }

    pub fn error(template: impl Into<MessageTemplate>) -> Self {
        Notice::Error(template.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Receives user notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default sink: forwards notices to `tracing`.
///
/// Creation links are logged without their fragment-bearing URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Status(t) => info!("{t}"),
            Notice::Remaining(t) => warn!("{t}"),
            Notice::Error(t) => error!("{t}"),
            Notice::PasteCreated { .. } => info!("paste created"),
        }
    }
}

/// Buffers notices in memory, e.g. for a comment form's status area.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered text of every error notice, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Error(t) => Some(t.render()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
