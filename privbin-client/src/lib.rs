//! Paste lifecycle client for PrivBin.
//!
//! Drives a zero-knowledge paste service: every field is encrypted before it
//! leaves the process and the key only ever travels in the URL fragment.
//!
//! - [`LifecycleController`] sequences create, view, clone, comment,
//!   refresh and delete
//! - [`EncryptionOrchestrator`] / [`DecryptionOrchestrator`] build and open
//!   the encrypted payloads
//! - [`TransportClient`] sends form requests and classifies the answers
//! - [`IdentityResolver`] reads paste id and key from a location
//! - [`PasswordOracle`] caches the password and asks for it when needed

pub mod config;
pub mod decrypter;
pub mod encrypter;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod notify;
pub mod password;
pub mod session;
pub mod transport;
pub mod types;

pub use config::ClientConfig;
pub use decrypter::DecryptionOrchestrator;
pub use encrypter::EncryptionOrchestrator;
pub use error::{ClientError, ClientResult};
pub use identity::IdentityResolver;
pub use lifecycle::LifecycleController;
pub use notify::{MessageTemplate, Notice, NotificationSink, RecordingSink, TracingSink};
pub use password::{NoPrompt, PasswordOracle, PasswordPrompt};
pub use session::{Affordances, AttachmentSource, CommentDraft, CreatedPaste, Mode, PasteDraft, Session};
pub use transport::{TransportClient, UploadFailure, UploadResult, UploadStatus};
pub use types::*;
