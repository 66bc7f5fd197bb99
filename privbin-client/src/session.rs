//! Per-page session state.
//!
//! Everything that lives for one page load: the location and the id/key
//! resolved from it, the ciphertext found on load, the paste being viewed or
//! drafted, and what the user can currently do.

use crate::identity::IdentityResolver;
use crate::types::{Attachment, DecryptedPaste};
use privbin_crypto::SymmetricKey;
use tracing::debug;
use url::Url;

/// What the session is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Creating,
    Viewing,
    Cloning,
    PostingComment,
    /// Re-fetching the viewed paste after a comment was posted.
    Refreshing,
    Deleting,
}

/// Action buttons currently offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affordances {
    Hidden,
    /// Send, expiration, password and attachment controls.
    Create,
    /// New paste, raw text and optionally clone.
    View { clone: bool },
}

/// Content of a paste that has not been sent yet.
#[derive(Clone, Debug, Default)]
pub struct PasteDraft {
    pub text: String,
    pub formatter: String,
    pub expire: String,
    pub burn_after_reading: bool,
    pub open_discussion: bool,
    pub password: String,
    pub attachment: Option<AttachmentSource>,
}

/// Where the attachment of a draft comes from.
#[derive(Clone, Debug)]
pub enum AttachmentSource {
    /// Read from disk when the paste is sent.
    File { path: std::path::PathBuf, mime: String },
    /// Already encoded, e.g. carried over from a cloned paste.
    Encoded(Attachment),
}

/// A reply to a paste or to one of its comments.
#[derive(Clone, Debug, Default)]
pub struct CommentDraft {
    pub text: String,
    pub nickname: String,
    /// Comment being replied to; `None` replies to the paste itself.
    pub parent_id: Option<String>,
}

/// Result of a successful paste upload.
#[derive(Clone, Debug)]
pub struct CreatedPaste {
    pub id: String,
    pub key: SymmetricKey,
    pub delete_token: String,
    pub url: String,
    pub delete_url: String,
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    affordances: Affordances,
    loading: Option<String>,
    identity: IdentityResolver,
    cipher_data: Option<String>,
    paste: Option<DecryptedPaste>,
    draft: PasteDraft,
    scroll_offset: u64,
    highlighted_comment: Option<String>,
}

impl Session {
    pub fn new(location: Url) -> Self {
        Self {
            mode: Mode::Creating,
            affordances: Affordances::Hidden,
            loading: None,
            identity: IdentityResolver::new(location),
            cipher_data: None,
            paste: None,
            draft: PasteDraft::default(),
            scroll_offset: 0,
            highlighted_comment: None,
        }
    }

    /// Starts a new page load. Ciphertext embedded in the page, if any, is
    /// what a later decryption without an explicit paste falls back to.
    pub fn load(&mut self, location: Url, cipher_data: Option<String>) {
        self.identity.set_location(location);
        self.cipher_data = cipher_data.filter(|c| !c.is_empty());
        self.paste = None;
        self.highlighted_comment = None;
        self.scroll_offset = 0;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!("session mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    // ── Affordances ──

    pub fn affordances(&self) -> Affordances {
        self.affordances
    }

    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    pub fn show_loading(&mut self, message: impl Into<String>) {
        self.loading = Some(message.into());
    }

    pub fn hide_loading(&mut self) {
        self.loading = None;
    }

    pub fn hide_all_buttons(&mut self) {
        self.affordances = Affordances::Hidden;
    }

    pub fn show_create_buttons(&mut self) {
        self.affordances = Affordances::Create;
    }

    /// Cloning is offered unless the viewed paste burns after reading.
    pub fn show_view_buttons(&mut self) {
        let clone = !self
            .paste
            .as_ref()
            .is_some_and(|p| p.meta.burnafterreading);
        self.affordances = Affordances::View { clone };
    }

    pub fn hide_clone_button(&mut self) {
        if let Affordances::View { .. } = self.affordances {
            self.affordances = Affordances::View { clone: false };
        }
    }

    /// Never both the loading indicator and every action hidden at once.
    pub fn is_actionable(&self) -> bool {
        self.loading.is_some() || self.affordances != Affordances::Hidden
    }

    // ── Location ──

    pub fn location(&self) -> &Url {
        self.identity.location()
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut IdentityResolver {
        &mut self.identity
    }

    /// Replaces the shareable location without reloading the page.
    pub fn push_location(&mut self, location: Url) {
        self.identity.set_location(location);
    }

    pub fn base_uri(&self) -> String {
        self.identity.base_uri()
    }

    pub fn cipher_data(&self) -> Option<&str> {
        self.cipher_data.as_deref()
    }

    pub fn has_cipher_data(&self) -> bool {
        self.cipher_data.is_some()
    }

    // ── Content ──

    pub fn paste(&self) -> Option<&DecryptedPaste> {
        self.paste.as_ref()
    }

    pub fn set_paste(&mut self, paste: DecryptedPaste) {
        self.paste = Some(paste);
    }

    pub fn clear_paste(&mut self) {
        self.paste = None;
    }

    pub fn draft(&self) -> &PasteDraft {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: PasteDraft) {
        self.draft = draft;
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
    }

    pub fn highlighted_comment(&self) -> Option<&str> {
        self.highlighted_comment.as_deref()
    }

    pub fn highlight_comment(&mut self, id: impl Into<String>) {
        self.highlighted_comment = Some(id.into());
    }
}
