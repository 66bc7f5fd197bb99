//! Top-level paste lifecycle: create, view, clone, discuss, refresh, delete.
//!
//! The controller owns the session and every collaborator. Each operation
//! runs its steps in order and leaves the session with at least one
//! actionable control, whatever fails along the way.

use crate::config::ClientConfig;
use crate::decrypter::DecryptionOrchestrator;
use crate::encrypter::EncryptionOrchestrator;
use crate::error::{ClientError, ClientResult, MISSING_KEY_MESSAGE};
use crate::notify::{MessageTemplate, Notice, NotificationSink, TracingSink};
use crate::password::{PasswordOracle, PasswordPrompt};
use crate::session::{AttachmentSource, CommentDraft, CreatedPaste, Mode, PasteDraft, Session};
use crate::transport::TransportClient;
use crate::types::{DecryptedPaste, Paste, PasteMeta, seconds_to_human};
use privbin_crypto::{CipherCodec, EntropyGate};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Delete token the server accepts for burn-after-reading pastes.
pub const BURN_AFTER_READING_TOKEN: &str = "burnafterreading";

const FOR_YOUR_EYES_ONLY: &str =
    "FOR YOUR EYES ONLY. Don't close this window, this message can't be displayed again.";
const DELETE_FAILED: &str =
    "Could not delete the paste, it was not stored in burn after reading mode.";

pub struct LifecycleController {
    config: ClientConfig,
    session: Session,
    transport: TransportClient,
    oracle: PasswordOracle,
    encrypter: EncryptionOrchestrator,
    decrypter: DecryptionOrchestrator,
    sink: Arc<dyn NotificationSink>,
}

impl LifecycleController {
    pub fn new(
        config: ClientConfig,
        entropy: EntropyGate,
        prompt: Arc<dyn PasswordPrompt>,
    ) -> ClientResult<Self> {
        let location = config.parsed_base_url()?;
        let codec = CipherCodec::new(entropy).with_iterations(config.pbkdf2_iterations);
        let transport = TransportClient::new(&config, codec.clone())?;

        Ok(Self {
            session: Session::new(location),
            transport,
            oracle: PasswordOracle::new(prompt),
            encrypter: EncryptionOrchestrator::new(),
            decrypter: DecryptionOrchestrator::new(codec),
            sink: Arc::new(TracingSink),
            config,
        })
    }

    /// Replaces the default notification sink.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    pub fn password_oracle(&self) -> &PasswordOracle {
        &self.oracle
    }

    /// A draft pre-filled with the configured defaults.
    pub fn blank_draft(&self) -> PasteDraft {
        PasteDraft {
            formatter: self.config.default_formatter.clone(),
            expire: self.config.default_expiration.clone(),
            ..PasteDraft::default()
        }
    }

    // ── Page load ──

    /// Starts a page at `location`: views `cipher_data` if the page carried
    /// any, otherwise opens an empty editor.
    pub async fn init(&mut self, location: &str, cipher_data: Option<String>) -> ClientResult<()> {
        let location = Url::parse(location)?;
        self.session.load(location, cipher_data);
        self.oracle.clear();
        self.transport.set_base_uri(self.session.base_uri());

        if self.session.has_cipher_data() {
            self.show_paste().await.map(|_| ())
        } else {
            self.new_paste();
            Ok(())
        }
    }

    /// Loads a shareable link: fetches the ciphertext, then views it.
    ///
    /// A link without id starts a new paste; a link without key fails
    /// before anything is fetched.
    pub async fn open(&mut self, location: &str) -> ClientResult<()> {
        let url = Url::parse(location)?;
        // Passwords never carry over from one paste to the next.
        self.oracle.clear();
        let mut target = crate::identity::IdentityResolver::new(url.clone());
        if target.paste_id().is_err() {
            return self.init(location, None).await;
        }
        if let Err(e) = target.paste_key() {
            self.session.load(url, None);
            self.transport.set_base_uri(self.session.base_uri());
            self.report_missing_identity(&e);
            return Err(e);
        }

        self.session.load(url, None);
        self.transport.set_base_uri(self.session.base_uri());
        self.session.set_mode(Mode::Viewing);
        self.session.hide_all_buttons();
        self.session.show_loading("Loading paste…");

        let body = match self.fetch_paste("load paste").await {
            Ok(paste) => serde_json::to_string(&paste)?,
            Err(e) => {
                self.new_paste();
                return Err(e);
            }
        };
        self.init(location, Some(body)).await
    }

    // ── Create ──

    /// Resets the editor and offers the create controls.
    ///
    /// Notices from a failed view stay visible.
    pub fn new_paste(&mut self) {
        self.session.hide_all_buttons();
        self.session.show_loading("Preparing new paste…");
        let draft = self.blank_draft();
        self.session.clear_paste();
        self.session.set_draft(draft);
        self.session.set_mode(Mode::Creating);
        self.session.show_create_buttons();
        self.session.hide_loading();
    }

    /// Encrypts and uploads `draft`; on success the session views it.
    pub async fn create_paste(&mut self, draft: PasteDraft) -> ClientResult<CreatedPaste> {
        self.session.set_mode(Mode::Creating);
        self.session.set_draft(draft.clone());
        let created = self
            .encrypter
            .send_paste(&mut self.session, &mut self.transport, &draft, self.sink.as_ref())
            .await?;
        // Comments posted right away are sealed with the creation password.
        self.oracle.set(&draft.password);
        info!("paste {} created", created.id);
        Ok(created)
    }

    // ── View ──

    /// Decrypts the ciphertext loaded with the page.
    pub async fn show_paste(&mut self) -> ClientResult<DecryptedPaste> {
        let resolved = {
            let identity = self.session.identity_mut();
            identity.paste_id().and_then(|_| identity.paste_key())
        };
        if let Err(e) = resolved {
            self.report_missing_identity(&e);
            return Err(e);
        }

        self.session.set_mode(Mode::Viewing);
        self.session.hide_all_buttons();
        let paste = self
            .decrypter
            .run(&mut self.session, &self.oracle, None, self.sink.as_ref())
            .await?;
        self.show_remaining_time(&paste.meta).await;
        Ok(paste)
    }

    /// Carries the viewed paste into a new, unsent draft.
    ///
    /// Burn-after-reading pastes are refused: they exist to be read once.
    pub fn clone_paste(&mut self) -> ClientResult<PasteDraft> {
        let paste = self.session.paste().cloned().ok_or(ClientError::NoPaste)?;
        if paste.meta.burnafterreading {
            warn!("refusing to clone a burn after reading paste");
            self.session.hide_clone_button();
            return Err(ClientError::CloneRefused);
        }

        let base = Url::parse(&self.session.base_uri())?;

        self.session.set_mode(Mode::Cloning);
        self.session.hide_all_buttons();
        self.session.show_loading("Cloning paste…");

        // Erase id and key from the shareable location.
        self.session.push_location(base);

        let mut draft = self.blank_draft();
        draft.text = paste.text;
        draft.formatter = paste.formatter;
        if let Some(attachment) = paste.attachment {
            self.sink.notify(Notice::Status(
                MessageTemplate::new("The cloned file '%s' was attached to this paste.")
                    .arg(&attachment.name),
            ));
            draft.attachment = Some(AttachmentSource::Encoded(attachment));
        }

        self.session.clear_paste();
        self.session.set_draft(draft.clone());
        self.session.set_mode(Mode::Creating);
        self.session.hide_loading();
        self.session.show_create_buttons();
        Ok(draft)
    }

    // ── Discussion ──

    /// Re-fetches and re-decrypts the viewed paste, keeping the scroll
    /// position.
    pub async fn refresh_paste(&mut self) -> ClientResult<DecryptedPaste> {
        let scroll_offset = self.session.scroll_offset();
        self.session.set_mode(Mode::Refreshing);

        let paste = match self.fetch_paste("refresh display").await {
            Ok(paste) => paste,
            Err(e) => {
                self.session.set_mode(Mode::Viewing);
                return Err(e);
            }
        };
        let result = self
            .decrypter
            .run(&mut self.session, &self.oracle, Some(paste), self.sink.as_ref())
            .await;
        self.session.set_scroll_offset(scroll_offset);
        self.session.set_mode(Mode::Viewing);
        result
    }

    /// Posts a comment, then refreshes the paste and highlights the new
    /// comment. Returns the comment id.
    ///
    /// Errors go to `status_area` when given instead of the default sink.
    pub async fn post_comment(
        &mut self,
        draft: CommentDraft,
        status_area: Option<Arc<dyn NotificationSink>>,
    ) -> ClientResult<String> {
        if self.session.paste().is_none() {
            return Err(ClientError::NoPaste);
        }
        self.session.set_mode(Mode::PostingComment);
        let sink = status_area.unwrap_or_else(|| self.sink.clone());

        let result = self
            .encrypter
            .send_comment(
                &mut self.session,
                &mut self.transport,
                &self.oracle,
                &draft,
                sink.as_ref(),
            )
            .await;
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.session.set_mode(Mode::Viewing);
                return Err(e);
            }
        };

        let comment_id = result.id.unwrap_or_default();
        self.refresh_paste().await?;
        self.session.highlight_comment(comment_id.clone());
        Ok(comment_id)
    }

    // ── Delete ──

    /// Asks the server to delete a paste. Failures are reported, not returned.
    pub async fn remove_paste(&mut self, paste_id: &str, delete_token: &str) {
        let previous = self.session.mode();
        self.session.set_mode(Mode::Deleting);

        self.transport.prepare();
        self.transport
            .set_url(format!("{}?{paste_id}", self.transport.base_uri()));
        self.transport.set_unencrypted_data("deletetoken", delete_token);
        match self.transport.run().await {
            Ok(_) => info!("paste {paste_id} deleted"),
            Err(failure) => {
                warn!("deleting paste {paste_id} failed: {failure}");
                self.sink.notify(Notice::error(DELETE_FAILED));
            }
        }

        self.session.set_mode(previous);
    }

    // ── Helpers ──

    async fn fetch_paste(&mut self, action: &'static str) -> ClientResult<Paste> {
        let paste_id = self.session.identity_mut().paste_id()?;
        self.transport.prepare();
        self.transport
            .set_url(format!("{}?{paste_id}", self.transport.base_uri()));

        let result = match self.transport.run().await {
            Ok(result) => result,
            Err(failure) => {
                self.session.hide_loading();
                self.session.show_view_buttons();
                self.sink.notify(Notice::Error(failure.to_template(action)));
                return Err(ClientError::Upload { action, failure });
            }
        };
        let mut paste: Paste = serde_json::from_value(result.body)?;
        if paste.id.is_empty() {
            paste.id = paste_id;
        }
        Ok(paste)
    }

    /// Shows how long the paste lives, or burns it now that it was read.
    async fn show_remaining_time(&mut self, meta: &PasteMeta) {
        if meta.burnafterreading {
            // Delete first, then tell the user it is gone.
            match self.session.identity_mut().paste_id() {
                Ok(id) => self.remove_paste(&id, BURN_AFTER_READING_TOKEN).await,
                Err(e) => warn!("cannot burn paste without id: {e}"),
            }
            self.sink
                .notify(Notice::Remaining(MessageTemplate::new(FOR_YOUR_EYES_ONLY)));
            self.session.hide_clone_button();
        } else if meta.expire_date.is_some() {
            let (amount, unit) = seconds_to_human(meta.remaining_time.unwrap_or_default());
            let plural = if amount == 1 { "" } else { "s" };
            debug!("paste expires in {amount} {unit}{plural}");
            self.sink.notify(Notice::Remaining(
                MessageTemplate::new(format!("This document will expire in %d {unit}{plural}."))
                    .arg(amount),
            ));
        }
    }

    fn report_missing_identity(&mut self, error: &ClientError) {
        warn!("cannot show paste: {error}");
        self.sink.notify(Notice::error(MISSING_KEY_MESSAGE));
        self.session.hide_loading();
        self.session.set_mode(Mode::Creating);
        self.session.show_create_buttons();
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("mode", &self.session.mode())
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
