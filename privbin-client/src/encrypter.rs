//! Builds and sends encrypted pastes and comments.

use crate::error::{ClientError, ClientResult};
use crate::identity::{delete_url, view_url};
use crate::notify::{MessageTemplate, Notice, NotificationSink};
use crate::password::PasswordOracle;
use crate::session::{AttachmentSource, CommentDraft, CreatedPaste, Mode, PasteDraft, Session};
use crate::transport::{TransportClient, UploadFailure, UploadResult, UploadStatus};
use crate::types::{Attachment, DecryptedPaste, PasteMeta};
use tracing::{debug, info, warn};
use url::Url;

const ENTROPY_WAIT_MESSAGE: &str = "Please move your mouse for more entropy…";

#[derive(Debug, Default)]
pub struct EncryptionOrchestrator {
    requirements_checked: bool,
}

impl EncryptionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until key material may be drawn.
    ///
    /// Checked once per orchestrator; while waiting the caller's future is
    /// the single pending retry.
    async fn check_requirements(&mut self, transport: &TransportClient, sink: &dyn NotificationSink) {
        if self.requirements_checked {
            return;
        }
        let entropy = transport.codec().entropy();
        if !entropy.is_ready() {
            info!("waiting for entropy before generating keys");
            sink.notify(Notice::status(ENTROPY_WAIT_MESSAGE));
            entropy.wait_ready().await;
        }
        self.requirements_checked = true;
    }

    /// Encrypts and uploads a new paste.
    ///
    /// An empty draft is dropped without a request. On success the session
    /// shows the created paste at its shareable location; on any failure the
    /// create controls come back.
    pub async fn send_paste(
        &mut self,
        session: &mut Session,
        transport: &mut TransportClient,
        draft: &PasteDraft,
        sink: &dyn NotificationSink,
    ) -> ClientResult<CreatedPaste> {
        session.hide_all_buttons();
        session.show_loading("Sending paste…");

        if draft.text.is_empty() && draft.attachment.is_none() {
            debug!("nothing to send");
            session.hide_loading();
            session.show_create_buttons();
            return Err(ClientError::EmptyContent);
        }

        self.check_requirements(transport, sink).await;

        match self.upload_paste(transport, draft).await {
            Ok((created, attachment)) => {
                session.hide_loading();
                sink.notify(Notice::PasteCreated {
                    url: created.url.clone(),
                    delete_url: created.delete_url.clone(),
                });
                match Url::parse(&created.url) {
                    Ok(location) => session.push_location(location),
                    Err(e) => warn!("created paste link is not a valid URL: {e}"),
                }
                session.set_paste(DecryptedPaste {
                    id: created.id.clone(),
                    text: draft.text.clone(),
                    formatter: draft.formatter.clone(),
                    attachment,
                    comments: Vec::new(),
                    meta: PasteMeta {
                        formatter: draft.formatter.clone(),
                        opendiscussion: draft.open_discussion,
                        burnafterreading: draft.burn_after_reading,
                        ..PasteMeta::default()
                    },
                });
                session.set_mode(Mode::Viewing);
                session.show_view_buttons();
                Ok(created)
            }
            Err(e) => {
                session.hide_loading();
                session.show_create_buttons();
                sink.notify(Notice::Error(upload_error_template(&e, "create paste")));
                Err(e)
            }
        }
    }

    /// Returns the created paste and the attachment exactly as it was sealed.
    async fn upload_paste(
        &self,
        transport: &mut TransportClient,
        draft: &PasteDraft,
    ) -> ClientResult<(CreatedPaste, Option<Attachment>)> {
        transport.prepare();
        transport.set_crypt_parameters(&draft.password, None);
        transport.set_unencrypted_bulk_data([
            ("expire", draft.expire.clone()),
            ("formatter", draft.formatter.clone()),
            ("burnafterreading", flag(draft.burn_after_reading)),
            ("opendiscussion", flag(draft.open_discussion)),
        ]);
        transport.set_data("data", &draft.text)?;

        let attachment = match &draft.attachment {
            Some(AttachmentSource::File { path, mime }) => Some(Attachment::from_file(path, mime).await?),
            Some(AttachmentSource::Encoded(attachment)) => Some(attachment.clone()),
            None => None,
        };
        if let Some(attachment) = &attachment {
            transport.set_data("attachment", &attachment.data_url)?;
            transport.set_data("attachmentname", &attachment.name)?;
        }

        let base = transport.base_uri().to_string();
        let result = transport.run().await.map_err(|failure| ClientError::Upload {
            action: "create paste",
            failure,
        })?;
        Ok((created_paste(&base, result)?, attachment))
    }

    /// Encrypts and uploads a comment under the viewed paste's key and the
    /// cached password.
    ///
    /// Failures are reported to `sink`, which is the comment form's own
    /// status area when the caller has one.
    pub async fn send_comment(
        &mut self,
        session: &mut Session,
        transport: &mut TransportClient,
        oracle: &PasswordOracle,
        draft: &CommentDraft,
        sink: &dyn NotificationSink,
    ) -> ClientResult<UploadResult> {
        session.hide_all_buttons();
        session.show_loading("Sending comment…");

        if draft.text.is_empty() {
            session.hide_loading();
            session.show_view_buttons();
            return Err(ClientError::EmptyContent);
        }

        self.check_requirements(transport, sink).await;

        match self.upload_comment(session, transport, oracle, draft).await {
            Ok(result) => Ok(result),
            Err(e) => {
                session.hide_loading();
                session.show_view_buttons();
                sink.notify(Notice::Error(upload_error_template(&e, "post comment")));
                Err(e)
            }
        }
    }

    async fn upload_comment(
        &self,
        session: &mut Session,
        transport: &mut TransportClient,
        oracle: &PasswordOracle,
        draft: &CommentDraft,
    ) -> ClientResult<UploadResult> {
        let paste_id = session.identity_mut().paste_id()?;
        let key = session.identity_mut().paste_key()?;

        transport.prepare();
        transport.set_crypt_parameters(&oracle.cached(), Some(key));
        transport.set_unencrypted_data("pasteid", paste_id.clone());
        transport.set_unencrypted_data("parentid", draft.parent_id.clone().unwrap_or(paste_id));
        transport.set_data("data", &draft.text)?;
        if !draft.nickname.is_empty() {
            transport.set_data("nickname", &draft.nickname)?;
        }

        transport.run().await.map_err(|failure| ClientError::Upload {
            action: "post comment",
            failure,
        })
    }
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

fn created_paste(base: &str, result: UploadResult) -> ClientResult<CreatedPaste> {
    let malformed = |body: &UploadResult| ClientError::Upload {
        action: "create paste",
        failure: UploadFailure {
            status: UploadStatus::Unknown,
            message: None,
            body: Some(body.body.clone()),
        },
    };
    let (Some(id), Some(key)) = (result.id.clone(), result.encryption_key.clone()) else {
        return Err(malformed(&result));
    };
    let delete_token = result.delete_token.clone().unwrap_or_default();
    Ok(CreatedPaste {
        url: view_url(base, &id, &key),
        delete_url: delete_url(base, &id, &delete_token),
        id,
        key,
        delete_token,
    })
}

/// Upload failures keep their classified message; anything that broke
/// before the request was sent is reported as-is.
fn upload_error_template(error: &ClientError, action: &str) -> MessageTemplate {
    match error {
        ClientError::Upload { failure, .. } => failure.to_template(action),
        other => MessageTemplate::new(format!("Could not {action}: %s")).arg(other.to_string()),
    }
}
