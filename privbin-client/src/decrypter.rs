//! Decrypts fetched pastes: attachment, body and discussion.

use crate::error::{ClientError, ClientResult, DECRYPTION_FAILED_MESSAGE};
use crate::notify::{Notice, NotificationSink};
use crate::password::PasswordOracle;
use crate::session::Session;
use crate::types::{
    Attachment, COMMENT_DECRYPTION_FAILED, DecryptedComment, DecryptedPaste, Paste,
};
use privbin_crypto::key::is_blank_password;
use privbin_crypto::{CipherCodec, SymmetricKey};
use tracing::{debug, error, warn};

#[derive(Clone, Debug)]
pub struct DecryptionOrchestrator {
    codec: CipherCodec,
}

impl DecryptionOrchestrator {
    pub fn new(codec: CipherCodec) -> Self {
        Self { codec }
    }

    /// Decrypts `paste`, or the ciphertext embedded in the page when `None`.
    ///
    /// The attachment, when present, must open before the body is touched,
    /// and an attachment-only paste may have an empty body. Any failure is
    /// reported with the single generic decryption message.
    pub async fn run(
        &self,
        session: &mut Session,
        oracle: &PasswordOracle,
        paste: Option<Paste>,
        sink: &dyn NotificationSink,
    ) -> ClientResult<DecryptedPaste> {
        session.show_loading("Decrypting paste…");

        match self.decrypt(session, oracle, paste).await {
            Ok(decrypted) => {
                session.hide_loading();
                session.set_paste(decrypted.clone());
                session.show_view_buttons();
                Ok(decrypted)
            }
            Err(e) => {
                error!("could not decrypt paste: {e}");
                session.hide_loading();
                session.show_view_buttons();
                session.hide_clone_button();
                sink.notify(Notice::error(DECRYPTION_FAILED_MESSAGE));
                Err(e)
            }
        }
    }

    async fn decrypt(
        &self,
        session: &mut Session,
        oracle: &PasswordOracle,
        paste: Option<Paste>,
    ) -> ClientResult<DecryptedPaste> {
        let paste = match paste {
            Some(paste) => paste,
            None => {
                let cipher_data = session
                    .cipher_data()
                    .ok_or_else(|| ClientError::Decryption("paste: no cipher data".into()))?;
                Paste::from_json(cipher_data)?
            }
        };
        let key = session.identity_mut().paste_key()?;
        let password = oracle.cached();

        let (attachment, text) = if paste.attachment().is_some() {
            let attachment = self
                .decrypt_attachment(oracle, &paste, &key, &password)
                .await?;
            // The attachment step may have learnt the password.
            let password = oracle.cached();
            let text = self.codec.decipher(key.as_str(), &password, &paste.data);
            (Some(attachment), text)
        } else {
            let text = self
                .decrypt_or_prompt_password(oracle, &key, &password, &paste.data)
                .await
                .map_err(|e| ClientError::Decryption(format!("paste text: {e}")))?;
            (None, text)
        };

        let comments = if paste.meta.opendiscussion {
            self.decrypt_comments(&paste, &key, &oracle.cached())
        } else {
            Vec::new()
        };

        Ok(DecryptedPaste {
            id: paste.id.clone(),
            text,
            formatter: paste.meta.formatter.clone(),
            attachment,
            comments,
            meta: paste.meta,
        })
    }

    /// Deciphers `data`; if that fails without a password, acquires one and
    /// tries exactly once more. A blank password counts as none.
    pub async fn decrypt_or_prompt_password(
        &self,
        oracle: &PasswordOracle,
        key: &SymmetricKey,
        password: &str,
        data: &str,
    ) -> ClientResult<String> {
        let plaintext = self.codec.decipher(key.as_str(), password, data);
        if !plaintext.is_empty() {
            return Ok(plaintext);
        }
        if !is_blank_password(password) {
            if oracle.cached().as_str() == password {
                debug!("cached password does not open this paste, forgetting it");
                oracle.clear();
            }
            return Err(ClientError::Decryption("data".into()));
        }

        debug!("decryption without password failed, acquiring one");
        let password = oracle.obtain().await?;
        let plaintext = self.codec.decipher(key.as_str(), &password, data);
        if plaintext.is_empty() {
            // Do not keep offering a password that does not open this paste.
            oracle.clear();
            return Err(ClientError::Decryption("data".into()));
        }
        Ok(plaintext)
    }

    /// Decrypts the attachment and its name; both or nothing.
    pub async fn decrypt_attachment(
        &self,
        oracle: &PasswordOracle,
        paste: &Paste,
        key: &SymmetricKey,
        password: &str,
    ) -> ClientResult<Attachment> {
        let blob = paste
            .attachment()
            .ok_or_else(|| ClientError::Decryption("attachment: none present".into()))?;
        let data_url = self
            .decrypt_or_prompt_password(oracle, key, password, blob)
            .await
            .map_err(|e| ClientError::Decryption(format!("attachment: {e}")))?;

        let name = match paste.attachmentname.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => self
                .decrypt_or_prompt_password(oracle, key, &oracle.cached(), name)
                .await
                .map_err(|e| ClientError::Decryption(format!("attachment name: {e}")))?,
            None => String::new(),
        };

        Ok(Attachment { data_url, name })
    }

    /// Decrypts every comment on its own, in server order. A comment that
    /// does not open gets the placeholder text instead of failing the thread.
    pub fn decrypt_comments(&self, paste: &Paste, key: &SymmetricKey, password: &str) -> Vec<DecryptedComment> {
        paste
            .comments
            .iter()
            .map(|comment| {
                let text = self.codec.decipher(key.as_str(), password, &comment.data);
                let nickname = comment
                    .meta
                    .nickname
                    .as_deref()
                    .map(|n| self.codec.decipher(key.as_str(), password, n))
                    .unwrap_or_default();
                let decrypted = !text.is_empty();
                if !decrypted {
                    warn!("comment {} could not be decrypted", comment.id);
                }
                DecryptedComment {
                    id: comment.id.clone(),
                    parentid: comment.parentid.clone(),
                    text: if decrypted {
                        text
                    } else {
                        COMMENT_DECRYPTION_FAILED.to_string()
                    },
                    nickname,
                    vizhash: comment.meta.vizhash.clone(),
                    postdate: comment.meta.postdate,
                    decrypted,
                }
            })
            .collect()
    }
}
