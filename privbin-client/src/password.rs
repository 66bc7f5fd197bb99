//! Password cache and prompt.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use privbin_crypto::key::is_blank_password;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use zeroize::Zeroizing;

/// Asks the user for a paste password.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// `None` means the user closed the prompt.
    async fn request_password(&self) -> Option<String>;
}

/// Prompt for non-interactive use: always canceled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

#[async_trait]
impl PasswordPrompt for NoPrompt {
    async fn request_password(&self) -> Option<String> {
        None
    }
}

/// Prompts per acquisition before giving up on blank answers.
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Session-scoped password cache in front of a [`PasswordPrompt`].
///
/// The password lives only as long as the oracle and is wiped on drop.
pub struct PasswordOracle {
    prompt: Arc<dyn PasswordPrompt>,
    cached: Mutex<Zeroizing<String>>,
}

impl PasswordOracle {
    pub fn new(prompt: Arc<dyn PasswordPrompt>) -> Self {
        Self {
            prompt,
            cached: Mutex::new(Zeroizing::new(String::new())),
        }
    }

    /// The cached password, empty if none is known.
    pub fn cached(&self) -> Zeroizing<String> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, password: &str) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) =
            Zeroizing::new(password.to_string());
    }

    pub fn clear(&self) {
        self.set("");
    }

    /// Returns the cached password, prompting if none (or a blank one) is cached.
    ///
    /// Blank answers re-prompt up to [`MAX_PROMPT_ATTEMPTS`] times.
    pub async fn obtain(&self) -> ClientResult<Zeroizing<String>> {
        let cached = self.cached();
        if !is_blank_password(&cached) {
            return Ok(cached);
        }
        for attempt in 1..=MAX_PROMPT_ATTEMPTS {
            let answer = self
                .prompt
                .request_password()
                .await
                .map(Zeroizing::new)
                .ok_or(ClientError::PasswordCanceled)?;
            if !is_blank_password(&answer) {
                self.set(&answer);
                return Ok(answer);
            }
            debug!("blank password on prompt attempt {attempt}");
        }
        Err(ClientError::PasswordRequired)
    }
}

impl std::fmt::Debug for PasswordOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordOracle")
            .field("cached", &!self.cached().is_empty())
            .finish_non_exhaustive()
    }
}
