//! Entropy readiness gate over the random source.
//!
//! Key, IV and salt generation must never draw from a source that has not
//! been seeded. The gate is an explicit handle (clone it to share) rather
//! than global state: everything that needs randomness receives it, and
//! tests can swap in an instrumented [`RandomSource`].
//!
//! Readiness is a one-way transition. Listeners registered before it fire
//! exactly once, together, when it happens; async callers use
//! [`EntropyGate::wait_ready`].

use crate::error::{CryptoError, CryptoResult};
use crate::key::{SYMMETRIC_KEY_SIZE, SymmetricKey};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// A cryptographically secure byte source.
pub trait RandomSource: Send + Sync {
    fn try_fill(&self, dest: &mut [u8]) -> CryptoResult<()>;
}

/// The operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn try_fill(&self, dest: &mut [u8]) -> CryptoResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::RandomSource(e.to_string()))
    }
}

type SeedListener = Box<dyn FnOnce() + Send>;

struct GateInner {
    source: Box<dyn RandomSource>,
    ready: watch::Sender<bool>,
    /// Also serializes the not-ready -> ready transition.
    listeners: Mutex<Vec<SeedListener>>,
}

/// Readiness barrier in front of a [`RandomSource`].
#[derive(Clone)]
pub struct EntropyGate {
    inner: Arc<GateInner>,
}

impl EntropyGate {
    /// Gate over the OS CSPRNG, ready as soon as the OS hands out bytes.
    pub fn os() -> Self {
        let mut sample = [0u8; 1];
        match OsRandom.try_fill(&mut sample) {
            Ok(()) => Self::seeded(OsRandom),
            Err(e) => {
                warn!("OS random source unavailable, entropy gate stays closed: {e}");
                Self::pending(OsRandom)
            }
        }
    }

    /// Gate that starts closed; call [`mark_seeded`](Self::mark_seeded) to open it.
    pub fn pending(source: impl RandomSource + 'static) -> Self {
        Self::build(Box::new(source), false)
    }

    /// Gate that is already open.
    pub fn seeded(source: impl RandomSource + 'static) -> Self {
        Self::build(Box::new(source), true)
    }

    fn build(source: Box<dyn RandomSource>, ready: bool) -> Self {
        let (tx, _rx) = watch::channel(ready);
        Self {
            inner: Arc::new(GateInner {
                source,
                ready: tx,
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Opens the gate and fans out to every pending listener.
    ///
    /// Subsequent calls are no-ops.
    pub fn mark_seeded(&self) {
        let fired = {
            let mut listeners = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if self.inner.ready.send_replace(true) {
                return;
            }
            std::mem::take(&mut *listeners)
        };
        debug!("entropy gate seeded, notifying {} listener(s)", fired.len());
        for listener in fired {
            listener();
        }
    }

    /// Registers a one-shot callback for the seeding transition.
    ///
    /// If the gate is already open the callback runs immediately, so a
    /// listener registered after the transition is never lost.
    pub fn add_seed_listener(&self, listener: impl FnOnce() + Send + 'static) {
        {
            let mut listeners = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !self.is_ready() {
                listeners.push(Box::new(listener));
                return;
            }
        }
        listener();
    }

    /// Number of listeners still waiting for the transition.
    pub fn pending_listeners(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Resolves once the gate is open. No timeout: this may wait forever.
    pub async fn wait_ready(&self) {
        let mut rx = self.inner.ready.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Fills `dest` with random bytes; refuses while the gate is closed.
    pub fn fill(&self, dest: &mut [u8]) -> CryptoResult<()> {
        if !self.is_ready() {
            return Err(CryptoError::EntropyNotReady);
        }
        self.inner.source.try_fill(dest)
    }

    /// Draws a fresh 256-bit symmetric key, base64 encoded.
    pub fn symmetric_key(&self) -> CryptoResult<SymmetricKey> {
        let mut bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
        self.fill(&mut bytes[..])?;
        Ok(SymmetricKey::from_encoded(STANDARD.encode(&bytes[..])))
    }
}

impl std::fmt::Debug for EntropyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyGate")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}
