//! Compress-then-encrypt codec for paste fields.

use crate::codec::CodecRegistry;
use crate::entropy::EntropyGate;
use crate::envelope::{CipherEnvelope, DEFAULT_ITERATIONS, IV_SIZE, SALT_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{self, SymmetricKey};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use std::sync::Arc;
use tracing::debug;

/// AES-256-GCM with the 128-bit IV used by every envelope generation.
type Aes256Gcm128 = AesGcm<Aes256, U16>;

/// Seals and opens paste fields.
///
/// Cheap to clone; the codec registry and the entropy gate are shared.
#[derive(Clone)]
pub struct CipherCodec {
    entropy: EntropyGate,
    registry: Arc<CodecRegistry>,
    iterations: u32,
}

impl CipherCodec {
    pub fn new(entropy: EntropyGate) -> Self {
        Self {
            entropy,
            registry: Arc::new(CodecRegistry::default()),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Overrides the PBKDF2 iteration count written into new envelopes.
    ///
    /// Opening always honours the count stored in the envelope.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn entropy(&self) -> &EntropyGate {
        &self.entropy
    }

    pub fn is_entropy_ready(&self) -> bool {
        self.entropy.is_ready()
    }

    /// Registers a one-shot callback for the moment entropy becomes available.
    pub fn add_entropy_seed_listener(&self, listener: impl FnOnce() + Send + 'static) {
        self.entropy.add_seed_listener(listener);
    }

    /// Draws a new symmetric key. Callers must check entropy readiness first;
    /// a closed gate yields [`CryptoError::EntropyNotReady`].
    pub fn symmetric_key(&self) -> CryptoResult<SymmetricKey> {
        self.entropy.symmetric_key()
    }

    /// Compresses and encrypts `message`.
    ///
    /// The effective key is `key` for a blank password, otherwise
    /// `key ∥ hex(SHA-256(password))`.
    pub fn cipher(&self, key: &str, password: &str, message: &str) -> CryptoResult<CipherEnvelope> {
        let material = key::effective_key(key, password);
        let payload = self.registry.encode(message)?;

        let mut iv = [0u8; IV_SIZE];
        let mut salt = [0u8; SALT_SIZE];
        self.entropy.fill(&mut iv)?;
        self.entropy.fill(&mut salt)?;

        let aes_key = key::derive_aes_key(&material, &salt, self.iterations);
        let cipher = Aes256Gcm128::new_from_slice(&aes_key[..])
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        let ciphertext = cipher
            .encrypt(
                Nonce::<U16>::from_slice(&iv),
                Payload {
                    msg: payload.as_bytes(),
                    aad: &[],
                },
            )
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        Ok(CipherEnvelope::new(&iv, &salt, self.iterations, &ciphertext))
    }

    /// Decrypts and decompresses a JSON envelope.
    ///
    /// Tries the bare key first and the password-augmented key second; never
    /// more. Every failure (bad tag, malformed JSON, broken compression)
    /// collapses into an empty string so callers cannot tell a wrong key
    /// from a wrong password or corrupted data.
    pub fn decipher(&self, key: &str, password: &str, data: &str) -> String {
        match CipherEnvelope::from_json(data) {
            Ok(envelope) => self.decipher_envelope(key, password, &envelope),
            Err(e) => {
                debug!("ciphertext is not a valid envelope: {e}");
                String::new()
            }
        }
    }

    /// [`decipher`](Self::decipher) for an already parsed envelope.
    pub fn decipher_envelope(&self, key: &str, password: &str, envelope: &CipherEnvelope) -> String {
        if let Ok(message) = self.open(key, envelope) {
            return message;
        }
        if key::is_blank_password(password) {
            return String::new();
        }
        let augmented = key::password_augmented(key, password);
        self.open(&augmented, envelope).unwrap_or_default()
    }

    /// One decryption attempt with a single key combination.
    fn open(&self, material: &str, envelope: &CipherEnvelope) -> CryptoResult<String> {
        envelope.validate()?;
        let iv = envelope.iv_bytes()?;
        let salt = envelope.salt_bytes()?;
        let aad = envelope.adata_bytes()?;
        let ciphertext = envelope.ciphertext_bytes()?;

        let aes_key = key::derive_aes_key(material, &salt, envelope.iter);
        let cipher = Aes256Gcm128::new_from_slice(&aes_key[..])
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;
        let plaintext = cipher
            .decrypt(
                Nonce::<U16>::from_slice(&iv),
                Payload {
                    msg: &ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::Decryption("authentication failed".to_string()))?;

        let payload = String::from_utf8(plaintext).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        self.registry.decode(&payload)
    }
}

impl std::fmt::Debug for CipherCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherCodec")
            .field("generations", &self.registry.generations())
            .field("iterations", &self.iterations)
            .finish()
    }
}
