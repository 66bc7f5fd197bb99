//! Encryption layer for PrivBin.
//!
//! Every paste field is sealed client-side before upload:
//! - PBKDF2-HMAC-SHA256 stretches the URL-fragment key (optionally extended
//!   with a password digest) into an AES-256 key
//! - AES-256-GCM with a 128-bit IV and 128-bit tag encrypts the payload
//! - Payloads are raw-deflated and base64'd before encryption
//!
//! # Compatibility
//!
//! The JSON [`CipherEnvelope`] has been stable since the ZeroBin days. What
//! changed between client generations is the text encoding of the payload;
//! [`CodecRegistry`] tries each known generation in a fixed order, so old
//! pastes keep opening.
//!
//! # Entropy
//!
//! Nothing random is drawn until the [`EntropyGate`] reports ready. The
//! gate is an explicit handle passed to whoever needs randomness.

mod cipher;
pub mod codec;
pub mod entropy;
pub mod envelope;
mod error;
pub mod key;

pub use cipher::CipherCodec;
pub use codec::{CodecRegistry, PayloadCodec, PrivateBinCodec, ZeroBinCodec};
pub use entropy::{EntropyGate, OsRandom, RandomSource};
pub use envelope::CipherEnvelope;
pub use error::{CryptoError, CryptoResult};
pub use key::SymmetricKey;
