//! Payload codecs: compression and text encoding applied before encryption.
//!
//! A plaintext message is raw-deflated and base64'd before encryption. Two
//! client generations did this with different text encoders, so decoding
//! goes through a small registry tried in fixed priority order:
//!
//! 1. [`PrivateBinCodec`]: the compressed bytes are carried as a "binary
//!    string" (one code point per byte) that is UTF-8 encoded before base64;
//!    the message itself is strict UTF-8.
//! 2. [`ZeroBinCodec`]: the compressed bytes are base64'd as they are, and
//!    characters outside the BMP were written as CESU-8 surrogate pairs.
//!
//! Encoding always uses the first registered codec.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::io::{Read, Write};
use tracing::debug;

/// One generation of the compress-and-encode payload layout.
pub trait PayloadCodec: Send + Sync {
    /// Short identifier used in logs.
    fn generation(&self) -> &'static str;

    /// Compresses and encodes a message into the base64 payload.
    fn encode(&self, message: &str) -> CryptoResult<String>;

    /// Decodes and decompresses a base64 payload back into the message.
    fn decode(&self, payload: &str) -> CryptoResult<String>;
}

/// Current payload layout (PrivateBin 1.x).
#[derive(Debug, Default, Clone, Copy)]
pub struct PrivateBinCodec;

impl PayloadCodec for PrivateBinCodec {
    fn generation(&self) -> &'static str {
        "privatebin-v1"
    }

    fn encode(&self, message: &str) -> CryptoResult<String> {
        let compressed = deflate(message.as_bytes())?;
        Ok(STANDARD.encode(wrap_binary(&compressed).as_bytes()))
    }

    fn decode(&self, payload: &str) -> CryptoResult<String> {
        let bytes = unwrap_payload(payload)?;
        String::from_utf8(bytes).map_err(|e| CryptoError::Encoding(e.to_string()))
    }
}

/// Legacy payload layout written by ZeroBin clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroBinCodec;

impl PayloadCodec for ZeroBinCodec {
    fn generation(&self) -> &'static str {
        "zerobin"
    }

    fn encode(&self, message: &str) -> CryptoResult<String> {
        let compressed = deflate(&encode_cesu8(message))?;
        Ok(STANDARD.encode(compressed))
    }

    fn decode(&self, payload: &str) -> CryptoResult<String> {
        let compressed = STANDARD.decode(payload.trim())?;
        decode_cesu8(&inflate(&compressed)?)
    }
}

/// Ordered set of payload codecs.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn PayloadCodec>>,
}

impl CodecRegistry {
    /// Creates a registry; the first codec is used for encoding.
    pub fn new(codecs: Vec<Box<dyn PayloadCodec>>) -> Self {
        Self { codecs }
    }

    /// Generation names in priority order.
    pub fn generations(&self) -> Vec<&'static str> {
        self.codecs.iter().map(|c| c.generation()).collect()
    }

    pub fn encode(&self, message: &str) -> CryptoResult<String> {
        let codec = self
            .codecs
            .first()
            .ok_or_else(|| CryptoError::Encoding("no payload codec registered".to_string()))?;
        codec.encode(message)
    }

    /// Tries every generation in order and returns the first success.
    pub fn decode(&self, payload: &str) -> CryptoResult<String> {
        let mut last_err = CryptoError::Encoding("no payload codec registered".to_string());
        for codec in &self.codecs {
            match codec.decode(payload) {
                Ok(message) => return Ok(message),
                Err(e) => {
                    debug!("payload codec {} rejected payload: {e}", codec.generation());
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new(vec![Box::new(PrivateBinCodec), Box::new(ZeroBinCodec)])
    }
}

fn deflate(bytes: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| CryptoError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CryptoError::Compression(e.to_string()))
}

fn inflate(bytes: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| CryptoError::Compression(e.to_string()))?;
    Ok(out)
}

/// base64 -> UTF-8 binary string -> bytes -> inflate.
fn unwrap_payload(payload: &str) -> CryptoResult<Vec<u8>> {
    let decoded = STANDARD.decode(payload.trim())?;
    let text = String::from_utf8(decoded).map_err(|e| CryptoError::Encoding(e.to_string()))?;
    inflate(&unwrap_binary(&text)?)
}

/// Maps every byte onto the code point with the same value.
fn wrap_binary(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn unwrap_binary(text: &str) -> CryptoResult<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(c).map_err(|_| {
                CryptoError::Encoding(format!("code point U+{:04X} in binary string", u32::from(c)))
            })
        })
        .collect()
}

/// UTF-8 with supplementary characters written as two 3-byte surrogates.
fn encode_cesu8(message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len());
    let mut buf = [0u16; 2];
    for c in message.chars() {
        if c.len_utf16() == 1 {
            let mut tmp = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            continue;
        }
        for unit in c.encode_utf16(&mut buf).iter() {
            let u = u32::from(*unit);
            out.push(0xE0 | (u >> 12) as u8);
            out.push(0x80 | ((u >> 6) & 0x3F) as u8);
            out.push(0x80 | (u & 0x3F) as u8);
        }
    }
    out
}

/// Lenient decoder accepting both UTF-8 and CESU-8 surrogate pairs.
fn decode_cesu8(bytes: &[u8]) -> CryptoResult<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        let (cp, len) = match b0 {
            0x00..=0x7F => (u32::from(b0), 1),
            0xC0..=0xDF => ((u32::from(b0 & 0x1F) << 6) | continuation(bytes, i + 1)?, 2),
            0xE0..=0xEF => (
                (u32::from(b0 & 0x0F) << 12)
                    | (continuation(bytes, i + 1)? << 6)
                    | continuation(bytes, i + 2)?,
                3,
            ),
            0xF0..=0xF7 => (
                (u32::from(b0 & 0x07) << 18)
                    | (continuation(bytes, i + 1)? << 12)
                    | (continuation(bytes, i + 2)? << 6)
                    | continuation(bytes, i + 3)?,
                4,
            ),
            _ => {
                return Err(CryptoError::Encoding(format!(
                    "invalid lead byte {b0:#04x} at offset {i}"
                )));
            }
        };
        if cp >= 0x1_0000 {
            let c = char::from_u32(cp)
                .ok_or_else(|| CryptoError::Encoding(format!("invalid code point {cp:#x}")))?;
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
        } else {
            units.push(cp as u16);
        }
        i += len;
    }
    String::from_utf16(&units).map_err(|e| CryptoError::Encoding(e.to_string()))
}

fn continuation(bytes: &[u8], at: usize) -> CryptoResult<u32> {
    match bytes.get(at) {
        Some(b) if (0x80..=0xBF).contains(b) => Ok(u32::from(b & 0x3F)),
        _ => Err(CryptoError::Encoding(format!(
            "truncated or invalid sequence at offset {at}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_string_carries_high_bytes_as_two_byte_utf8() {
        let wrapped = wrap_binary(&[0x00, 0x7F, 0x80, 0xFF]);
        assert_eq!(wrapped.as_bytes(), &[0x00, 0x7F, 0xC2, 0x80, 0xC3, 0xBF]);
        assert_eq!(unwrap_binary(&wrapped).unwrap(), vec![0x00, 0x7F, 0x80, 0xFF]);
    }

    #[test]
    fn binary_string_rejects_wide_code_points() {
        assert!(unwrap_binary("\u{0100}").is_err());
    }

    #[test]
    fn cesu8_surrogates_recombine() {
        let encoded = encode_cesu8("a\u{1F600}b");
        assert_eq!(encoded.len(), 1 + 6 + 1);
        assert!(String::from_utf8(encoded.clone()).is_err());
        assert_eq!(decode_cesu8(&encoded).unwrap(), "a\u{1F600}b");
    }

    #[test]
    fn cesu8_decoder_accepts_plain_utf8() {
        let s = "grüße \u{1F600}";
        assert_eq!(decode_cesu8(s.as_bytes()).unwrap(), s);
    }

    #[test]
    fn lone_surrogate_is_rejected() {
        assert!(decode_cesu8(&[0xED, 0xA0, 0x80]).is_err());
    }
}
