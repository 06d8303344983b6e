//! Byte/text codecs shared by the cipher and the key wrappers.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Converts binary material to transport-safe text and back.
///
/// Key wrappers take a codec so that every binary value crossing their
/// boundary (keys, sealed boxes, RSA ciphertext) uses one encoding.
pub trait BinaryCodec: Send + Sync {
    fn encode(&self, bytes: &[u8]) -> String;
    fn decode(&self, text: &str) -> CryptoResult<Vec<u8>>;
}

/// Standard alphabet, padded base64 (RFC 4648 §4).
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64Codec;

impl BinaryCodec for Base64Codec {
    fn encode(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn decode(&self, text: &str) -> CryptoResult<Vec<u8>> {
        STANDARD
            .decode(text.trim())
            .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))
    }
}

/// Lowercase hex.
#[derive(Clone, Copy, Debug, Default)]
pub struct HexCodec;

impl BinaryCodec for HexCodec {
    fn encode(&self, bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    fn decode(&self, text: &str) -> CryptoResult<Vec<u8>> {
        hex::decode(text.trim()).map_err(|e| CryptoError::Encoding(format!("invalid hex: {e}")))
    }
}

/// Maps each byte to the char with the same code point (U+0000..=U+00FF).
pub fn latin1_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`latin1_encode`]. Returns `None` if any char is above U+00FF.
pub fn latin1_decode(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// Decodes caller-supplied key or IV text into exactly `expected` bytes.
///
/// Two forms are accepted: `expected` characters taken byte-per-character,
/// or `2 * expected` hex characters. The lengths never overlap, so the form
/// is unambiguous.
pub(crate) fn decode_material(text: &str, expected: usize) -> Option<Vec<u8>> {
    let chars = text.chars().count();
    if chars == expected {
        return latin1_decode(text);
    }
    if chars == expected * 2 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(text).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_matches_reference_vectors() {
        let codec = Base64Codec;
        assert_eq!(codec.encode(b""), "");
        assert_eq!(codec.encode(b"f"), "Zg==");
        assert_eq!(codec.encode(b"foob"), "Zm9vYg==");
        assert_eq!(codec.encode(&[0xff, 0x00, 0x80]), "/wCA");
        assert_eq!(codec.decode("Zm9vYmFy").unwrap(), b"foobar");
    }

    #[test]
    fn base64_rejects_garbage() {
        assert!(matches!(
            Base64Codec.decode("not*base64"),
            Err(CryptoError::Encoding(_))
        ));
    }

    #[test]
    fn latin1_roundtrip_covers_every_byte() {
        let all: Vec<u8> = (0..=255).collect();
        let text = latin1_encode(&all);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(latin1_decode(&text).unwrap(), all);
    }

    #[test]
    fn latin1_decode_rejects_wide_chars() {
        assert!(latin1_decode("caf\u{e9}").is_some());
        assert!(latin1_decode("\u{20ac}").is_none());
    }

    #[test]
    fn material_accepts_raw_and_hex_forms() {
        assert_eq!(decode_material("abcd", 4).unwrap(), b"abcd");
        assert_eq!(decode_material("00ff10ab", 4).unwrap(), vec![0x00, 0xff, 0x10, 0xab]);
        assert!(decode_material("abc", 4).is_none());
        assert!(decode_material("zzzzzzzz", 4).is_none());
    }
}
