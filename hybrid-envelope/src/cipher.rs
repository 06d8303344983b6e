//! Symmetric payload encryption.
//!
//! Values are JSON-serialized, encrypted under the configured algorithm and
//! returned as standard base64. Authenticated modes append their 16-byte tag
//! to the ciphertext before encoding and bind the config salt as associated
//! data. CBC modes use PKCS#7 padding and carry no tag, so a corrupted CBC
//! ciphertext may decrypt to garbage instead of failing.
//!
//! The algorithm is not recorded in the output. Decrypting with a different
//! algorithm than the one used to encrypt is undefined.

use crate::config::{Algorithm, SymmetricConfig};
use crate::encoding::{Base64Codec, BinaryCodec, decode_material};
use crate::error::{CryptoError, CryptoResult};
use aes_gcm::aead::{Aead, KeyInit, Nonce, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chacha20poly1305::ChaCha20Poly1305;
use serde::Serialize;
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

/// Key and IV bytes decoded from a [`SymmetricConfig`], validated against the
/// algorithm's sizes.
struct Material {
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
}

impl Material {
    fn from_config(config: &SymmetricConfig) -> CryptoResult<Self> {
        let alg = config.algorithm;
        let key = decode_material(&config.secret_key, alg.key_len()).ok_or(
            CryptoError::InvalidKeyLength {
                expected: alg.key_len(),
                actual: config.secret_key.chars().count(),
            },
        )?;
        let iv = decode_material(&config.iv, alg.iv_len()).ok_or(CryptoError::InvalidIvLength {
            expected: alg.iv_len(),
            actual: config.iv.chars().count(),
        })?;
        Ok(Self {
            key: Zeroizing::new(key),
            iv: Zeroizing::new(iv),
        })
    }
}

/// Serializes `plaintext` to JSON and encrypts it. Returns base64 text.
pub fn encrypt<T: Serialize + ?Sized>(
    plaintext: &T,
    config: &SymmetricConfig,
) -> CryptoResult<String> {
    let json = Zeroizing::new(serde_json::to_vec(plaintext)?);
    let ciphertext = encrypt_bytes(&json, config)?;
    Ok(Base64Codec.encode(&ciphertext))
}

/// Decrypts base64 text produced by [`encrypt`] and parses the JSON value.
pub fn decrypt<T: DeserializeOwned>(ciphertext: &str, config: &SymmetricConfig) -> CryptoResult<T> {
    let raw = Base64Codec
        .decode(ciphertext)
        .map_err(|e| CryptoError::Decryption(format!("malformed ciphertext: {e}")))?;
    let plaintext = Zeroizing::new(decrypt_bytes(&raw, config)?);
    Ok(serde_json::from_slice(&plaintext)?)
}

/// Encrypts raw bytes under `config`.
pub fn encrypt_bytes(plaintext: &[u8], config: &SymmetricConfig) -> CryptoResult<Vec<u8>> {
    let m = Material::from_config(config)?;
    let aad = config.salt.as_bytes();
    match config.algorithm {
        Algorithm::Aes128Cbc => cbc_encrypt::<aes::Aes128>(&m, plaintext),
        Algorithm::Aes192Cbc => cbc_encrypt::<aes::Aes192>(&m, plaintext),
        Algorithm::Aes256Cbc => cbc_encrypt::<aes::Aes256>(&m, plaintext),
        Algorithm::Aes128Gcm => aead_encrypt::<Aes128Gcm>(&m, plaintext, aad),
        Algorithm::Aes256Gcm => aead_encrypt::<Aes256Gcm>(&m, plaintext, aad),
        Algorithm::ChaCha20Poly1305 => aead_encrypt::<ChaCha20Poly1305>(&m, plaintext, aad),
    }
}

/// Decrypts raw bytes under `config`.
pub fn decrypt_bytes(ciphertext: &[u8], config: &SymmetricConfig) -> CryptoResult<Vec<u8>> {
    let m = Material::from_config(config)?;
    let aad = config.salt.as_bytes();
    match config.algorithm {
        Algorithm::Aes128Cbc => cbc_decrypt::<aes::Aes128>(&m, ciphertext),
        Algorithm::Aes192Cbc => cbc_decrypt::<aes::Aes192>(&m, ciphertext),
        Algorithm::Aes256Cbc => cbc_decrypt::<aes::Aes256>(&m, ciphertext),
        Algorithm::Aes128Gcm => aead_decrypt::<Aes128Gcm>(&m, ciphertext, aad),
        Algorithm::Aes256Gcm => aead_decrypt::<Aes256Gcm>(&m, ciphertext, aad),
        Algorithm::ChaCha20Poly1305 => aead_decrypt::<ChaCha20Poly1305>(&m, ciphertext, aad),
    }
}

fn aead_encrypt<C: Aead + KeyInit>(m: &Material, msg: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher =
        C::new_from_slice(&m.key).map_err(|e| CryptoError::Encryption(e.to_string()))?;
    cipher
        .encrypt(Nonce::<C>::from_slice(&m.iv), Payload { msg, aad })
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

fn aead_decrypt<C: Aead + KeyInit>(m: &Material, msg: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher =
        C::new_from_slice(&m.key).map_err(|e| CryptoError::Decryption(e.to_string()))?;
    cipher
        .decrypt(Nonce::<C>::from_slice(&m.iv), Payload { msg, aad })
        .map_err(|_| {
            CryptoError::Decryption(
                "authentication failed (wrong key or tampered data)".to_string(),
            )
        })
}

fn cbc_encrypt<C>(m: &Material, msg: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: BlockEncryptMut + BlockCipher,
    cbc::Encryptor<C>: KeyIvInit + BlockEncryptMut,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(&m.key, &m.iv)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(msg))
}

fn cbc_decrypt<C>(m: &Material, msg: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: BlockDecryptMut + BlockCipher,
    cbc::Decryptor<C>: KeyIvInit + BlockDecryptMut,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(&m.key, &m.iv)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(msg).map_err(|_| {
        CryptoError::Decryption("invalid padding (wrong key or corrupted data)".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{random_iv, random_iv_for_algorithm, random_key};
    use serde_json::{Value, json};

    fn config_for(alg: Algorithm) -> SymmetricConfig {
        SymmetricConfig::generate(alg, "testsalt").unwrap()
    }

    #[test]
    fn roundtrip_every_algorithm() {
        let payload = json!({"hello": "world", "n": 99, "nested": [1, 2, {"x": null}]});
        for alg in Algorithm::ALL {
            let config = config_for(alg);
            let ct = encrypt(&payload, &config).unwrap();
            let pt: Value = decrypt(&ct, &config).unwrap();
            assert_eq!(pt, payload, "{alg}");
        }
    }

    #[test]
    fn legacy_latin1_iv_works_for_cbc() {
        let config = SymmetricConfig::new(
            random_key(32).unwrap(),
            random_iv(None).unwrap(),
            "salt",
            Algorithm::Aes256Cbc,
        );
        let ct = encrypt(&json!({"ok": true}), &config).unwrap();
        let pt: Value = decrypt(&ct, &config).unwrap();
        assert_eq!(pt, json!({"ok": true}));
    }

    #[test]
    fn hex_encoded_key_is_accepted() {
        let key = hex::encode([7u8; 32]);
        let config = SymmetricConfig::new(
            key,
            random_iv_for_algorithm(Algorithm::Aes256Gcm).unwrap(),
            "",
            Algorithm::Aes256Gcm,
        );
        let ct = encrypt("text", &config).unwrap();
        let pt: String = decrypt(&ct, &config).unwrap();
        assert_eq!(pt, "text");
    }

    #[test]
    fn aead_output_carries_tag() {
        let config = config_for(Algorithm::Aes256Gcm);
        let raw = encrypt_bytes(b"abc", &config).unwrap();
        assert_eq!(raw.len(), 3 + crate::config::TAG_LEN);
    }

    #[test]
    fn cbc_output_is_block_padded() {
        let config = config_for(Algorithm::Aes128Cbc);
        assert_eq!(encrypt_bytes(b"", &config).unwrap().len(), 16);
        assert_eq!(encrypt_bytes(&[0u8; 16], &config).unwrap().len(), 32);
    }

    #[test]
    fn sixteen_byte_iv_rejected_for_gcm() {
        let config = SymmetricConfig::new(
            random_key(32).unwrap(),
            random_iv(None).unwrap(),
            "s",
            Algorithm::Aes256Gcm,
        );
        let err = encrypt(&json!({}), &config).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidIvLength { expected: 12, actual: 16 }));
    }

    #[test]
    fn wrong_key_length_rejected() {
        let config = SymmetricConfig::new(
            "short",
            random_iv_for_algorithm(Algorithm::Aes256Cbc).unwrap(),
            "",
            Algorithm::Aes256Cbc,
        );
        assert!(matches!(
            encrypt(&json!(1), &config),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 5 })
        ));
    }

    #[test]
    fn key_length_error_counts_characters() {
        let config = SymmetricConfig::new(
            "\u{e9}".repeat(31),
            random_iv_for_algorithm(Algorithm::Aes256Gcm).unwrap(),
            "",
            Algorithm::Aes256Gcm,
        );
        assert!(matches!(
            encrypt(&json!(1), &config),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn tampered_aead_ciphertext_fails() {
        let config = config_for(Algorithm::ChaCha20Poly1305);
        let raw = encrypt_bytes(b"integrity-protected data", &config).unwrap();
        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(decrypt_bytes(&tampered, &config), Err(CryptoError::Decryption(_))),
                "tampering at byte {i} should be detected"
            );
        }
    }

    #[test]
    fn salt_is_authenticated_in_aead_modes() {
        let config = config_for(Algorithm::Aes256Gcm);
        let ct = encrypt(&json!({"a": 1}), &config).unwrap();
        let mut other = config.clone();
        other.salt = "different".to_string();
        assert!(matches!(decrypt::<Value>(&ct, &other), Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn malformed_base64_is_decryption_error() {
        let config = config_for(Algorithm::Aes256Gcm);
        assert!(matches!(
            decrypt::<Value>("%%%not-base64%%%", &config),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn truncated_cbc_ciphertext_fails() {
        let config = config_for(Algorithm::Aes256Cbc);
        let raw = encrypt_bytes(b"some cbc plaintext", &config).unwrap();
        assert!(decrypt_bytes(&raw[..raw.len() - 1], &config).is_err());
    }

    #[test]
    fn non_json_plaintext_is_serialization_error() {
        let config = config_for(Algorithm::Aes256Gcm);
        let raw = encrypt_bytes(b"{not json", &config).unwrap();
        let text = Base64Codec.encode(&raw);
        assert!(matches!(decrypt::<Value>(&text, &config), Err(CryptoError::Serialization(_))));
    }

    #[test]
    fn non_string_map_keys_fail_to_serialize() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "v");
        let config = config_for(Algorithm::Aes256Gcm);
        assert!(matches!(encrypt(&map, &config), Err(CryptoError::Serialization(_))));
    }
}
