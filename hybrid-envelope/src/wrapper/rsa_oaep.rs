//! RSA-OAEP key wrapping.

use crate::config::KeyPair;
use crate::encoding::{Base64Codec, BinaryCodec};
use crate::error::{CryptoError, CryptoResult};
use crate::wrapper::KeyWrapper;
use rand_core::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

/// SHA-256 output size; OAEP spends two of these plus two bytes per block.
const OAEP_HASH_LEN: usize = 32;

/// Wraps to an RSA public key (SPKI or PKCS#1 PEM), unwraps with the
/// matching private key (PKCS#8 or PKCS#1 PEM).
pub struct RsaKeyWrapper<'a, C = Base64Codec> {
    keys: &'a KeyPair,
    codec: C,
}

impl<'a> RsaKeyWrapper<'a> {
    pub fn new(keys: &'a KeyPair) -> Self {
        Self::with_codec(keys, Base64Codec)
    }
}

impl<'a, C: BinaryCodec> RsaKeyWrapper<'a, C> {
    pub fn with_codec(keys: &'a KeyPair, codec: C) -> Self {
        Self { keys, codec }
    }
}

impl<C: BinaryCodec> KeyWrapper for RsaKeyWrapper<'_, C> {
    async fn wrap(&self, plaintext: &[u8]) -> CryptoResult<String> {
        let public = parse_public_key(&self.keys.public_key)?;
        let max = max_wrap_len(&public);
        if plaintext.len() > max {
            return Err(CryptoError::WrapSize {
                max,
                actual: plaintext.len(),
            });
        }

        let ciphertext = public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| match e {
                rsa::Error::MessageTooLong => CryptoError::WrapSize {
                    max,
                    actual: plaintext.len(),
                },
                other => CryptoError::Encryption(format!("RSA-OAEP encrypt failed: {other}")),
            })?;
        Ok(self.codec.encode(&ciphertext))
    }

    async fn unwrap(&self, wrapped: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let private = parse_private_key(self.keys.private_key()?)?;
        let public = parse_public_key(&self.keys.public_key)?;
        if RsaPublicKey::from(&private) != public {
            return Err(CryptoError::Unwrap(
                "public key does not belong to private key".to_string(),
            ));
        }

        let ciphertext = self
            .codec
            .decode(wrapped)
            .map_err(|e| CryptoError::Unwrap(e.to_string()))?;
        private
            .decrypt(Oaep::new::<Sha256>(), &ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| {
                CryptoError::Unwrap(
                    "RSA-OAEP decrypt failed (wrong key or corrupted data)".to_string(),
                )
            })
    }
}

/// Largest plaintext that fits one OAEP block under `key`.
pub fn max_wrap_len(key: &RsaPublicKey) -> usize {
    key.size().saturating_sub(2 * OAEP_HASH_LEN + 2)
}

pub(crate) fn parse_public_key(pem: &str) -> CryptoResult<RsaPublicKey> {
    let pem = pem.trim();
    if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
        return Ok(key);
    }
    RsaPublicKey::from_pkcs1_pem(pem)
        .map_err(|e| CryptoError::InvalidKey(format!("unrecognized RSA public key: {e}")))
}

pub(crate) fn parse_private_key(pem: &str) -> CryptoResult<RsaPrivateKey> {
    let pem = pem.trim();
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }
    RsaPrivateKey::from_pkcs1_pem(pem)
        .map_err(|e| CryptoError::InvalidKey(format!("unrecognized RSA private key: {e}")))
}
