//! Anonymous sealed-box key wrapping (X25519 + XSalsa20-Poly1305).
//!
//! Output layout matches libsodium `crypto_box_seal`:
//! `[ephemeral_pubkey:32][ciphertext][tag:16]`, base64 encoded. The sender is
//! anonymous; recipients learn only that the box was sealed to their key.

use crate::config::KeyPair;
use crate::encoding::{Base64Codec, BinaryCodec};
use crate::error::{CryptoError, CryptoResult};
use crate::sealed_box::ready;
use crate::wrapper::KeyWrapper;
use crypto_box::{KEY_SIZE, PublicKey, SecretKey};
use rand_core::OsRng;
use zeroize::{Zeroize, Zeroizing};

/// Wraps to a base64 X25519 public key; unwrapping needs both recipient keys.
pub struct SealedBoxKeyWrapper<'a, C = Base64Codec> {
    keys: &'a KeyPair,
    codec: C,
}

impl<'a> SealedBoxKeyWrapper<'a> {
    pub fn new(keys: &'a KeyPair) -> Self {
        Self::with_codec(keys, Base64Codec)
    }
}

impl<'a, C: BinaryCodec> SealedBoxKeyWrapper<'a, C> {
    pub fn with_codec(keys: &'a KeyPair, codec: C) -> Self {
        Self { keys, codec }
    }

    fn public_key(&self) -> CryptoResult<PublicKey> {
        let bytes = self.codec.decode(&self.keys.public_key)?;
        Ok(PublicKey::from(key_array(&bytes)?))
    }

    fn secret_key(&self) -> CryptoResult<SecretKey> {
        let bytes = Zeroizing::new(self.codec.decode(self.keys.private_key()?)?);
        let mut arr = key_array(&bytes)?;
        let secret = SecretKey::from(arr);
        arr.zeroize();
        Ok(secret)
    }
}

fn key_array(bytes: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: bytes.len(),
    })
}

impl<C: BinaryCodec> KeyWrapper for SealedBoxKeyWrapper<'_, C> {
    async fn wrap(&self, plaintext: &[u8]) -> CryptoResult<String> {
        ready().await?;
        let recipient = self.public_key()?;
        let sealed = recipient
            .seal(&mut OsRng, plaintext)
            .map_err(|e| CryptoError::Encryption(format!("sealed box seal failed: {e}")))?;
        Ok(self.codec.encode(&sealed))
    }

    async fn unwrap(&self, wrapped: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
        ready().await?;
        let public = self.public_key()?;
        let secret = self.secret_key()?;
        if secret.public_key() != public {
            return Err(CryptoError::Unwrap(
                "public key does not belong to private key".to_string(),
            ));
        }

        let sealed = self
            .codec
            .decode(wrapped)
            .map_err(|e| CryptoError::Unwrap(e.to_string()))?;
        secret.unseal(&sealed).map(Zeroizing::new).map_err(|_| {
            CryptoError::Unwrap("sealed box open failed (wrong key or tampered data)".to_string())
        })
    }
}
