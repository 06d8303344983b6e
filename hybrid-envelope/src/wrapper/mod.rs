//! Asymmetric protection of the symmetric key material.
//!
//! Two interchangeable strategies implement [`KeyWrapper`]:
//! - [`RsaKeyWrapper`]: one-shot RSA-OAEP (SHA-256) encryption to a PEM key
//! - [`SealedBoxKeyWrapper`]: anonymous X25519 sealed box to a base64 key
//!
//! [`ConfiguredWrapper`] picks one from the [`KeyPairConfig`] discriminant so
//! envelope orchestration is written once.

mod rsa_oaep;
mod sealed_box;

pub use self::rsa_oaep::{RsaKeyWrapper, max_wrap_len};
pub use self::sealed_box::SealedBoxKeyWrapper;

use crate::config::{KeyInfo, KeyPairConfig};
use crate::error::{CryptoError, CryptoResult};
use std::future::Future;
use zeroize::Zeroizing;

/// Wraps and unwraps small key blobs for one recipient keypair.
pub trait KeyWrapper: Send + Sync {
    /// Encrypts `plaintext` to the recipient's public key. Returns text in
    /// the wrapper's codec.
    fn wrap(&self, plaintext: &[u8]) -> impl Future<Output = CryptoResult<String>> + Send;

    /// Recovers the plaintext passed to [`KeyWrapper::wrap`]. Needs the
    /// recipient's private key.
    fn unwrap(
        &self,
        wrapped: &str,
    ) -> impl Future<Output = CryptoResult<Zeroizing<Vec<u8>>>> + Send;

    /// Serializes `info` to JSON and wraps it.
    fn wrap_key_info(&self, info: &KeyInfo) -> impl Future<Output = CryptoResult<String>> + Send {
        async move {
            let json = Zeroizing::new(serde_json::to_vec(info)?);
            self.wrap(&json).await
        }
    }

    /// Unwraps and parses a [`KeyInfo`] blob.
    fn unwrap_key_info(&self, wrapped: &str) -> impl Future<Output = CryptoResult<KeyInfo>> + Send {
        async move {
            let json = self.unwrap(wrapped).await?;
            serde_json::from_slice(&json)
                .map_err(|e| CryptoError::Serialization(format!("recovered key info: {e}")))
        }
    }
}

/// The wrapper selected by a [`KeyPairConfig`].
pub enum ConfiguredWrapper<'a> {
    Rsa(RsaKeyWrapper<'a>),
    SealedBox(SealedBoxKeyWrapper<'a>),
}

impl<'a> ConfiguredWrapper<'a> {
    pub fn for_config(config: &'a KeyPairConfig) -> Self {
        match config {
            KeyPairConfig::Rsa(keys) => ConfiguredWrapper::Rsa(RsaKeyWrapper::new(keys)),
            KeyPairConfig::SealedBox(keys) => {
                ConfiguredWrapper::SealedBox(SealedBoxKeyWrapper::new(keys))
            }
        }
    }
}

impl KeyWrapper for ConfiguredWrapper<'_> {
    async fn wrap(&self, plaintext: &[u8]) -> CryptoResult<String> {
        match self {
            ConfiguredWrapper::Rsa(w) => w.wrap(plaintext).await,
            ConfiguredWrapper::SealedBox(w) => w.wrap(plaintext).await,
        }
    }

    async fn unwrap(&self, wrapped: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
        match self {
            ConfiguredWrapper::Rsa(w) => w.unwrap(wrapped).await,
            ConfiguredWrapper::SealedBox(w) => w.unwrap(wrapped).await,
        }
    }
}
