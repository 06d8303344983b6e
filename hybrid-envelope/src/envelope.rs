//! Hybrid envelope construction and deconstruction.
//!
//! Encrypt: payload -> symmetric cipher -> `encryptedData`; key info
//! (`secretKey`, `iv`, `salt`) -> key wrapper -> `encryptedKey`; both fields
//! serialized as one JSON object.
//!
//! Decrypt reverses the flow and merges the recovered key info into the
//! caller's symmetric config with recovered values taking precedence (see
//! [`SymmetricConfig::with_recovered`]). Every failure on the decrypt side
//! collapses to `None` so callers cannot tell a wrong key from a corrupted
//! envelope or a wrong algorithm.

use crate::cipher;
use crate::config::{HybridConfig, KeyInfo, SymmetricConfig};
use crate::error::{CryptoError, CryptoResult};
use crate::wrapper::{ConfiguredWrapper, KeyWrapper};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire form of an envelope. Carries no algorithm or version metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Envelope {
    /// Base64 symmetric ciphertext (tag included for authenticated modes).
    pub encrypted_data: String,
    /// Wrapped key info in the key wrapper's codec.
    pub encrypted_key: String,
}

impl Envelope {
    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CryptoResult<Self> {
        serde_json::from_str(json).map_err(|e| CryptoError::EnvelopeFormat(e.to_string()))
    }
}

/// Encrypts `data` for the recipient in `config.asymmetric`.
///
/// All errors propagate: a failed encrypt reveals nothing secret.
pub async fn hybrid_encrypt<T: Serialize + ?Sized>(
    data: &T,
    config: &HybridConfig,
) -> CryptoResult<String> {
    let wrapper = ConfiguredWrapper::for_config(&config.asymmetric);
    encrypt_with(data, &config.symmetric, &wrapper).await
}

/// Decrypts an envelope produced by [`hybrid_encrypt`].
///
/// Returns `None` on any failure: malformed envelope, unwrap failure,
/// symmetric decrypt failure, or JSON that does not match `T`.
pub async fn hybrid_decrypt<T: DeserializeOwned>(
    envelope: &str,
    config: &HybridConfig,
) -> Option<T> {
    let wrapper = ConfiguredWrapper::for_config(&config.asymmetric);
    decrypt_with(envelope, &config.symmetric, &wrapper).await
}

/// [`hybrid_encrypt`] with an explicit key wrapper.
pub async fn encrypt_with<T, W>(
    data: &T,
    symmetric: &SymmetricConfig,
    wrapper: &W,
) -> CryptoResult<String>
where
    T: Serialize + ?Sized,
    W: KeyWrapper,
{
    let encrypted_data = cipher::encrypt(data, symmetric)?;
    let encrypted_key = wrapper.wrap_key_info(&KeyInfo::from(symmetric)).await?;
    let json = Envelope {
        encrypted_data,
        encrypted_key,
    }
    .to_json()?;
    debug!(
        "sealed {} byte envelope ({})",
        json.len(),
        symmetric.algorithm
    );
    Ok(json)
}

/// [`hybrid_decrypt`] with an explicit key wrapper.
pub async fn decrypt_with<T, W>(
    envelope: &str,
    symmetric: &SymmetricConfig,
    wrapper: &W,
) -> Option<T>
where
    T: DeserializeOwned,
    W: KeyWrapper,
{
    match try_decrypt(envelope, symmetric, wrapper).await {
        Ok(data) => {
            debug!("opened {} byte envelope ({})", envelope.len(), symmetric.algorithm);
            Some(data)
        }
        Err(e) => {
            debug!("envelope rejected: {e}");
            None
        }
    }
}

async fn try_decrypt<T, W>(
    envelope: &str,
    symmetric: &SymmetricConfig,
    wrapper: &W,
) -> CryptoResult<T>
where
    T: DeserializeOwned,
    W: KeyWrapper,
{
    let envelope = Envelope::from_json(envelope)?;
    let recovered = wrapper.unwrap_key_info(&envelope.encrypted_key).await?;
    let effective = symmetric.with_recovered(&recovered);
    cipher::decrypt(&envelope.encrypted_data, &effective)
}
