//! Caller-supplied configuration for hybrid envelopes.
//!
//! All types here are plain serde data. Field names follow the camelCase wire
//! shape (`secretKey`, `publicKey`, ...) so existing JSON configs load as-is.

use crate::error::{CryptoError, CryptoResult};
use crate::random;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric cipher used for the bulk payload.
///
/// The algorithm is never written into the envelope; both sides must agree
/// on it out of band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "aes-128-cbc")]
    Aes128Cbc,
    #[serde(rename = "aes-192-cbc")]
    Aes192Cbc,
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

/// Nonce length of the authenticated modes.
pub const AEAD_IV_LEN: usize = 12;
/// IV length of the block-chaining modes (one AES block).
pub const CBC_IV_LEN: usize = 16;
/// Authentication tag length appended by the authenticated modes.
pub const TAG_LEN: usize = 16;

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Aes128Cbc,
        Algorithm::Aes192Cbc,
        Algorithm::Aes256Cbc,
        Algorithm::Aes128Gcm,
        Algorithm::Aes256Gcm,
        Algorithm::ChaCha20Poly1305,
    ];

    /// Key size in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Algorithm::Aes128Cbc | Algorithm::Aes128Gcm => 16,
            Algorithm::Aes192Cbc => 24,
            Algorithm::Aes256Cbc | Algorithm::Aes256Gcm | Algorithm::ChaCha20Poly1305 => 32,
        }
    }

    /// IV / nonce size in bytes.
    pub const fn iv_len(self) -> usize {
        if self.is_authenticated() {
            AEAD_IV_LEN
        } else {
            CBC_IV_LEN
        }
    }

    /// Returns true for AEAD modes that emit an authentication tag.
    pub const fn is_authenticated(self) -> bool {
        matches!(
            self,
            Algorithm::Aes128Gcm | Algorithm::Aes256Gcm | Algorithm::ChaCha20Poly1305
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Aes128Cbc => "aes-128-cbc",
            Algorithm::Aes192Cbc => "aes-192-cbc",
            Algorithm::Aes256Cbc => "aes-256-cbc",
            Algorithm::Aes128Gcm => "aes-128-gcm",
            Algorithm::Aes256Gcm => "aes-256-gcm",
            Algorithm::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == lowered)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Key material and parameters for the symmetric layer.
///
/// `secret_key` is either `key_len` raw characters or `2 * key_len` hex
/// characters. `iv` is either `iv_len` latin1 characters or `2 * iv_len`
/// hex characters.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SymmetricConfig {
    pub secret_key: String,
    pub iv: String,
    #[serde(default)]
    pub salt: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub algorithm: Algorithm,
}

impl SymmetricConfig {
    pub fn new(
        secret_key: impl Into<String>,
        iv: impl Into<String>,
        salt: impl Into<String>,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            iv: iv.into(),
            salt: salt.into(),
            algorithm,
        }
    }

    /// Creates a config with a full-entropy hex key and a correctly sized
    /// hex IV.
    pub fn generate(algorithm: Algorithm, salt: impl Into<String>) -> CryptoResult<Self> {
        Ok(Self {
            secret_key: random::random_key(2 * algorithm.key_len())?,
            iv: random::random_iv_for_algorithm(algorithm)?,
            salt: salt.into(),
            algorithm,
        })
    }

    /// Builds the effective decrypt config from recovered key info.
    ///
    /// Recovered values win: they are what the sender actually used. Fields
    /// missing from the recovered blob fall back to this config. The
    /// algorithm always comes from this config since it is never wrapped.
    pub fn with_recovered(&self, recovered: &KeyInfo) -> SymmetricConfig {
        SymmetricConfig {
            secret_key: recovered
                .secret_key
                .clone()
                .unwrap_or_else(|| self.secret_key.clone()),
            iv: recovered.iv.clone().unwrap_or_else(|| self.iv.clone()),
            salt: recovered.salt.clone().unwrap_or_else(|| self.salt.clone()),
            algorithm: self.algorithm,
        }
    }
}

impl fmt::Debug for SymmetricConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricConfig")
            .field("secret_key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .field("salt", &self.salt)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// The small blob protected by the key wrapper.
///
/// Every field is optional on the way in so that a partial blob can be
/// completed from the caller's config (see [`SymmetricConfig::with_recovered`]).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl From<&SymmetricConfig> for KeyInfo {
    fn from(config: &SymmetricConfig) -> Self {
        Self {
            secret_key: Some(config.secret_key.clone()),
            iv: Some(config.iv.clone()),
            salt: Some(config.salt.clone()),
        }
    }
}

impl fmt::Debug for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyInfo")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("iv", &self.iv.as_ref().map(|_| "[REDACTED]"))
            .field("salt", &self.salt)
            .finish()
    }
}

/// Recipient keypair in text form.
///
/// Only `public_key` is needed to wrap; unwrapping needs both.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl KeyPair {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: Some(private_key.into()),
        }
    }

    /// A keypair that can only be used to wrap.
    pub fn public_only(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: None,
        }
    }

    pub fn private_key(&self) -> CryptoResult<&str> {
        self.private_key
            .as_deref()
            .ok_or(CryptoError::MissingPrivateKey)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Asymmetric key configuration. The variant selects the key wrapper.
///
/// Serialized with a `kind` tag. A keypair object without a tag reads as
/// [`KeyPairConfig::Rsa`], which is the shape of older `{aes, rsa}` configs.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyPairConfig {
    /// RSA-OAEP; PEM encoded keys.
    Rsa(KeyPair),
    /// Anonymous sealed box; base64 encoded X25519 keys.
    SealedBox(KeyPair),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedKeyPairConfig {
    Rsa(KeyPair),
    SealedBox(KeyPair),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UntaggedKeyPair {
    public_key: String,
    #[serde(default)]
    private_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged, expecting = "a keypair object, optionally tagged with `kind`")]
enum KeyPairConfigRepr {
    Tagged(TaggedKeyPairConfig),
    Untagged(UntaggedKeyPair),
}

impl<'de> Deserialize<'de> for KeyPairConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match KeyPairConfigRepr::deserialize(deserializer)? {
            KeyPairConfigRepr::Tagged(TaggedKeyPairConfig::Rsa(kp)) => KeyPairConfig::Rsa(kp),
            KeyPairConfigRepr::Tagged(TaggedKeyPairConfig::SealedBox(kp)) => {
                KeyPairConfig::SealedBox(kp)
            }
            KeyPairConfigRepr::Untagged(UntaggedKeyPair {
                public_key,
                private_key,
            }) => KeyPairConfig::Rsa(KeyPair {
                public_key,
                private_key,
            }),
        })
    }
}

impl KeyPairConfig {
    pub fn key_pair(&self) -> &KeyPair {
        match self {
            KeyPairConfig::Rsa(kp) | KeyPairConfig::SealedBox(kp) => kp,
        }
    }
}

/// Full per-call configuration for [`crate::hybrid_encrypt`] and
/// [`crate::hybrid_decrypt`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HybridConfig {
    #[serde(alias = "aes")]
    pub symmetric: SymmetricConfig,
    #[serde(alias = "rsa")]
    pub asymmetric: KeyPairConfig,
}

impl HybridConfig {
    pub fn new(symmetric: SymmetricConfig, asymmetric: KeyPairConfig) -> Self {
        Self {
            symmetric,
            asymmetric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn algorithm_sizes() {
        assert_eq!(Algorithm::Aes256Gcm.iv_len(), 12);
        assert_eq!(Algorithm::ChaCha20Poly1305.iv_len(), 12);
        assert_eq!(Algorithm::Aes128Cbc.iv_len(), 16);
        assert_eq!(Algorithm::Aes192Cbc.key_len(), 24);
        assert_eq!(Algorithm::Aes128Gcm.key_len(), 16);
        assert_eq!(Algorithm::Aes256Cbc.key_len(), 32);
    }

    #[test]
    fn algorithm_names_roundtrip() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.to_string().parse::<Algorithm>().unwrap(), alg);
            let json = serde_json::to_string(&alg).unwrap();
            assert_eq!(json, format!("\"{}\"", alg.name()));
        }
        assert_eq!("AES-256-GCM".parse::<Algorithm>().unwrap(), Algorithm::Aes256Gcm);
        assert!(matches!(
            "des-ede3".parse::<Algorithm>(),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn recovered_fields_win() {
        let caller =
            SymmetricConfig::new("caller-key", "caller-iv", "caller-salt", Algorithm::Aes256Cbc);
        let recovered = KeyInfo {
            secret_key: Some("sender-key".into()),
            iv: Some("sender-iv".into()),
            salt: Some("sender-salt".into()),
        };
        let merged = caller.with_recovered(&recovered);
        assert_eq!(merged.secret_key, "sender-key");
        assert_eq!(merged.iv, "sender-iv");
        assert_eq!(merged.salt, "sender-salt");
        assert_eq!(merged.algorithm, Algorithm::Aes256Cbc);
    }

    #[test]
    fn missing_recovered_fields_fall_back_to_caller() {
        let caller =
            SymmetricConfig::new("caller-key", "caller-iv", "caller-salt", Algorithm::Aes256Gcm);
        let recovered = KeyInfo {
            secret_key: Some("sender-key".into()),
            iv: None,
            salt: None,
        };
        let merged = caller.with_recovered(&recovered);
        assert_eq!(merged.secret_key, "sender-key");
        assert_eq!(merged.iv, "caller-iv");
        assert_eq!(merged.salt, "caller-salt");
    }

    #[test]
    fn key_info_wire_shape() {
        let config = SymmetricConfig::new("k", "i", "s", Algorithm::Aes256Gcm);
        let json = serde_json::to_string(&KeyInfo::from(&config)).unwrap();
        assert_eq!(json, r#"{"secretKey":"k","iv":"i","salt":"s"}"#);
    }

    #[test]
    fn hybrid_config_accepts_legacy_field_names() {
        let json = r#"{
            "aes": {"secretKey": "k", "iv": "i", "salt": "s", "algorithm": "aes-256-cbc"},
            "rsa": {"publicKey": "pub", "privateKey": "priv"}
        }"#;
        let config: HybridConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.symmetric.algorithm, Algorithm::Aes256Cbc);
        assert!(matches!(config.asymmetric, KeyPairConfig::Rsa(_)));
        assert_eq!(config.asymmetric.key_pair().private_key().unwrap(), "priv");
    }

    #[test]
    fn tagged_keypair_config_selects_variant() {
        let sealed: KeyPairConfig =
            serde_json::from_str(r#"{"kind": "sealed_box", "publicKey": "pub"}"#).unwrap();
        assert!(matches!(sealed, KeyPairConfig::SealedBox(_)));

        let rsa: KeyPairConfig =
            serde_json::from_str(r#"{"kind": "rsa", "publicKey": "pub"}"#).unwrap();
        assert!(matches!(rsa, KeyPairConfig::Rsa(_)));

        let json = serde_json::to_value(&sealed).unwrap();
        assert_eq!(json["kind"], "sealed_box");
    }

    #[test]
    fn unknown_keypair_kind_is_rejected() {
        let json = r#"{"kind": "dsa", "publicKey": "pub"}"#;
        assert!(serde_json::from_str::<KeyPairConfig>(json).is_err());
        assert!(serde_json::from_str::<KeyPairConfig>(r#"{"privateKey": "priv"}"#).is_err());
    }

    #[test]
    fn public_only_keypair_has_no_private_key() {
        let kp = KeyPair::public_only("pub");
        assert!(matches!(kp.private_key(), Err(CryptoError::MissingPrivateKey)));
    }

    #[test]
    fn generated_key_is_full_entropy_hex() {
        for alg in Algorithm::ALL {
            let config = SymmetricConfig::generate(alg, "s").unwrap();
            assert_eq!(config.secret_key.len(), 2 * alg.key_len(), "{alg}");
            assert!(config.secret_key.bytes().all(|b| b.is_ascii_hexdigit()));
            let key = crate::encoding::decode_material(&config.secret_key, alg.key_len()).unwrap();
            assert_eq!(key, hex::decode(&config.secret_key).unwrap(), "{alg}");
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config =
            SymmetricConfig::new("super-secret", "iv-material", "salt", Algorithm::Aes256Gcm);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("iv-material"));

        let kp = KeyPair::new("pub", "private-material");
        assert!(!format!("{kp:?}").contains("private-material"));
    }
}
