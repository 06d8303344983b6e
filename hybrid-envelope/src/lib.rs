//! Hybrid encryption envelopes.
//!
//! Arbitrary JSON-serializable data is encrypted with a symmetric cipher
//! under a per-message key, and that key material is wrapped for a recipient
//! public key. The sender needs no pre-shared secret; bulk encryption runs at
//! symmetric-cipher speed.
//!
//! # Architecture
//!
//! - [`cipher`]: AES-CBC, AES-GCM and ChaCha20-Poly1305 payload encryption
//! - [`wrapper`]: key wrapping via RSA-OAEP or an anonymous X25519 sealed box
//! - [`envelope`]: orchestration and the `{encryptedData, encryptedKey}` wire format
//! - [`random`]: CSPRNG keys and algorithm-sized IVs
//!
//! The envelope is not self-describing. Sender and recipient agree on the
//! symmetric algorithm and the wrapping strategy out of band.
//!
//! ```no_run
//! # async fn demo() -> hybrid_envelope::CryptoResult<()> {
//! use hybrid_envelope::{
//!     Algorithm, HybridConfig, KeyPairConfig, SymmetricConfig, generate_sealed_box_keypair,
//!     hybrid_decrypt, hybrid_encrypt,
//! };
//!
//! let config = HybridConfig::new(
//!     SymmetricConfig::generate(Algorithm::Aes256Gcm, "salt")?,
//!     KeyPairConfig::SealedBox(generate_sealed_box_keypair()),
//! );
//! let sealed = hybrid_encrypt(&serde_json::json!({"ok": true}), &config).await?;
//! let opened: Option<serde_json::Value> = hybrid_decrypt(&sealed, &config).await;
//! assert!(opened.is_some());
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod config;
pub mod encoding;
pub mod envelope;
mod error;
pub mod keys;
pub mod random;
pub mod sealed_box;
pub mod wrapper;

pub use config::{
    AEAD_IV_LEN, Algorithm, CBC_IV_LEN, HybridConfig, KeyInfo, KeyPair, KeyPairConfig,
    SymmetricConfig, TAG_LEN,
};
pub use encoding::{Base64Codec, BinaryCodec, HexCodec};
pub use envelope::{Envelope, decrypt_with, encrypt_with, hybrid_decrypt, hybrid_encrypt};
pub use error::{CryptoError, CryptoResult};
pub use keys::{DEFAULT_RSA_BITS, generate_rsa_keypair, generate_sealed_box_keypair};
pub use random::{random_iv, random_iv_for_algorithm, random_iv_hex, random_key};
pub use wrapper::{ConfiguredWrapper, KeyWrapper, RsaKeyWrapper, SealedBoxKeyWrapper};
