//! Recipient keypair generation for both wrapping strategies.

use crate::config::KeyPair;
use crate::encoding::{Base64Codec, BinaryCodec};
use crate::error::{CryptoError, CryptoResult};
use crypto_box::SecretKey;
use rand_core::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

/// Modulus size used when callers do not choose one. Large enough for a
/// JSON key-info blob under OAEP-SHA256.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// Smallest modulus accepted by [`generate_rsa_keypair`].
pub const MIN_RSA_BITS: usize = 1024;

/// Generates an RSA keypair: PKCS#8 PEM private key, SPKI PEM public key.
pub fn generate_rsa_keypair(bits: usize) -> CryptoResult<KeyPair> {
    if bits < MIN_RSA_BITS {
        return Err(CryptoError::KeyGeneration(format!(
            "RSA modulus of {bits} bits is below the {MIN_RSA_BITS}-bit minimum"
        )));
    }

    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CryptoError::KeyGeneration(format!("RSA key generation failed: {e}")))?;
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyGeneration(format!("public key encoding failed: {e}")))?;
    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyGeneration(format!("private key encoding failed: {e}")))?;

    Ok(KeyPair::new(public_pem, private_pem.as_str()))
}

/// Generates an X25519 keypair for sealed-box wrapping, base64 encoded.
pub fn generate_sealed_box_keypair() -> KeyPair {
    let secret = SecretKey::generate(&mut OsRng);
    let codec = Base64Codec;
    KeyPair::new(
        codec.encode(secret.public_key().as_bytes()),
        codec.encode(&secret.to_bytes()),
    )
}
