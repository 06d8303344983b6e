//! Random key and IV generation.
//!
//! Everything draws from the operating system CSPRNG. There is no fallback:
//! if the OS source fails, the call fails.

use crate::config::{Algorithm, CBC_IV_LEN};
use crate::encoding::latin1_encode;
use crate::error::{CryptoError, CryptoResult};
use rand_core::{OsRng, RngCore};

/// Fills a fresh buffer of `len` bytes from the OS random source.
pub fn random_bytes(len: usize) -> CryptoResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::Random(e.to_string()))?;
    Ok(buf)
}

/// Returns exactly `length` lowercase hex characters.
///
/// Used as-is, the string is a `length`-byte key (one byte per character).
/// The generator does not check `length` against any cipher.
pub fn random_key(length: usize) -> CryptoResult<String> {
    let bytes = random_bytes(length.div_ceil(2))?;
    let mut key = hex::encode(bytes);
    key.truncate(length);
    Ok(key)
}

/// Returns a raw byte-per-character (latin1) IV.
///
/// With `None` this is the legacy generator and always yields 16 bytes,
/// which authenticated modes reject. Pass the algorithm, or use
/// [`random_iv_for_algorithm`], whenever the mode is authenticated.
pub fn random_iv(algorithm: Option<Algorithm>) -> CryptoResult<String> {
    let len = algorithm.map_or(CBC_IV_LEN, Algorithm::iv_len);
    Ok(latin1_encode(&random_bytes(len)?))
}

/// Returns a hex IV of `bytes` random bytes (`2 * bytes` characters).
pub fn random_iv_hex(bytes: usize) -> CryptoResult<String> {
    Ok(hex::encode(random_bytes(bytes)?))
}

/// Returns a hex IV sized for `algorithm`: 12 bytes for authenticated modes,
/// 16 for block-chaining modes.
pub fn random_iv_for_algorithm(algorithm: Algorithm) -> CryptoResult<String> {
    random_iv_hex(algorithm.iv_len())
}
