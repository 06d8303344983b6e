//! C ABI exports for hybrid envelope encryption.
//!
//! Lets host languages (P/Invoke, JNI, Swift, Node-API shims) seal and open
//! envelopes without reimplementing the format. Configs and payloads cross
//! the boundary as JSON strings; errors come back as [`HybridError`] codes.
//!
//! Strings written to `out_*` pointers are owned by the caller and must be
//! released with [`hybrid_free_string`].

use hybrid_envelope::{
    Algorithm, CBC_IV_LEN, CryptoError, DEFAULT_RSA_BITS, HybridConfig, generate_rsa_keypair,
    generate_sealed_box_keypair, hybrid_decrypt as open_envelope, hybrid_encrypt as seal_envelope,
    random_iv_for_algorithm, random_iv_hex, random_key,
};
use serde_json::Value;
use std::ffi::{CStr, CString, c_char};
use std::sync::LazyLock;
use tokio::runtime::Runtime;
use tracing::warn;

/// Error codes returned by FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridError {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer argument.
    NullPointer = 1,
    /// Invalid UTF-8 string.
    InvalidUtf8 = 2,
    /// JSON parse or serialization error.
    JsonError = 3,
    /// Invalid key, IV, algorithm or other argument.
    InvalidArgument = 4,
    /// Key info does not fit the RSA key.
    KeyInfoTooLarge = 5,
    /// Encryption or key wrapping failed.
    EncryptFailed = 6,
    /// Decryption failed. Deliberately carries no detail.
    DecryptFailed = 7,
    /// Key generation failed.
    KeyGenerationFailed = 8,
    /// Secure random source unavailable.
    RandomFailed = 9,
    /// Async runtime could not be created.
    RuntimeUnavailable = 10,
    /// Unknown error.
    Unknown = 99,
}

impl From<&CryptoError> for HybridError {
    fn from(e: &CryptoError) -> Self {
        match e {
            CryptoError::Serialization(_) => HybridError::JsonError,
            CryptoError::WrapSize { .. } => HybridError::KeyInfoTooLarge,
            CryptoError::InvalidKeyLength { .. }
            | CryptoError::InvalidIvLength { .. }
            | CryptoError::UnsupportedAlgorithm(_)
            | CryptoError::InvalidKey(_)
            | CryptoError::MissingPrivateKey
            | CryptoError::Encoding(_) => HybridError::InvalidArgument,
            CryptoError::Encryption(_) | CryptoError::Unavailable(_) => HybridError::EncryptFailed,
            CryptoError::Decryption(_)
            | CryptoError::Unwrap(_)
            | CryptoError::EnvelopeFormat(_) => HybridError::DecryptFailed,
            CryptoError::Random(_) => HybridError::RandomFailed,
            CryptoError::KeyGeneration(_) => HybridError::KeyGenerationFailed,
        }
    }
}

/// Runtime driving the async library calls. Created on first use.
static RUNTIME: LazyLock<std::io::Result<Runtime>> = LazyLock::new(Runtime::new);

fn runtime() -> Result<&'static Runtime, HybridError> {
    RUNTIME.as_ref().map_err(|e| {
        warn!("failed to start async runtime: {e}");
        HybridError::RuntimeUnavailable
    })
}

/// Reads a required C string argument.
///
/// # Safety
/// - `ptr` must be null or a valid null-terminated string.
unsafe fn read_str<'a>(ptr: *const c_char) -> Result<&'a str, HybridError> {
    if ptr.is_null() {
        return Err(HybridError::NullPointer);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| HybridError::InvalidUtf8)
}

/// Hands `value` to the caller through `out`.
///
/// # Safety
/// - `out` must be a valid, non-null pointer.
unsafe fn write_out(out: *mut *mut c_char, value: String) -> HybridError {
    match CString::new(value) {
        Ok(c) => {
            unsafe { *out = c.into_raw() };
            HybridError::Ok
        }
        Err(_) => HybridError::JsonError,
    }
}

fn crypto_failure(op: &str, e: &CryptoError) -> HybridError {
    warn!("{op} failed: {e}");
    HybridError::from(e)
}

// ============================================================================
// Core Functions
// ============================================================================

/// Installs the stderr log subscriber. Safe to call more than once.
///
/// Honors `RUST_LOG`; defaults to `info`.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_init() -> HybridError {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
    match runtime() {
        Ok(_) => HybridError::Ok,
        Err(e) => e,
    }
}

/// Returns the library version as a string.
///
/// # Safety
/// - The returned string is statically allocated and must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Frees a string allocated by this library.
///
/// # Safety
/// - `s` must be a string allocated by this library, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ============================================================================
// Envelope Functions
// ============================================================================

/// Encrypts a JSON payload into an envelope string.
///
/// # Safety
/// - `data_json` and `config_json` must be valid null-terminated UTF-8 strings.
/// - `out_envelope` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_encrypt(
    data_json: *const c_char,
    config_json: *const c_char,
    out_envelope: *mut *mut c_char,
) -> HybridError {
    if out_envelope.is_null() {
        return HybridError::NullPointer;
    }
    let (data, config) = match unsafe { (read_str(data_json), read_str(config_json)) } {
        (Ok(d), Ok(c)) => (d, c),
        (Err(e), _) | (_, Err(e)) => return e,
    };
    let Ok(data) = serde_json::from_str::<Value>(data) else {
        return HybridError::JsonError;
    };
    let Ok(config) = serde_json::from_str::<HybridConfig>(config) else {
        return HybridError::JsonError;
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => return e,
    };

    match rt.block_on(seal_envelope(&data, &config)) {
        Ok(envelope) => unsafe { write_out(out_envelope, envelope) },
        Err(e) => crypto_failure("envelope encrypt", &e),
    }
}

/// Decrypts an envelope string into its JSON payload.
///
/// Every failure after argument checks returns `DecryptFailed`.
///
/// # Safety
/// - `envelope` and `config_json` must be valid null-terminated UTF-8 strings.
/// - `out_json` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_decrypt(
    envelope: *const c_char,
    config_json: *const c_char,
    out_json: *mut *mut c_char,
) -> HybridError {
    if out_json.is_null() {
        return HybridError::NullPointer;
    }
    let (envelope, config) = match unsafe { (read_str(envelope), read_str(config_json)) } {
        (Ok(e), Ok(c)) => (e, c),
        (Err(e), _) | (_, Err(e)) => return e,
    };
    let Ok(config) = serde_json::from_str::<HybridConfig>(config) else {
        return HybridError::JsonError;
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => return e,
    };

    let Some(data) = rt.block_on(open_envelope::<Value>(envelope, &config)) else {
        return HybridError::DecryptFailed;
    };
    match serde_json::to_string(&data) {
        Ok(json) => unsafe { write_out(out_json, json) },
        Err(_) => HybridError::DecryptFailed,
    }
}

// ============================================================================
// Key and IV Generation
// ============================================================================

/// Generates an RSA keypair as `{"publicKey": ..., "privateKey": ...}` PEM.
///
/// `bits == 0` selects the default modulus size.
///
/// # Safety
/// - `out_json` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_generate_rsa_keypair(
    bits: u32,
    out_json: *mut *mut c_char,
) -> HybridError {
    if out_json.is_null() {
        return HybridError::NullPointer;
    }
    let bits = if bits == 0 { DEFAULT_RSA_BITS } else { bits as usize };
    let keypair = match generate_rsa_keypair(bits) {
        Ok(kp) => kp,
        Err(e) => return crypto_failure("RSA key generation", &e),
    };
    match serde_json::to_string(&keypair) {
        Ok(json) => unsafe { write_out(out_json, json) },
        Err(_) => HybridError::JsonError,
    }
}

/// Generates a sealed-box keypair as `{"publicKey": ..., "privateKey": ...}` base64.
///
/// # Safety
/// - `out_json` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_generate_sealed_box_keypair(
    out_json: *mut *mut c_char,
) -> HybridError {
    if out_json.is_null() {
        return HybridError::NullPointer;
    }
    match serde_json::to_string(&generate_sealed_box_keypair()) {
        Ok(json) => unsafe { write_out(out_json, json) },
        Err(_) => HybridError::JsonError,
    }
}

/// Generates a hex key of exactly `length` characters.
///
/// # Safety
/// - `out_key` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_random_key(
    length: usize,
    out_key: *mut *mut c_char,
) -> HybridError {
    if out_key.is_null() {
        return HybridError::NullPointer;
    }
    match random_key(length) {
        Ok(key) => unsafe { write_out(out_key, key) },
        Err(e) => crypto_failure("random key", &e),
    }
}

/// Generates a hex IV sized for `algorithm` (e.g. `"aes-256-gcm"`).
///
/// A null `algorithm` selects the legacy 16-byte IV, hex encoded since raw
/// latin1 bytes cannot cross a C string boundary intact.
///
/// # Safety
/// - `algorithm` must be null or a valid null-terminated UTF-8 string.
/// - `out_iv` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hybrid_random_iv(
    algorithm: *const c_char,
    out_iv: *mut *mut c_char,
) -> HybridError {
    if out_iv.is_null() {
        return HybridError::NullPointer;
    }
    let iv = if algorithm.is_null() {
        random_iv_hex(CBC_IV_LEN)
    } else {
        let name = match unsafe { read_str(algorithm) } {
            Ok(s) => s,
            Err(e) => return e,
        };
        match name.parse::<Algorithm>() {
            Ok(alg) => random_iv_for_algorithm(alg),
            Err(e) => return crypto_failure("random IV", &e),
        }
    };
    match iv {
        Ok(iv) => unsafe { write_out(out_iv, iv) },
        Err(e) => crypto_failure("random IV", &e),
    }
}
