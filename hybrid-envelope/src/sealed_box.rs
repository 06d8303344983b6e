//! Process-wide readiness of the sealed-box primitive.
//!
//! The first caller runs a seal/open self-test against a throwaway X25519
//! keypair. Every later or concurrent caller awaits that same outcome,
//! including a failure.

use crate::error::{CryptoError, CryptoResult};
use crypto_box::SecretKey;
use rand_core::OsRng;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

static READY: OnceCell<Result<(), String>> = OnceCell::const_new();

const SELF_TEST_PLAINTEXT: &[u8] = b"sealed-box readiness check";

#[cfg(test)]
static SELF_TEST_RUNS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// Waits until the sealed-box primitive is usable.
pub async fn ready() -> CryptoResult<()> {
    READY
        .get_or_init(|| async { self_test() })
        .await
        .clone()
        .map_err(CryptoError::Unavailable)
}

/// Returns true once initialization has completed successfully.
pub fn is_ready() -> bool {
    matches!(READY.get(), Some(Ok(())))
}

fn self_test() -> Result<(), String> {
    #[cfg(test)]
    SELF_TEST_RUNS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let secret = SecretKey::generate(&mut OsRng);
    let outcome = secret
        .public_key()
        .seal(&mut OsRng, SELF_TEST_PLAINTEXT)
        .map_err(|e| format!("seal self-test failed: {e}"))
        .and_then(|sealed| {
            secret
                .unseal(&sealed)
                .map_err(|e| format!("open self-test failed: {e}"))
        })
        .and_then(|opened| {
            if opened == SELF_TEST_PLAINTEXT {
                Ok(())
            } else {
                Err("self-test plaintext mismatch".to_string())
            }
        });

    match &outcome {
        Ok(()) => debug!("sealed-box primitive ready"),
        Err(e) => warn!("sealed-box primitive unavailable: {e}"),
    }
    outcome
}
