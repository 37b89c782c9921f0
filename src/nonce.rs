//! Server nonce generation for `Digest` challenges.

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

/// Number of random bytes in a nonce (rendered as twice as many hex chars)
pub const NONCE_BYTES: usize = 16;

/// Nonce handed out when the entropy source fails.
///
/// A fixed nonce is weaker than a random one, but the verifier keeps no nonce
/// state anyway, so request handling continues instead of aborting.
pub const FALLBACK_NONCE: &str = "0a0b0c0d0e0f1a1b1c1d1e1f01234567";

/// Generate a fresh nonce from the operating system's entropy source.
pub fn generate_nonce() -> String {
    nonce_from(&mut OsRng)
}

/// Generate a nonce from the given source, falling back to [`FALLBACK_NONCE`]
/// if it cannot deliver bytes.
pub fn nonce_from<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    match rng.try_fill_bytes(&mut bytes) {
        Ok(()) => hex::encode(bytes),
        Err(err) => {
            warn!(error = %err, "entropy source failed, using fallback nonce");
            FALLBACK_NONCE.to_string()
        }
    }
}
