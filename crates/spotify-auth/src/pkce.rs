//! PKCE (Proof Key for Code Exchange) secret generation per RFC 7636
//!
//! Generates the random `state` and code verifier used during the OAuth
//! authorization flow, and derives the S256 challenge. The verifier stays
//! with the initiating party and is sent during token exchange; the
//! challenge is included in the authorization URL so the authorization
//! server can verify the exchange request came from the same party that
//! initiated the flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRng;
use rand::rngs::SysRng;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Characters a generated secret is drawn from.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a cryptographically random string of `len` characters.
///
/// Each character is selected uniformly from the alphanumeric alphabet.
/// Random bytes at or above the largest multiple of the alphabet size are
/// rejected and redrawn, so no alphabet position is favored by the byte
/// range not dividing evenly.
///
/// Fails only when the OS secure-random source cannot produce bytes.
pub fn random_string(len: usize) -> Result<String> {
    let bound = 256 - (256 % ALPHABET.len());
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];

    while out.len() < len {
        SysRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| Error::SecretGeneration(e.to_string()))?;
        for &byte in &buf {
            if (byte as usize) < bound {
                out.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
                if out.len() == len {
                    break;
                }
            }
        }
    }

    Ok(out)
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`, padding stripped.
/// Deterministic given the verifier; no side effects.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
