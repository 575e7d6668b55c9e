//! Opaque session tokens.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};

/// A freshly issued session token and the digest it is stored under.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// The bearer token handed to the client. Never stored server-side.
    pub token: String,
    /// SHA-256 digest of the token, used as the session store key.
    pub digest: String,
}

impl SessionToken {
    /// Generates a new random token.
    pub fn generate() -> Self {
        let token = generate_token();
        let digest = token_digest(&token);

        Self { token, digest }
    }
}

/// Generates 32 random bytes, base64url-encoded.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.random::<u8>()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Digest under which the session for `token` is stored.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
