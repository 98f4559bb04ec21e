//! Credential hashing seam.
//!
//! Hashing is a collaborator concern: the store only ever sees the encoded
//! string. The default implementation is salted SHA-256 in a
//! `sha256$<salt>$<digest>` encoding; swap the trait impl to change schemes
//! without touching account logic.

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Hashes and verifies account credentials.
pub trait CredentialHasher {
    /// Produce an encoded hash for storage.
    fn hash(&self, password: &str) -> String;

    /// Check `password` against a stored encoded hash.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Default salted SHA-256 hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaltedSha256;

impl SaltedSha256 {
    fn digest(salt_hex: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt_hex.as_bytes());
        hasher.update(b"$");
        hasher.update(password.as_bytes());
        hex(&hasher.finalize())
    }
}

impl CredentialHasher for SaltedSha256 {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt_hex = hex(&salt);
        let digest = Self::digest(&salt_hex, password);
        format!("{SCHEME}${salt_hex}${digest}")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.splitn(3, '$');
        let (Some(scheme), Some(salt_hex), Some(digest)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        if scheme != SCHEME {
            return false;
        }
        Self::digest(salt_hex, password) == digest
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{CredentialHasher, SaltedSha256};

    #[test]
    fn hash_then_verify_round_trips() {
        let hasher = SaltedSha256;
        let stored = hasher.hash("alice123");
        assert!(stored.starts_with("sha256$"));
        assert!(hasher.verify("alice123", &stored));
        assert!(!hasher.verify("alice124", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = SaltedSha256;
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn malformed_stored_value_never_verifies() {
        let hasher = SaltedSha256;
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "sha256$missing-digest"));
        assert!(!hasher.verify("pw", "bcrypt$salt$digest"));
    }
}
