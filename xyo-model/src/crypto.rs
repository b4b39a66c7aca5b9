//! Centralized cryptographic operations for the origin-chain engine.
//!
//! **All** hashing and signature verification goes through this module.
//! This provides a single audit surface for cryptographic correctness.
//!
//! # Primitives
//!
//! | Primitive   | Algorithm       | Purpose                                   |
//! |-------------|-----------------|-------------------------------------------|
//! | Hash        | BLAKE3 (32 B)   | Block hashing, previous-hash linkage      |
//! | Hash        | SHA-256 (32 B)  | Interop hashing for foreign chains        |
//! | Signature   | Ed25519 (64 B)  | Bound-witness co-signing                  |
//!
//! Signing lives with the key material in [`crate::signer`]; verification is
//! a capability of [`PublicKey`] so a block can be checked without any
//! private keys present.

use crate::types::{Hash, HashKind, PublicKey, Signature, SignatureScheme};

// ---------------------------------------------------------------------------
// Hash providers
// ---------------------------------------------------------------------------

/// A hashing capability announcing its algorithm id.
///
/// Providers are stateless and may be shared freely across sessions.
pub trait HashProvider: Send + Sync {
    /// The algorithm this provider implements.
    fn kind(&self) -> HashKind;

    /// Hash arbitrary bytes.
    fn hash(&self, data: &[u8]) -> Hash;
}

/// BLAKE3 content hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Provider;

impl HashProvider for Blake3Provider {
    fn kind(&self) -> HashKind {
        HashKind::Blake3
    }

    fn hash(&self, data: &[u8]) -> Hash {
        Hash::new(HashKind::Blake3, blake3::hash(data).as_bytes().to_vec())
    }
}

/// SHA-256 content hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Provider;

impl HashProvider for Sha256Provider {
    fn kind(&self) -> HashKind {
        HashKind::Sha256
    }

    fn hash(&self, data: &[u8]) -> Hash {
        use sha2::{Digest, Sha256};
        Hash::new(HashKind::Sha256, Sha256::digest(data).to_vec())
    }
}

// ---------------------------------------------------------------------------
// Signature verification
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Verify a signature over `data` with this key.
    ///
    /// Returns `false` for malformed key bytes, malformed signature bytes,
    /// mismatched schemes, or a failing verification. Never panics.
    pub fn verify(&self, data: &[u8], signature: &Signature) -> bool {
        if self.scheme() != signature.scheme() {
            return false;
        }
        match self.scheme() {
            SignatureScheme::Ed25519 => verify_ed25519(self, data, signature),
        }
    }
}

fn verify_ed25519(key: &PublicKey, data: &[u8], signature: &Signature) -> bool {
    use ed25519_dalek::Verifier;
    let Ok(key_bytes) = <[u8; 32]>::try_from(key.as_bytes()) else {
        return false;
    };
    let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    vk.verify(data, &sig).is_ok()
}
