//! Signer capability and Ed25519 key material
//!
//! Each participant signs bound witnesses with one or more keypairs. The
//! private half stays in a local key file; the public half travels inside
//! every block the signer participates in.
//!
//! Key files are scheme-tagged: one tag byte naming the signature scheme,
//! then that scheme's seed. The tag keeps a key file self-describing the
//! same way wire values are, so a future scheme gets a new tag rather than
//! a new file layout.

use crate::types::{PublicKey, Signature, SignatureScheme};
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use zeroize::Zeroizing;

/// Key-file tag byte for an Ed25519 seed.
const KEY_FILE_TAG_ED25519: u8 = 0x01;

/// Errors that can occur loading or saving signer key material.
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("key file is empty")]
    EmptyKeyFile,

    #[error("unrecognized scheme tag {0:#04x} in key file")]
    UnknownSchemeTag(u8),

    #[error("key file holds {got} seed bytes where {expected} are required")]
    SeedLength { expected: usize, got: usize },
}

/// A signing capability: owns private key material, exposes the public key.
///
/// Signers are immutable once constructed and safe to share as
/// `Arc<dyn Signer>`; signing borrows `&self`.
pub trait Signer: Send + Sync {
    /// The signature scheme this signer produces.
    fn scheme(&self) -> SignatureScheme;

    /// The signer's public key.
    fn public_key(&self) -> PublicKey;

    /// Sign arbitrary bytes.
    fn sign(&self, data: &[u8]) -> Signature;
}

/// Ed25519 signer backed by a dalek keypair.
#[derive(Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a new signer with a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a signer from an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Parse a signer from scheme-tagged key-file bytes.
    pub fn from_key_file_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let (&tag, seed) = bytes.split_first().ok_or(SignerError::EmptyKeyFile)?;
        if tag != KEY_FILE_TAG_ED25519 {
            return Err(SignerError::UnknownSchemeTag(tag));
        }
        if seed.len() != ed25519_dalek::SECRET_KEY_LENGTH {
            return Err(SignerError::SeedLength {
                expected: ed25519_dalek::SECRET_KEY_LENGTH,
                got: seed.len(),
            });
        }
        let mut seed_bytes = Zeroizing::new([0u8; 32]);
        seed_bytes.copy_from_slice(seed);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed_bytes),
        })
    }

    /// Serialize the signer to scheme-tagged key-file bytes.
    ///
    /// The buffer holds the private seed; it is wiped on drop.
    pub fn to_key_file_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(33));
        out.push(KEY_FILE_TAG_ED25519);
        out.extend_from_slice(self.signing_key.as_bytes());
        out
    }

    /// Load a signer from a key file, or generate and save one if the file
    /// does not exist yet. Returns (signer, is_new).
    ///
    /// The parent directory must already exist; key placement is the
    /// caller's layout decision.
    pub fn load_or_generate(path: impl AsRef<Path>) -> Result<(Self, bool), SignerError> {
        match fs::read(&path) {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                Ok((Self::from_key_file_bytes(&bytes)?, false))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let signer = Self::generate();
                signer.save(&path)?;
                Ok((signer, true))
            }
            Err(e) => Err(SignerError::Io(e)),
        }
    }

    /// Load a signer's private key from a key file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let bytes = Zeroizing::new(fs::read(path)?);
        Self::from_key_file_bytes(&bytes)
    }

    /// Save the signer's private key to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SignerError> {
        fs::write(path, &*self.to_key_file_bytes())?;
        Ok(())
    }

    /// Get the dalek verifying key.
    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl Signer for Ed25519Signer {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::new(
            SignatureScheme::Ed25519,
            self.signing_key.verifying_key().to_bytes().to_vec(),
        )
    }

    fn sign(&self, data: &[u8]) -> Signature {
        let sig = self.signing_key.sign(data);
        Signature::new(SignatureScheme::Ed25519, sig.to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.public_key())
            .finish()
    }
}
