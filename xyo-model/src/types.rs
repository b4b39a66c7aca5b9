//! Strong types for protocol byte strings
//!
//! Hashes, public keys, and signatures are opaque byte strings tagged by the
//! algorithm that produced them. The wire codec embeds the tag in each
//! value's type identifier, so two values are interchangeable only when both
//! the bytes and the algorithm agree.

use std::fmt;

/// Hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum HashKind {
    Sha256,
    Blake3,
}

impl HashKind {
    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashKind::Sha256 => 32,
            HashKind::Blake3 => 32,
        }
    }
}

/// Signature scheme identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum SignatureScheme {
    Ed25519,
}

impl SignatureScheme {
    /// Public key length in bytes.
    pub fn public_key_len(&self) -> usize {
        match self {
            SignatureScheme::Ed25519 => 32,
        }
    }

    /// Signature length in bytes.
    pub fn signature_len(&self) -> usize {
        match self {
            SignatureScheme::Ed25519 => 64,
        }
    }
}

/// Macro to define algorithm-tagged byte strings.
///
/// Args:
/// - $name: The name of the struct (e.g., Hash)
/// - $tag_ty: The algorithm tag type (e.g., HashKind)
/// - $tag_field: Accessor name for the tag (e.g., algorithm)
/// - $doc: Documentation string
macro_rules! define_tagged_bytes {
    ($name:ident, $tag_ty:ident, $tag_field:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $tag_field: $tag_ty,
            #[serde(with = "serde_bytes")]
            bytes: Vec<u8>,
        }

        impl $name {
            /// Construct from an algorithm tag and raw bytes.
            pub fn new($tag_field: $tag_ty, bytes: Vec<u8>) -> Self {
                Self { $tag_field, bytes }
            }

            /// The algorithm tag.
            pub fn $tag_field(&self) -> $tag_ty {
                self.$tag_field
            }

            /// Returns the inner bytes as a slice.
            pub fn as_bytes(&self) -> &[u8] {
                &self.bytes
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.bytes
            }
        }

        // Zero-allocation hex formatting
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?}, ", stringify!($name), self.$tag_field)?;
                fmt::Display::fmt(self, f)?;
                write!(f, ")")
            }
        }
    };
}

define_tagged_bytes!(Hash, HashKind, algorithm, "Algorithm-tagged hash digest");
define_tagged_bytes!(PublicKey, SignatureScheme, scheme, "Scheme-tagged public key");
define_tagged_bytes!(Signature, SignatureScheme, scheme, "Scheme-tagged signature");

impl Hash {
    /// Parse from a hex string.
    pub fn from_hex(algorithm: HashKind, hex_str: &str) -> Result<Self, String> {
        let bytes = hex::decode(hex_str).map_err(|e| format!("invalid hex: {}", e))?;
        if bytes.len() != algorithm.digest_len() {
            return Err(format!(
                "expected {} bytes, got {}",
                algorithm.digest_len(),
                bytes.len()
            ));
        }
        Ok(Self::new(algorithm, bytes))
    }
}

// --- Tests ---
