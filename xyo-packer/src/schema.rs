//! Wire schema - type identifiers and framing primitives
//!
//! Every protocol value carries a two-byte (major, minor) type identifier.
//! The major byte groups a family (structures, hashes, keys, signatures,
//! heuristics); the minor byte selects the concrete algorithm or kind.
//! All multi-byte integers on the wire are big-endian.

use crate::error::PackError;
use crate::value::Value;
use xyo_model::{HashKind, Heuristic, SignatureScheme};

// --- Structure family ---
pub const MAJOR_STRUCT: u8 = 0x01;
pub const MINOR_BOUND_WITNESS: u8 = 0x01;
pub const MINOR_TRANSFER: u8 = 0x02;
pub const MINOR_PAYLOAD: u8 = 0x03;
pub const MINOR_ARRAY: u8 = 0x04;

// --- Hash family (minor = algorithm id) ---
pub const MAJOR_HASH: u8 = 0x02;
pub const MINOR_SHA256: u8 = 0x01;
pub const MINOR_BLAKE3: u8 = 0x02;

// --- Public key family (minor = scheme id) ---
pub const MAJOR_KEY: u8 = 0x03;
pub const MINOR_ED25519_KEY: u8 = 0x01;

// --- Signature family (minor = scheme id) ---
pub const MAJOR_SIGNATURE: u8 = 0x04;
pub const MINOR_ED25519_SIG: u8 = 0x01;

// --- Heuristic family ---
pub const MAJOR_HEURISTIC: u8 = 0x05;
pub const MINOR_RSSI: u8 = 0x01;
pub const MINOR_INDEX: u8 = 0x02;
pub const MINOR_PREVIOUS_HASH: u8 = 0x03;
pub const MINOR_NEXT_PUBLIC_KEY: u8 = 0x04;
pub const MINOR_BRIDGE: u8 = 0x05;

/// Wire type identifier for a hash algorithm.
pub fn hash_type(kind: HashKind) -> (u8, u8) {
    match kind {
        HashKind::Sha256 => (MAJOR_HASH, MINOR_SHA256),
        HashKind::Blake3 => (MAJOR_HASH, MINOR_BLAKE3),
    }
}

/// Wire type identifier for a public key scheme.
pub fn key_type(scheme: SignatureScheme) -> (u8, u8) {
    match scheme {
        SignatureScheme::Ed25519 => (MAJOR_KEY, MINOR_ED25519_KEY),
    }
}

/// Wire type identifier for a signature scheme.
pub fn signature_type(scheme: SignatureScheme) -> (u8, u8) {
    match scheme {
        SignatureScheme::Ed25519 => (MAJOR_SIGNATURE, MINOR_ED25519_SIG),
    }
}

/// The wire type identifier a value serializes under.
pub fn value_type(value: &Value) -> (u8, u8) {
    match value {
        Value::Hash(h) => hash_type(h.algorithm()),
        Value::PublicKey(k) => key_type(k.scheme()),
        Value::Signature(s) => signature_type(s.scheme()),
        Value::Heuristic(h) => match h {
            Heuristic::Rssi(_) => (MAJOR_HEURISTIC, MINOR_RSSI),
            Heuristic::Index(_) => (MAJOR_HEURISTIC, MINOR_INDEX),
            Heuristic::PreviousHash(_) => (MAJOR_HEURISTIC, MINOR_PREVIOUS_HASH),
            Heuristic::NextPublicKey(_) => (MAJOR_HEURISTIC, MINOR_NEXT_PUBLIC_KEY),
            Heuristic::Bridge(_) => (MAJOR_HEURISTIC, MINOR_BRIDGE),
            Heuristic::Custom { major, minor, .. } => (*major, *minor),
        },
        Value::Payload(_) => (MAJOR_STRUCT, MINOR_PAYLOAD),
        Value::BoundWitness(_) => (MAJOR_STRUCT, MINOR_BOUND_WITNESS),
        Value::Transfer(_) => (MAJOR_STRUCT, MINOR_TRANSFER),
        Value::Array(_) => (MAJOR_STRUCT, MINOR_ARRAY),
    }
}

/// Framing for one serialized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Payload bytes only. Valid only inside a parent that knows both the
    /// value's type and its length.
    Raw,
    /// Size prefix + payload. The parent must know the type.
    Untyped,
    /// major + minor + size prefix + payload. Self-describing.
    Typed,
}

/// Width of a value's size prefix.
///
/// Fixed-size values carry no prefix; the payload length is a property of
/// the type. Prefixed values count the prefix itself in the length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePrefix {
    /// No prefix; payload is always exactly this many bytes.
    Fixed(usize),
    U8,
    U16,
    U32,
}

impl SizePrefix {
    /// Width of the prefix in bytes (0, 1, 2 or 4).
    pub fn width(&self) -> usize {
        match self {
            SizePrefix::Fixed(_) => 0,
            SizePrefix::U8 => 1,
            SizePrefix::U16 => 2,
            SizePrefix::U32 => 4,
        }
    }

    /// Total size (prefix + payload) of the value starting at `header`.
    pub fn read_size(&self, header: &[u8]) -> Result<usize, PackError> {
        let width = self.width();
        if header.len() < width {
            return Err(PackError::Malformed(format!(
                "buffer too short for {}-byte size prefix",
                width
            )));
        }
        let total = match self {
            SizePrefix::Fixed(len) => return Ok(*len),
            SizePrefix::U8 => header[0] as usize,
            SizePrefix::U16 => u16::from_be_bytes([header[0], header[1]]) as usize,
            SizePrefix::U32 => {
                u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize
            }
        };
        // The length counts the prefix itself.
        if total < width {
            return Err(PackError::Malformed(format!(
                "size prefix {} smaller than its own width {}",
                total, width
            )));
        }
        Ok(total)
    }

    /// Frame raw payload bytes with this prefix.
    pub fn frame(&self, payload: Vec<u8>) -> Result<Vec<u8>, PackError> {
        match self {
            SizePrefix::Fixed(len) => {
                if payload.len() != *len {
                    return Err(PackError::Malformed(format!(
                        "fixed-size value expects {} bytes, got {}",
                        len,
                        payload.len()
                    )));
                }
                Ok(payload)
            }
            SizePrefix::U8 => {
                let total = payload.len() + 1;
                if total > u8::MAX as usize {
                    return Err(PackError::Malformed("value too large for u8 prefix".into()));
                }
                let mut out = Vec::with_capacity(total);
                out.push(total as u8);
                out.extend_from_slice(&payload);
                Ok(out)
            }
            SizePrefix::U16 => {
                let total = payload.len() + 2;
                if total > u16::MAX as usize {
                    return Err(PackError::Malformed("value too large for u16 prefix".into()));
                }
                let mut out = Vec::with_capacity(total);
                out.extend_from_slice(&(total as u16).to_be_bytes());
                out.extend_from_slice(&payload);
                Ok(out)
            }
            SizePrefix::U32 => {
                let total = payload.len() + 4;
                if total > u32::MAX as usize {
                    return Err(PackError::Malformed("value too large for u32 prefix".into()));
                }
                let mut out = Vec::with_capacity(total);
                out.extend_from_slice(&(total as u32).to_be_bytes());
                out.extend_from_slice(&payload);
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_counts_itself() {
        let framed = SizePrefix::U16.frame(vec![0xaa, 0xbb, 0xcc]).unwrap();
        assert_eq!(framed, vec![0x00, 0x05, 0xaa, 0xbb, 0xcc]);
        assert_eq!(SizePrefix::U16.read_size(&framed).unwrap(), 5);
    }

    #[test]
    fn test_fixed_has_no_prefix() {
        let framed = SizePrefix::Fixed(2).frame(vec![1, 2]).unwrap();
        assert_eq!(framed, vec![1, 2]);
        assert_eq!(SizePrefix::Fixed(2).read_size(&[]).unwrap(), 2);
        assert!(SizePrefix::Fixed(2).frame(vec![1]).is_err());
    }

    #[test]
    fn test_undersized_prefix_rejected() {
        // A u32 prefix claiming 2 total bytes cannot even hold itself.
        let bytes = [0x00, 0x00, 0x00, 0x02];
        assert!(SizePrefix::U32.read_size(&bytes).is_err());
    }

    #[test]
    fn test_short_header_rejected() {
        assert!(SizePrefix::U32.read_size(&[0x00, 0x01]).is_err());
    }
}
