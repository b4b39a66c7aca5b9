//! Codec registry - serialize/deserialize any protocol entity
//!
//! A `Packer` holds one codec per (major, minor) plus a name index. It is
//! populated during startup and read-only afterwards, so sessions share it
//! behind an `Arc` without locking.

use crate::error::PackError;
use crate::schema::{value_type, Framing, SizePrefix};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One (major, minor) wire codec.
///
/// `encode`/`decode` deal in raw payload bytes; framing is the registry's
/// job. Codecs for composite values call back into the packer for their
/// children.
pub trait Codec: Send + Sync {
    fn major(&self) -> u8;
    fn minor(&self) -> u8;
    fn name(&self) -> &'static str;
    fn size_prefix(&self) -> SizePrefix;

    /// Serialize the value's payload (no prefix, no type bytes).
    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError>;

    /// Deserialize from payload bytes (prefix and type bytes stripped).
    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError>;

    /// Total size (prefix + payload) of the value starting at `header`.
    fn read_size(&self, header: &[u8]) -> Result<usize, PackError> {
        self.size_prefix().read_size(header)
    }
}

/// Registry of codecs keyed by (major, minor) and by name.
#[derive(Default)]
pub struct Packer {
    by_type: HashMap<(u8, u8), Arc<dyn Codec>>,
    by_name: HashMap<&'static str, (u8, u8)>,
}

impl Packer {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec. Fails on a duplicate (major, minor).
    pub fn register(&mut self, codec: Arc<dyn Codec>) -> Result<(), PackError> {
        let id = (codec.major(), codec.minor());
        if self.by_type.contains_key(&id) {
            return Err(PackError::DuplicateType {
                major: id.0,
                minor: id.1,
            });
        }
        self.by_name.insert(codec.name(), id);
        self.by_type.insert(id, codec);
        Ok(())
    }

    /// Look up a codec by (major, minor).
    pub fn lookup_by_major_minor(&self, major: u8, minor: u8) -> Option<&Arc<dyn Codec>> {
        self.by_type.get(&(major, minor))
    }

    /// Look up a codec by its registered name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<dyn Codec>> {
        self.by_name.get(name).and_then(|id| self.by_type.get(id))
    }

    fn codec(&self, major: u8, minor: u8) -> Result<&Arc<dyn Codec>, PackError> {
        self.by_type
            .get(&(major, minor))
            .ok_or(PackError::UnknownType { major, minor })
    }

    /// Serialize `value` under the given type identifier and framing.
    pub fn serialize(
        &self,
        value: &Value,
        major: u8,
        minor: u8,
        framing: Framing,
    ) -> Result<Vec<u8>, PackError> {
        let codec = self.codec(major, minor)?;
        let payload = codec.encode(value, self)?;
        match framing {
            Framing::Raw => Ok(payload),
            Framing::Untyped => codec.size_prefix().frame(payload),
            Framing::Typed => {
                let framed = codec.size_prefix().frame(payload)?;
                let mut out = Vec::with_capacity(2 + framed.len());
                out.push(major);
                out.push(minor);
                out.extend_from_slice(&framed);
                Ok(out)
            }
        }
    }

    /// Serialize `value` under the type identifier its variant implies.
    pub fn serialize_value(&self, value: &Value, framing: Framing) -> Result<Vec<u8>, PackError> {
        let (major, minor) = value_type(value);
        self.serialize(value, major, minor, framing)
    }

    /// Deserialize one typed value, requiring the whole buffer be consumed.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value, PackError> {
        let (value, consumed) = self.read_typed(bytes)?;
        if consumed != bytes.len() {
            return Err(PackError::Malformed(format!(
                "{} trailing bytes after typed value",
                bytes.len() - consumed
            )));
        }
        Ok(value)
    }

    /// Deserialize one untyped value of a known type, requiring the whole
    /// buffer be consumed.
    pub fn deserialize_untyped(
        &self,
        bytes: &[u8],
        major: u8,
        minor: u8,
    ) -> Result<Value, PackError> {
        let (value, consumed) = self.read_untyped(bytes, major, minor)?;
        if consumed != bytes.len() {
            return Err(PackError::Malformed(format!(
                "{} trailing bytes after untyped value",
                bytes.len() - consumed
            )));
        }
        Ok(value)
    }

    /// Read one typed value from the front of `bytes`.
    /// Returns the value and the number of bytes consumed.
    pub fn read_typed(&self, bytes: &[u8]) -> Result<(Value, usize), PackError> {
        if bytes.len() < 2 {
            return Err(PackError::Malformed(
                "buffer too short for type identifier".into(),
            ));
        }
        let (major, minor) = (bytes[0], bytes[1]);
        let (value, consumed) = self.read_untyped(&bytes[2..], major, minor)?;
        Ok((value, consumed + 2))
    }

    /// Read one untyped value of a known type from the front of `bytes`.
    /// Returns the value and the number of bytes consumed.
    pub fn read_untyped(
        &self,
        bytes: &[u8],
        major: u8,
        minor: u8,
    ) -> Result<(Value, usize), PackError> {
        let codec = self.codec(major, minor)?;
        let total = codec.read_size(bytes)?;
        if bytes.len() < total {
            return Err(PackError::Malformed(format!(
                "value of {} declares {} bytes but only {} remain",
                codec.name(),
                total,
                bytes.len()
            )));
        }
        let width = codec.size_prefix().width();
        let value = codec.decode(&bytes[width..total], self)?;
        Ok((value, total))
    }
}

impl std::fmt::Debug for Packer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packer")
            .field("codecs", &self.by_type.len())
            .finish()
    }
}
