//! Standard codecs for the protocol schema
//!
//! One codec per (major, minor) row of the schema. Composite codecs call
//! back into the packer for their children; fixed-size leaves carry no
//! size prefix at all.

use crate::error::PackError;
use crate::registry::{Codec, Packer};
use crate::schema::{self, Framing, SizePrefix};
use crate::value::Value;
use xyo_model::{
    BoundWitness, Hash, HashKind, Heuristic, Payload, PublicKey, Signature, SignatureScheme,
    Transfer,
};

fn wrong_value(expected: &str, got: &Value) -> PackError {
    PackError::Malformed(format!("expected {} value, got {}", expected, got.kind_name()))
}

// ---------------------------------------------------------------------------
// Fixed-size leaves: hashes, keys, signatures
// ---------------------------------------------------------------------------

/// Codec for one hash algorithm; payload is the raw digest.
pub struct HashCodec {
    kind: HashKind,
    name: &'static str,
}

impl HashCodec {
    pub fn sha256() -> Self {
        Self {
            kind: HashKind::Sha256,
            name: "sha256-hash",
        }
    }

    pub fn blake3() -> Self {
        Self {
            kind: HashKind::Blake3,
            name: "blake3-hash",
        }
    }
}

impl Codec for HashCodec {
    fn major(&self) -> u8 {
        schema::hash_type(self.kind).0
    }
    fn minor(&self) -> u8 {
        schema::hash_type(self.kind).1
    }
    fn name(&self) -> &'static str {
        self.name
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::Fixed(self.kind.digest_len())
    }

    fn encode(&self, value: &Value, _packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Hash(h) if h.algorithm() == self.kind => Ok(h.as_bytes().to_vec()),
            other => Err(wrong_value(self.name, other)),
        }
    }

    fn decode(&self, payload: &[u8], _packer: &Packer) -> Result<Value, PackError> {
        Ok(Value::Hash(Hash::new(self.kind, payload.to_vec())))
    }
}

/// Codec for Ed25519 public keys; payload is the raw 32-byte key.
pub struct Ed25519KeyCodec;

impl Codec for Ed25519KeyCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_KEY
    }
    fn minor(&self) -> u8 {
        schema::MINOR_ED25519_KEY
    }
    fn name(&self) -> &'static str {
        "ed25519-public-key"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::Fixed(SignatureScheme::Ed25519.public_key_len())
    }

    fn encode(&self, value: &Value, _packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::PublicKey(k) if k.scheme() == SignatureScheme::Ed25519 => {
                Ok(k.as_bytes().to_vec())
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], _packer: &Packer) -> Result<Value, PackError> {
        Ok(Value::PublicKey(PublicKey::new(
            SignatureScheme::Ed25519,
            payload.to_vec(),
        )))
    }
}

/// Codec for Ed25519 signatures; payload is the raw 64-byte signature.
pub struct Ed25519SignatureCodec;

impl Codec for Ed25519SignatureCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_SIGNATURE
    }
    fn minor(&self) -> u8 {
        schema::MINOR_ED25519_SIG
    }
    fn name(&self) -> &'static str {
        "ed25519-signature"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::Fixed(SignatureScheme::Ed25519.signature_len())
    }

    fn encode(&self, value: &Value, _packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Signature(s) if s.scheme() == SignatureScheme::Ed25519 => {
                Ok(s.as_bytes().to_vec())
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], _packer: &Packer) -> Result<Value, PackError> {
        Ok(Value::Signature(Signature::new(
            SignatureScheme::Ed25519,
            payload.to_vec(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Heuristic leaves
// ---------------------------------------------------------------------------

/// Signal strength in dBm, one signed byte.
pub struct RssiCodec;

impl Codec for RssiCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_HEURISTIC
    }
    fn minor(&self) -> u8 {
        schema::MINOR_RSSI
    }
    fn name(&self) -> &'static str {
        "rssi"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::Fixed(1)
    }

    fn encode(&self, value: &Value, _packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Heuristic(Heuristic::Rssi(v)) => Ok(vec![*v as u8]),
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], _packer: &Packer) -> Result<Value, PackError> {
        Ok(Value::Heuristic(Heuristic::Rssi(payload[0] as i8)))
    }
}

/// Chain index, u64 big-endian.
pub struct ChainIndexCodec;

impl Codec for ChainIndexCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_HEURISTIC
    }
    fn minor(&self) -> u8 {
        schema::MINOR_INDEX
    }
    fn name(&self) -> &'static str {
        "chain-index"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::Fixed(8)
    }

    fn encode(&self, value: &Value, _packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Heuristic(Heuristic::Index(i)) => Ok(i.to_be_bytes().to_vec()),
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], _packer: &Packer) -> Result<Value, PackError> {
        let bytes: [u8; 8] = payload
            .try_into()
            .map_err(|_| PackError::Malformed("chain-index payload is not 8 bytes".into()))?;
        Ok(Value::Heuristic(Heuristic::Index(u64::from_be_bytes(bytes))))
    }
}

/// Previous-hash link; payload is one typed hash (algorithm self-described).
pub struct PreviousHashCodec;

impl Codec for PreviousHashCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_HEURISTIC
    }
    fn minor(&self) -> u8 {
        schema::MINOR_PREVIOUS_HASH
    }
    fn name(&self) -> &'static str {
        "previous-hash"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U8
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Heuristic(Heuristic::PreviousHash(h)) => {
                packer.serialize_value(&Value::Hash(h.clone()), Framing::Typed)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        match packer.deserialize(payload)? {
            Value::Hash(h) => Ok(Value::Heuristic(Heuristic::PreviousHash(h))),
            other => Err(wrong_value("hash", &other)),
        }
    }
}

/// Next-public-key commitment; payload is one typed public key.
pub struct NextPublicKeyCodec;

impl Codec for NextPublicKeyCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_HEURISTIC
    }
    fn minor(&self) -> u8 {
        schema::MINOR_NEXT_PUBLIC_KEY
    }
    fn name(&self) -> &'static str {
        "next-public-key"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U8
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Heuristic(Heuristic::NextPublicKey(k)) => {
                packer.serialize_value(&Value::PublicKey(k.clone()), Framing::Typed)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        match packer.deserialize(payload)? {
            Value::PublicKey(k) => Ok(Value::Heuristic(Heuristic::NextPublicKey(k))),
            other => Err(wrong_value("public-key", &other)),
        }
    }
}

/// Bridged block heuristic; payload is one typed bound witness.
pub struct BridgedBlockCodec;

impl Codec for BridgedBlockCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_HEURISTIC
    }
    fn minor(&self) -> u8 {
        schema::MINOR_BRIDGE
    }
    fn name(&self) -> &'static str {
        "bridged-block"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U32
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Heuristic(Heuristic::Bridge(block)) => {
                packer.serialize_value(&Value::BoundWitness((**block).clone()), Framing::Typed)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        match packer.deserialize(payload)? {
            Value::BoundWitness(block) => {
                Ok(Value::Heuristic(Heuristic::Bridge(Box::new(block))))
            }
            other => Err(wrong_value("bound-witness", &other)),
        }
    }
}

/// Extension codec: opaque payload surfacing as `Heuristic::Custom`.
///
/// Registering one of these at an unclaimed (major, minor) is how
/// applications extend the heuristic vocabulary without touching the core.
pub struct OpaqueHeuristicCodec {
    pub major: u8,
    pub minor: u8,
    pub name: &'static str,
}

impl Codec for OpaqueHeuristicCodec {
    fn major(&self) -> u8 {
        self.major
    }
    fn minor(&self) -> u8 {
        self.minor
    }
    fn name(&self) -> &'static str {
        self.name
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U16
    }

    fn encode(&self, value: &Value, _packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Heuristic(Heuristic::Custom { major, minor, bytes })
                if *major == self.major && *minor == self.minor =>
            {
                Ok(bytes.clone())
            }
            other => Err(wrong_value(self.name, other)),
        }
    }

    fn decode(&self, payload: &[u8], _packer: &Packer) -> Result<Value, PackError> {
        Ok(Value::Heuristic(Heuristic::Custom {
            major: self.major,
            minor: self.minor,
            bytes: payload.to_vec(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Composites: array, payload, transfer, bound witness
// ---------------------------------------------------------------------------

/// Mixed-type array; payload is a concatenation of typed children.
pub struct ArrayCodec;

impl Codec for ArrayCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_STRUCT
    }
    fn minor(&self) -> u8 {
        schema::MINOR_ARRAY
    }
    fn name(&self) -> &'static str {
        "array"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U32
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Array(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(packer.serialize_value(item, Framing::Typed)?);
                }
                Ok(out)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        let mut items = Vec::new();
        let mut offset = 0;
        while offset < payload.len() {
            let (item, consumed) = packer.read_typed(&payload[offset..])?;
            items.push(item);
            offset += consumed;
        }
        Ok(Value::Array(items))
    }
}

fn encode_heuristic_list(heuristics: &[Heuristic], packer: &Packer) -> Result<Vec<u8>, PackError> {
    let items = heuristics
        .iter()
        .map(|h| Value::Heuristic(h.clone()))
        .collect();
    packer.serialize(
        &Value::Array(items),
        schema::MAJOR_STRUCT,
        schema::MINOR_ARRAY,
        Framing::Untyped,
    )
}

fn decode_array_at(
    payload: &[u8],
    offset: &mut usize,
    packer: &Packer,
) -> Result<Vec<Value>, PackError> {
    let (value, consumed) = packer.read_untyped(
        &payload[*offset..],
        schema::MAJOR_STRUCT,
        schema::MINOR_ARRAY,
    )?;
    *offset += consumed;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(wrong_value("array", &other)),
    }
}

fn heuristics_from(items: Vec<Value>) -> Result<Vec<Heuristic>, PackError> {
    items
        .into_iter()
        .map(|v| match v {
            Value::Heuristic(h) => Ok(h),
            other => Err(wrong_value("heuristic", &other)),
        })
        .collect()
}

/// Payload; two untyped heuristic arrays: signed, then unsigned.
pub struct PayloadCodec;

impl Codec for PayloadCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_STRUCT
    }
    fn minor(&self) -> u8 {
        schema::MINOR_PAYLOAD
    }
    fn name(&self) -> &'static str {
        "payload"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U32
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Payload(p) => {
                let mut out = encode_heuristic_list(&p.signed_heuristics, packer)?;
                out.extend(encode_heuristic_list(&p.unsigned_heuristics, packer)?);
                Ok(out)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        let mut offset = 0;
        let signed = heuristics_from(decode_array_at(payload, &mut offset, packer)?)?;
        let unsigned = heuristics_from(decode_array_at(payload, &mut offset, packer)?)?;
        if offset != payload.len() {
            return Err(PackError::Malformed("trailing bytes in payload".into()));
        }
        Ok(Value::Payload(Payload::new(signed, unsigned)))
    }
}

fn encode_key_sets(key_sets: &[Vec<PublicKey>], packer: &Packer) -> Result<Vec<u8>, PackError> {
    let sets = key_sets
        .iter()
        .map(|keys| Value::Array(keys.iter().cloned().map(Value::PublicKey).collect()))
        .collect();
    packer.serialize(
        &Value::Array(sets),
        schema::MAJOR_STRUCT,
        schema::MINOR_ARRAY,
        Framing::Untyped,
    )
}

fn encode_payload_list(payloads: &[Payload], packer: &Packer) -> Result<Vec<u8>, PackError> {
    let items = payloads.iter().cloned().map(Value::Payload).collect();
    packer.serialize(
        &Value::Array(items),
        schema::MAJOR_STRUCT,
        schema::MINOR_ARRAY,
        Framing::Untyped,
    )
}

fn encode_signature_sets(
    signature_sets: &[Vec<Signature>],
    packer: &Packer,
) -> Result<Vec<u8>, PackError> {
    let sets = signature_sets
        .iter()
        .map(|sigs| Value::Array(sigs.iter().cloned().map(Value::Signature).collect()))
        .collect();
    packer.serialize(
        &Value::Array(sets),
        schema::MAJOR_STRUCT,
        schema::MINOR_ARRAY,
        Framing::Untyped,
    )
}

fn key_sets_from(items: Vec<Value>) -> Result<Vec<Vec<PublicKey>>, PackError> {
    items
        .into_iter()
        .map(|set| match set {
            Value::Array(keys) => keys
                .into_iter()
                .map(|k| match k {
                    Value::PublicKey(key) => Ok(key),
                    other => Err(wrong_value("public-key", &other)),
                })
                .collect(),
            other => Err(wrong_value("array", &other)),
        })
        .collect()
}

fn payloads_from(items: Vec<Value>) -> Result<Vec<Payload>, PackError> {
    items
        .into_iter()
        .map(|v| match v {
            Value::Payload(p) => Ok(p),
            other => Err(wrong_value("payload", &other)),
        })
        .collect()
}

fn signature_sets_from(items: Vec<Value>) -> Result<Vec<Vec<Signature>>, PackError> {
    items
        .into_iter()
        .map(|set| match set {
            Value::Array(sigs) => sigs
                .into_iter()
                .map(|s| match s {
                    Value::Signature(sig) => Ok(sig),
                    other => Err(wrong_value("signature", &other)),
                })
                .collect(),
            other => Err(wrong_value("array", &other)),
        })
        .collect()
}

/// Zig-zag transfer; three untyped arrays: key sets, payloads, signature sets.
pub struct TransferCodec;

impl Codec for TransferCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_STRUCT
    }
    fn minor(&self) -> u8 {
        schema::MINOR_TRANSFER
    }
    fn name(&self) -> &'static str {
        "witness-transfer"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U32
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::Transfer(t) => {
                let mut out = encode_key_sets(&t.public_keys, packer)?;
                out.extend(encode_payload_list(&t.payloads, packer)?);
                out.extend(encode_signature_sets(&t.signatures, packer)?);
                Ok(out)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        let mut offset = 0;
        let public_keys = key_sets_from(decode_array_at(payload, &mut offset, packer)?)?;
        let payloads = payloads_from(decode_array_at(payload, &mut offset, packer)?)?;
        let signatures = signature_sets_from(decode_array_at(payload, &mut offset, packer)?)?;
        if offset != payload.len() {
            return Err(PackError::Malformed("trailing bytes in transfer".into()));
        }
        Ok(Value::Transfer(Transfer {
            public_keys,
            payloads,
            signatures,
        }))
    }
}

/// Bound witness; same three untyped arrays as a transfer.
pub struct BoundWitnessCodec;

impl Codec for BoundWitnessCodec {
    fn major(&self) -> u8 {
        schema::MAJOR_STRUCT
    }
    fn minor(&self) -> u8 {
        schema::MINOR_BOUND_WITNESS
    }
    fn name(&self) -> &'static str {
        "bound-witness"
    }
    fn size_prefix(&self) -> SizePrefix {
        SizePrefix::U32
    }

    fn encode(&self, value: &Value, packer: &Packer) -> Result<Vec<u8>, PackError> {
        match value {
            Value::BoundWitness(b) => {
                let mut out = encode_key_sets(&b.public_keys, packer)?;
                out.extend(encode_payload_list(&b.payloads, packer)?);
                out.extend(encode_signature_sets(&b.signatures, packer)?);
                Ok(out)
            }
            other => Err(wrong_value(self.name(), other)),
        }
    }

    fn decode(&self, payload: &[u8], packer: &Packer) -> Result<Value, PackError> {
        let mut offset = 0;
        let public_keys = key_sets_from(decode_array_at(payload, &mut offset, packer)?)?;
        let payloads = payloads_from(decode_array_at(payload, &mut offset, packer)?)?;
        let signatures = signature_sets_from(decode_array_at(payload, &mut offset, packer)?)?;
        if offset != payload.len() {
            return Err(PackError::Malformed(
                "trailing bytes in bound witness".into(),
            ));
        }
        Ok(Value::BoundWitness(BoundWitness {
            public_keys,
            payloads,
            signatures,
        }))
    }
}
