//! Protocol value - the tagged variant every codec speaks
//!
//! Parsing dispatches through the registry by (major, minor) and lands in
//! one of these variants; heterogeneous lists are `Value::Array`.

use xyo_model::{BoundWitness, Hash, Heuristic, Payload, PublicKey, Signature, Transfer};

/// Any serializable protocol entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Hash(Hash),
    PublicKey(PublicKey),
    Signature(Signature),
    Heuristic(Heuristic),
    Payload(Payload),
    BoundWitness(BoundWitness),
    Transfer(Transfer),
    /// Mixed-type list; children serialize typed.
    Array(Vec<Value>),
}

impl Value {
    /// Short variant name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Hash(_) => "hash",
            Value::PublicKey(_) => "public-key",
            Value::Signature(_) => "signature",
            Value::Heuristic(_) => "heuristic",
            Value::Payload(_) => "payload",
            Value::BoundWitness(_) => "bound-witness",
            Value::Transfer(_) => "transfer",
            Value::Array(_) => "array",
        }
    }
}
