//! XYO Packer
//!
//! The self-describing, length-prefixed binary format for every protocol
//! entity:
//! - **Schema**: (major, minor) type identifiers, big-endian size prefixes
//!   that count themselves
//! - **Value**: tagged variant covering every serializable entity
//! - **Codec**: per-type serializer registered in the `Packer`
//! - **Packer**: registry keyed by (major, minor) and by name; typed,
//!   untyped, and raw framings
//!
//! A packer is populated during startup (`Packer::standard()` installs the
//! protocol schema) and read-only afterwards; share it via `Arc`.

pub mod codecs;
pub mod error;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::PackError;
pub use registry::{Codec, Packer};
pub use schema::{Framing, SizePrefix};
pub use value::Value;

use std::sync::Arc;

impl Packer {
    /// A packer with the standard protocol schema registered.
    pub fn standard() -> Self {
        let mut packer = Packer::new();
        let codecs: Vec<Arc<dyn Codec>> = vec![
            Arc::new(codecs::BoundWitnessCodec),
            Arc::new(codecs::TransferCodec),
            Arc::new(codecs::PayloadCodec),
            Arc::new(codecs::ArrayCodec),
            Arc::new(codecs::HashCodec::sha256()),
            Arc::new(codecs::HashCodec::blake3()),
            Arc::new(codecs::Ed25519KeyCodec),
            Arc::new(codecs::Ed25519SignatureCodec),
            Arc::new(codecs::RssiCodec),
            Arc::new(codecs::ChainIndexCodec),
            Arc::new(codecs::PreviousHashCodec),
            Arc::new(codecs::NextPublicKeyCodec),
            Arc::new(codecs::BridgedBlockCodec),
        ];
        for codec in codecs {
            packer
                .register(codec)
                .expect("standard schema type ids are unique");
        }
        packer
    }
}
