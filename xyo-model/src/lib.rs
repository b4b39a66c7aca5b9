//! XYO Model
//!
//! Pure data types and crypto capability traits for the XYO origin-chain
//! engine, decoupled from the wire codec, network stack, and chain state:
//! - **Hash / PublicKey / Signature**: algorithm-tagged byte strings
//! - **HashProvider**: hashing capability (BLAKE3, SHA-256)
//! - **Signer**: signing capability owning Ed25519 key material
//! - **Heuristic**: typed datum carried inside a payload
//! - **Payload**: one participant's signed/unsigned heuristic lists
//! - **BoundWitness**: the co-signed block and its internal invariants

pub mod bound_witness;
pub mod crypto;
pub mod heuristic;
pub mod payload;
pub mod signer;
pub mod transfer;
pub mod types;

pub use bound_witness::{BlockFault, BoundWitness};
pub use crypto::{Blake3Provider, HashProvider, Sha256Provider};
pub use heuristic::Heuristic;
pub use payload::Payload;
pub use signer::{Ed25519Signer, Signer, SignerError};
pub use transfer::Transfer;
pub use types::{Hash, HashKind, PublicKey, Signature, SignatureScheme};
