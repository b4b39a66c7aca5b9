//! Heuristics - typed data items carried inside a payload
//!
//! A heuristic is one datum about an encounter: a radio signal strength, the
//! position of the block in its author's chain, the hash link to the previous
//! block, or a commitment to the key that will sign the next one. New kinds
//! are added by registering a codec for their type identifier; values of
//! unknown-but-registered kinds surface as [`Heuristic::Custom`].

use crate::bound_witness::BoundWitness;
use crate::types::{Hash, PublicKey};

/// A typed serializable datum placed inside a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Heuristic {
    /// Received signal strength of the encounter, in dBm.
    Rssi(i8),
    /// Position of this block in its author's origin chain.
    Index(u64),
    /// Hash of the author's previous block.
    PreviousHash(Hash),
    /// Commitment: the author's next block will be signed by this key.
    NextPublicKey(PublicKey),
    /// An embedded bound witness carried on behalf of another chain.
    Bridge(Box<BoundWitness>),
    /// An extension heuristic the core does not interpret.
    Custom { major: u8, minor: u8, bytes: Vec<u8> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HashKind;

    #[test]
    fn test_heuristic_equality() {
        assert_eq!(Heuristic::Rssi(-5), Heuristic::Rssi(-5));
        assert_ne!(Heuristic::Index(0), Heuristic::Index(1));
        let h = Hash::new(HashKind::Blake3, vec![7; 32]);
        assert_eq!(
            Heuristic::PreviousHash(h.clone()),
            Heuristic::PreviousHash(h)
        );
    }
}
