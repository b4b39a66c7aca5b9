//! Payload - one participant's contribution to a bound witness
//!
//! A payload is two ordered heuristic lists: the signed list is covered by
//! the participant's signatures, the unsigned list is free-form metadata.

use crate::heuristic::Heuristic;
use crate::types::{Hash, PublicKey};

/// One peer's heuristics for a single bound witness.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload {
    /// Heuristics covered by the signature.
    pub signed_heuristics: Vec<Heuristic>,
    /// Metadata outside the signed region.
    pub unsigned_heuristics: Vec<Heuristic>,
}

impl Payload {
    /// Create a payload from its signed and unsigned heuristic lists.
    pub fn new(signed_heuristics: Vec<Heuristic>, unsigned_heuristics: Vec<Heuristic>) -> Self {
        Self {
            signed_heuristics,
            unsigned_heuristics,
        }
    }

    /// The chain index declared in the signed heuristics, if any.
    pub fn index(&self) -> Option<u64> {
        self.signed_heuristics.iter().find_map(|h| match h {
            Heuristic::Index(i) => Some(*i),
            _ => None,
        })
    }

    /// The previous-hash link declared in the signed heuristics, if any.
    pub fn previous_hash(&self) -> Option<&Hash> {
        self.signed_heuristics.iter().find_map(|h| match h {
            Heuristic::PreviousHash(hash) => Some(hash),
            _ => None,
        })
    }

    /// The next-public-key commitment declared in the signed heuristics, if any.
    pub fn next_public_key(&self) -> Option<&PublicKey> {
        self.signed_heuristics.iter().find_map(|h| match h {
            Heuristic::NextPublicKey(key) => Some(key),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HashKind;

    #[test]
    fn test_linkage_accessors() {
        let prev = Hash::new(HashKind::Blake3, vec![3; 32]);
        let payload = Payload::new(
            vec![
                Heuristic::Index(4),
                Heuristic::PreviousHash(prev.clone()),
                Heuristic::Rssi(-40),
            ],
            vec![],
        );
        assert_eq!(payload.index(), Some(4));
        assert_eq!(payload.previous_hash(), Some(&prev));
        assert_eq!(payload.next_public_key(), None);
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::default();
        assert_eq!(payload.index(), None);
        assert_eq!(payload.previous_hash(), None);
    }
}
