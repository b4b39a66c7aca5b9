//! Bound witness - the co-signed block
//!
//! A bound witness holds three parallel ordered lists, one slot per
//! participant: the participant's key set, its payload, and its signatures
//! (one per key, same order). A completed block must satisfy the internal
//! invariants checked by [`BoundWitness::validate`].

use crate::payload::Payload;
use crate::types::{PublicKey, Signature};
use thiserror::Error;

/// Why a block fails its internal invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockFault {
    #[error("block has no participants")]
    Empty,

    #[error("parallel lists disagree: {keys} key sets, {payloads} payloads, {signatures} signature sets")]
    LengthMismatch {
        keys: usize,
        payloads: usize,
        signatures: usize,
    },

    #[error("participant {participant} has {keys} keys but {signatures} signatures")]
    KeySignatureMismatch {
        participant: usize,
        keys: usize,
        signatures: usize,
    },

    #[error("duplicate public key in block")]
    DuplicateKey,

    #[error("signature {signature} of participant {participant} does not verify")]
    SignatureInvalid {
        participant: usize,
        signature: usize,
    },
}

/// A mutually signed block attesting that peers met and exchanged payloads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundWitness {
    /// Key set per participant, in participant order (initiator first).
    pub public_keys: Vec<Vec<PublicKey>>,
    /// Payload per participant, same order.
    pub payloads: Vec<Payload>,
    /// Signatures per participant, pairwise with that participant's keys.
    pub signatures: Vec<Vec<Signature>>,
}

impl BoundWitness {
    /// Number of participants.
    pub fn participant_count(&self) -> usize {
        self.public_keys.len()
    }

    /// Check the structural invariants: non-empty, parallel list lengths,
    /// per-participant key/signature pairing, key uniqueness across the block.
    pub fn validate_structure(&self) -> Result<(), BlockFault> {
        if self.public_keys.is_empty() {
            return Err(BlockFault::Empty);
        }
        if self.public_keys.len() != self.payloads.len()
            || self.public_keys.len() != self.signatures.len()
        {
            return Err(BlockFault::LengthMismatch {
                keys: self.public_keys.len(),
                payloads: self.payloads.len(),
                signatures: self.signatures.len(),
            });
        }

        for (participant, (keys, sigs)) in
            self.public_keys.iter().zip(&self.signatures).enumerate()
        {
            if keys.len() != sigs.len() || keys.is_empty() {
                return Err(BlockFault::KeySignatureMismatch {
                    participant,
                    keys: keys.len(),
                    signatures: sigs.len(),
                });
            }
        }

        let mut seen: Vec<&PublicKey> = Vec::new();
        for keys in &self.public_keys {
            for key in keys {
                if seen.contains(&key) {
                    return Err(BlockFault::DuplicateKey);
                }
                seen.push(key);
            }
        }

        Ok(())
    }

    /// Check every signature against the canonical signing data.
    ///
    /// Assumes [`validate_structure`](Self::validate_structure) passed.
    pub fn verify_signatures(&self, signing_data: &[u8]) -> Result<(), BlockFault> {
        for (participant, (keys, sigs)) in
            self.public_keys.iter().zip(&self.signatures).enumerate()
        {
            for (i, (key, sig)) in keys.iter().zip(sigs).enumerate() {
                if !key.verify(signing_data, sig) {
                    return Err(BlockFault::SignatureInvalid {
                        participant,
                        signature: i,
                    });
                }
            }
        }
        Ok(())
    }

    /// Check the completed-block invariants against the canonical signing data.
    pub fn validate(&self, signing_data: &[u8]) -> Result<(), BlockFault> {
        self.validate_structure()?;
        self.verify_signatures(signing_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Heuristic;
    use crate::signer::{Ed25519Signer, Signer};

    fn signed_block(signing_data: &[u8]) -> (BoundWitness, Ed25519Signer, Ed25519Signer) {
        let a = Ed25519Signer::generate();
        let b = Ed25519Signer::generate();
        let block = BoundWitness {
            public_keys: vec![vec![a.public_key()], vec![b.public_key()]],
            payloads: vec![
                Payload::new(vec![Heuristic::Index(0)], vec![]),
                Payload::new(vec![Heuristic::Index(0)], vec![]),
            ],
            signatures: vec![vec![a.sign(signing_data)], vec![b.sign(signing_data)]],
        };
        (block, a, b)
    }

    #[test]
    fn test_valid_block() {
        let data = b"canonical signing data";
        let (block, _, _) = signed_block(data);
        assert_eq!(block.participant_count(), 2);
        assert!(block.validate(data).is_ok());
    }

    #[test]
    fn test_tampered_signing_data_fails() {
        let (block, _, _) = signed_block(b"canonical signing data");
        assert!(matches!(
            block.validate(b"different data"),
            Err(BlockFault::SignatureInvalid { participant: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let data = b"data";
        let a = Ed25519Signer::generate();
        let block = BoundWitness {
            public_keys: vec![vec![a.public_key()], vec![a.public_key()]],
            payloads: vec![Payload::default(), Payload::default()],
            signatures: vec![vec![a.sign(data)], vec![a.sign(data)]],
        };
        assert_eq!(block.validate(data), Err(BlockFault::DuplicateKey));
    }

    #[test]
    fn test_parallel_length_mismatch_rejected() {
        let data = b"data";
        let (mut block, _, _) = signed_block(data);
        block.payloads.pop();
        assert!(matches!(
            block.validate(data),
            Err(BlockFault::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_block_rejected() {
        let block = BoundWitness::default();
        assert_eq!(block.validate(b""), Err(BlockFault::Empty));
    }
}
