//! Chain verifier - validate a sequence of blocks from one origin
//!
//! Given an ordered list of blocks claimed to be the tail of one peer's
//! origin chain, check every block's internal invariants and the linkage
//! rules between consecutive blocks. Failures come back as a structured
//! report, never as an error in normal flow.

use crate::signing::signing_data;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use xyo_model::{
    Blake3Provider, BlockFault, BoundWitness, HashKind, HashProvider, PublicKey, Sha256Provider,
};
use xyo_packer::{Framing, Packer, Value};

/// Which participant of each block is the chain's owner.
#[derive(Debug, Clone)]
pub enum Party {
    /// Fixed participant slot in every block.
    Position(usize),
    /// The owner's key in the earliest supplied block; later blocks are
    /// tracked through key rotation.
    GenesisKey(PublicKey),
}

/// Why a chain failed verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainFault {
    #[error("block violates internal invariants: {0}")]
    MalformedBlock(BlockFault),

    #[error("block does not serialize: {0}")]
    Unserializable(String),

    #[error("party not present in block")]
    PartyMissing,

    #[error("party's signed heuristics carry no chain index")]
    MissingIndex,

    #[error("chain index {found} where {expected} was required")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("party's signed heuristics carry no previous-hash link")]
    MissingPreviousHash,

    #[error("previous-hash link does not match the preceding block")]
    PreviousHashMismatch,

    #[error("no hash provider registered for {0:?}")]
    UnsupportedHashAlgorithm(HashKind),

    #[error("committed next public key absent from the following block")]
    NextKeyUnfulfilled,

    #[error("block signature failed verification")]
    SignatureInvalid,
}

/// Outcome of verifying a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    pub is_valid: bool,
    /// Index into the supplied block list where verification failed.
    pub first_invalid_index: Option<usize>,
    pub fault: Option<ChainFault>,
}

impl ChainReport {
    fn valid() -> Self {
        Self {
            is_valid: true,
            first_invalid_index: None,
            fault: None,
        }
    }

    fn invalid(index: usize, fault: ChainFault) -> Self {
        Self {
            is_valid: false,
            first_invalid_index: Some(index),
            fault: Some(fault),
        }
    }
}

/// Validates origin-chain linkage over a block sequence.
pub struct ChainVerifier {
    packer: Arc<Packer>,
    hashers: HashMap<HashKind, Arc<dyn HashProvider>>,
}

impl ChainVerifier {
    /// A verifier with the standard hash providers registered.
    pub fn new(packer: Arc<Packer>) -> Self {
        let mut hashers: HashMap<HashKind, Arc<dyn HashProvider>> = HashMap::new();
        hashers.insert(HashKind::Blake3, Arc::new(Blake3Provider));
        hashers.insert(HashKind::Sha256, Arc::new(Sha256Provider));
        Self { packer, hashers }
    }

    /// Register an additional hash provider.
    pub fn with_provider(mut self, provider: Arc<dyn HashProvider>) -> Self {
        self.hashers.insert(provider.kind(), provider);
        self
    }

    /// Verify `blocks` as a consecutive run of one party's origin chain.
    ///
    /// The first supplied block anchors the expected index; each following
    /// block must increment it, link back by hash, and honor any next-key
    /// commitment the preceding block made.
    pub fn verify(&self, blocks: &[BoundWitness], party: &Party) -> ChainReport {
        let mut expected_index: Option<u64> = None;
        let mut previous: Option<(&BoundWitness, usize)> = None;

        for (k, block) in blocks.iter().enumerate() {
            // Internal invariants first: structure, then (later) signatures.
            if let Err(fault) = block.validate_structure() {
                return ChainReport::invalid(k, ChainFault::MalformedBlock(fault));
            }

            let slot = match self.resolve_slot(block, party, previous) {
                Some(slot) => slot,
                None => return ChainReport::invalid(k, ChainFault::PartyMissing),
            };
            let payload = &block.payloads[slot];

            // Chain index: anchored by the first block, incrementing by one.
            let Some(found) = payload.index() else {
                return ChainReport::invalid(k, ChainFault::MissingIndex);
            };
            let expected = expected_index.unwrap_or(found);
            if found != expected {
                return ChainReport::invalid(k, ChainFault::IndexMismatch { expected, found });
            }
            expected_index = Some(expected + 1);

            if let Some((prev_block, prev_slot)) = previous {
                // Previous-hash link, using the algorithm the link declares.
                let Some(link) = payload.previous_hash() else {
                    return ChainReport::invalid(k, ChainFault::MissingPreviousHash);
                };
                let Some(hasher) = self.hashers.get(&link.algorithm()) else {
                    return ChainReport::invalid(
                        k,
                        ChainFault::UnsupportedHashAlgorithm(link.algorithm()),
                    );
                };
                let prev_bytes = match self
                    .packer
                    .serialize_value(&Value::BoundWitness(prev_block.clone()), Framing::Typed)
                {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        return ChainReport::invalid(k - 1, ChainFault::Unserializable(e.to_string()))
                    }
                };
                if hasher.hash(&prev_bytes) != *link {
                    return ChainReport::invalid(k, ChainFault::PreviousHashMismatch);
                }

                // Next-key commitment made by the previous block.
                if let Some(committed) = prev_block.payloads[prev_slot].next_public_key() {
                    if !block.public_keys[slot].contains(committed) {
                        return ChainReport::invalid(k, ChainFault::NextKeyUnfulfilled);
                    }
                }
            }

            // Signatures last, over the recomputed canonical data.
            let data = match signing_data(&self.packer, &block.public_keys, &block.payloads) {
                Ok(data) => data,
                Err(e) => return ChainReport::invalid(k, ChainFault::Unserializable(e.to_string())),
            };
            if block.verify_signatures(&data).is_err() {
                return ChainReport::invalid(k, ChainFault::SignatureInvalid);
            }

            previous = Some((block, slot));
        }

        ChainReport::valid()
    }

    /// Find the party's participant slot in `block`.
    fn resolve_slot(
        &self,
        block: &BoundWitness,
        party: &Party,
        previous: Option<(&BoundWitness, usize)>,
    ) -> Option<usize> {
        match party {
            Party::Position(slot) => {
                if *slot < block.public_keys.len() {
                    Some(*slot)
                } else {
                    None
                }
            }
            Party::GenesisKey(genesis) => {
                // Expected keys: the party's keys in the previous block plus
                // any committed next key; at the first block, the genesis key.
                let mut expected: Vec<&PublicKey> = Vec::new();
                match previous {
                    None => expected.push(genesis),
                    Some((prev_block, prev_slot)) => {
                        expected.extend(prev_block.public_keys[prev_slot].iter());
                        if let Some(next) = prev_block.payloads[prev_slot].next_public_key() {
                            expected.push(next);
                        }
                    }
                }
                block
                    .public_keys
                    .iter()
                    .position(|keys| keys.iter().any(|key| expected.contains(&key)))
            }
        }
    }
}
