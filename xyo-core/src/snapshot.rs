//! Chain snapshot - one consistent read of the continuity state

use std::sync::Arc;
use xyo_model::{Hash, PublicKey, Signer};

/// The continuity values a payload is built from, read atomically.
#[derive(Clone)]
pub struct ChainSnapshot {
    /// Index the next block will carry.
    pub index: u64,
    /// Hash of the last committed block, absent at genesis.
    pub previous_hash: Option<Hash>,
    /// Current signers at snapshot time.
    pub signers: Vec<Arc<dyn Signer>>,
    /// Pending next-key commitment, if a rotation is queued.
    pub next_public_key: Option<PublicKey>,
}

impl std::fmt::Debug for ChainSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSnapshot")
            .field("index", &self.index)
            .field("previous_hash", &self.previous_hash)
            .field("signers", &self.signers.len())
            .field("next_public_key", &self.next_public_key)
            .finish()
    }
}
