//! Origin-chain state repository
//!
//! Holds one peer's chain continuity values and advances them when a block
//! commits. The repository is the sole writer of this state; every other
//! component reads snapshots. Backends may be persistent, so the interface
//! is async; the in-memory implementation guards its state with a mutex,
//! which gives the single-writer ordering the engine relies on.

use crate::snapshot::ChainSnapshot;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use xyo_model::{Hash, PublicKey, Signer};

/// Errors from origin-chain state operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("no rotatable signers: only the genesis signer remains")]
    NoRotatableSigners,

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// One peer's origin-chain continuity state.
#[async_trait]
pub trait OriginChainRepository: Send + Sync {
    /// The pending block's index (number of blocks already committed).
    async fn get_index(&self) -> Result<u64, RepositoryError>;

    /// Hash of the most recently committed block; `None` only at genesis.
    async fn get_previous_hash(&self) -> Result<Option<Hash>, RepositoryError>;

    /// Copy of the current signers at call time.
    async fn get_signers(&self) -> Result<Vec<Arc<dyn Signer>>, RepositoryError>;

    /// Copy of the queued signer additions.
    async fn get_waiting_signers(&self) -> Result<Vec<Arc<dyn Signer>>, RepositoryError>;

    /// The genesis signer, i.e. the first current signer, if any.
    async fn get_genesis_signer(&self) -> Result<Option<Arc<dyn Signer>>, RepositoryError>;

    /// The key committed to sign the next block, if a commitment is pending.
    async fn get_next_public_key(&self) -> Result<Option<PublicKey>, RepositoryError>;

    /// One consistent read of (index, previous hash, signers, next key).
    async fn snapshot(&self) -> Result<ChainSnapshot, RepositoryError>;

    /// Queue a signer; it joins the current set when the next block commits.
    /// Records the signer's key as the next-public-key commitment.
    async fn add_signer(&self, signer: Arc<dyn Signer>) -> Result<(), RepositoryError>;

    /// Drop the oldest non-genesis current signer.
    /// The genesis signer is never removed.
    async fn remove_oldest_signer(&self) -> Result<(), RepositoryError>;

    /// Replace the current signers wholesale (recovery/bootstrap).
    /// Waiting signers and any pending next-key commitment are untouched.
    async fn set_current_signers(
        &self,
        signers: Vec<Arc<dyn Signer>>,
    ) -> Result<(), RepositoryError>;

    /// Commit a block: record its hash, advance the index, promote one
    /// waiting signer, and clear the next-key commitment.
    async fn update_origin_chain_state(&self, hash: Hash) -> Result<(), RepositoryError>;
}

#[derive(Default)]
struct ChainState {
    index: u64,
    previous_hash: Option<Hash>,
    current_signers: VecDeque<Arc<dyn Signer>>,
    waiting_signers: VecDeque<Arc<dyn Signer>>,
    next_public_key: Option<PublicKey>,
}

/// In-memory repository backend.
pub struct MemoryChainRepository {
    state: Mutex<ChainState>,
}

impl MemoryChainRepository {
    /// A fresh chain at genesis with the given initial signers.
    pub fn new(signers: Vec<Arc<dyn Signer>>) -> Self {
        Self {
            state: Mutex::new(ChainState {
                current_signers: signers.into(),
                ..ChainState::default()
            }),
        }
    }
}

#[async_trait]
impl OriginChainRepository for MemoryChainRepository {
    async fn get_index(&self) -> Result<u64, RepositoryError> {
        Ok(self.state.lock().await.index)
    }

    async fn get_previous_hash(&self) -> Result<Option<Hash>, RepositoryError> {
        Ok(self.state.lock().await.previous_hash.clone())
    }

    async fn get_signers(&self) -> Result<Vec<Arc<dyn Signer>>, RepositoryError> {
        Ok(self.state.lock().await.current_signers.iter().cloned().collect())
    }

    async fn get_waiting_signers(&self) -> Result<Vec<Arc<dyn Signer>>, RepositoryError> {
        Ok(self.state.lock().await.waiting_signers.iter().cloned().collect())
    }

    async fn get_genesis_signer(&self) -> Result<Option<Arc<dyn Signer>>, RepositoryError> {
        Ok(self.state.lock().await.current_signers.front().cloned())
    }

    async fn get_next_public_key(&self) -> Result<Option<PublicKey>, RepositoryError> {
        Ok(self.state.lock().await.next_public_key.clone())
    }

    async fn snapshot(&self) -> Result<ChainSnapshot, RepositoryError> {
        let state = self.state.lock().await;
        Ok(ChainSnapshot {
            index: state.index,
            previous_hash: state.previous_hash.clone(),
            signers: state.current_signers.iter().cloned().collect(),
            next_public_key: state.next_public_key.clone(),
        })
    }

    async fn add_signer(&self, signer: Arc<dyn Signer>) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.next_public_key = Some(signer.public_key());
        state.waiting_signers.push_back(signer);
        Ok(())
    }

    async fn remove_oldest_signer(&self) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        // current_signers[0] is the genesis signer; rotation starts behind it.
        if state.current_signers.len() < 2 {
            return Err(RepositoryError::NoRotatableSigners);
        }
        state.current_signers.remove(1);
        Ok(())
    }

    async fn set_current_signers(
        &self,
        signers: Vec<Arc<dyn Signer>>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.current_signers = signers.into();
        Ok(())
    }

    async fn update_origin_chain_state(&self, hash: Hash) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        debug!(index = state.index, block_hash = %hash, "advancing origin chain");
        state.previous_hash = Some(hash);
        state.index += 1;
        if let Some(promoted) = state.waiting_signers.pop_front() {
            state.current_signers.push_back(promoted);
        }
        state.next_public_key = None;
        Ok(())
    }
}
