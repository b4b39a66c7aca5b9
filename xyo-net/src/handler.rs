//! Connection handler - glue from pipe to committed chain state
//!
//! On a new peer session the handler reads the chain snapshot, builds the
//! local payload, runs the driver, and on success hashes the block,
//! notifies the listeners, and advances the repository, strictly in that
//! order. On any failure the repository is untouched.

use crate::driver::InteractionDriver;
use crate::error::HandlerError;
use crate::pipe::Pipe;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use xyo_core::{ChainSnapshot, OriginChainRepository, ZigZagAssembler};
use xyo_model::{Blake3Provider, BoundWitness, HashProvider, Heuristic, Payload};
use xyo_packer::{Framing, Packer, Value};

/// Notified after each successfully assembled block, before the repository
/// advances.
#[async_trait]
pub trait SuccessListener: Send + Sync {
    async fn on_bound_witness_success(&self, block: &BoundWitness);
}

/// Builds the local payload for the next block from a chain snapshot.
pub trait PayloadProvider: Send + Sync {
    fn payload(&self, snapshot: &ChainSnapshot) -> Payload;
}

/// Standard payload provider: chain continuity heuristics plus whatever
/// extra heuristics the application supplies.
#[derive(Default)]
pub struct ChainStatePayloadProvider {
    extra_signed: Vec<Heuristic>,
    extra_unsigned: Vec<Heuristic>,
}

impl ChainStatePayloadProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an application heuristic to the signed list.
    pub fn with_signed(mut self, heuristic: Heuristic) -> Self {
        self.extra_signed.push(heuristic);
        self
    }

    /// Add an application heuristic to the unsigned list.
    pub fn with_unsigned(mut self, heuristic: Heuristic) -> Self {
        self.extra_unsigned.push(heuristic);
        self
    }
}

impl PayloadProvider for ChainStatePayloadProvider {
    fn payload(&self, snapshot: &ChainSnapshot) -> Payload {
        let mut signed = vec![Heuristic::Index(snapshot.index)];
        if let Some(previous) = &snapshot.previous_hash {
            signed.push(Heuristic::PreviousHash(previous.clone()));
        }
        if let Some(next) = &snapshot.next_public_key {
            signed.push(Heuristic::NextPublicKey(next.clone()));
        }
        signed.extend(self.extra_signed.iter().cloned());
        Payload::new(signed, self.extra_unsigned.clone())
    }
}

/// Runs bound-witness sessions against one origin chain.
pub struct BoundWitnessHandler {
    packer: Arc<Packer>,
    repository: Arc<dyn OriginChainRepository>,
    hasher: Arc<dyn HashProvider>,
    payload_provider: Arc<dyn PayloadProvider>,
    listeners: Vec<Arc<dyn SuccessListener>>,
}

impl BoundWitnessHandler {
    pub fn builder(repository: Arc<dyn OriginChainRepository>) -> HandlerBuilder {
        HandlerBuilder {
            packer: None,
            repository,
            hasher: None,
            payload_provider: None,
            listeners: Vec::new(),
        }
    }

    /// Run one session over `pipe` and, on success, commit the block.
    pub async fn handle<P: Pipe>(&self, pipe: P) -> Result<BoundWitness, HandlerError> {
        let snapshot = self.repository.snapshot().await?;
        let payload = self.payload_provider.payload(&snapshot);
        let mut assembler =
            ZigZagAssembler::new(self.packer.clone(), snapshot.signers.clone(), payload);

        let mut driver = InteractionDriver::new(pipe, self.packer.clone());
        let block = match driver.run(&mut assembler).await {
            Ok(block) => block,
            Err(e) => {
                warn!(error = %e, "bound-witness session failed");
                return Err(e.into());
            }
        };

        let bytes = self
            .packer
            .serialize_value(&Value::BoundWitness(block.clone()), Framing::Typed)?;
        let hash = self.hasher.hash(&bytes);

        for listener in &self.listeners {
            listener.on_bound_witness_success(&block).await;
        }
        self.repository.update_origin_chain_state(hash.clone()).await?;
        info!(index = snapshot.index, block_hash = %hash, "bound witness committed");

        Ok(block)
    }
}

/// Assembles a [`BoundWitnessHandler`].
pub struct HandlerBuilder {
    packer: Option<Arc<Packer>>,
    repository: Arc<dyn OriginChainRepository>,
    hasher: Option<Arc<dyn HashProvider>>,
    payload_provider: Option<Arc<dyn PayloadProvider>>,
    listeners: Vec<Arc<dyn SuccessListener>>,
}

impl HandlerBuilder {
    pub fn with_packer(mut self, packer: Arc<Packer>) -> Self {
        self.packer = Some(packer);
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn HashProvider>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn with_payload_provider(mut self, provider: Arc<dyn PayloadProvider>) -> Self {
        self.payload_provider = Some(provider);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn SuccessListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> BoundWitnessHandler {
        BoundWitnessHandler {
            packer: self.packer.unwrap_or_else(|| Arc::new(Packer::standard())),
            repository: self.repository,
            hasher: self.hasher.unwrap_or_else(|| Arc::new(Blake3Provider)),
            payload_provider: self
                .payload_provider
                .unwrap_or_else(|| Arc::new(ChainStatePayloadProvider::new())),
            listeners: self.listeners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xyo_model::HashKind;

    #[test]
    fn test_payload_provider_builds_continuity_heuristics() {
        let provider = ChainStatePayloadProvider::new().with_signed(Heuristic::Rssi(-20));
        let hash = xyo_model::Blake3Provider.hash(b"prev");
        let snapshot = ChainSnapshot {
            index: 3,
            previous_hash: Some(hash.clone()),
            signers: vec![],
            next_public_key: None,
        };
        let payload = provider.payload(&snapshot);
        assert_eq!(payload.index(), Some(3));
        assert_eq!(payload.previous_hash(), Some(&hash));
        assert_eq!(payload.previous_hash().map(|h| h.algorithm()), Some(HashKind::Blake3));
        assert!(payload
            .signed_heuristics
            .contains(&Heuristic::Rssi(-20)));
    }

    #[test]
    fn test_genesis_payload_has_no_previous_hash() {
        let provider = ChainStatePayloadProvider::new();
        let snapshot = ChainSnapshot {
            index: 0,
            previous_hash: None,
            signers: vec![],
            next_public_key: None,
        };
        let payload = provider.payload(&snapshot);
        assert_eq!(payload.index(), Some(0));
        assert_eq!(payload.previous_hash(), None);
    }
}
