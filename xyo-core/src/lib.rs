//! XYO Core
//!
//! The origin-chain protocol engine:
//! - **OriginChainRepository**: one peer's continuity state (index,
//!   previous hash, signer rotation, next-key commitment)
//! - **ZigZagAssembler**: the three-message bound-witness state machine
//! - **ChainVerifier**: linkage validation over a block sequence
//! - **Signing data**: the canonical bytes both peers co-sign
//! - **Bridged blocks**: extraction of embedded blocks from a carrier

pub mod assembler;
pub mod bridge;
pub mod repository;
pub mod signing;
pub mod snapshot;
pub mod verifier;

pub use assembler::{AssemblyError, Phase, ZigZagAssembler};
pub use bridge::extract_bridged_blocks;
pub use repository::{MemoryChainRepository, OriginChainRepository, RepositoryError};
pub use signing::signing_data;
pub use snapshot::ChainSnapshot;
pub use verifier::{ChainFault, ChainReport, ChainVerifier, Party};
