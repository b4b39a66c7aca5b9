//! Error types for the xyo-net crate

use thiserror::Error;
use xyo_core::{AssemblyError, RepositoryError};
use xyo_packer::PackError;

/// Network layer errors for a bound-witness session.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("peer disconnected")]
    PeerDisconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Frame(String),

    #[error("peer catalogue {0:#010x} does not offer the bound-witness protocol")]
    UnexpectedCatalogue(u32),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Errors surfaced by the connection handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Pack(#[from] PackError),
}
