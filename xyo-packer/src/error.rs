//! Error types for the xyo-packer crate

use thiserror::Error;

/// Wire codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("unknown type ({major:#04x}, {minor:#04x})")]
    UnknownType { major: u8, minor: u8 },

    #[error("unknown codec name: {0}")]
    UnknownName(String),

    #[error("type ({major:#04x}, {minor:#04x}) already registered")]
    DuplicateType { major: u8, minor: u8 },

    #[error("malformed value: {0}")]
    Malformed(String),
}
