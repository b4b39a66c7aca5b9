//! Catalogue header - sub-protocol negotiation
//!
//! The first outbound message of a session advertises which sub-protocols
//! the sender is initiating: one byte giving the catalogue size (fixed at
//! 4), then a 4-byte big-endian bitmask. Later messages omit the header.

use crate::error::NetError;

/// Bitmask for the bound-witness exchange.
pub const BOUND_WITNESS: u32 = 1;

/// Size in bytes of the catalogue bitmask.
pub const CATALOGUE_SIZE: u8 = 4;

/// Prepend the catalogue header to a first message.
pub fn with_header(items: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + payload.len());
    out.push(CATALOGUE_SIZE);
    out.extend_from_slice(&items.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split a first message into its catalogue bitmask and the payload after it.
pub fn split_header(data: &[u8]) -> Result<(u32, &[u8]), NetError> {
    if data.is_empty() {
        return Err(NetError::Frame("empty first message".into()));
    }
    if data[0] != CATALOGUE_SIZE {
        return Err(NetError::Frame(format!(
            "unsupported catalogue size {}",
            data[0]
        )));
    }
    let rest = &data[1..];
    if rest.len() < CATALOGUE_SIZE as usize {
        return Err(NetError::Frame("truncated catalogue header".into()));
    }
    let items = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
    Ok((items, &rest[CATALOGUE_SIZE as usize..]))
}
