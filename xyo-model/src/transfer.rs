//! Transfer - one zig-zag message between two assembling peers
//!
//! Each transfer carries the lists the *other* side still has to integrate.
//! Lists only ever grow over the exchange; a missing contribution is an
//! empty list, never an absent field, so the wire shape stays fixed.

use crate::payload::Payload;
use crate::types::{PublicKey, Signature};

/// Accumulated contributions handed to the other peer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transfer {
    /// Key sets contributed so far, participant order preserved.
    pub public_keys: Vec<Vec<PublicKey>>,
    /// Payloads contributed so far.
    pub payloads: Vec<Payload>,
    /// Signature sets contributed so far.
    pub signatures: Vec<Vec<Signature>>,
}

impl Transfer {
    /// True when the transfer carries nothing to integrate.
    pub fn is_empty(&self) -> bool {
        self.public_keys.is_empty() && self.payloads.is_empty() && self.signatures.is_empty()
    }
}
