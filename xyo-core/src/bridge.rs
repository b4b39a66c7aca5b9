//! Bridged-block extraction
//!
//! Bridges and archivists carry other peers' blocks embedded as heuristics.
//! This scans one completed block and returns the embedded blocks as a flat
//! list; consumers that accept bridged bridges recurse themselves.

use xyo_model::{BoundWitness, Heuristic};

/// Collect every bound witness embedded in the block's signed heuristics.
pub fn extract_bridged_blocks(block: &BoundWitness) -> Vec<BoundWitness> {
    block
        .payloads
        .iter()
        .flat_map(|payload| payload.signed_heuristics.iter())
        .filter_map(|heuristic| match heuristic {
            Heuristic::Bridge(inner) => Some((**inner).clone()),
            _ => None,
        })
        .collect()
}
