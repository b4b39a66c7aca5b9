//! Verifier scenarios over assembler-built chains
//!
//! Builds real two-party blocks with the zig-zag assembler and checks the
//! chain verifier's accept/reject behavior for linkage, index, and next-key
//! rules.

use std::sync::Arc;
use xyo_core::{ChainFault, ChainVerifier, Party, ZigZagAssembler};
use xyo_model::{
    Blake3Provider, BoundWitness, Ed25519Signer, Hash, HashProvider, Heuristic, Payload, Signer,
};
use xyo_packer::{Framing, Packer, Value};

fn packer() -> Arc<Packer> {
    Arc::new(Packer::standard())
}

fn signer() -> Arc<dyn Signer> {
    Arc::new(Ed25519Signer::generate())
}

/// Run a full zig-zag between two single-signer peers.
fn exchange(
    packer: &Arc<Packer>,
    a: &Arc<dyn Signer>,
    a_payload: Payload,
    b: &Arc<dyn Signer>,
    b_payload: Payload,
) -> BoundWitness {
    let mut initiator = ZigZagAssembler::new(packer.clone(), vec![a.clone()], a_payload);
    let mut responder = ZigZagAssembler::new(packer.clone(), vec![b.clone()], b_payload);

    let t1 = initiator.incoming_data(None, false).expect("offer");
    let t2 = responder.incoming_data(Some(t1), true).expect("counter");
    let t3 = initiator.incoming_data(Some(t2), false).expect("closing");
    responder.incoming_data(Some(t3), false).expect("finish");

    initiator.take_bound_witness().expect("completed block")
}

fn block_hash(packer: &Packer, block: &BoundWitness) -> Hash {
    let bytes = packer
        .serialize_value(&Value::BoundWitness(block.clone()), Framing::Typed)
        .expect("serialize block");
    Blake3Provider.hash(&bytes)
}

#[test]
fn test_single_block_chain_accepted() {
    let packer = packer();
    let (a, b) = (signer(), signer());
    let block = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(0), Heuristic::Rssi(-5)], vec![]),
        &b,
        Payload::new(vec![Heuristic::Index(0), Heuristic::Rssi(-10)], vec![]),
    );

    let verifier = ChainVerifier::new(packer);
    let report = verifier.verify(&[block.clone()], &Party::Position(0));
    assert!(report.is_valid, "unexpected fault: {:?}", report.fault);

    // The same block also verifies when the party is named by key.
    let by_key = verifier.verify(&[block], &Party::GenesisKey(a.public_key()));
    assert!(by_key.is_valid);
}

#[test]
fn test_missing_index_rejected() {
    let packer = packer();
    let (a, b) = (signer(), signer());
    // The responder contributes no signed heuristics at all.
    let block = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(0), Heuristic::Rssi(-5)], vec![]),
        &b,
        Payload::new(vec![], vec![]),
    );

    let verifier = ChainVerifier::new(packer);
    let report = verifier.verify(&[block], &Party::Position(1));
    assert!(!report.is_valid);
    assert_eq!(report.first_invalid_index, Some(0));
    assert_eq!(report.fault, Some(ChainFault::MissingIndex));
}

#[test]
fn test_two_block_linkage_accepted_and_order_matters() {
    let packer = packer();
    let (a, b, c) = (signer(), signer(), signer());

    let b1 = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
        &b,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    let b2 = exchange(
        &packer,
        &a,
        Payload::new(
            vec![
                Heuristic::Index(1),
                Heuristic::PreviousHash(block_hash(&packer, &b1)),
            ],
            vec![],
        ),
        &c,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );

    let verifier = ChainVerifier::new(packer);
    let forward = verifier.verify(&[b1.clone(), b2.clone()], &Party::Position(0));
    assert!(forward.is_valid, "unexpected fault: {:?}", forward.fault);

    let backward = verifier.verify(&[b2, b1], &Party::Position(0));
    assert!(!backward.is_valid);
    assert_eq!(backward.first_invalid_index, Some(1));
}

#[test]
fn test_index_gap_rejected() {
    let packer = packer();
    let (a, b, c) = (signer(), signer(), signer());

    let b1 = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
        &b,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    // Declares index 2 where 1 is required.
    let b2 = exchange(
        &packer,
        &a,
        Payload::new(
            vec![
                Heuristic::Index(2),
                Heuristic::PreviousHash(block_hash(&packer, &b1)),
            ],
            vec![],
        ),
        &c,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );

    let verifier = ChainVerifier::new(packer);
    let report = verifier.verify(&[b1, b2], &Party::Position(0));
    assert!(!report.is_valid);
    assert_eq!(report.first_invalid_index, Some(1));
    assert_eq!(
        report.fault,
        Some(ChainFault::IndexMismatch {
            expected: 1,
            found: 2
        })
    );
}

#[test]
fn test_previous_hash_mismatch_rejected() {
    let packer = packer();
    let (a, b, c) = (signer(), signer(), signer());

    let b1 = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
        &b,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    let bogus = Blake3Provider.hash(b"not the previous block");
    let b2 = exchange(
        &packer,
        &a,
        Payload::new(
            vec![Heuristic::Index(1), Heuristic::PreviousHash(bogus)],
            vec![],
        ),
        &c,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );

    let verifier = ChainVerifier::new(packer);
    let report = verifier.verify(&[b1, b2], &Party::Position(0));
    assert!(!report.is_valid);
    assert_eq!(report.fault, Some(ChainFault::PreviousHashMismatch));
}

#[test]
fn test_next_key_commitment_enforced() {
    let packer = packer();
    let (a1, a2, b, c) = (signer(), signer(), signer(), signer());

    // Block 0 commits that a2 signs the next block.
    let b1 = exchange(
        &packer,
        &a1,
        Payload::new(
            vec![
                Heuristic::Index(0),
                Heuristic::NextPublicKey(a2.public_key()),
            ],
            vec![],
        ),
        &b,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    let prev = block_hash(&packer, &b1);

    // Honored: block 1 signed by a2.
    let honored = exchange(
        &packer,
        &a2,
        Payload::new(
            vec![
                Heuristic::Index(1),
                Heuristic::PreviousHash(prev.clone()),
            ],
            vec![],
        ),
        &c,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    let verifier = ChainVerifier::new(packer.clone());
    let report = verifier.verify(&[b1.clone(), honored.clone()], &Party::Position(0));
    assert!(report.is_valid, "unexpected fault: {:?}", report.fault);

    // Key-named party tracking follows the rotation to the committed key.
    let by_key = verifier.verify(&[b1.clone(), honored], &Party::GenesisKey(a1.public_key()));
    assert!(by_key.is_valid, "unexpected fault: {:?}", by_key.fault);

    // Broken: block 1 signed by an unrelated signer.
    let stranger = signer();
    let broken = exchange(
        &packer,
        &stranger,
        Payload::new(
            vec![Heuristic::Index(1), Heuristic::PreviousHash(prev)],
            vec![],
        ),
        &c,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    let report = verifier.verify(&[b1, broken], &Party::Position(0));
    assert!(!report.is_valid);
    assert_eq!(report.first_invalid_index, Some(1));
    assert_eq!(report.fault, Some(ChainFault::NextKeyUnfulfilled));
}

#[test]
fn test_tampered_block_signature_rejected() {
    let packer = packer();
    let (a, b) = (signer(), signer());
    let mut block = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
        &b,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    // Flip a heuristic after signing.
    block.payloads[1].signed_heuristics[0] = Heuristic::Index(0xdead);

    let verifier = ChainVerifier::new(packer);
    let report = verifier.verify(&[block], &Party::Position(0));
    assert!(!report.is_valid);
    assert_eq!(report.fault, Some(ChainFault::SignatureInvalid));
}

#[test]
fn test_chain_tail_anchors_at_first_supplied_block() {
    let packer = packer();
    let (a, b, c) = (signer(), signer(), signer());

    // A tail starting mid-chain: indices 5 and 6.
    let b5 = exchange(
        &packer,
        &a,
        Payload::new(vec![Heuristic::Index(5)], vec![]),
        &b,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );
    let b6 = exchange(
        &packer,
        &a,
        Payload::new(
            vec![
                Heuristic::Index(6),
                Heuristic::PreviousHash(block_hash(&packer, &b5)),
            ],
            vec![],
        ),
        &c,
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );

    let verifier = ChainVerifier::new(packer);
    let report = verifier.verify(&[b5, b6], &Party::Position(0));
    assert!(report.is_valid, "unexpected fault: {:?}", report.fault);
}
