//! Zig-zag assembler - the three-message bound-witness state machine
//!
//! Both peers run the same machine; `end_point` tells a peer it is the
//! concluding side of the exchange. The initiator calls with no transfer
//! first; the responder's first call integrates it and signs; the
//! initiator's second call signs and completes; the responder's second
//! call integrates the last signatures and completes.
//!
//! Any schema mismatch, list-length disagreement, or failed signature
//! verification during integration is terminal: the machine moves to
//! `Failed` and no block is ever emitted.

use crate::signing::signing_data;
use std::sync::Arc;
use thiserror::Error;
use xyo_model::{BoundWitness, Payload, PublicKey, Signature, Signer, Transfer};
use xyo_packer::{PackError, Packer};

/// Errors that abort a bound-witness assembly.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("negotiation aborted: {reason}")]
    NegotiationAborted { reason: String },

    #[error("peer signature failed verification")]
    SignatureInvalid,

    #[error(transparent)]
    Pack(#[from] PackError),
}

/// Where the machine stands in the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing exchanged yet.
    Ready,
    /// Initiator has contributed its keys and payload, awaiting the peer.
    Contributed,
    /// Responder has integrated, contributed, and signed, awaiting signatures.
    Signed,
    /// Block assembled; retrievable once via `take_bound_witness`.
    Complete,
    /// Terminal failure; no block will be emitted.
    Failed,
}

/// Two-party bound-witness assembler.
///
/// The block data model admits any number of participants; this machine
/// deliberately supports exactly two and aborts on anything else.
pub struct ZigZagAssembler {
    packer: Arc<Packer>,
    signers: Vec<Arc<dyn Signer>>,
    payload: Payload,
    phase: Phase,
    /// Key sets in participant order, initiator first.
    key_sets: Vec<Vec<PublicKey>>,
    /// Payloads in participant order.
    payloads: Vec<Payload>,
    local_signatures: Option<Vec<Signature>>,
    remote_signatures: Option<Vec<Signature>>,
    /// 0 when this peer initiated, 1 when it responded.
    local_slot: usize,
    signing_data: Option<Vec<u8>>,
    completed: Option<BoundWitness>,
}

impl ZigZagAssembler {
    /// A fresh assembler for one exchange.
    pub fn new(packer: Arc<Packer>, signers: Vec<Arc<dyn Signer>>, payload: Payload) -> Self {
        Self {
            packer,
            signers,
            payload,
            phase: Phase::Ready,
            key_sets: Vec::new(),
            payloads: Vec::new(),
            local_signatures: None,
            remote_signatures: None,
            local_slot: 0,
            signing_data: None,
            completed: None,
        }
    }

    /// Current phase, for observability.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drive the machine with the peer's latest transfer.
    ///
    /// `end_point` is true only on the responder's first call. Returns the
    /// transfer to hand to the peer; after the machine completes, the block
    /// is available once via [`take_bound_witness`](Self::take_bound_witness).
    pub fn incoming_data(
        &mut self,
        transfer: Option<Transfer>,
        end_point: bool,
    ) -> Result<Transfer, AssemblyError> {
        match (self.phase, transfer, end_point) {
            (Phase::Ready, None, false) => self.contribute_first(),
            (Phase::Ready, Some(t), true) => self.integrate_and_sign(t),
            (Phase::Contributed, Some(t), false) => self.countersign_and_complete(t),
            (Phase::Signed, Some(t), false) => self.integrate_signatures(t),
            (phase, transfer, end_point) => Err(self.fail(format!(
                "unexpected step: phase {:?}, transfer {}, end_point {}",
                phase,
                if transfer.is_some() { "present" } else { "absent" },
                end_point
            ))),
        }
    }

    /// The completed block, at most once per assembler instance.
    pub fn take_bound_witness(&mut self) -> Option<BoundWitness> {
        self.completed.take()
    }

    fn fail(&mut self, reason: String) -> AssemblyError {
        self.phase = Phase::Failed;
        AssemblyError::NegotiationAborted { reason }
    }

    fn local_keys(&self) -> Vec<PublicKey> {
        self.signers.iter().map(|s| s.public_key()).collect()
    }

    fn sign_local(&self, data: &[u8]) -> Vec<Signature> {
        self.signers.iter().map(|s| s.sign(data)).collect()
    }

    /// Initiator, first call: offer keys and payload, nothing to integrate.
    fn contribute_first(&mut self) -> Result<Transfer, AssemblyError> {
        self.local_slot = 0;
        self.key_sets.push(self.local_keys());
        self.payloads.push(self.payload.clone());
        self.phase = Phase::Contributed;
        Ok(Transfer {
            public_keys: self.key_sets.clone(),
            payloads: self.payloads.clone(),
            signatures: vec![],
        })
    }

    /// Responder, first call: integrate the initiator, append self, sign.
    fn integrate_and_sign(&mut self, transfer: Transfer) -> Result<Transfer, AssemblyError> {
        if let Err(reason) = check_shape(&transfer, 1, 1, 0) {
            return Err(self.fail(reason));
        }
        self.local_slot = 1;
        self.key_sets = transfer.public_keys;
        self.payloads = transfer.payloads;
        self.key_sets.push(self.local_keys());
        self.payloads.push(self.payload.clone());

        let data = signing_data(&self.packer, &self.key_sets, &self.payloads)?;
        let signatures = self.sign_local(&data);
        self.signing_data = Some(data);
        self.local_signatures = Some(signatures.clone());
        self.phase = Phase::Signed;

        Ok(Transfer {
            public_keys: vec![self.key_sets[1].clone()],
            payloads: vec![self.payloads[1].clone()],
            signatures: vec![signatures],
        })
    }

    /// Initiator, second call: integrate the responder, verify, countersign.
    fn countersign_and_complete(&mut self, transfer: Transfer) -> Result<Transfer, AssemblyError> {
        if let Err(reason) = check_shape(&transfer, 1, 1, 1) {
            return Err(self.fail(reason));
        }
        let mut transfer = transfer;
        let remote_sigs = transfer.signatures.pop().unwrap_or_default();
        let remote_keys = transfer.public_keys.pop().unwrap_or_default();
        let remote_payload = transfer.payloads.pop().unwrap_or_default();
        if remote_keys.len() != remote_sigs.len() {
            return Err(self.fail(format!(
                "peer offered {} keys but {} signatures",
                remote_keys.len(),
                remote_sigs.len()
            )));
        }

        self.key_sets.push(remote_keys);
        self.payloads.push(remote_payload);

        let data = signing_data(&self.packer, &self.key_sets, &self.payloads)?;
        if !verify_set(&self.key_sets[1], &remote_sigs, &data) {
            self.phase = Phase::Failed;
            return Err(AssemblyError::SignatureInvalid);
        }

        let local_sigs = self.sign_local(&data);
        self.signing_data = Some(data);
        self.local_signatures = Some(local_sigs.clone());
        self.remote_signatures = Some(remote_sigs);
        self.assemble()?;

        Ok(Transfer {
            public_keys: vec![],
            payloads: vec![],
            signatures: vec![local_sigs],
        })
    }

    /// Responder, second call: integrate the initiator's signatures.
    fn integrate_signatures(&mut self, transfer: Transfer) -> Result<Transfer, AssemblyError> {
        if let Err(reason) = check_shape(&transfer, 0, 0, 1) {
            return Err(self.fail(reason));
        }
        let mut transfer = transfer;
        let remote_sigs = transfer.signatures.pop().unwrap_or_default();
        // The machine only reaches this phase with signing data cached.
        let Some(data) = self.signing_data.clone() else {
            return Err(self.fail("signing data missing before final signatures".into()));
        };
        if self.key_sets[0].len() != remote_sigs.len() {
            return Err(self.fail(format!(
                "peer offered {} signatures for {} keys",
                remote_sigs.len(),
                self.key_sets[0].len()
            )));
        }
        if !verify_set(&self.key_sets[0], &remote_sigs, &data) {
            self.phase = Phase::Failed;
            return Err(AssemblyError::SignatureInvalid);
        }

        self.remote_signatures = Some(remote_sigs);
        self.assemble()?;

        Ok(Transfer::default())
    }

    /// Build and validate the completed block from the accumulated parts.
    fn assemble(&mut self) -> Result<(), AssemblyError> {
        let (Some(local), Some(remote)) = (
            self.local_signatures.clone(),
            self.remote_signatures.clone(),
        ) else {
            return Err(self.fail("assembly reached without both signature sets".into()));
        };
        let signatures = if self.local_slot == 0 {
            vec![local, remote]
        } else {
            vec![remote, local]
        };
        let block = BoundWitness {
            public_keys: self.key_sets.clone(),
            payloads: self.payloads.clone(),
            signatures,
        };
        let Some(data) = self.signing_data.as_deref() else {
            return Err(self.fail("assembly reached without signing data".into()));
        };
        if let Err(fault) = block.validate(data) {
            return Err(self.fail(format!("assembled block invalid: {}", fault)));
        }
        self.completed = Some(block);
        self.phase = Phase::Complete;
        Ok(())
    }
}

/// Require the transfer to carry exactly the expected list lengths.
fn check_shape(
    transfer: &Transfer,
    keys: usize,
    payloads: usize,
    signatures: usize,
) -> Result<(), String> {
    if transfer.public_keys.len() != keys
        || transfer.payloads.len() != payloads
        || transfer.signatures.len() != signatures
    {
        return Err(format!(
            "transfer shape mismatch: got {} key sets, {} payloads, {} signature sets; expected {}/{}/{}",
            transfer.public_keys.len(),
            transfer.payloads.len(),
            transfer.signatures.len(),
            keys,
            payloads,
            signatures
        ));
    }
    Ok(())
}

fn verify_set(keys: &[PublicKey], signatures: &[Signature], data: &[u8]) -> bool {
    keys.len() == signatures.len()
        && keys
            .iter()
            .zip(signatures)
            .all(|(key, sig)| key.verify(data, sig))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xyo_model::{Ed25519Signer, Heuristic};

    fn assembler(payload: Payload) -> (ZigZagAssembler, Arc<dyn Signer>) {
        let signer: Arc<dyn Signer> = Arc::new(Ed25519Signer::generate());
        let packer = Arc::new(Packer::standard());
        (
            ZigZagAssembler::new(packer, vec![signer.clone()], payload),
            signer,
        )
    }

    fn run_exchange(
        a: &mut ZigZagAssembler,
        b: &mut ZigZagAssembler,
    ) -> Result<(BoundWitness, BoundWitness), AssemblyError> {
        let t1 = a.incoming_data(None, false)?;
        let t2 = b.incoming_data(Some(t1), true)?;
        let t3 = a.incoming_data(Some(t2), false)?;
        let last = b.incoming_data(Some(t3), false)?;
        assert!(last.is_empty());
        Ok((
            a.take_bound_witness().expect("initiator block"),
            b.take_bound_witness().expect("responder block"),
        ))
    }

    #[test]
    fn test_two_party_exchange_produces_identical_blocks() {
        let (mut a, signer_a) = assembler(Payload::new(
            vec![Heuristic::Index(0), Heuristic::Rssi(-5)],
            vec![],
        ));
        let (mut b, signer_b) = assembler(Payload::new(
            vec![Heuristic::Index(0), Heuristic::Rssi(-10)],
            vec![],
        ));

        let (block_a, block_b) = run_exchange(&mut a, &mut b).unwrap();
        assert_eq!(block_a, block_b);
        assert_eq!(block_a.participant_count(), 2);
        assert_eq!(block_a.public_keys[0][0], signer_a.public_key());
        assert_eq!(block_a.public_keys[1][0], signer_b.public_key());
        assert_eq!(a.phase(), Phase::Complete);
        assert_eq!(b.phase(), Phase::Complete);
    }

    #[test]
    fn test_completed_block_verifies() {
        let (mut a, _) = assembler(Payload::new(vec![Heuristic::Index(0)], vec![]));
        let (mut b, _) = assembler(Payload::new(vec![Heuristic::Index(3)], vec![]));
        let (block, _) = run_exchange(&mut a, &mut b).unwrap();

        let packer = Packer::standard();
        let data = signing_data(&packer, &block.public_keys, &block.payloads).unwrap();
        assert!(block.validate(&data).is_ok());
    }

    #[test]
    fn test_block_emitted_at_most_once() {
        let (mut a, _) = assembler(Payload::default());
        let (mut b, _) = assembler(Payload::default());
        run_exchange(&mut a, &mut b).unwrap();
        assert!(a.take_bound_witness().is_none());
        assert!(b.take_bound_witness().is_none());
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let (mut a, _) = assembler(Payload::new(vec![Heuristic::Index(0)], vec![]));
        let (mut b, _) = assembler(Payload::new(vec![Heuristic::Index(0)], vec![]));

        let t1 = a.incoming_data(None, false).unwrap();
        let mut t2 = b.incoming_data(Some(t1), true).unwrap();
        // Tamper with the responder's signed heuristics after it signed.
        t2.payloads[0].signed_heuristics.push(Heuristic::Rssi(0));

        assert!(matches!(
            a.incoming_data(Some(t2), false),
            Err(AssemblyError::SignatureInvalid)
        ));
        assert_eq!(a.phase(), Phase::Failed);
        assert!(a.take_bound_witness().is_none());
    }

    #[test]
    fn test_multi_party_transfer_rejected() {
        let (mut b, _) = assembler(Payload::default());

        let three_keys = Transfer {
            public_keys: vec![
                vec![Ed25519Signer::generate().public_key()],
                vec![Ed25519Signer::generate().public_key()],
            ],
            payloads: vec![Payload::default(), Payload::default()],
            signatures: vec![],
        };
        assert!(matches!(
            b.incoming_data(Some(three_keys), true),
            Err(AssemblyError::NegotiationAborted { .. })
        ));
        assert_eq!(b.phase(), Phase::Failed);
    }

    #[test]
    fn test_out_of_order_call_rejected() {
        let (mut a, _) = assembler(Payload::default());
        // A second "first call" before any transfer arrives is a protocol error.
        a.incoming_data(None, false).unwrap();
        assert!(matches!(
            a.incoming_data(None, false),
            Err(AssemblyError::NegotiationAborted { .. })
        ));
    }

    #[test]
    fn test_failed_machine_stays_failed() {
        let (mut a, _) = assembler(Payload::default());
        a.incoming_data(None, false).unwrap();
        let _ = a.incoming_data(None, false);
        let t = Transfer::default();
        assert!(matches!(
            a.incoming_data(Some(t), false),
            Err(AssemblyError::NegotiationAborted { .. })
        ));
    }
}
