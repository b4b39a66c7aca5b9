//! Canonical signing data
//!
//! Both peers must sign byte-identical data. The canonical form is the
//! untyped serialization of the key-set array followed by the untyped
//! serialization of each participant's signed-heuristics array, in
//! participant order (initiator first). Unsigned heuristics never enter.

use xyo_model::{Payload, PublicKey};
use xyo_packer::{schema, Framing, PackError, Packer, Value};

/// Serialize the canonical signing data for a block in progress.
pub fn signing_data(
    packer: &Packer,
    key_sets: &[Vec<PublicKey>],
    payloads: &[Payload],
) -> Result<Vec<u8>, PackError> {
    let sets = Value::Array(
        key_sets
            .iter()
            .map(|keys| Value::Array(keys.iter().cloned().map(Value::PublicKey).collect()))
            .collect(),
    );
    let mut out = packer.serialize(
        &sets,
        schema::MAJOR_STRUCT,
        schema::MINOR_ARRAY,
        Framing::Untyped,
    )?;

    for payload in payloads {
        let signed = Value::Array(
            payload
                .signed_heuristics
                .iter()
                .cloned()
                .map(Value::Heuristic)
                .collect(),
        );
        out.extend(packer.serialize(
            &signed,
            schema::MAJOR_STRUCT,
            schema::MINOR_ARRAY,
            Framing::Untyped,
        )?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xyo_model::{Ed25519Signer, Heuristic, Signer};

    #[test]
    fn test_signing_data_ignores_unsigned_heuristics() {
        let packer = Packer::standard();
        let signer = Ed25519Signer::generate();
        let keys = vec![vec![signer.public_key()]];

        let with_unsigned = vec![Payload::new(
            vec![Heuristic::Index(0)],
            vec![Heuristic::Rssi(-3)],
        )];
        let without_unsigned = vec![Payload::new(vec![Heuristic::Index(0)], vec![])];

        let a = signing_data(&packer, &keys, &with_unsigned).unwrap();
        let b = signing_data(&packer, &keys, &without_unsigned).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signing_data_depends_on_participant_order() {
        let packer = Packer::standard();
        let a = Ed25519Signer::generate();
        let b = Ed25519Signer::generate();
        let payloads = vec![Payload::default(), Payload::default()];

        let forward = signing_data(
            &packer,
            &[vec![a.public_key()], vec![b.public_key()]],
            &payloads,
        )
        .unwrap();
        let reversed = signing_data(
            &packer,
            &[vec![b.public_key()], vec![a.public_key()]],
            &payloads,
        )
        .unwrap();
        assert_ne!(forward, reversed);
    }
}
