use reseal_canonical::{
    Attestation, AttestationCodec, CodecError, EmitterAddress, GuardianAddress, GuardianSet,
    Signature, WireCodec,
};
use reseal_core::{reconcile, DecodeError, Observation, ReconcileError, Reconciler};

const OLD_SET: u32 = 4;
const NEW_SET: u32 = 5;

fn guardian(index: u8) -> GuardianAddress {
    GuardianAddress::new([index + 1; 20])
}

fn make_roster(size: u8) -> GuardianSet {
    GuardianSet::new(NEW_SET, (0..size).map(guardian).collect()).unwrap()
}

fn old_signature(index: u8) -> Signature {
    Signature {
        guardian_index: index,
        r: [0xa0 ^ index; 32],
        s: [0xb0 ^ index; 32],
        recovery_id: index % 2,
    }
}

fn fresh_bytes(index: u8, v: u8) -> Vec<u8> {
    let mut raw = vec![0xc0 ^ index; 32];
    raw.extend_from_slice(&[0xd0 ^ index; 32]);
    raw.push(v);
    raw
}

fn observe(index: u8) -> Observation {
    Observation::new(guardian(index), fresh_bytes(index, 27 + index % 2))
}

fn make_attestation(indexes: &[u8]) -> Attestation {
    Attestation {
        version: 1,
        guardian_set_index: OLD_SET,
        signatures: indexes.iter().copied().map(old_signature).collect(),
        timestamp: 1_717_000_000,
        nonce: 0,
        emitter_chain: 2,
        emitter_address: EmitterAddress::new([0x3e; 32]),
        sequence: 164_170,
        consistency_level: 1,
        payload: b"transfer".to_vec(),
    }
}

fn encode(attestation: &Attestation) -> Vec<u8> {
    WireCodec.encode(attestation).unwrap()
}

fn decode(bytes: &[u8]) -> Attestation {
    WireCodec.decode(bytes).unwrap()
}

fn indexes(attestation: &Attestation) -> Vec<u8> {
    attestation.signatures.iter().map(|s| s.guardian_index).collect()
}

/// 13 signatures at indexes 0..=12; 0..=10 reconfirmed, 11 and 12 stale.
fn thirteen_of_nineteen() -> (Vec<u8>, GuardianSet) {
    let signed: Vec<u8> = (0..13).collect();
    (encode(&make_attestation(&signed)), make_roster(19))
}

#[test]
fn replaces_stale_signatures_and_restamps_guardian_set() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.push(observe(17));
    observations.push(observe(15));

    let result = reconcile(&original, &roster, &observations).unwrap();
    let patched = decode(&result.bytes);

    assert_eq!(patched.guardian_set_index, NEW_SET);
    assert_eq!(patched.signatures.len(), 13);
    let mut expected: Vec<u8> = (0..=10).collect();
    expected.extend([15, 17]);
    assert_eq!(indexes(&patched), expected);

    assert_eq!(result.report.previous_guardian_set_index, OLD_SET);
    assert_eq!(result.report.stale, vec![11, 12]);
    assert_eq!(result.report.replacements, vec![15, 17]);
    assert_eq!(result.report.retained.len(), 11);
    assert_eq!(result.report.quorum, 13);
}

#[test]
fn retained_signatures_keep_original_content() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.extend([observe(15), observe(17)]);

    let patched = decode(&reconcile(&original, &roster, &observations).unwrap().bytes);

    assert_eq!(patched.signatures[0], old_signature(0));
    let replacement = patched
        .signatures
        .iter()
        .find(|s| s.guardian_index == 15)
        .unwrap();
    assert_eq!(replacement.r, [0xc0 ^ 15; 32]);
    assert_eq!(replacement.s, [0xd0 ^ 15; 32]);
    assert_eq!(replacement.recovery_id, 1);
}

#[test]
fn insufficient_replacements_return_original_untouched() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.push(observe(15));

    let err = reconcile(&original, &roster, &observations).unwrap_err();
    match &err {
        ReconcileError::Quorum {
            stale,
            available,
            original: returned,
        } => {
            assert_eq!(*stale, 2);
            assert_eq!(*available, 1);
            assert_eq!(returned, &original);
        }
        other => panic!("expected quorum error, got {:?}", other),
    }
    assert_eq!(err.original_bytes(), Some(original.as_slice()));
}

#[test]
fn fully_confirmed_attestation_is_restamped_and_stable() {
    let signed: Vec<u8> = vec![1, 4, 9];
    let original_vaa = make_attestation(&signed);
    let original = encode(&original_vaa);
    let roster = make_roster(19);
    let observations: Vec<Observation> = signed.iter().copied().map(observe).collect();

    let first = reconcile(&original, &roster, &observations).unwrap();
    let patched = decode(&first.bytes);
    assert_eq!(patched.guardian_set_index, NEW_SET);
    assert_eq!(patched.signatures, original_vaa.signatures);
    assert!(first.report.stale.is_empty());
    assert!(first.report.replacements.is_empty());
    assert_ne!(first.bytes, original);

    let second = reconcile(&first.bytes, &roster, &observations).unwrap();
    assert_eq!(second.bytes, first.bytes);
}

#[test]
fn reconciled_output_is_a_fixed_point() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.extend([observe(15), observe(17)]);

    let first = reconcile(&original, &roster, &observations).unwrap();
    let second = reconcile(&first.bytes, &roster, &observations).unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert!(second.report.stale.is_empty());
}

#[test]
fn identical_inputs_give_identical_bytes() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.extend([observe(18), observe(14), observe(16)]);

    let a = reconcile(&original, &roster, &observations).unwrap();
    let b = reconcile(&original, &roster, &observations).unwrap();
    assert_eq!(a, b);
}

#[test]
fn surplus_replacements_are_taken_lowest_index_first() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.extend([observe(18), observe(14), observe(16)]);

    let result = reconcile(&original, &roster, &observations).unwrap();
    assert_eq!(result.report.replacements, vec![14, 16]);
}

#[test]
fn output_is_count_preserving_and_strictly_ascending() {
    let roster = make_roster(19);
    for stale_count in 0..=6u8 {
        let signed: Vec<u8> = (0..13).collect();
        let original = encode(&make_attestation(&signed));
        let confirmed = 13 - stale_count;
        let mut observations: Vec<Observation> = (0..confirmed).map(observe).collect();
        observations.extend((13..19).rev().map(observe));

        let patched = decode(&reconcile(&original, &roster, &observations).unwrap().bytes);
        assert_eq!(patched.signatures.len(), 13, "stale = {}", stale_count);
        assert!(patched.has_canonical_signatures(), "stale = {}", stale_count);
    }
}

#[test]
fn digest_survives_reconciliation() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.extend([observe(15), observe(17)]);

    let patched = decode(&reconcile(&original, &roster, &observations).unwrap().bytes);
    assert_eq!(patched.digest(), decode(&original).digest());
}

#[test]
fn empty_roster_is_an_input_error() {
    let (original, _) = thirteen_of_nineteen();
    let empty = GuardianSet::new(NEW_SET, vec![]).unwrap();
    let err = reconcile(&original, &empty, &[observe(0)]).unwrap_err();
    assert!(matches!(err, ReconcileError::Input(_)));
}

#[test]
fn empty_observations_are_an_input_error() {
    let (original, roster) = thirteen_of_nineteen();
    let err = reconcile(&original, &roster, &[]).unwrap_err();
    assert!(matches!(err, ReconcileError::Input(_)));
}

#[test]
fn empty_attestation_is_an_input_error() {
    let roster = make_roster(19);
    let err = reconcile(&[], &roster, &[observe(0)]).unwrap_err();
    assert!(matches!(err, ReconcileError::Input(_)));
}

#[test]
fn only_unusable_observations_is_an_input_error() {
    let (original, roster) = thirteen_of_nineteen();
    let observations = vec![
        Observation::new(GuardianAddress::new([0xee; 20]), fresh_bytes(0, 27)),
        Observation::new(guardian(3), fresh_bytes(3, 5)),
    ];
    let err = reconcile(&original, &roster, &observations).unwrap_err();
    assert!(matches!(err, ReconcileError::Input(_)));
}

#[test]
fn malformed_observation_is_skipped_not_fatal() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.push(Observation::new(guardian(15), fresh_bytes(15, 31)));
    observations.push(Observation::new(guardian(16), vec![0u8; 12]));
    observations.extend([observe(15), observe(17)]);

    let result = reconcile(&original, &roster, &observations).unwrap();
    assert_eq!(result.report.malformed, 2);
    assert_eq!(result.report.replacements, vec![15, 17]);
}

#[test]
fn hex_encoded_observations_are_accepted() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    for index in [15u8, 17] {
        let text = hex::encode(fresh_bytes(index, 28));
        observations.push(Observation::new(guardian(index), text.into_bytes()));
    }

    let patched = decode(&reconcile(&original, &roster, &observations).unwrap().bytes);
    let last = patched.signatures.last().unwrap();
    assert_eq!(last.guardian_index, 17);
    assert_eq!(last.recovery_id, 1);
    assert_eq!(last.r, [0xc0 ^ 17; 32]);
}

#[test]
fn first_observation_per_guardian_wins() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.push(Observation::new(guardian(15), fresh_bytes(99, 27)));
    observations.extend([observe(15), observe(17)]);

    let result = reconcile(&original, &roster, &observations).unwrap();
    assert_eq!(result.report.duplicates, 1);
    let patched = decode(&result.bytes);
    let sig = patched
        .signatures
        .iter()
        .find(|s| s.guardian_index == 15)
        .unwrap();
    assert_eq!(sig.r, [0xc0 ^ 99; 32]);
}

#[test]
fn off_roster_observations_are_counted_and_ignored() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.push(Observation::new(GuardianAddress::new([0xee; 20]), fresh_bytes(1, 27)));
    observations.extend([observe(15), observe(17)]);

    let result = reconcile(&original, &roster, &observations).unwrap();
    assert_eq!(result.report.off_roster, 1);
}

#[test]
fn positions_come_from_target_roster_not_address_order() {
    // Roster lists guardians in reverse; the signer at position 0 is guardian(4).
    let roster = GuardianSet::new(NEW_SET, (0..5).rev().map(guardian).collect()).unwrap();
    let original = encode(&make_attestation(&[0, 1]));
    let observations = vec![observe(4), observe(0)];

    let result = reconcile(&original, &roster, &observations).unwrap();
    // guardian(4) is at position 0, guardian(0) at position 4.
    assert_eq!(result.report.retained, vec![0]);
    assert_eq!(result.report.replacements, vec![4]);
}

#[test]
fn undecodable_attestation_is_a_decode_error() {
    let roster = make_roster(19);
    let err = reconcile(&[1, 0, 0], &roster, &[observe(0)]).unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Decode(DecodeError::Attestation(CodecError::Truncated { .. }))
    ));
}

#[test]
fn reconcile_errors_compare_by_value() {
    let hex_error = DecodeError::from(hex::FromHexError::OddLength);
    assert_eq!(
        ReconcileError::from(hex_error.clone()),
        ReconcileError::Decode(DecodeError::InvalidHex(hex::FromHexError::OddLength))
    );
    assert_ne!(
        ReconcileError::from(hex_error),
        ReconcileError::Decode(DecodeError::InvalidLength(3))
    );
}

#[test]
fn report_carries_target_roster_quorum() {
    let original = encode(&make_attestation(&[0, 1]));
    let roster = make_roster(4);
    let result = reconcile(&original, &roster, &[observe(0), observe(1)]).unwrap();
    assert_eq!(result.report.quorum, 3);
}

struct RejectingCodec;

impl AttestationCodec for RejectingCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Attestation, CodecError> {
        WireCodec.decode(bytes)
    }

    fn encode(&self, _attestation: &Attestation) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::TooManySignatures(256))
    }
}

#[test]
fn encoding_failure_is_a_serialization_error() {
    let (original, roster) = thirteen_of_nineteen();
    let mut observations: Vec<Observation> = (0..=10).map(observe).collect();
    observations.extend([observe(15), observe(17)]);

    let err = Reconciler::new(RejectingCodec)
        .reconcile(&original, &roster, &observations)
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Serialization(_)));
}
