// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![allow(non_snake_case)]

use zkbbs::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};
use zkbbs::bbsplus::keys::{BBSplusKeyPair, BBSplusPublicKey};
use zkbbs::bbsplus::proof::BBSplusPoKSignature;
use zkbbs::bbsplus::signature::BBSplusSignature;
use zkbbs::bls::keys::BlsKeyPairG2;
use zkbbs::errors::Error;

const IKM: &[u8] = b"an-IKM-of-at-least-thirty-two-octets";

fn sample_messages() -> Vec<Vec<u8>> {
    vec![
        b"message at position zero".to_vec(),
        b"message at position one".to_vec(),
        b"message at position two".to_vec(),
    ]
}

fn keypair<CS: BbsCiphersuite>(message_count: usize) -> BBSplusKeyPair {
    BBSplusKeyPair::generate::<CS>(Some(IKM), message_count).unwrap()
}

fn sign_verify_round_trip<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let messages = sample_messages();

    let signature =
        BBSplusSignature::sign::<CS>(&messages, keypair.private_key(), keypair.public_key())
            .unwrap();

    assert_eq!(
        signature.verify::<CS>(keypair.public_key(), &messages),
        Ok(true)
    );
}

#[test]
fn sign_verify_round_trip_sha256() {
    sign_verify_round_trip::<Bls12381Sha256>();
}

#[test]
fn sign_verify_round_trip_shake256() {
    sign_verify_round_trip::<Bls12381Shake256>();
}

fn tampered_signature_does_not_verify<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let messages = sample_messages();
    let signature =
        BBSplusSignature::sign::<CS>(&messages, keypair.private_key(), keypair.public_key())
            .unwrap();

    // one byte in each of the A, e and s regions
    for position in [0usize, 60, 100] {
        let mut bytes = signature.to_bytes();
        bytes[position] ^= 0x01;
        match BBSplusSignature::from_bytes(&bytes) {
            Ok(tampered) => assert_eq!(
                tampered.verify::<CS>(keypair.public_key(), &messages),
                Ok(false)
            ),
            // a flip that breaks the canonical encoding is rejected earlier
            Err(_) => {}
        }
    }

    // changing any single message must also invalidate it
    for i in 0..messages.len() {
        let mut modified = messages.clone();
        modified[i] = b"a different message".to_vec();
        assert_eq!(
            signature.verify::<CS>(keypair.public_key(), &modified),
            Ok(false)
        );
    }
}

#[test]
fn tampered_signature_does_not_verify_sha256() {
    tampered_signature_does_not_verify::<Bls12381Sha256>();
}

#[test]
fn tampered_signature_does_not_verify_shake256() {
    tampered_signature_does_not_verify::<Bls12381Shake256>();
}

fn message_count_mismatch_is_an_error<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let messages = sample_messages();
    let short = &messages[..2];

    assert_eq!(
        BBSplusSignature::sign::<CS>(short, keypair.private_key(), keypair.public_key())
            .unwrap_err(),
        Error::MessageCountMismatch {
            expected: 3,
            found: 2
        }
    );

    let signature =
        BBSplusSignature::sign::<CS>(&messages, keypair.private_key(), keypair.public_key())
            .unwrap();
    assert_eq!(
        signature
            .verify::<CS>(keypair.public_key(), short)
            .unwrap_err(),
        Error::MessageCountMismatch {
            expected: 3,
            found: 2
        }
    );
}

#[test]
fn message_count_mismatch_is_an_error_sha256() {
    message_count_mismatch_is_an_error::<Bls12381Sha256>();
}

#[test]
fn message_count_mismatch_is_an_error_shake256() {
    message_count_mismatch_is_an_error::<Bls12381Shake256>();
}

fn empty_vector_needs_a_zero_count_key<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(0);

    let signature =
        BBSplusSignature::sign::<CS>(&[], keypair.private_key(), keypair.public_key()).unwrap();
    assert_eq!(signature.verify::<CS>(keypair.public_key(), &[]), Ok(true));

    // a zero-count key cannot sign actual messages
    assert!(matches!(
        BBSplusSignature::sign::<CS>(
            &sample_messages(),
            keypair.private_key(),
            keypair.public_key()
        ),
        Err(Error::MessageCountMismatch { .. })
    ));

    // and a three-slot key cannot sign the empty vector
    let keypair3 = BBSplusKeyPair::generate::<CS>(Some(IKM), 3).unwrap();
    assert!(matches!(
        BBSplusSignature::sign::<CS>(&[], keypair3.private_key(), keypair3.public_key()),
        Err(Error::MessageCountMismatch { .. })
    ));
}

#[test]
fn empty_vector_needs_a_zero_count_key_sha256() {
    empty_vector_needs_a_zero_count_key::<Bls12381Sha256>();
}

#[test]
fn empty_vector_needs_a_zero_count_key_shake256() {
    empty_vector_needs_a_zero_count_key::<Bls12381Shake256>();
}

fn key_generation_and_conversion<CS: BbsCiphersuite>() {
    // seeded generation is deterministic
    let a = BBSplusKeyPair::generate::<CS>(Some(IKM), 3).unwrap();
    let b = BBSplusKeyPair::generate::<CS>(Some(IKM), 3).unwrap();
    assert_eq!(a, b);

    let c = BBSplusKeyPair::generate::<CS>(None, 3).unwrap();
    assert_ne!(a, c);

    // both conversion variants agree with direct generation
    let bls = BlsKeyPairG2::generate(Some(IKM)).unwrap();
    let converted_from_sk = bls.private_key().to_bbsplus_keypair::<CS>(3).unwrap();
    let converted_from_pk = bls.public_key().to_bbsplus_public_key::<CS>(3).unwrap();

    assert_eq!(converted_from_sk.public_key(), &converted_from_pk);
    assert_eq!(converted_from_sk.public_key(), a.public_key());

    // the generator sequence is bound to the message count
    let wider = bls.private_key().to_bbsplus_keypair::<CS>(4).unwrap();
    assert_eq!(wider.public_key().message_count(), 4);
    assert_ne!(wider.public_key(), a.public_key());

    assert_eq!(
        bls.private_key().to_bbsplus_keypair::<CS>(0).unwrap_err(),
        Error::InvalidMessageCount
    );
    assert_eq!(
        bls.public_key().to_bbsplus_public_key::<CS>(0).unwrap_err(),
        Error::InvalidMessageCount
    );
}

#[test]
fn key_generation_and_conversion_sha256() {
    key_generation_and_conversion::<Bls12381Sha256>();
}

#[test]
fn key_generation_and_conversion_shake256() {
    key_generation_and_conversion::<Bls12381Shake256>();
}

fn octet_and_serde_round_trips<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let messages = sample_messages();
    let signature =
        BBSplusSignature::sign::<CS>(&messages, keypair.private_key(), keypair.public_key())
            .unwrap();

    let restored = BBSplusSignature::from_bytes(&signature.to_bytes()).unwrap();
    assert_eq!(restored, signature);

    let pk_bytes = keypair.public_key().to_bytes();
    let restored_pk = BBSplusPublicKey::from_bytes(&pk_bytes).unwrap();
    assert_eq!(&restored_pk, keypair.public_key());
    assert_eq!(restored_pk.message_count(), 3);

    assert!(BBSplusPublicKey::from_bytes(&pk_bytes[..pk_bytes.len() - 1]).is_err());
    assert!(BBSplusPublicKey::from_bytes(&[0u8; 10]).is_err());

    let json = serde_json::to_string(&signature).unwrap();
    let from_json: BBSplusSignature = serde_json::from_str(&json).unwrap();
    assert_eq!(from_json, signature);
}

#[test]
fn octet_and_serde_round_trips_sha256() {
    octet_and_serde_round_trips::<Bls12381Sha256>();
}

#[test]
fn octet_and_serde_round_trips_shake256() {
    octet_and_serde_round_trips::<Bls12381Shake256>();
}

fn proof_round_trip<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let (sk, pk) = (keypair.private_key(), keypair.public_key());
    let messages = sample_messages();
    let signature = BBSplusSignature::sign::<CS>(&messages, sk, pk).unwrap();

    // pure possession proof, partial disclosure, full disclosure
    for disclosed in [vec![], vec![0usize, 2], vec![0usize, 1, 2]] {
        let proof =
            BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &disclosed, None)
                .unwrap();
        let disclosed_messages: Vec<Vec<u8>> =
            disclosed.iter().map(|&i| messages[i].clone()).collect();
        assert_eq!(
            proof.proof_verify::<CS>(pk, &disclosed_messages, None),
            Ok(true)
        );
    }

    // distinct proofs from one signature are unlinkable randomizations
    let p1 =
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[0], None).unwrap();
    let p2 =
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[0], None).unwrap();
    assert_ne!(p1, p2);
}

#[test]
fn proof_round_trip_sha256() {
    proof_round_trip::<Bls12381Sha256>();
}

#[test]
fn proof_round_trip_shake256() {
    proof_round_trip::<Bls12381Shake256>();
}

fn proof_rejects_wrong_disclosures<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let (sk, pk) = (keypair.private_key(), keypair.public_key());
    let messages = sample_messages();
    let signature = BBSplusSignature::sign::<CS>(&messages, sk, pk).unwrap();

    let proof =
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[0, 1], None).unwrap();

    // the right values at the right positions
    assert_eq!(
        proof.proof_verify::<CS>(pk, &[messages[0].clone(), messages[1].clone()], None),
        Ok(true)
    );

    // a substituted value
    assert_eq!(
        proof.proof_verify::<CS>(pk, &[messages[2].clone(), messages[1].clone()], None),
        Ok(false)
    );

    // the right values, permuted across positions
    assert_eq!(
        proof.proof_verify::<CS>(pk, &[messages[1].clone(), messages[0].clone()], None),
        Ok(false)
    );

    // wrong number of disclosed messages
    assert!(matches!(
        proof.proof_verify::<CS>(pk, &[messages[0].clone()], None),
        Err(Error::MessageCountMismatch { .. })
    ));

    // tampered proof bytes
    let bytes = proof.to_bytes();
    for position in [3usize, 50, bytes.len() - 1] {
        let mut tampered = bytes.clone();
        tampered[position] ^= 0x01;
        match BBSplusPoKSignature::from_bytes(&tampered) {
            Ok(p) => assert_ne!(
                p.proof_verify::<CS>(pk, &[messages[0].clone(), messages[1].clone()], None),
                Ok(true)
            ),
            Err(_) => {}
        }
    }

    // octet round trip preserves the proof
    let restored = BBSplusPoKSignature::from_bytes(&bytes).unwrap();
    assert_eq!(restored, proof);
    assert_eq!(restored.disclosed_indexes(), &[0, 1]);
}

#[test]
fn proof_rejects_wrong_disclosures_sha256() {
    proof_rejects_wrong_disclosures::<Bls12381Sha256>();
}

#[test]
fn proof_rejects_wrong_disclosures_shake256() {
    proof_rejects_wrong_disclosures::<Bls12381Shake256>();
}

fn proof_nonce_binding<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let (sk, pk) = (keypair.private_key(), keypair.public_key());
    let messages = sample_messages();
    let signature = BBSplusSignature::sign::<CS>(&messages, sk, pk).unwrap();

    let nonce = b"verifier session nonce".to_vec();
    let proof =
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[0], Some(&nonce))
            .unwrap();

    let disclosed = vec![messages[0].clone()];
    assert_eq!(
        proof.proof_verify::<CS>(pk, &disclosed, Some(&nonce)),
        Ok(true)
    );
    assert_eq!(
        proof.proof_verify::<CS>(pk, &disclosed, Some(b"another nonce")),
        Ok(false)
    );
    assert_eq!(proof.proof_verify::<CS>(pk, &disclosed, None), Ok(false));
}

#[test]
fn proof_nonce_binding_sha256() {
    proof_nonce_binding::<Bls12381Sha256>();
}

#[test]
fn proof_nonce_binding_shake256() {
    proof_nonce_binding::<Bls12381Shake256>();
}

fn proof_index_validation<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let (sk, pk) = (keypair.private_key(), keypair.public_key());
    let messages = sample_messages();
    let signature = BBSplusSignature::sign::<CS>(&messages, sk, pk).unwrap();

    assert_eq!(
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[5], None).unwrap_err(),
        Error::IndexOutOfBounds {
            index: 5,
            message_count: 3
        }
    );
    assert_eq!(
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[0, 0], None)
            .unwrap_err(),
        Error::DuplicateIndex(0)
    );
}

#[test]
fn proof_index_validation_sha256() {
    proof_index_validation::<Bls12381Sha256>();
}

#[test]
fn proof_index_validation_shake256() {
    proof_index_validation::<Bls12381Shake256>();
}

/// Scenario: three messages, reveal only position 0; the proof verifies with
/// message 0 and fails when message 1's value is put in its place.
fn single_disclosure_scenario<CS: BbsCiphersuite>() {
    let keypair = keypair::<CS>(3);
    let (sk, pk) = (keypair.private_key(), keypair.public_key());
    let messages = sample_messages();

    let signature = BBSplusSignature::sign::<CS>(&messages, sk, pk).unwrap();
    assert_eq!(signature.verify::<CS>(pk, &messages), Ok(true));

    let proof =
        BBSplusPoKSignature::proof_gen::<CS>(&signature, pk, &messages, &[0], None).unwrap();

    assert_eq!(
        proof.proof_verify::<CS>(pk, &[messages[0].clone()], None),
        Ok(true)
    );
    assert_eq!(
        proof.proof_verify::<CS>(pk, &[messages[1].clone()], None),
        Ok(false)
    );
}

#[test]
fn single_disclosure_scenario_sha256() {
    single_disclosure_scenario::<Bls12381Sha256>();
}

#[test]
fn single_disclosure_scenario_shake256() {
    single_disclosure_scenario::<Bls12381Shake256>();
}
