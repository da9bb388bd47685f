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

use rand::Rng;
use zkbbs::bbsplus::blind::BBSplusBlindSignature;
use zkbbs::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};
use zkbbs::bbsplus::commitment::BBSplusCommitment;
use zkbbs::bbsplus::keys::BBSplusKeyPair;
use zkbbs::bbsplus::proof::BBSplusPoKSignature;
use zkbbs::errors::Error;
use zkbbs::utils::random::generate_nonce;

fn bbsplus_blind_main<CS: BbsCiphersuite>() -> Result<(), Error> {
    const MSGS: [&str; 3] = [
        "9872ad089e452c7b6e283dfac2a80d58e8d0ff71cc4d5e310a1debdda4a45f02",
        "87a8bd656d49ee07b8110e1d8fd4f1dcef6fb9bc368c492d9bc8c4f98a739ac6",
        "96012096adda3f13dd4adbe4eea481a4c4b5717932b73b00e31807d3c5894b90",
    ];

    log::info!("Messages: {:?}", MSGS);

    let blinded_indexes = [1usize];
    let known_indexes = [0usize, 2usize];

    let mut rng = rand::thread_rng();
    let key_material: Vec<u8> = (0..32).map(|_| rng.gen()).collect();

    log::info!("Keypair Generation");
    let issuer_keypair = BBSplusKeyPair::generate::<CS>(Some(&key_material), MSGS.len())?;

    let issuer_sk = issuer_keypair.private_key();
    log::info!("SK: {}", issuer_sk.encode());
    let issuer_pk = issuer_keypair.public_key();
    log::info!("PK: {}", issuer_pk.encode());

    let messages: Vec<Vec<u8>> = MSGS.iter().map(|m| hex::decode(m).unwrap()).collect();
    let hidden_messages: Vec<Vec<u8>> = blinded_indexes
        .iter()
        .map(|&i| messages[i].clone())
        .collect();
    let known_messages: Vec<Vec<u8>> = known_indexes
        .iter()
        .map(|&i| messages[i].clone())
        .collect();

    //Holder receive nonce from Issuer
    let nonce_issuer = generate_nonce(32);
    log::info!("Generate Nonce...");
    log::info!("Nonce: {}", hex::encode(&nonce_issuer));

    log::info!("Computing pedersen commitment on the hidden messages");
    let (commitment, blind_factor) =
        BBSplusCommitment::commit::<CS>(issuer_pk, &blinded_indexes, &hidden_messages, &nonce_issuer)?;

    //Issuer verifies the proof of knowledge of the committed messages
    log::info!("Verification of the Zero-Knowledge proof of the committed messages");
    let zkpok_result = commitment.verify_proof::<CS>(issuer_pk, &nonce_issuer)?;
    assert!(zkpok_result, "Commitment Proof Verification Failed!");

    //Issuer computes the blind signature
    log::info!("Computation of a blind signature over the commitment");
    let blind_signature = BBSplusBlindSignature::blind_sign::<CS>(
        issuer_sk,
        issuer_pk,
        &commitment,
        &known_indexes,
        &known_messages,
    )?;

    //Holder unblinds the signature
    log::info!("Signature unblinding and verification...");
    let signature = blind_signature.unblind(&blind_factor);

    assert_eq!(
        signature.verify::<CS>(issuer_pk, &messages),
        Ok(true),
        "Unblinded Signature NOT VALID!"
    );
    log::info!("Signature is VALID!");

    //Holder receive nonce from Verifier
    let nonce_verifier = generate_nonce(32);
    log::info!("Generate Nonce...");
    log::info!("Nonce: {}", hex::encode(&nonce_verifier));

    //Holder generates SPoK
    log::info!("Computation of a Zero-Knowledge proof-of-knowledge of the signature");
    let proof = BBSplusPoKSignature::proof_gen::<CS>(
        &signature,
        issuer_pk,
        &messages,
        &known_indexes,
        Some(&nonce_verifier),
    )?;

    //Verifier verifies SPoK
    log::info!("Signature Proof of Knowledge verification...");
    let proof_result =
        proof.proof_verify::<CS>(issuer_pk, &known_messages, Some(&nonce_verifier))?;
    assert!(
        proof_result,
        "Signature Proof of Knowledge Verification Failed!"
    );
    log::info!("Signature Proof of Knowledge is VALID!");

    Ok(())
}

fn main() {
    use std::env;

    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        println!(
            "Usage: {} <cipher_suite>
                Ciphersuites:
                    - BLS12-381-SHA-256
                    - BLS12-381-SHAKE-256",
            args[0]
        );
        return;
    }

    let cipher_suite = &args[1];

    match cipher_suite.as_str() {
        "BLS12-381-SHA-256" => {
            println!("\n");
            log::info!("Ciphersuite: BLS12-381-SHA-256");
            let _ = bbsplus_blind_main::<Bls12381Sha256>();
        }
        "BLS12-381-SHAKE-256" => {
            println!("\n");
            log::info!("Ciphersuite: BLS12-381-SHAKE-256");
            let _ = bbsplus_blind_main::<Bls12381Shake256>();
        }
        _ => {
            println!("Unknown cipher suite: {}", cipher_suite);
        }
    }
}
