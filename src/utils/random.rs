use bls12_381_plus::Scalar;
use elliptic_curve::hash2curve::{ExpandMsg, Expander};
use rand::RngCore;

use crate::bbsplus::ciphersuites::BbsCiphersuite;

/// Uniform random scalars from the process-wide CSPRNG. 48 bytes of entropy
/// per scalar keep the modular reduction bias negligible.
pub fn calculate_random_scalars(count: usize) -> Vec<Scalar> {
    let mut rng = rand::thread_rng();
    let mut random_scalars: Vec<Scalar> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut buf = [0u8; 48];
        rng.fill_bytes(&mut buf);
        random_scalars.push(Scalar::from_okm(&buf));
    }

    random_scalars
}

/// Deterministic stand-in for [`calculate_random_scalars`], used by seeded
/// test paths. A separate provider rather than a branch inside the callers.
pub fn seeded_random_scalars<CS>(count: usize, seed: &[u8], dst: &[u8]) -> Vec<Scalar>
where
    CS: BbsCiphersuite,
{
    let out_len = CS::EXPAND_LEN * count;
    assert!(out_len <= 65535, "count * EXPAND_LEN > 65535");

    let mut v = vec![0u8; out_len];
    CS::Expander::expand_message(&[seed], &[dst], out_len)
        .expect("expand_message failed on mocked scalars")
        .fill_bytes(&mut v);

    let mut random_scalars: Vec<Scalar> = Vec::with_capacity(count);
    for i in 0..count {
        let slice: &[u8; 48] = &v[i * CS::EXPAND_LEN..(i + 1) * CS::EXPAND_LEN]
            .try_into()
            .expect("EXPAND_LEN chunk");
        random_scalars.push(Scalar::from_okm(slice));
    }

    random_scalars
}

/// Fresh per-session nonce bytes for the blind-issuance and proof protocols.
pub fn generate_nonce(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut nonce = vec![0u8; len];
    rng.fill_bytes(&mut nonce);
    nonce
}
