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

use bls12_381_plus::group::Curve;
use bls12_381_plus::{
    multi_miller_loop, G1Projective, G2Prepared, G2Projective, Gt, Scalar,
};
use group::Group;
use serde::{Deserialize, Serialize};

use super::ciphersuites::BbsCiphersuite;
use super::generators::Generators;
use super::keys::BBSplusPublicKey;
use super::signature::{calculate_b, BBSplusSignature};
use crate::errors::Error;
use crate::utils::message::BBSplusMessage;
use crate::utils::util::{
    bitvector_to_indexes, calculate_domain, get_messages, get_remaining_indexes, hash_to_scalar,
    i2osp, indexes_to_bitvector, parse_g1_projective, validate_indexes, ScalarExt,
};

#[cfg(not(test))]
use crate::utils::random::calculate_random_scalars;
#[cfg(test)]
use crate::utils::random::seeded_random_scalars;

#[cfg(test)]
const SEED_MOCKED_SCALAR: &[u8] = b"3.141592653589793238462643383279";

/// Selective-disclosure proof of knowledge of a signature. `A_prime`,
/// `A_bar` and `D` are fresh randomizations of the signature, so proofs
/// derived from the same signature are unlinkable; the scalars are the
/// Schnorr responses for the signature's secret components and every
/// undisclosed message. Carries its own disclosed-position set, so it is
/// verifiable from just the public key and the disclosed values.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPoKSignature {
    pub(crate) A_prime: G1Projective,
    pub(crate) A_bar: G1Projective,
    pub(crate) D: G1Projective,
    pub(crate) c: Scalar,
    pub(crate) e_cap: Scalar,
    pub(crate) r2_cap: Scalar,
    pub(crate) r3_cap: Scalar,
    pub(crate) s_cap: Scalar,
    pub(crate) m_cap: Vec<Scalar>,
    pub(crate) disclosed_indexes: Vec<usize>,
}

impl BBSplusPoKSignature {
    /// # Description
    /// Derives a proof from a valid signature, disclosing exactly the
    /// messages at `disclosed_indexes` (any subset, empty and full both
    /// legal). The optional nonce is a verifier session value bound into
    /// the challenge.
    ///
    /// # Inputs:
    /// * `signature` (REQUIRED), a signature valid for `pk` and `messages`.
    /// * `pk` (REQUIRED), the signer's public key.
    /// * `messages` (REQUIRED), the full signed vector, in signing order.
    /// * `disclosed_indexes` (REQUIRED), unique in-range positions to
    ///   reveal.
    /// * `nonce` (OPTIONAL), verifier nonce.
    ///
    /// # Output:
    /// a [`BBSplusPoKSignature`] or [`Error`].
    ///
    pub fn proof_gen<CS>(
        signature: &BBSplusSignature,
        pk: &BBSplusPublicKey,
        messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
        nonce: Option<&[u8]>,
    ) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
    {
        pk.validate()?;
        if messages.len() != pk.message_count() {
            return Err(Error::MessageCountMismatch {
                expected: pk.message_count(),
                found: messages.len(),
            });
        }
        validate_indexes(disclosed_indexes, pk.message_count())?;

        let message_scalars = BBSplusMessage::messages_to_scalar::<CS>(messages)?;
        core_proof_gen::<CS>(pk, signature, &message_scalars, disclosed_indexes, nonce)
    }

    /// # Description
    /// Verifies the proof against `pk` and the disclosed messages, supplied
    /// in ascending order of [`disclosed_indexes`](Self::disclosed_indexes).
    /// Recomputes the Fiat-Shamir challenge from the transcript and checks
    /// the pairing on the randomized signature. Any mismatch — a wrong
    /// value, a value at the wrong position, a tampered byte — yields
    /// `Ok(false)`.
    ///
    pub fn proof_verify<CS>(
        &self,
        pk: &BBSplusPublicKey,
        disclosed_messages: &[Vec<u8>],
        nonce: Option<&[u8]>,
    ) -> Result<bool, Error>
    where
        CS: BbsCiphersuite,
    {
        pk.validate()?;

        let U = self.m_cap.len();
        let R = self.disclosed_indexes.len();
        let L = R + U;

        if pk.message_count() != L {
            return Err(Error::MessageCountMismatch {
                expected: pk.message_count(),
                found: L,
            });
        }
        validate_indexes(&self.disclosed_indexes, L)?;
        if disclosed_messages.len() != R {
            return Err(Error::MessageCountMismatch {
                expected: R,
                found: disclosed_messages.len(),
            });
        }

        let disclosed_scalars = BBSplusMessage::messages_to_scalar::<CS>(disclosed_messages)?;
        core_proof_verify::<CS>(pk, self, &disclosed_scalars, nonce)
    }

    /// Positions disclosed by this proof, ascending.
    pub fn disclosed_indexes(&self) -> &[usize] {
        &self.disclosed_indexes
    }

    /// `I2OSP(L, 2) || bitvector(disclosed) || A' || Abar || D || c ||
    /// e^ || r2^ || r3^ || s^ || m^_1 .. m^_U`
    pub fn to_bytes(&self) -> Vec<u8> {
        let total = self.disclosed_indexes.len() + self.m_cap.len();

        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&i2osp(total, 2));
        bytes.extend_from_slice(&indexes_to_bitvector(total, &self.disclosed_indexes));
        bytes.extend_from_slice(&self.A_prime.to_affine().to_compressed());
        bytes.extend_from_slice(&self.A_bar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.D.to_affine().to_compressed());
        bytes.extend_from_slice(&self.c.to_bytes_be());
        bytes.extend_from_slice(&self.e_cap.to_bytes_be());
        bytes.extend_from_slice(&self.r2_cap.to_bytes_be());
        bytes.extend_from_slice(&self.r3_cap.to_bytes_be());
        bytes.extend_from_slice(&self.s_cap.to_bytes_be());
        self.m_cap
            .iter()
            .for_each(|m| bytes.extend_from_slice(&m.to_bytes_be()));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        const G1_LEN: usize = G1Projective::COMPRESSED_BYTES;

        if bytes.len() < 2 {
            return Err(Error::InvalidProofOfKnowledgeSignature);
        }

        let L = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        let bitvector_len = (L / 8) + 1;
        let offset = 2 + bitvector_len;
        if bytes.len() < offset {
            return Err(Error::InvalidProofOfKnowledgeSignature);
        }

        let disclosed_indexes = bitvector_to_indexes(&bytes[2..offset]);
        let R = disclosed_indexes.len();
        if R > L || disclosed_indexes.iter().any(|&i| i >= L) {
            return Err(Error::InvalidProofOfKnowledgeSignature);
        }
        let U = L - R;

        let expected_len = offset + 3 * G1_LEN + (5 + U) * Scalar::BYTES;
        if bytes.len() != expected_len {
            return Err(Error::InvalidProofOfKnowledgeSignature);
        }

        let parse_point = |slice: &[u8]| -> Result<G1Projective, Error> {
            parse_g1_projective(slice).map_err(|_| Error::InvalidProofOfKnowledgeSignature)
        };
        let parse_scalar = |slice: &[u8]| -> Result<Scalar, Error> {
            let b: [u8; Scalar::BYTES] = slice
                .try_into()
                .map_err(|_| Error::InvalidProofOfKnowledgeSignature)?;
            Scalar::from_bytes_be(&b).map_err(|_| Error::InvalidProofOfKnowledgeSignature)
        };

        let A_prime = parse_point(&bytes[offset..offset + G1_LEN])?;
        let A_bar = parse_point(&bytes[offset + G1_LEN..offset + 2 * G1_LEN])?;
        let D = parse_point(&bytes[offset + 2 * G1_LEN..offset + 3 * G1_LEN])?;

        let mut cursor = offset + 3 * G1_LEN;
        let mut next_scalar = |bytes: &[u8]| -> Result<Scalar, Error> {
            let s = parse_scalar(&bytes[cursor..cursor + Scalar::BYTES])?;
            cursor += Scalar::BYTES;
            Ok(s)
        };

        let c = next_scalar(bytes)?;
        let e_cap = next_scalar(bytes)?;
        let r2_cap = next_scalar(bytes)?;
        let r3_cap = next_scalar(bytes)?;
        let s_cap = next_scalar(bytes)?;

        let mut m_cap: Vec<Scalar> = Vec::with_capacity(U);
        for _ in 0..U {
            m_cap.push(next_scalar(bytes)?);
        }

        Ok(Self {
            A_prime,
            A_bar,
            D,
            c,
            e_cap,
            r2_cap,
            r3_cap,
            s_cap,
            m_cap,
            disclosed_indexes,
        })
    }
}

struct ProofInitResult {
    A_prime: G1Projective,
    A_bar: G1Projective,
    D: G1Projective,
    C1: G1Projective,
    C2: G1Projective,
    domain: Scalar,
}

fn core_proof_gen<CS>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    messages: &[BBSplusMessage],
    disclosed_indexes: &[usize],
    nonce: Option<&[u8]>,
) -> Result<BBSplusPoKSignature, Error>
where
    CS: BbsCiphersuite,
{
    let L = messages.len();
    let mut disclosed_indexes = disclosed_indexes.to_vec();
    disclosed_indexes.sort_unstable();
    let U = L - disclosed_indexes.len();

    let undisclosed_indexes = get_remaining_indexes(L, &disclosed_indexes);
    let disclosed_messages = get_messages(messages, &disclosed_indexes);
    let undisclosed_messages = get_messages(messages, &undisclosed_indexes);

    #[cfg(not(test))]
    let random_scalars = calculate_random_scalars(6 + U);

    #[cfg(test)]
    let random_scalars = seeded_random_scalars::<CS>(
        6 + U,
        SEED_MOCKED_SCALAR,
        &[CS::ID, b"MOCK_RANDOM_SCALARS_DST_"].concat(),
    );

    let init_res = proof_init::<CS>(pk, signature, &random_scalars, messages, &undisclosed_indexes)?;

    let challenge =
        proof_challenge_calculate::<CS>(&init_res, &disclosed_indexes, &disclosed_messages, nonce)?;

    proof_finalize(
        &init_res,
        challenge,
        signature,
        &random_scalars,
        &undisclosed_messages,
        disclosed_indexes,
    )
}

fn proof_init<CS>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    random_scalars: &[Scalar],
    messages: &[BBSplusMessage],
    undisclosed_indexes: &[usize],
) -> Result<ProofInitResult, Error>
where
    CS: BbsCiphersuite,
{
    let U = undisclosed_indexes.len();
    if random_scalars.len() != 6 + U {
        return Err(Error::ProofGenError("Random scalars not valid".to_owned()));
    }

    let domain = calculate_domain::<CS>(pk)?;
    let B = calculate_b(
        pk,
        Generators::create_g1_base_point::<CS>()?,
        signature.s,
        messages,
    );

    let r1 = random_scalars[0];
    let r2 = random_scalars[1];
    let e_tilde = random_scalars[2];
    let r2_tilde = random_scalars[3];
    let r3_tilde = random_scalars[4];
    let s_tilde = random_scalars[5];
    let m_tilde = &random_scalars[6..(6 + U)];

    let A_prime = signature.a * r1;
    let A_bar = A_prime * (-signature.e) + B * r1;
    let D = B * r1 + pk.h0() * r2;

    let C1 = A_prime * e_tilde + pk.h0() * r2_tilde;

    let mut C2 = D * (-r3_tilde) + pk.h0() * s_tilde;
    for (j, &idx) in undisclosed_indexes.iter().enumerate() {
        C2 += pk.message_generators()[idx] * m_tilde[j];
    }

    Ok(ProofInitResult {
        A_prime,
        A_bar,
        D,
        C1,
        C2,
        domain,
    })
}

fn proof_challenge_calculate<CS>(
    init_res: &ProofInitResult,
    disclosed_indexes: &[usize],
    disclosed_messages: &[BBSplusMessage],
    nonce: Option<&[u8]>,
) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
{
    let R = disclosed_indexes.len();
    if disclosed_messages.len() != R {
        return Err(Error::ProofGenError(
            "Number of disclosed indexes different from number of disclosed messages".to_owned(),
        ));
    }

    let nonce = nonce.unwrap_or(b"");

    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(&init_res.A_prime.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.A_bar.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.D.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.C1.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.C2.to_affine().to_compressed());
    c_arr.extend_from_slice(&i2osp(R, 8));
    disclosed_indexes
        .iter()
        .for_each(|&i| c_arr.extend_from_slice(&i2osp(i, 8)));
    disclosed_messages
        .iter()
        .for_each(|m| c_arr.extend_from_slice(&m.value.to_bytes_be()));
    c_arr.extend_from_slice(&init_res.domain.to_bytes_be());
    c_arr.extend_from_slice(&i2osp(nonce.len(), 8));
    c_arr.extend_from_slice(nonce);

    hash_to_scalar::<CS>(&c_arr, &[CS::ID, b"H2S_"].concat())
}

fn proof_finalize(
    init_res: &ProofInitResult,
    challenge: Scalar,
    signature: &BBSplusSignature,
    random_scalars: &[Scalar],
    undisclosed_messages: &[BBSplusMessage],
    disclosed_indexes: Vec<usize>,
) -> Result<BBSplusPoKSignature, Error> {
    let U = undisclosed_messages.len();

    let r1 = random_scalars[0];
    let r2 = random_scalars[1];
    let e_tilde = random_scalars[2];
    let r2_tilde = random_scalars[3];
    let r3_tilde = random_scalars[4];
    let s_tilde = random_scalars[5];
    let m_tilde = &random_scalars[6..(6 + U)];

    let r3 = Option::<Scalar>::from(r1.invert())
        .ok_or_else(|| Error::ProofGenError("r1 is not invertible".to_owned()))?;
    let s_prime = r2 * r3 + signature.s;

    let e_cap = challenge * signature.e + e_tilde;
    let r2_cap = challenge * r2 + r2_tilde;
    let r3_cap = challenge * r3 + r3_tilde;
    let s_cap = challenge * s_prime + s_tilde;

    let mut m_cap: Vec<Scalar> = Vec::with_capacity(U);
    for j in 0..U {
        m_cap.push(challenge * undisclosed_messages[j].value + m_tilde[j]);
    }

    Ok(BBSplusPoKSignature {
        A_prime: init_res.A_prime,
        A_bar: init_res.A_bar,
        D: init_res.D,
        c: challenge,
        e_cap,
        r2_cap,
        r3_cap,
        s_cap,
        m_cap,
        disclosed_indexes,
    })
}

fn core_proof_verify<CS>(
    pk: &BBSplusPublicKey,
    proof: &BBSplusPoKSignature,
    disclosed_messages: &[BBSplusMessage],
    nonce: Option<&[u8]>,
) -> Result<bool, Error>
where
    CS: BbsCiphersuite,
{
    let init_res = proof_verify_init::<CS>(pk, proof, disclosed_messages)?;

    let cv = proof_challenge_calculate::<CS>(
        &init_res,
        &proof.disclosed_indexes,
        disclosed_messages,
        nonce,
    )?;

    if proof.c != cv {
        return Ok(false);
    }

    if proof.A_prime.is_identity().into() {
        return Ok(false);
    }

    let BP2 = G2Projective::GENERATOR;
    let term1 = (
        &proof.A_prime.to_affine(),
        &G2Prepared::from(pk.w().to_affine()),
    );
    let term2 = (&proof.A_bar.to_affine(), &G2Prepared::from(-BP2.to_affine()));

    let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

    Ok(pairing == Gt::IDENTITY)
}

fn proof_verify_init<CS>(
    pk: &BBSplusPublicKey,
    proof: &BBSplusPoKSignature,
    disclosed_messages: &[BBSplusMessage],
) -> Result<ProofInitResult, Error>
where
    CS: BbsCiphersuite,
{
    let U = proof.m_cap.len();
    let R = proof.disclosed_indexes.len();
    let L = R + U;

    let undisclosed_indexes = get_remaining_indexes(L, &proof.disclosed_indexes);
    let domain = calculate_domain::<CS>(pk)?;

    let C1 = (proof.A_bar - proof.D) * proof.c
        + proof.A_prime * proof.e_cap
        + pk.h0() * proof.r2_cap;

    let mut T = Generators::create_g1_base_point::<CS>()?;
    for (i, &idx) in proof.disclosed_indexes.iter().enumerate() {
        T += pk.message_generators()[idx] * disclosed_messages[i].value;
    }

    let mut C2 = T * proof.c + proof.D * (-proof.r3_cap) + pk.h0() * proof.s_cap;
    for (j, &idx) in undisclosed_indexes.iter().enumerate() {
        C2 += pk.message_generators()[idx] * proof.m_cap[j];
    }

    Ok(ProofInitResult {
        A_prime: proof.A_prime,
        A_bar: proof.A_bar,
        D: proof.D,
        C1,
        C2,
        domain,
    })
}
