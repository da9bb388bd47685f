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
use ff::Field;
use group::Group;
use serde::{Deserialize, Serialize};

use super::ciphersuites::BbsCiphersuite;
use super::generators::Generators;
use super::keys::{BBSplusPublicKey, BBSplusSecretKey};
use crate::errors::Error;
use crate::utils::message::BBSplusMessage;
use crate::utils::util::{
    calculate_domain, hash_to_scalars, parse_g1_projective, serialize_scalars, ScalarExt,
};

/// BBS+ signature over an ordered message vector: one G1 point and the two
/// scalars `(e, s)` folded into it. Constant size regardless of how many
/// messages the key binds.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusSignature {
    pub(crate) a: G1Projective,
    pub(crate) e: Scalar,
    pub(crate) s: Scalar,
}

impl BBSplusSignature {
    pub const BYTES: usize = 112;

    /// # Description
    /// Signs an ordered message vector. The vector length must equal the
    /// public key's message count. The randomizers `(e, s)` are derived by
    /// hashing the secret key, the key domain and the message scalars, so
    /// two different vectors under the same key can never share them.
    ///
    /// # Inputs:
    /// * `messages` (REQUIRED), the octet strings to sign, in order.
    /// * `sk` (REQUIRED), the signer's secret key.
    /// * `pk` (REQUIRED), the message-count-bound public key of `sk`.
    ///
    /// # Output:
    /// a [`BBSplusSignature`] or [`Error`].
    ///
    pub fn sign<CS>(
        messages: &[Vec<u8>],
        sk: &BBSplusSecretKey,
        pk: &BBSplusPublicKey,
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

        let message_scalars = BBSplusMessage::messages_to_scalar::<CS>(messages)?;
        core_sign::<CS>(sk, pk, &message_scalars)
    }

    /// # Description
    /// Checks the pairing equation binding this signature, the public key
    /// and the message vector. `Ok(false)` means a well-formed signature
    /// that does not match; malformed or wrong-length inputs are errors.
    ///
    pub fn verify<CS>(&self, pk: &BBSplusPublicKey, messages: &[Vec<u8>]) -> Result<bool, Error>
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

        let message_scalars = BBSplusMessage::messages_to_scalar::<CS>(messages)?;
        core_verify::<CS>(pk, self, &message_scalars)
    }

    pub fn a(&self) -> G1Projective {
        self.a
    }

    pub fn e(&self) -> Scalar {
        self.e
    }

    pub fn s(&self) -> Scalar {
        self.s
    }

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[0..48].copy_from_slice(&self.a.to_affine().to_compressed());
        bytes[48..80].copy_from_slice(&self.e.to_bytes_be());
        bytes[80..112].copy_from_slice(&self.s.to_bytes_be());
        bytes
    }

    pub fn from_bytes(data: &[u8; Self::BYTES]) -> Result<Self, Error> {
        let a = parse_g1_projective(&data[0..48]).map_err(|_| Error::InvalidSignature)?;
        let e_bytes: [u8; 32] = data[48..80].try_into().map_err(|_| Error::InvalidSignature)?;
        let e = Scalar::from_bytes_be(&e_bytes).map_err(|_| Error::InvalidSignature)?;
        let s_bytes: [u8; 32] = data[80..112].try_into().map_err(|_| Error::InvalidSignature)?;
        let s = Scalar::from_bytes_be(&s_bytes).map_err(|_| Error::InvalidSignature)?;

        Ok(Self { a, e, s })
    }
}

/// `B = P1 + h0 * s + h_1 * msg_1 + ... + h_L * msg_L`
pub(crate) fn calculate_b(
    pk: &BBSplusPublicKey,
    base_point: G1Projective,
    s: Scalar,
    messages: &[BBSplusMessage],
) -> G1Projective {
    let mut B = base_point + pk.h0() * s;
    for (h_i, m) in pk.message_generators().iter().zip(messages) {
        B += h_i * m.value;
    }
    B
}

pub(crate) fn core_sign<CS>(
    sk: &BBSplusSecretKey,
    pk: &BBSplusPublicKey,
    messages: &[BBSplusMessage],
) -> Result<BBSplusSignature, Error>
where
    CS: BbsCiphersuite,
{
    let domain = calculate_domain::<CS>(pk)?;

    // e and s must never repeat across two different vectors under one key
    let mut e_s_input: Vec<Scalar> = Vec::with_capacity(messages.len() + 2);
    e_s_input.push(sk.0);
    e_s_input.push(domain);
    messages.iter().for_each(|m| e_s_input.push(m.value));

    let scalars = hash_to_scalars::<CS>(
        &serialize_scalars(&e_s_input),
        2,
        &[CS::ID, b"H2S_"].concat(),
    )?;
    let e = scalars[0];
    let s = scalars[1];

    let B = calculate_b(
        pk,
        Generators::create_g1_base_point::<CS>()?,
        s,
        messages,
    );

    let sk_plus_e = sk.0 + e;
    if sk_plus_e.is_zero().into() {
        return Err(Error::SignatureGenerationError("SK + e == 0".to_owned()));
    }

    // A = B * (1 / (SK + e))
    let inverse = Option::<Scalar>::from(sk_plus_e.invert())
        .ok_or_else(|| Error::SignatureGenerationError("SK + e is not invertible".to_owned()))?;
    let A = B * inverse;

    if A.is_identity().into() {
        return Err(Error::SignatureGenerationError(
            "A == Identity_G1".to_owned(),
        ));
    }

    Ok(BBSplusSignature { a: A, e, s })
}

pub(crate) fn core_verify<CS>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    messages: &[BBSplusMessage],
) -> Result<bool, Error>
where
    CS: BbsCiphersuite,
{
    if signature.a.is_identity().into() {
        return Ok(false);
    }

    let B = calculate_b(
        pk,
        Generators::create_g1_base_point::<CS>()?,
        signature.s,
        messages,
    );

    let BP2 = G2Projective::GENERATOR;
    let A2 = pk.w() + BP2 * signature.e;

    let term1 = (&signature.a.to_affine(), &G2Prepared::from(A2.to_affine()));
    let term2 = (&B.to_affine(), &G2Prepared::from(-BP2.to_affine()));

    let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

    Ok(pairing == Gt::IDENTITY)
}
