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
use bls12_381_plus::{G1Projective, Scalar};
use ff::Field;
use group::Group;
use serde::{Deserialize, Serialize};

use super::ciphersuites::BbsCiphersuite;
use super::commitment::{BBSplusCommitment, BlindFactor};
use super::generators::Generators;
use super::keys::{BBSplusPublicKey, BBSplusSecretKey};
use super::signature::BBSplusSignature;
use crate::errors::Error;
use crate::utils::message::BBSplusMessage;
use crate::utils::util::{parse_g1_projective, validate_indexes, ScalarExt};

#[cfg(not(test))]
use crate::utils::random::calculate_random_scalars;
#[cfg(test)]
use crate::utils::random::seeded_random_scalars;

#[cfg(test)]
const SEED_MOCKED_SCALAR: &[u8] = b"3.141592653589793238462643383279";

/// Signature issued over a commitment plus the messages the signer knows.
/// Same `(A, e, s)` shape as [`BBSplusSignature`], but `s` covers only the
/// signer's contribution: the holder must fold in its blinding factor with
/// [`unblind`](Self::unblind) before ordinary verification can succeed.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusBlindSignature {
    pub(crate) a: G1Projective,
    pub(crate) e: Scalar,
    pub(crate) s: Scalar,
}

impl BBSplusBlindSignature {
    pub const BYTES: usize = 112;

    /// # Description
    /// Signer side of blind issuance. Signs the holder's commitment together
    /// with the messages at `known_indexes`, without learning the committed
    /// values. The known positions and the commitment's blinded positions
    /// must partition the key's message slots exactly; an overlap or a gap
    /// is a validation error. The commitment proof is expected to have been
    /// checked with [`BBSplusCommitment::verify_proof`] beforehand — that
    /// check is the trust boundary of the protocol.
    ///
    /// # Inputs:
    /// * `sk` (REQUIRED), the signer's secret key.
    /// * `pk` (REQUIRED), the matching message-count-bound public key.
    /// * `commitment` (REQUIRED), the holder's commitment.
    /// * `known_indexes` (REQUIRED), positions whose values the signer sees.
    /// * `known_messages` (REQUIRED), one octet string per known position.
    ///
    /// # Output:
    /// a [`BBSplusBlindSignature`] or [`Error`].
    ///
    pub fn blind_sign<CS>(
        sk: &BBSplusSecretKey,
        pk: &BBSplusPublicKey,
        commitment: &BBSplusCommitment,
        known_indexes: &[usize],
        known_messages: &[Vec<u8>],
    ) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
    {
        pk.validate()?;
        if known_messages.len() != known_indexes.len() {
            return Err(Error::MessageCountMismatch {
                expected: known_indexes.len(),
                found: known_messages.len(),
            });
        }
        validate_indexes(known_indexes, pk.message_count())?;
        validate_indexes(commitment.blinded_indexes(), pk.message_count())?;

        // known ∪ blinded must cover every slot exactly once
        let mut all_indexes: Vec<usize> = known_indexes.to_vec();
        all_indexes.extend_from_slice(commitment.blinded_indexes());
        all_indexes.sort_unstable();
        if all_indexes.len() != pk.message_count()
            || all_indexes.iter().enumerate().any(|(i, &v)| i != v)
        {
            return Err(Error::InvalidIndexPartition);
        }

        let known_scalars = BBSplusMessage::messages_to_scalar::<CS>(known_messages)?;

        #[cfg(not(test))]
        let random_scalars = calculate_random_scalars(2);

        #[cfg(test)]
        let random_scalars = seeded_random_scalars::<CS>(
            2,
            SEED_MOCKED_SCALAR,
            &[CS::ID, b"MOCK_BLIND_SIGN_SCALARS_DST_"].concat(),
        );

        let e = random_scalars[0];
        let s_second = random_scalars[1];

        // B = P1 + C + h0 * s'' + sum over known positions
        let mut B = Generators::create_g1_base_point::<CS>()?
            + commitment.commitment()
            + pk.h0() * s_second;
        for (&i, m) in known_indexes.iter().zip(known_scalars.iter()) {
            B += pk.message_generators()[i] * m.value;
        }

        let sk_plus_e = sk.0 + e;
        if sk_plus_e.is_zero().into() {
            return Err(Error::BlindSignError("SK + e == 0".to_owned()));
        }

        let inverse = Option::<Scalar>::from(sk_plus_e.invert())
            .ok_or_else(|| Error::BlindSignError("SK + e is not invertible".to_owned()))?;
        let A = B * inverse;

        if A.is_identity().into() {
            return Err(Error::BlindSignError("A == Identity_G1".to_owned()));
        }

        Ok(Self {
            a: A,
            e,
            s: s_second,
        })
    }

    /// Removes the holder's blinding contribution: `s = s'' + s'`. Purely
    /// algebraic; the result verifies as an ordinary signature over the full
    /// message vector only when the factor is the one used at commit time.
    pub fn unblind(&self, blind_factor: &BlindFactor) -> BBSplusSignature {
        BBSplusSignature {
            a: self.a,
            e: self.e,
            s: self.s + blind_factor.0,
        }
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

#[cfg(test)]
mod tests {
    use super::BBSplusBlindSignature;
    use crate::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};
    use crate::bbsplus::commitment::BBSplusCommitment;
    use crate::bbsplus::keys::BBSplusKeyPair;
    use crate::errors::Error;

    const IKM: &[u8] = b"an-IKM-of-at-least-thirty-two-octets";

    fn partition_is_enforced<CS: BbsCiphersuite>() {
        let keypair = BBSplusKeyPair::generate::<CS>(Some(IKM), 3).unwrap();
        let (sk, pk) = (keypair.private_key(), keypair.public_key());

        let nonce = b"signer session nonce".to_vec();
        let (commitment, _) =
            BBSplusCommitment::commit::<CS>(pk, &[1], &[b"hidden".to_vec()], &nonce).unwrap();

        let known = vec![b"known-0".to_vec(), b"known-2".to_vec()];

        // overlap: position 1 appears on both sides
        assert_eq!(
            BBSplusBlindSignature::blind_sign::<CS>(sk, pk, &commitment, &[0, 1], &known)
                .unwrap_err(),
            Error::InvalidIndexPartition
        );

        // gap: position 2 appears on neither side
        assert_eq!(
            BBSplusBlindSignature::blind_sign::<CS>(sk, pk, &commitment, &[0], &known[..1])
                .unwrap_err(),
            Error::InvalidIndexPartition
        );

        assert!(
            BBSplusBlindSignature::blind_sign::<CS>(sk, pk, &commitment, &[0, 2], &known).is_ok()
        );
    }

    #[test]
    fn partition_is_enforced_sha256() {
        partition_is_enforced::<Bls12381Sha256>();
    }

    #[test]
    fn partition_is_enforced_shake256() {
        partition_is_enforced::<Bls12381Shake256>();
    }
}
