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
use serde::{Deserialize, Serialize};

use super::ciphersuites::BbsCiphersuite;
use super::keys::BBSplusPublicKey;
use crate::errors::Error;
use crate::utils::message::BBSplusMessage;
use crate::utils::util::{
    calculate_blind_challenge, i2osp, parse_g1_projective, validate_indexes, ScalarExt,
};

#[cfg(not(test))]
use crate::utils::random::calculate_random_scalars;
#[cfg(test)]
use crate::utils::random::seeded_random_scalars;

#[cfg(test)]
const SEED_MOCKED_SCALAR: &[u8] = b"3.141592653589793238462643383279";

/// The holder's secret blinding scalar. Generated with the commitment,
/// consumed once by unblinding, never reused across commitments. Scrubbed
/// on drop.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlindFactor(pub(crate) Scalar);

impl BlindFactor {
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: &[u8; Scalar::BYTES]) -> Result<Self, Error> {
        Ok(Self(Scalar::from_bytes_be(bytes)?))
    }
}

impl Drop for BlindFactor {
    fn drop(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

/// Schnorr proof of knowledge of the committed message scalars and the
/// blinding factor: one response per hidden message, one for the blinding
/// factor, and the nonce-bound challenge.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusZKPoK {
    pub(crate) s_cap: Scalar,
    pub(crate) m_cap: Vec<Scalar>,
    pub(crate) challenge: Scalar,
}

impl BBSplusZKPoK {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&self.s_cap.to_bytes_be());
        bytes.extend_from_slice(&self.challenge.to_bytes_be());
        self.m_cap
            .iter()
            .for_each(|m| bytes.extend_from_slice(&m.to_bytes_be()));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 2 * Scalar::BYTES || bytes.len() % Scalar::BYTES != 0 {
            return Err(Error::InvalidCommitmentProof);
        }

        let parse_scalar = |slice: &[u8]| -> Result<Scalar, Error> {
            let b: [u8; Scalar::BYTES] = slice
                .try_into()
                .map_err(|_| Error::InvalidCommitmentProof)?;
            Scalar::from_bytes_be(&b).map_err(|_| Error::InvalidCommitmentProof)
        };

        let s_cap = parse_scalar(&bytes[0..Scalar::BYTES])?;
        let challenge = parse_scalar(&bytes[Scalar::BYTES..2 * Scalar::BYTES])?;

        let mut m_cap: Vec<Scalar> = Vec::new();
        for chunk in bytes[2 * Scalar::BYTES..].chunks_exact(Scalar::BYTES) {
            m_cap.push(parse_scalar(chunk)?);
        }

        Ok(Self {
            s_cap,
            m_cap,
            challenge,
        })
    }
}

/// Pedersen-style commitment to the messages the holder keeps hidden during
/// blind issuance, bundled with the positions it blinds and the proof of
/// knowledge the signer checks before signing. The positions are public
/// protocol data; only the message values stay secret.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusCommitment {
    pub(crate) commitment: G1Projective,
    pub(crate) blinded_indexes: Vec<usize>,
    pub(crate) proof: BBSplusZKPoK,
}

impl BBSplusCommitment {
    /// # Description
    /// Holder side of blind issuance: commits to the messages at
    /// `blinded_indexes` under the matching generators of `pk`, and proves
    /// knowledge of them and of the fresh blinding factor. The nonce is the
    /// signer's session value and must be non-empty; it is bound into the
    /// challenge so a stale commitment cannot be replayed in a new session.
    ///
    /// # Inputs:
    /// * `pk` (REQUIRED), the signer's public key.
    /// * `blinded_indexes` (REQUIRED), the positions kept hidden, unique and
    ///   in range of the key.
    /// * `hidden_messages` (REQUIRED), one octet string per blinded
    ///   position, in the same order.
    /// * `nonce` (REQUIRED), non-empty session nonce from the signer.
    ///
    /// # Output:
    /// ([`BBSplusCommitment`], [`BlindFactor`]) or [`Error`].
    ///
    pub fn commit<CS>(
        pk: &BBSplusPublicKey,
        blinded_indexes: &[usize],
        hidden_messages: &[Vec<u8>],
        nonce: &[u8],
    ) -> Result<(Self, BlindFactor), Error>
    where
        CS: BbsCiphersuite,
    {
        if nonce.is_empty() {
            return Err(Error::MissingNonce);
        }
        pk.validate()?;
        validate_indexes(blinded_indexes, pk.message_count())?;
        if hidden_messages.len() != blinded_indexes.len() {
            return Err(Error::MessageCountMismatch {
                expected: blinded_indexes.len(),
                found: hidden_messages.len(),
            });
        }

        let M = blinded_indexes.len();
        let hidden_scalars = BBSplusMessage::messages_to_scalar::<CS>(hidden_messages)?;

        let mut bases: Vec<G1Projective> = Vec::with_capacity(M + 1);
        bases.push(pk.h0());
        for &i in blinded_indexes {
            bases.push(pk.message_generators()[i]);
        }

        #[cfg(not(test))]
        let random_scalars = calculate_random_scalars(M + 2);

        #[cfg(test)]
        let random_scalars = seeded_random_scalars::<CS>(
            M + 2,
            SEED_MOCKED_SCALAR,
            &[CS::ID, b"MOCK_RANDOM_SCALARS_DST_"].concat(),
        );

        let s_prime = random_scalars[0];
        let s_tilde = random_scalars[1];
        let m_tilde = &random_scalars[2..(M + 2)];

        let mut commitment = bases[0] * s_prime;
        for i in 0..M {
            commitment += bases[i + 1] * hidden_scalars[i].value;
        }

        let mut Cbar = bases[0] * s_tilde;
        for i in 0..M {
            Cbar += bases[i + 1] * m_tilde[i];
        }

        let challenge =
            calculate_blind_challenge::<CS>(commitment, Cbar, &bases, blinded_indexes, nonce)?;

        let s_cap = s_tilde + s_prime * challenge;
        let mut m_cap: Vec<Scalar> = Vec::with_capacity(M);
        for i in 0..M {
            m_cap.push(m_tilde[i] + hidden_scalars[i].value * challenge);
        }

        let proof = BBSplusZKPoK {
            s_cap,
            m_cap,
            challenge,
        };

        Ok((
            Self {
                commitment,
                blinded_indexes: blinded_indexes.to_vec(),
                proof,
            },
            BlindFactor(s_prime),
        ))
    }

    /// # Description
    /// Signer side: recomputes the Fiat-Shamir challenge over the same
    /// transcript and checks the proof of knowledge. `Ok(false)` on any
    /// mismatch — a signer must refuse to blind-sign in that case. The
    /// holder's blinding factor plays no part here.
    ///
    pub fn verify_proof<CS>(&self, pk: &BBSplusPublicKey, nonce: &[u8]) -> Result<bool, Error>
    where
        CS: BbsCiphersuite,
    {
        if nonce.is_empty() {
            return Err(Error::MissingNonce);
        }
        pk.validate()?;
        validate_indexes(&self.blinded_indexes, pk.message_count())?;
        let M = self.blinded_indexes.len();
        if self.proof.m_cap.len() != M {
            return Err(Error::InvalidCommitmentProof);
        }

        let mut bases: Vec<G1Projective> = Vec::with_capacity(M + 1);
        bases.push(pk.h0());
        for &i in &self.blinded_indexes {
            bases.push(pk.message_generators()[i]);
        }

        let mut Cbar = bases[0] * self.proof.s_cap;
        for i in 0..M {
            Cbar += bases[i + 1] * self.proof.m_cap[i];
        }
        Cbar += self.commitment * (-self.proof.challenge);

        let cv = calculate_blind_challenge::<CS>(
            self.commitment,
            Cbar,
            &bases,
            &self.blinded_indexes,
            nonce,
        )?;

        Ok(cv == self.proof.challenge)
    }

    pub fn commitment(&self) -> G1Projective {
        self.commitment
    }

    pub fn blinded_indexes(&self) -> &[usize] {
        &self.blinded_indexes
    }

    /// `C || I2OSP(B, 8) || index_1 .. index_B || proof`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&self.commitment.to_affine().to_compressed());
        bytes.extend_from_slice(&i2osp(self.blinded_indexes.len(), 8));
        self.blinded_indexes
            .iter()
            .for_each(|&i| bytes.extend_from_slice(&i2osp(i, 8)));
        bytes.extend_from_slice(&self.proof.to_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        const G1_LEN: usize = G1Projective::COMPRESSED_BYTES;

        if bytes.len() < G1_LEN + 8 {
            return Err(Error::InvalidCommitment);
        }

        let commitment =
            parse_g1_projective(&bytes[0..G1_LEN]).map_err(|_| Error::InvalidCommitment)?;

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&bytes[G1_LEN..G1_LEN + 8]);
        let B = u64::from_be_bytes(count_bytes) as usize;

        let indexes_end = G1_LEN + 8 + B * 8;
        if bytes.len() < indexes_end {
            return Err(Error::InvalidCommitment);
        }

        let mut blinded_indexes: Vec<usize> = Vec::with_capacity(B);
        for i in 0..B {
            let mut index_bytes = [0u8; 8];
            index_bytes.copy_from_slice(&bytes[G1_LEN + 8 + i * 8..G1_LEN + 8 + (i + 1) * 8]);
            blinded_indexes.push(u64::from_be_bytes(index_bytes) as usize);
        }

        let proof = BBSplusZKPoK::from_bytes(&bytes[indexes_end..])?;
        if proof.m_cap.len() != B {
            return Err(Error::InvalidCommitmentProof);
        }

        Ok(Self {
            commitment,
            blinded_indexes,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::BBSplusCommitment;
    use crate::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};
    use crate::bbsplus::keys::BBSplusKeyPair;
    use crate::errors::Error;

    const IKM: &[u8] = b"an-IKM-of-at-least-thirty-two-octets";

    fn commit_and_verify<CS: BbsCiphersuite>() {
        let keypair = BBSplusKeyPair::generate::<CS>(Some(IKM), 3).unwrap();
        let pk = keypair.public_key();

        let hidden = vec![b"hidden".to_vec()];
        let nonce = b"signer session nonce".to_vec();

        let (commitment, _blind_factor) =
            BBSplusCommitment::commit::<CS>(pk, &[1], &hidden, &nonce).unwrap();

        assert_eq!(commitment.verify_proof::<CS>(pk, &nonce), Ok(true));
        assert_eq!(
            commitment.verify_proof::<CS>(pk, b"a different nonce"),
            Ok(false)
        );
        assert_eq!(
            commitment.verify_proof::<CS>(pk, b""),
            Err(Error::MissingNonce)
        );

        let round_trip = BBSplusCommitment::from_bytes(&commitment.to_bytes()).unwrap();
        assert_eq!(round_trip, commitment);
    }

    #[test]
    fn commit_and_verify_sha256() {
        commit_and_verify::<Bls12381Sha256>();
    }

    #[test]
    fn commit_and_verify_shake256() {
        commit_and_verify::<Bls12381Shake256>();
    }

    fn commit_input_validation<CS: BbsCiphersuite>() {
        let keypair = BBSplusKeyPair::generate::<CS>(Some(IKM), 3).unwrap();
        let pk = keypair.public_key();
        let hidden = vec![b"hidden".to_vec()];

        assert_eq!(
            BBSplusCommitment::commit::<CS>(pk, &[1], &hidden, b"").unwrap_err(),
            Error::MissingNonce
        );
        assert_eq!(
            BBSplusCommitment::commit::<CS>(pk, &[3], &hidden, b"nonce").unwrap_err(),
            Error::IndexOutOfBounds {
                index: 3,
                message_count: 3
            }
        );
        assert_eq!(
            BBSplusCommitment::commit::<CS>(pk, &[1, 1], &[hidden[0].clone(), hidden[0].clone()], b"nonce")
                .unwrap_err(),
            Error::DuplicateIndex(1)
        );
        assert!(matches!(
            BBSplusCommitment::commit::<CS>(pk, &[0, 1], &hidden, b"nonce").unwrap_err(),
            Error::MessageCountMismatch { .. }
        ));
    }

    #[test]
    fn commit_input_validation_sha256() {
        commit_input_validation::<Bls12381Sha256>();
    }

    #[test]
    fn commit_input_validation_shake256() {
        commit_input_validation::<Bls12381Shake256>();
    }
}
