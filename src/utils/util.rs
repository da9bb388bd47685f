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
use bls12_381_plus::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use elliptic_curve::hash2curve::{ExpandMsg, Expander};

use crate::bbsplus::ciphersuites::BbsCiphersuite;
use crate::bbsplus::keys::BBSplusPublicKey;
use crate::errors::Error;
use crate::utils::message::BBSplusMessage;

/// I2OSP with `len` at most 8.
pub fn i2osp(value: usize, len: usize) -> Vec<u8> {
    let bytes = (value as u64).to_be_bytes();
    bytes[bytes.len() - len..].to_vec()
}

/// Maps an octet string to a non-zero scalar, retrying with an appended
/// counter octet until the expanded bytes land outside the zero class.
pub fn hash_to_scalar<CS>(msg_octets: &[u8], dst: &[u8]) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
{
    let mut uniform_bytes = vec![0u8; CS::EXPAND_LEN];

    for counter in 0u8..=255 {
        let msg_prime = [msg_octets, &counter.to_be_bytes()].concat();
        CS::Expander::expand_message(&[&msg_prime], &[dst], CS::EXPAND_LEN)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut uniform_bytes);
        let hashed_scalar = Scalar::from_okm(
            uniform_bytes
                .as_slice()
                .try_into()
                .map_err(|_| Error::HashToScalarError)?,
        );
        if hashed_scalar != Scalar::ZERO {
            return Ok(hashed_scalar);
        }
    }

    Err(Error::HashToScalarError)
}

/// Multi-scalar variant of [`hash_to_scalar`]: one expansion of
/// `count * EXPAND_LEN` bytes, re-expanded as a whole whenever any chunk
/// maps to zero.
pub fn hash_to_scalars<CS>(msg_octets: &[u8], count: usize, dst: &[u8]) -> Result<Vec<Scalar>, Error>
where
    CS: BbsCiphersuite,
{
    let len_in_bytes = count * CS::EXPAND_LEN;
    let mut uniform_bytes = vec![0u8; len_in_bytes];
    let mut scalars: Vec<Scalar> = Vec::with_capacity(count);

    for t in 0u8..=255 {
        scalars.clear();
        let msg_prime = [msg_octets, &t.to_be_bytes()[..], i2osp(count, 4).as_slice()].concat();
        CS::Expander::expand_message(&[&msg_prime], &[dst], len_in_bytes)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut uniform_bytes);

        for i in 0..count {
            let tv = &uniform_bytes[i * CS::EXPAND_LEN..(i + 1) * CS::EXPAND_LEN];
            let scalar_i =
                Scalar::from_okm(tv.try_into().map_err(|_| Error::HashToScalarError)?);
            if scalar_i == Scalar::ZERO {
                break;
            }
            scalars.push(scalar_i);
        }

        if scalars.len() == count {
            return Ok(scalars);
        }
    }

    Err(Error::HashToScalarError)
}

/// Scalar binding the public key, its full generator sequence and the
/// ciphersuite identifier. Feeds the deterministic signature randomizers and
/// the proof transcript.
pub(crate) fn calculate_domain<CS>(pk: &BBSplusPublicKey) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
{
    let L = pk.message_count();

    let mut dom_octs: Vec<u8> = Vec::new();
    dom_octs.extend_from_slice(&i2osp(L, 8));
    dom_octs.extend_from_slice(&pk.h0().to_affine().to_compressed());
    pk.message_generators()
        .iter()
        .for_each(|h| dom_octs.extend_from_slice(&h.to_affine().to_compressed()));
    dom_octs.extend_from_slice(CS::ID);

    let mut dom_input: Vec<u8> = Vec::new();
    dom_input.extend_from_slice(&pk.w_bytes());
    dom_input.extend_from_slice(&dom_octs);

    hash_to_scalar::<CS>(&dom_input, &[CS::ID, b"H2S_"].concat())
}

/// Fiat-Shamir challenge for the proof of knowledge of hidden messages:
/// commitment, Schnorr commitment, the bases in use, the blinded positions
/// and the session nonce.
pub(crate) fn calculate_blind_challenge<CS>(
    commitment: G1Projective,
    c_bar: G1Projective,
    bases: &[G1Projective],
    blinded_indexes: &[usize],
    nonce: &[u8],
) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
{
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(&commitment.to_affine().to_compressed());
    c_arr.extend_from_slice(&c_bar.to_affine().to_compressed());
    c_arr.extend_from_slice(&i2osp(bases.len(), 8));
    bases
        .iter()
        .for_each(|b| c_arr.extend_from_slice(&b.to_affine().to_compressed()));
    c_arr.extend_from_slice(&i2osp(blinded_indexes.len(), 8));
    blinded_indexes
        .iter()
        .for_each(|&i| c_arr.extend_from_slice(&i2osp(i, 8)));
    c_arr.extend_from_slice(&i2osp(nonce.len(), 8));
    c_arr.extend_from_slice(nonce);

    hash_to_scalar::<CS>(&c_arr, &[CS::ID, b"BLIND_H2S_"].concat())
}

/// Rejects anything that is not the canonical compressed encoding of a
/// G1 subgroup point.
pub fn parse_g1_projective(bytes: &[u8]) -> Result<G1Projective, Error> {
    let compressed: [u8; G1Projective::COMPRESSED_BYTES] = bytes.try_into().map_err(|_| {
        Error::DeserializationError("invalid length for a compressed G1 point".to_owned())
    })?;
    let point = G1Affine::from_compressed(&compressed);
    if point.is_none().into() {
        return Err(Error::DeserializationError(
            "non-canonical G1 point".to_owned(),
        ));
    }
    Ok(G1Projective::from(point.unwrap()))
}

/// Rejects anything that is not the canonical compressed encoding of a
/// G2 subgroup point.
pub fn parse_g2_projective(bytes: &[u8]) -> Result<G2Projective, Error> {
    let compressed: [u8; G2Affine::COMPRESSED_BYTES] = bytes.try_into().map_err(|_| {
        Error::DeserializationError("invalid length for a compressed G2 point".to_owned())
    })?;
    let point = G2Affine::from_compressed(&compressed);
    if point.is_none().into() {
        return Err(Error::DeserializationError(
            "non-canonical G2 point".to_owned(),
        ));
    }
    Ok(G2Projective::from(point.unwrap()))
}

/// Every index must fall in `[0, message_count)` and appear at most once.
pub(crate) fn validate_indexes(indexes: &[usize], message_count: usize) -> Result<(), Error> {
    let mut seen = vec![false; message_count];
    for &index in indexes {
        if index >= message_count {
            return Err(Error::IndexOutOfBounds {
                index,
                message_count,
            });
        }
        if seen[index] {
            return Err(Error::DuplicateIndex(index));
        }
        seen[index] = true;
    }
    Ok(())
}

pub fn get_remaining_indexes(length: usize, indexes: &[usize]) -> Vec<usize> {
    let mut remaining: Vec<usize> = Vec::new();
    for i in 0..length {
        if !indexes.contains(&i) {
            remaining.push(i);
        }
    }
    remaining
}

pub fn get_messages(messages: &[BBSplusMessage], indexes: &[usize]) -> Vec<BBSplusMessage> {
    let mut out: Vec<BBSplusMessage> = Vec::new();
    for i in indexes {
        out.push(messages[*i]);
    }
    out
}

/// Index set to big-endian bitvector, one bit per message position.
pub fn indexes_to_bitvector(total: usize, indexes: &[usize]) -> Vec<u8> {
    let mut bytes = vec![0u8; (total / 8) + 1];

    for r in indexes {
        let idx = *r / 8;
        let bit = (*r % 8) as u8;
        bytes[idx] |= 1u8 << bit;
    }

    bytes.reverse();
    bytes
}

/// Inverse of [`indexes_to_bitvector`]; yields indexes in ascending order.
pub fn bitvector_to_indexes(data: &[u8]) -> Vec<usize> {
    let mut indexes = Vec::new();
    let mut position = 0;

    for b in data.iter().rev() {
        let mut v = *b;
        let mut remaining = 8;
        while v > 0 {
            if v & 1u8 == 1 {
                indexes.push(position);
            }
            v >>= 1;
            position += 1;
            remaining -= 1;
        }
        position += remaining;
    }

    indexes
}

pub(crate) fn serialize_scalars(scalars: &[Scalar]) -> Vec<u8> {
    let mut result: Vec<u8> = Vec::with_capacity(scalars.len() * Scalar::BYTES);
    scalars
        .iter()
        .for_each(|s| result.extend_from_slice(&s.to_be_bytes()));
    result
}

pub trait ScalarExt {
    fn to_bytes_be(&self) -> [u8; 32];
    fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self, Error>
    where
        Self: Sized;
}

impl ScalarExt for Scalar {
    fn to_bytes_be(&self) -> [u8; 32] {
        self.to_be_bytes()
    }

    fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self, Error> {
        Option::<Scalar>::from(Scalar::from_be_bytes(bytes))
            .ok_or_else(|| Error::DeserializationError("non-canonical scalar".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::{bitvector_to_indexes, indexes_to_bitvector, validate_indexes};
    use crate::errors::Error;

    #[test]
    fn bitvector_round_trip() {
        let indexes = [0usize, 2, 9];
        let bv = indexes_to_bitvector(10, &indexes);
        assert_eq!(bitvector_to_indexes(&bv), indexes.to_vec());
    }

    #[test]
    fn bitvector_empty() {
        let bv = indexes_to_bitvector(4, &[]);
        assert!(bitvector_to_indexes(&bv).is_empty());
    }

    #[test]
    fn index_validation() {
        assert!(validate_indexes(&[0, 2, 1], 3).is_ok());
        assert_eq!(
            validate_indexes(&[0, 3], 3),
            Err(Error::IndexOutOfBounds {
                index: 3,
                message_count: 3
            })
        );
        assert_eq!(validate_indexes(&[1, 1], 3), Err(Error::DuplicateIndex(1)));
    }
}
