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

use bls12_381_plus::G1Projective;
use elliptic_curve::hash2curve::{ExpandMsg, Expander};

use super::ciphersuites::BbsCiphersuite;
use crate::errors::Error;
use crate::utils::util::i2osp;

/// Pseudo-random G1 points backing a public key: `q1` pairs with the
/// signature randomizer `s`, `message_generators[i]` with message slot `i`.
/// Derivation is a pure function of the seed, so a public key and its
/// generator sequence can always be re-expanded from the G2 point alone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Generators {
    pub g1_base_point: G1Projective,
    pub q1: G1Projective,
    pub message_generators: Vec<G1Projective>,
}

impl Generators {
    /// Expands `message_count + 1` distinct points from `seed` (the
    /// ciphersuite seed when none is given).
    pub fn create<CS>(seed: Option<&[u8]>, message_count: usize) -> Result<Generators, Error>
    where
        CS: BbsCiphersuite,
    {
        let seed = seed.unwrap_or(CS::GENERATOR_SEED_DST);
        let base_point = Self::create_g1_base_point::<CS>()?;

        let mut generators: Vec<G1Projective> = Vec::with_capacity(message_count + 1);
        let mut v = vec![0u8; CS::EXPAND_LEN];
        let mut buffer = vec![0u8; CS::EXPAND_LEN];

        CS::Expander::expand_message(&[seed], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut v);

        let mut n = 1u32;
        while generators.len() < message_count + 1 {
            v.append(&mut n.to_be_bytes().to_vec());
            CS::Expander::expand_message(&[&v], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
                .map_err(|_| Error::HashToScalarError)?
                .fill_bytes(&mut buffer);
            v = buffer.clone();
            n += 1;
            let candidate = G1Projective::hash::<CS::Expander>(&v, CS::GENERATOR_DST);
            if !generators.contains(&candidate) && candidate != base_point {
                generators.push(candidate);
            }
        }

        Ok(Generators {
            g1_base_point: base_point,
            q1: generators[0],
            message_generators: generators[1..].to_vec(),
        })
    }

    pub(crate) fn create_g1_base_point<CS>() -> Result<G1Projective, Error>
    where
        CS: BbsCiphersuite,
    {
        let mut v = vec![0u8; CS::EXPAND_LEN];
        CS::Expander::expand_message(
            &[CS::GENERATOR_SEED_BP],
            &[CS::GENERATOR_SEED_DST],
            CS::EXPAND_LEN,
        )
        .map_err(|_| Error::HashToScalarError)?
        .fill_bytes(&mut v);

        let buffer = [v.as_slice(), i2osp(1, 4).as_slice()].concat();
        CS::Expander::expand_message(&[&buffer], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut v);

        Ok(G1Projective::hash::<CS::Expander>(&v, CS::GENERATOR_DST))
    }
}

#[cfg(test)]
mod tests {
    use super::Generators;
    use crate::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};

    fn distinct_and_deterministic<CS: BbsCiphersuite>() {
        let a = Generators::create::<CS>(Some(b"test seed"), 4).unwrap();
        let b = Generators::create::<CS>(Some(b"test seed"), 4).unwrap();
        assert_eq!(a, b);

        let c = Generators::create::<CS>(Some(b"other seed"), 4).unwrap();
        assert_ne!(a.q1, c.q1);

        let mut points = vec![a.g1_base_point, a.q1];
        points.extend_from_slice(&a.message_generators);
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert_ne!(points[i], points[j]);
            }
        }
    }

    #[test]
    fn generators_sha256() {
        distinct_and_deterministic::<Bls12381Sha256>();
    }

    #[test]
    fn generators_shake256() {
        distinct_and_deterministic::<Bls12381Shake256>();
    }
}
