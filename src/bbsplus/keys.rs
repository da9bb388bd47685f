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
use bls12_381_plus::{G1Projective, G2Affine, G2Projective, Scalar};
use group::Group;
use serde::{Deserialize, Serialize};

use super::ciphersuites::BbsCiphersuite;
use super::generators::Generators;
use crate::bls::keys::{gen_sk, BlsPublicKey, BlsSecretKey};
use crate::errors::Error;
use crate::utils::util::{i2osp, parse_g1_projective, parse_g2_projective};

/// Signing scalar. Never leaves the signer; scrubbed on drop.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusSecretKey(pub(crate) Scalar);

impl BBSplusSecretKey {
    //in BE order
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; Scalar::BYTES] = bytes.try_into().map_err(|_| Error::InvalidKey)?;
        let s = Option::<Scalar>::from(Scalar::from_be_bytes(&bytes)).ok_or(Error::InvalidKey)?;
        Ok(Self(s))
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Drop for BBSplusSecretKey {
    fn drop(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

/// Message-count-bound public key: the G2 point `w = g2 * x` plus the
/// generator `h0` used by the signature randomizer and one generator per
/// message slot. The generator sequence is a pure expansion of `w`, so two
/// parties deriving a key for the same `w` and count always agree on it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPublicKey {
    pub(crate) w: G2Projective,
    pub(crate) h0: G1Projective,
    pub(crate) h: Vec<G1Projective>,
}

impl BBSplusPublicKey {
    /// Number of message slots this key can sign and verify. Fixed at
    /// derivation time; every operation checks its message vector against it.
    pub fn message_count(&self) -> usize {
        self.h.len()
    }

    pub fn w(&self) -> G2Projective {
        self.w
    }

    pub(crate) fn h0(&self) -> G1Projective {
        self.h0
    }

    pub(crate) fn message_generators(&self) -> &[G1Projective] {
        &self.h
    }

    pub(crate) fn w_bytes(&self) -> [u8; G2Affine::COMPRESSED_BYTES] {
        self.w.to_affine().to_compressed()
    }

    /// Expands `message_count + 1` generators from the compressed form of
    /// `w`. Pure and deterministic.
    pub(crate) fn derive_from<CS>(w: G2Projective, message_count: usize) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
    {
        let seed = w.to_affine().to_compressed();
        let generators = Generators::create::<CS>(Some(&seed), message_count)?;

        Ok(Self {
            w,
            h0: generators.q1,
            h: generators.message_generators,
        })
    }

    /// Identity-point checks on every component. Run before any arithmetic
    /// on a deserialized key.
    pub fn validate(&self) -> Result<(), Error> {
        if self.w.is_identity().into() {
            return Err(Error::InvalidKey);
        }
        if self.h0.is_identity().into() {
            return Err(Error::InvalidKey);
        }
        for h_i in &self.h {
            if h_i.is_identity().into() {
                return Err(Error::InvalidKey);
            }
        }
        Ok(())
    }

    /// `w || I2OSP(L, 8) || h0 || h_1 || ... || h_L`, all points compressed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&self.w_bytes());
        bytes.extend_from_slice(&i2osp(self.message_count(), 8));
        bytes.extend_from_slice(&self.h0.to_affine().to_compressed());
        self.h
            .iter()
            .for_each(|h_i| bytes.extend_from_slice(&h_i.to_affine().to_compressed()));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        const G2_LEN: usize = G2Affine::COMPRESSED_BYTES;
        const G1_LEN: usize = G1Projective::COMPRESSED_BYTES;

        if bytes.len() < G2_LEN + 8 + G1_LEN {
            return Err(Error::InvalidKey);
        }

        let w = parse_g2_projective(&bytes[0..G2_LEN]).map_err(|_| Error::InvalidKey)?;

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&bytes[G2_LEN..G2_LEN + 8]);
        let L = u64::from_be_bytes(count_bytes) as usize;

        let expected_len = G2_LEN + 8 + G1_LEN * (L + 1);
        if bytes.len() != expected_len {
            return Err(Error::InvalidKey);
        }

        let h0 =
            parse_g1_projective(&bytes[G2_LEN + 8..G2_LEN + 8 + G1_LEN]).map_err(|_| Error::InvalidKey)?;

        let mut h: Vec<G1Projective> = Vec::with_capacity(L);
        let mut offset = G2_LEN + 8 + G1_LEN;
        for _ in 0..L {
            h.push(
                parse_g1_projective(&bytes[offset..offset + G1_LEN])
                    .map_err(|_| Error::InvalidKey)?,
            );
            offset += G1_LEN;
        }

        Ok(Self { w, h0, h })
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl BlsSecretKey {
    /// Re-derives the message-count-bound keypair of this secret key.
    /// A count of zero is rejected: a converted key that can bind no
    /// messages is a caller mistake, not a degenerate-but-valid key.
    pub fn to_bbsplus_keypair<CS>(&self, message_count: usize) -> Result<BBSplusKeyPair, Error>
    where
        CS: BbsCiphersuite,
    {
        if message_count == 0 {
            return Err(Error::InvalidMessageCount);
        }

        let w = G2Projective::GENERATOR * self.0;
        let public = BBSplusPublicKey::derive_from::<CS>(w, message_count)?;

        Ok(BBSplusKeyPair {
            public,
            private: BBSplusSecretKey(self.0),
        })
    }
}

impl BlsPublicKey<G2Projective> {
    /// Public-key variant of the conversion: expands the G2 point into a
    /// message-count-bound verification key.
    pub fn to_bbsplus_public_key<CS>(&self, message_count: usize) -> Result<BBSplusPublicKey, Error>
    where
        CS: BbsCiphersuite,
    {
        if message_count == 0 {
            return Err(Error::InvalidMessageCount);
        }

        BBSplusPublicKey::derive_from::<CS>(self.point(), message_count)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusKeyPair {
    public: BBSplusPublicKey,
    private: BBSplusSecretKey,
}

impl BBSplusKeyPair {
    /// Secret scalar from `key_material` (or the CSPRNG when absent), public
    /// key expanded for exactly `message_count` slots. A count of zero is
    /// allowed here so that keys for empty message vectors stay expressible.
    pub fn generate<CS>(key_material: Option<&[u8]>, message_count: usize) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
    {
        let sk = match key_material {
            Some(ikm) => gen_sk(ikm)?,
            None => {
                use rand::RngCore;
                let mut ikm = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut ikm);
                gen_sk(&ikm)?
            }
        };

        let w = G2Projective::GENERATOR * sk;
        let public = BBSplusPublicKey::derive_from::<CS>(w, message_count)?;

        Ok(Self {
            public,
            private: BBSplusSecretKey(sk),
        })
    }

    pub fn public_key(&self) -> &BBSplusPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &BBSplusSecretKey {
        &self.private
    }
}
