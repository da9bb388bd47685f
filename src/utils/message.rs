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

use bls12_381_plus::Scalar;
use ff::Field;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::bbsplus::ciphersuites::BbsCiphersuite;
use crate::errors::Error;
use crate::utils::util::hash_to_scalar;

/// A signed message, reduced to its scalar form. Position in the message
/// vector decides which generator of the public key it is paired with, so
/// vectors of these are positional, never sets.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusMessage {
    pub value: Scalar,
}

impl BBSplusMessage {
    pub fn new(msg: Scalar) -> Self {
        Self { value: msg }
    }

    pub fn random(rng: impl RngCore) -> Self {
        Self::new(Scalar::random(rng))
    }

    /// Deterministic map from an arbitrary octet string to a scalar, under
    /// the ciphersuite's message mapping DST.
    pub fn map_message_to_scalar_as_hash<CS>(data: &[u8]) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
    {
        let dst = [CS::ID, b"MAP_MSG_TO_SCALAR_AS_HASH_"].concat();
        let scalar = hash_to_scalar::<CS>(data, &dst)?;
        Ok(Self { value: scalar })
    }

    pub fn messages_to_scalar<CS>(messages: &[Vec<u8>]) -> Result<Vec<Self>, Error>
    where
        CS: BbsCiphersuite,
    {
        messages
            .iter()
            .map(|m| Self::map_message_to_scalar_as_hash::<CS>(m))
            .collect()
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.value.to_be_bytes()
    }
}
