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

use bls12_381_plus::{G1Projective, G2Projective, Scalar};
use elliptic_curve::hash2curve::ExpandMsgXmd;
use ff::Field;
use group::{Group, GroupEncoding};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::Error;
use crate::utils::util::i2osp;

const KEYGEN_SALT: &[u8] = b"BLS-SIG-KEYGEN-SALT-";
const MIN_IKM_LEN: usize = 32;

/// The two pairing source groups a raw key can live in. The blinding
/// generator is a fixed, publicly re-derivable point with unknown discrete
/// log relative to the group generator.
pub trait BlsCurve:
    Group<Scalar = Scalar> + GroupEncoding + Copy + Serialize + DeserializeOwned
{
    fn blinding_generator() -> Self;
}

impl BlsCurve for G1Projective {
    fn blinding_generator() -> Self {
        G1Projective::hash::<ExpandMsgXmd<Sha256>>(
            b"BLS_KEY_BLINDING_GENERATOR_SEED",
            b"BLS_KEY_BLINDING_G1_XMD:SHA-256_SSWU_RO_",
        )
    }
}

impl BlsCurve for G2Projective {
    fn blinding_generator() -> Self {
        G2Projective::hash::<ExpandMsgXmd<Sha256>>(
            b"BLS_KEY_BLINDING_GENERATOR_SEED",
            b"BLS_KEY_BLINDING_G2_XMD:SHA-256_SSWU_RO_",
        )
    }
}

/// Secret-key scalar shared by the raw BLS representation and the BBS+
/// scheme keys derived from it. Scrubbed on drop.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlsSecretKey(pub(crate) Scalar);

impl BlsSecretKey {
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

impl Drop for BlsSecretKey {
    fn drop(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

/// The signer's share of a blinded key: combined with the other party's
/// contribution it reconstitutes the unblinded public key. Scrubbed on drop.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct KeyBlindingFactor(pub(crate) Scalar);

impl KeyBlindingFactor {
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; Scalar::BYTES] = bytes.try_into().map_err(|_| Error::InvalidKey)?;
        let s = Option::<Scalar>::from(Scalar::from_be_bytes(&bytes)).ok_or(Error::InvalidKey)?;
        Ok(Self(s))
    }
}

impl Drop for KeyBlindingFactor {
    fn drop(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlsPublicKey<G: BlsCurve>(pub(crate) G);

pub type BlsPublicKeyG1 = BlsPublicKey<G1Projective>;
pub type BlsPublicKeyG2 = BlsPublicKey<G2Projective>;

impl<G: BlsCurve> BlsPublicKey<G> {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().as_ref().to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut repr = G::Repr::default();
        if repr.as_ref().len() != bytes.len() {
            return Err(Error::InvalidKey);
        }
        repr.as_mut().copy_from_slice(bytes);
        let point = Option::<G>::from(G::from_bytes(&repr)).ok_or(Error::InvalidKey)?;
        Ok(Self(point))
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn point(&self) -> G {
        self.0
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BlsKeyPair<G: BlsCurve> {
    public: BlsPublicKey<G>,
    private: BlsSecretKey,
}

pub type BlsKeyPairG1 = BlsKeyPair<G1Projective>;
pub type BlsKeyPairG2 = BlsKeyPair<G2Projective>;

impl<G: BlsCurve> BlsKeyPair<G> {
    /// Generates a keypair with `pk = g * x`. Deterministic when `ikm` is
    /// supplied (at least 32 octets), drawn from the process CSPRNG
    /// otherwise.
    pub fn generate(ikm: Option<&[u8]>) -> Result<Self, Error> {
        let sk = match ikm {
            Some(ikm) => gen_sk(ikm)?,
            None => gen_sk(&random_ikm())?,
        };
        let pk = G::generator() * sk;

        Ok(Self {
            public: BlsPublicKey(pk),
            private: BlsSecretKey(sk),
        })
    }

    /// Same derivation as [`generate`](Self::generate) with one extra binding
    /// term: `pk = g * x + B_G * r`. The returned factor `r` is the
    /// contribution that another party's share can later be combined with.
    pub fn generate_blinded(ikm: Option<&[u8]>) -> Result<(Self, KeyBlindingFactor), Error> {
        let mut keypair = Self::generate(ikm)?;

        let blinding_g = G::blinding_generator();
        let mut seed_input = blinding_g.to_bytes().as_ref().to_vec();
        match ikm {
            Some(ikm) => seed_input.extend_from_slice(ikm),
            None => seed_input.extend_from_slice(&random_ikm()),
        }
        let r = gen_sk(&seed_input)?;
        keypair.public = BlsPublicKey(keypair.public.0 + blinding_g * r);

        Ok((keypair, KeyBlindingFactor(r)))
    }

    pub fn public_key(&self) -> &BlsPublicKey<G> {
        &self.public
    }

    pub fn private_key(&self) -> &BlsSecretKey {
        &self.private
    }
}

/// IKM to secret scalar, HKDF-SHA-256 with the standard BLS keygen salt and
/// a 48-octet OKM reduced mod r.
pub(crate) fn gen_sk(ikm: &[u8]) -> Result<Scalar, Error> {
    if ikm.len() < MIN_IKM_LEN {
        return Err(Error::KeyGenError(format!(
            "length(key_material) < {}",
            MIN_IKM_LEN
        )));
    }

    // ikm || I2OSP(0, 1)
    let mut ikm_prime = Vec::with_capacity(ikm.len() + 1);
    ikm_prime.extend_from_slice(ikm);
    ikm_prime.push(0u8);

    let hk = Hkdf::<Sha256>::new(Some(KEYGEN_SALT), &ikm_prime);
    let mut okm = [0u8; 48];
    hk.expand(&i2osp(48, 2), &mut okm)
        .map_err(|_| Error::KeyGenError("HKDF expand failed".to_owned()))?;

    let sk = Scalar::from_okm(&okm);
    if sk.is_zero().into() {
        return Err(Error::KeyGenError("derived scalar is zero".to_owned()));
    }
    Ok(sk)
}

fn random_ikm() -> [u8; MIN_IKM_LEN] {
    let mut rng = rand::thread_rng();
    let mut ikm = [0u8; MIN_IKM_LEN];
    rng.fill_bytes(&mut ikm);
    ikm
}

#[cfg(test)]
mod tests {
    use super::{BlsCurve, BlsKeyPairG1, BlsKeyPairG2};
    use crate::errors::Error;
    use bls12_381_plus::{G1Projective, G2Projective};
    use group::Group;

    const IKM: &[u8] = b"an-IKM-of-at-least-thirty-two-octets";

    #[test]
    fn deterministic_when_seeded() {
        let a = BlsKeyPairG2::generate(Some(IKM)).unwrap();
        let b = BlsKeyPairG2::generate(Some(IKM)).unwrap();
        assert_eq!(a, b);

        let c = BlsKeyPairG2::generate(None).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn short_ikm_is_rejected() {
        let result = BlsKeyPairG1::generate(Some(b"too short"));
        assert!(matches!(result, Err(Error::KeyGenError(_))));
    }

    #[test]
    fn blinded_key_carries_the_binding_term() {
        let (blinded, r) = BlsKeyPairG2::generate_blinded(Some(IKM)).unwrap();
        let plain = BlsKeyPairG2::generate(Some(IKM)).unwrap();

        assert_eq!(blinded.private_key(), plain.private_key());
        assert_eq!(
            blinded.public_key().point(),
            plain.public_key().point() + G2Projective::blinding_generator() * r.0
        );
    }

    #[test]
    fn blinding_generators_differ_from_group_generators() {
        assert_ne!(G1Projective::blinding_generator(), G1Projective::generator());
        assert_ne!(G2Projective::blinding_generator(), G2Projective::generator());
        assert!(!bool::from(G1Projective::blinding_generator().is_identity()));
        assert!(!bool::from(G2Projective::blinding_generator().is_identity()));
    }
}
