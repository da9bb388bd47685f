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

use thiserror::Error;

/// Failures surfaced by the key manager, the signature and proof engines and
/// the blind-issuance protocol. A signature or proof that is well formed but
/// does not satisfy its verification equations is *not* an error: every
/// `verify`-style operation returns `Ok(false)` for that case and reserves
/// `Err` for malformed or inconsistent inputs.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Invalid key")]
    InvalidKey,
    #[error("A message count of zero is not valid here")]
    InvalidMessageCount,
    #[error("Message vector length does not match the key: expected {expected}, found {found}")]
    MessageCountMismatch { expected: usize, found: usize },
    #[error("Index {index} is out of range for a key with {message_count} message slots")]
    IndexOutOfBounds { index: usize, message_count: usize },
    #[error("Duplicate index: {0}")]
    DuplicateIndex(usize),
    #[error("Known and blinded indexes must partition the message positions")]
    InvalidIndexPartition,
    #[error("A non-empty nonce is required")]
    MissingNonce,
    #[error("Error during deserialization: {0}")]
    DeserializationError(String),
    #[error("Error during hash to scalar computation")]
    HashToScalarError,
    #[error("Error during computation of a Signature: {0}")]
    SignatureGenerationError(String),
    #[error("Error during computation of a Blind Signature: {0}")]
    BlindSignError(String),
    #[error("Error during computation of a Proof of Knowledge of a Signature: {0}")]
    ProofGenError(String),
    #[error("Not a valid Signature")]
    InvalidSignature,
    #[error("Invalid commitment")]
    InvalidCommitment,
    #[error("Invalid commitment proof")]
    InvalidCommitmentProof,
    #[error("Invalid Proof of Knowledge of a Signature")]
    InvalidProofOfKnowledgeSignature,
}
