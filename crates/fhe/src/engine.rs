// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::{FheError, FheResult};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ciphertext handle plus a proof that it is a well formed encryption for one contract and user.
/// Consumed by exactly one contract write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    pub handle: B256,
    pub input_proof: Bytes,
}

/// Clear values revealed for a set of handles together with the proof the contract checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionResult {
    pub clear_values: HashMap<B256, U256>,
    pub abi_encoded_clear_values: Bytes,
    pub decryption_proof: Bytes,
}

impl DecryptionResult {
    /// The clear value revealed for `handle`
    pub fn value_for(&self, handle: &B256) -> FheResult<U256> {
        self.clear_values
            .get(handle)
            .copied()
            .ok_or(FheError::MissingHandle(*handle))
    }
}

/// What happened when the proof was handed to the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// The contract already holds a verified value for this record
    AlreadyVerified,
}

/// Result of a decryption round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    Verified(DecryptionResult),
    AlreadyVerified,
}

/// Callback the engine uses to put `(clear values, proof)` on-chain
#[async_trait]
pub trait DecryptionSubmitter: Send + Sync {
    async fn submit(
        &self,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> FheResult<SubmitOutcome>;
}

/// Client side of the FHE scheme. Implementations decide whether decryption is computed
/// locally and attested on-chain or routed through an oracle; callers only see the outcome.
#[async_trait]
pub trait FheEngine: Send + Sync {
    /// Fetch key material. Safe to call more than once.
    async fn initialize(&self) -> FheResult<()>;

    fn is_initialized(&self) -> bool;

    /// Encrypt `value` for `contract` on behalf of `user`
    async fn encrypt(&self, contract: Address, user: Address, value: u32)
        -> FheResult<EncryptedInput>;

    /// Decrypt `handles` and hand the clear values and proof to `submitter`
    async fn verify_decryption(
        &self,
        handles: &[B256],
        contract: Address,
        submitter: &dyn DecryptionSubmitter,
    ) -> FheResult<DecryptionOutcome>;
}

/// ABI encode a list of uint256 values as a static tuple
pub fn abi_encode_clear_values(values: &[U256]) -> Bytes {
    let mut out = Vec::with_capacity(values.len() * 32);
    for value in values {
        out.extend_from_slice(&value.to_be_bytes::<32>());
    }
    Bytes::from(out)
}

/// Read the `index`th word of an ABI encoded static tuple of uint256 values
pub fn decode_clear_value(encoded: &[u8], index: usize) -> Option<U256> {
    let start = index.checked_mul(32)?;
    let word = encoded.get(start..start.checked_add(32)?)?;
    Some(U256::from_be_slice(word))
}
