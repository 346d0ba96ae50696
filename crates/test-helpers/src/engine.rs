// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use dfb_fhe::{
    abi_encode_clear_values, DecryptionOutcome, DecryptionResult, DecryptionSubmitter,
    EncryptedInput, FheEngine, FheError, FheResult, SubmitOutcome,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Arguments of one `encrypt` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptCall {
    pub contract: Address,
    pub user: Address,
    pub value: u32,
}

#[derive(Default)]
struct MockFhe {
    initialized: bool,
    init_calls: usize,
    fail_init: bool,
    fail_encrypt: bool,
    fail_decrypt: bool,
    plaintexts: HashMap<B256, u32>,
    encrypt_calls: Vec<EncryptCall>,
    decrypt_calls: usize,
}

/// FHE engine that "encrypts" by remembering the plaintext behind each handle
#[derive(Clone, Default)]
pub struct MockFheEngine {
    state: Arc<Mutex<MockFhe>>,
}

impl MockFheEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockFhe> {
        self.state.lock().unwrap()
    }

    /// Make `handle` decrypt to `value`
    pub fn register(&self, handle: B256, value: u32) {
        self.state().plaintexts.insert(handle, value);
    }

    pub fn fail_init(&self, fail: bool) {
        self.state().fail_init = fail;
    }

    pub fn fail_encrypt(&self, fail: bool) {
        self.state().fail_encrypt = fail;
    }

    pub fn fail_decrypt(&self, fail: bool) {
        self.state().fail_decrypt = fail;
    }

    pub fn init_calls(&self) -> usize {
        self.state().init_calls
    }

    pub fn encrypt_calls(&self) -> Vec<EncryptCall> {
        self.state().encrypt_calls.clone()
    }

    pub fn decrypt_calls(&self) -> usize {
        self.state().decrypt_calls
    }
}

#[async_trait]
impl FheEngine for MockFheEngine {
    async fn initialize(&self) -> FheResult<()> {
        let mut state = self.state();
        state.init_calls += 1;
        if state.fail_init {
            return Err(FheError::Gateway("key service unreachable".to_string()));
        }
        state.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    async fn encrypt(
        &self,
        contract: Address,
        user: Address,
        value: u32,
    ) -> FheResult<EncryptedInput> {
        let mut state = self.state();
        if !state.initialized {
            return Err(FheError::NotInitialized);
        }
        if state.fail_encrypt {
            return Err(FheError::Rejected("bad input".to_string()));
        }

        state.encrypt_calls.push(EncryptCall {
            contract,
            user,
            value,
        });
        let handle = B256::from(U256::from(state.encrypt_calls.len()).to_be_bytes::<32>());
        state.plaintexts.insert(handle, value);

        Ok(EncryptedInput {
            handle,
            input_proof: Bytes::from_static(b"input-proof"),
        })
    }

    async fn verify_decryption(
        &self,
        handles: &[B256],
        _contract: Address,
        submitter: &dyn DecryptionSubmitter,
    ) -> FheResult<DecryptionOutcome> {
        let (clear_values, encoded) = {
            let mut state = self.state();
            if !state.initialized {
                return Err(FheError::NotInitialized);
            }
            state.decrypt_calls += 1;
            if state.fail_decrypt {
                return Err(FheError::Gateway("relayer timeout".to_string()));
            }

            let mut clear_values = HashMap::new();
            let mut ordered = Vec::with_capacity(handles.len());
            for handle in handles {
                let value = state
                    .plaintexts
                    .get(handle)
                    .copied()
                    .ok_or(FheError::MissingHandle(*handle))?;
                clear_values.insert(*handle, U256::from(value));
                ordered.push(U256::from(value));
            }
            (clear_values, abi_encode_clear_values(&ordered))
        };

        let proof = Bytes::from_static(b"decryption-proof");
        match submitter.submit(encoded.clone(), proof.clone()).await? {
            SubmitOutcome::AlreadyVerified => Ok(DecryptionOutcome::AlreadyVerified),
            SubmitOutcome::Submitted => Ok(DecryptionOutcome::Verified(DecryptionResult {
                clear_values,
                abi_encoded_clear_values: encoded,
                decryption_proof: proof,
            })),
        }
    }
}
