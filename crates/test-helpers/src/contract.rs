// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use dfb_evm::{
    BusinessData, Confirmation, CreateBusinessData, FeedbackRead, FeedbackWrite, GatewayError,
    GatewayResult,
};
use dfb_fhe::decode_clear_value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

pub const MOCK_CONTRACT_ADDRESS: Address = Address::new([0xfe; 20]);
pub const MOCK_SIGNER_ADDRESS: Address = Address::new([0xaa; 20]);

/// Record fixture as the contract would return it
pub fn business_data(name: &str, public_value1: u64, creator: Address) -> BusinessData {
    BusinessData {
        name: name.to_string(),
        public_value1: U256::from(public_value1),
        public_value2: U256::ZERO,
        description: String::new(),
        creator,
        timestamp: 1_700_000_000,
        is_verified: false,
        decrypted_value: 0,
    }
}

struct StoredRecord {
    data: BusinessData,
    handle: B256,
}

enum PendingWrite {
    Create(CreateBusinessData),
    Verify { business_id: String, clear: Bytes },
}

#[derive(Default)]
struct MockChain {
    ids: Vec<String>,
    records: HashMap<String, StoredRecord>,
    pending: HashMap<TxHash, PendingWrite>,
    calls: Vec<String>,
    failing_ids: HashSet<String>,
    fail_listing: bool,
    reject_writes: bool,
    revert_next_confirmation: bool,
    verified_elsewhere: Option<u32>,
    unavailable: bool,
    nonce: u64,
}

impl MockChain {
    fn next_tx_hash(&mut self) -> TxHash {
        self.nonce += 1;
        TxHash::from(U256::from(self.nonce).to_be_bytes::<32>())
    }
}

/// In-memory stand-in for the feedback contract. Clones share the same chain.
///
/// Writes are queued when submitted and applied when their confirmation is awaited.
#[derive(Clone, Default)]
pub struct MockFeedbackContract {
    chain: Arc<Mutex<MockChain>>,
}

impl MockFeedbackContract {
    pub fn new() -> Self {
        Self::default()
    }

    fn chain(&self) -> MutexGuard<'_, MockChain> {
        self.chain.lock().unwrap()
    }

    pub fn insert(&self, business_id: &str, data: BusinessData, handle: B256) {
        let mut chain = self.chain();
        chain.ids.push(business_id.to_string());
        chain
            .records
            .insert(business_id.to_string(), StoredRecord { data, handle });
    }

    pub fn record(&self, business_id: &str) -> Option<BusinessData> {
        self.chain().records.get(business_id).map(|r| r.data.clone())
    }

    pub fn ids(&self) -> Vec<String> {
        self.chain().ids.clone()
    }

    /// Every gateway method called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.chain().calls.clone()
    }

    pub fn write_count(&self) -> usize {
        self.chain()
            .calls
            .iter()
            .filter(|c| *c == "createBusinessData" || *c == "verifyDecryption")
            .count()
    }

    /// Make `getBusinessData` fail for this id
    pub fn fail_record(&self, business_id: &str) {
        self.chain().failing_ids.insert(business_id.to_string());
    }

    pub fn fail_listing(&self, fail: bool) {
        self.chain().fail_listing = fail;
    }

    /// Simulate the wallet declining every signature request
    pub fn reject_writes(&self, reject: bool) {
        self.chain().reject_writes = reject;
    }

    pub fn revert_next_confirmation(&self) {
        self.chain().revert_next_confirmation = true;
    }

    /// Have another party verify the record with `value` right before our next
    /// `verifyDecryption` lands
    pub fn verify_elsewhere_before_write(&self, value: u32) {
        self.chain().verified_elsewhere = Some(value);
    }

    pub fn set_available(&self, available: bool) {
        self.chain().unavailable = !available;
    }

    fn log(&self, call: &str) -> MutexGuard<'_, MockChain> {
        trace!(call, "mock contract call");
        let mut chain = self.chain();
        chain.calls.push(call.to_string());
        chain
    }
}

#[async_trait]
impl FeedbackRead for MockFeedbackContract {
    fn contract_address(&self) -> Address {
        MOCK_CONTRACT_ADDRESS
    }

    async fn get_all_business_ids(&self) -> GatewayResult<Vec<String>> {
        let chain = self.log("getAllBusinessIds");
        if chain.fail_listing {
            return Err(GatewayError::Contract("connection refused".to_string()));
        }
        Ok(chain.ids.clone())
    }

    async fn get_business_data(&self, business_id: &str) -> GatewayResult<BusinessData> {
        let chain = self.log("getBusinessData");
        if chain.failing_ids.contains(business_id) {
            return Err(GatewayError::Contract("execution reverted".to_string()));
        }
        chain
            .records
            .get(business_id)
            .map(|r| r.data.clone())
            .ok_or_else(|| GatewayError::NotFound(business_id.to_string()))
    }

    async fn get_encrypted_value(&self, business_id: &str) -> GatewayResult<B256> {
        let chain = self.log("getEncryptedValue");
        chain
            .records
            .get(business_id)
            .map(|r| r.handle)
            .ok_or_else(|| GatewayError::NotFound(business_id.to_string()))
    }

    async fn is_available(&self) -> GatewayResult<bool> {
        let chain = self.log("isAvailable");
        Ok(!chain.unavailable)
    }
}

#[async_trait]
impl FeedbackWrite for MockFeedbackContract {
    async fn create_business_data(&self, data: CreateBusinessData) -> GatewayResult<TxHash> {
        let mut chain = self.log("createBusinessData");
        if chain.reject_writes {
            return Err(GatewayError::UserRejected);
        }
        if chain.records.contains_key(&data.business_id) {
            return Err(GatewayError::Contract("business id already exists".to_string()));
        }

        let tx_hash = chain.next_tx_hash();
        chain.pending.insert(tx_hash, PendingWrite::Create(data));
        Ok(tx_hash)
    }

    async fn verify_decryption(
        &self,
        business_id: &str,
        abi_encoded_clear_values: Bytes,
        _decryption_proof: Bytes,
    ) -> GatewayResult<TxHash> {
        let mut chain = self.log("verifyDecryption");
        if chain.reject_writes {
            return Err(GatewayError::UserRejected);
        }
        if let Some(value) = chain.verified_elsewhere.take() {
            if let Some(record) = chain.records.get_mut(business_id) {
                record.data.is_verified = true;
                record.data.decrypted_value = value;
            }
        }

        let record = chain
            .records
            .get(business_id)
            .ok_or_else(|| GatewayError::NotFound(business_id.to_string()))?;
        if record.data.is_verified {
            return Err(GatewayError::AlreadyVerified(business_id.to_string()));
        }

        let tx_hash = chain.next_tx_hash();
        chain.pending.insert(
            tx_hash,
            PendingWrite::Verify {
                business_id: business_id.to_string(),
                clear: abi_encoded_clear_values,
            },
        );
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> GatewayResult<Confirmation> {
        let mut chain = self.log("waitForConfirmation");
        let write = chain
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| GatewayError::Contract(format!("unknown transaction {tx_hash}")))?;
        if std::mem::take(&mut chain.revert_next_confirmation) {
            return Err(GatewayError::Reverted(tx_hash));
        }

        let block_number = chain.nonce;
        match write {
            PendingWrite::Create(data) => {
                let record = StoredRecord {
                    data: BusinessData {
                        name: data.name,
                        public_value1: data.public_value1,
                        public_value2: data.public_value2,
                        description: data.description,
                        creator: MOCK_SIGNER_ADDRESS,
                        timestamp: 1_700_000_000 + block_number,
                        is_verified: false,
                        decrypted_value: 0,
                    },
                    handle: data.encrypted_value,
                };
                chain.ids.push(data.business_id.clone());
                chain.records.insert(data.business_id, record);
            }
            PendingWrite::Verify { business_id, clear } => {
                let value = decode_clear_value(&clear, 0)
                    .ok_or(GatewayError::Reverted(tx_hash))?
                    .saturating_to::<u32>();
                let record = chain
                    .records
                    .get_mut(&business_id)
                    .ok_or_else(|| GatewayError::NotFound(business_id.clone()))?;
                record.data.is_verified = true;
                record.data.decrypted_value = value;
            }
        }

        Ok(Confirmation {
            tx_hash,
            block_number: Some(block_number),
        })
    }
}
