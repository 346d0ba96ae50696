// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::{GatewayError, GatewayResult};
use crate::helpers::{parse_signer, ProviderConfig};
use alloy::{
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider},
    sol,
};
use anyhow::Context;
use async_trait::async_trait;
use dfb_config::ChainConfig;
use once_cell::sync::Lazy;
use std::marker::PhantomData;
use tokio::sync::Mutex;
use tracing::{debug, info};

static NONCE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract DateFeedback {
        error AlreadyVerified(string businessId);
        error NotFound(string businessId);

        function createBusinessData(
            string calldata businessId,
            string calldata name,
            bytes32 encryptedValue,
            bytes calldata inputProof,
            uint256 publicValue1,
            uint256 publicValue2,
            string calldata description
        ) external;
        function verifyDecryption(
            string calldata businessId,
            bytes memory abiEncodedClearValue,
            bytes memory decryptionProof
        ) external;
        function getAllBusinessIds() external view returns (string[] memory);
        function getBusinessData(string calldata businessId) external view returns (
            string memory name,
            uint256 publicValue1,
            uint256 publicValue2,
            string memory description,
            address creator,
            uint256 timestamp,
            bool isVerified,
            uint32 decryptedValue
        );
        function getEncryptedValue(string calldata businessId) external view returns (bytes32);
        function isAvailable() public pure returns (bool);
    }
}

/// A record as stored by the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessData {
    pub name: String,
    pub public_value1: U256,
    pub public_value2: U256,
    pub description: String,
    pub creator: Address,
    pub timestamp: u64,
    pub is_verified: bool,
    pub decrypted_value: u32,
}

impl From<DateFeedback::getBusinessDataReturn> for BusinessData {
    fn from(value: DateFeedback::getBusinessDataReturn) -> Self {
        Self {
            name: value.name,
            public_value1: value.publicValue1,
            public_value2: value.publicValue2,
            description: value.description,
            creator: value.creator,
            timestamp: value.timestamp.saturating_to::<u64>(),
            is_verified: value.isVerified,
            decrypted_value: value.decryptedValue,
        }
    }
}

/// Arguments of `createBusinessData`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBusinessData {
    pub business_id: String,
    pub name: String,
    /// Ciphertext handle returned by the FHE engine
    pub encrypted_value: B256,
    pub input_proof: Bytes,
    pub public_value1: U256,
    pub public_value2: U256,
    pub description: String,
}

/// A transaction that has been mined successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Trait for read-only operations on the feedback contract
#[async_trait]
pub trait FeedbackRead: Send + Sync {
    /// The contract address ciphertexts are scoped to
    fn contract_address(&self) -> Address;

    /// List every record identifier
    async fn get_all_business_ids(&self) -> GatewayResult<Vec<String>>;

    /// Fetch one record
    async fn get_business_data(&self, business_id: &str) -> GatewayResult<BusinessData>;

    /// Fetch the ciphertext handle of a record
    async fn get_encrypted_value(&self, business_id: &str) -> GatewayResult<B256>;

    /// Liveness probe
    async fn is_available(&self) -> GatewayResult<bool>;
}

/// Trait for signer-bound operations on the feedback contract.
///
/// Submitting returns as soon as the node accepted the transaction; confirmation is a separate
/// suspension point.
#[async_trait]
pub trait FeedbackWrite: Send + Sync {
    async fn create_business_data(&self, data: CreateBusinessData) -> GatewayResult<TxHash>;

    async fn verify_decryption(
        &self,
        business_id: &str,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> GatewayResult<TxHash>;

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> GatewayResult<Confirmation>;
}

/// Generic type to represent different provider capabilities
pub trait ProviderType: Send + Sync + 'static {}

/// Marker type for read-only provider
#[derive(Clone)]
pub struct ReadOnly;
impl ProviderType for ReadOnly {}

/// Marker type for read-write provider
#[derive(Clone)]
pub struct ReadWrite;
impl ProviderType for ReadWrite {}

/// Generic feedback contract
#[derive(Clone)]
pub struct FeedbackContract<T: ProviderType> {
    provider: DynProvider,
    contract_address: Address,
    signer: Option<Address>,
    _marker: PhantomData<T>,
}

impl<T: ProviderType> FeedbackContract<T> {
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn address(&self) -> &Address {
        &self.contract_address
    }

    fn instance(&self) -> DateFeedback::DateFeedbackInstance<&DynProvider> {
        DateFeedback::new(self.contract_address, &self.provider)
    }
}

impl FeedbackContract<ReadWrite> {
    /// The address transactions are signed with
    pub fn signer_address(&self) -> Address {
        // Only the write factory constructs ReadWrite contracts and it always sets a signer
        self.signer.unwrap_or_default()
    }

    async fn next_pending_nonce(&self) -> GatewayResult<u64> {
        self.provider
            .get_transaction_count(self.signer_address())
            .pending()
            .await
            .context("Failed to fetch pending nonce")
            .map_err(GatewayError::from)
    }
}

/// Type aliases for the two contract variants
pub type FeedbackReadContract = FeedbackContract<ReadOnly>;
pub type FeedbackWriteContract = FeedbackContract<ReadWrite>;

// Factory for creating contract instances
pub struct FeedbackContractFactory;

impl FeedbackContractFactory {
    /// Create a read-only contract for the chain's feedback deployment
    pub async fn create_read(chain: &ChainConfig) -> anyhow::Result<FeedbackReadContract> {
        let contract_address = chain.contracts.feedback.parsed_address()?;
        let provider = ProviderConfig::from_chain(chain)?
            .create_readonly_provider()
            .await?;

        Ok(FeedbackContract {
            provider,
            contract_address,
            signer: None,
            _marker: PhantomData,
        })
    }

    /// Create a write-capable contract signing with `private_key`
    pub async fn create_write(
        chain: &ChainConfig,
        private_key: &str,
    ) -> anyhow::Result<FeedbackWriteContract> {
        let contract_address = chain.contracts.feedback.parsed_address()?;
        let signer = parse_signer(private_key)?;
        let provider = ProviderConfig::from_chain(chain)?
            .create_signer_provider(&signer)
            .await?;

        Ok(FeedbackContract {
            provider,
            contract_address,
            signer: Some(signer.address()),
            _marker: PhantomData,
        })
    }
}

// Implement FeedbackRead for any FeedbackContract regardless of provider type
#[async_trait]
impl<T: ProviderType> FeedbackRead for FeedbackContract<T> {
    fn contract_address(&self) -> Address {
        self.contract_address
    }

    async fn get_all_business_ids(&self) -> GatewayResult<Vec<String>> {
        let ids = self
            .instance()
            .getAllBusinessIds()
            .call()
            .await
            .map_err(GatewayError::from_contract)?;
        Ok(ids)
    }

    async fn get_business_data(&self, business_id: &str) -> GatewayResult<BusinessData> {
        let data = self
            .instance()
            .getBusinessData(business_id.to_string())
            .call()
            .await
            .map_err(GatewayError::from_contract)?;
        Ok(data.into())
    }

    async fn get_encrypted_value(&self, business_id: &str) -> GatewayResult<B256> {
        let handle = self
            .instance()
            .getEncryptedValue(business_id.to_string())
            .call()
            .await
            .map_err(GatewayError::from_contract)?;
        Ok(handle)
    }

    async fn is_available(&self) -> GatewayResult<bool> {
        let available = self
            .instance()
            .isAvailable()
            .call()
            .await
            .map_err(GatewayError::from_contract)?;
        Ok(available)
    }
}

// Implement FeedbackWrite only for contracts with ReadWrite marker
#[async_trait]
impl FeedbackWrite for FeedbackContract<ReadWrite> {
    async fn create_business_data(&self, data: CreateBusinessData) -> GatewayResult<TxHash> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = self.next_pending_nonce().await?;

        let instance = self.instance();
        let builder = instance
            .createBusinessData(
                data.business_id.clone(),
                data.name,
                data.encrypted_value,
                data.input_proof,
                data.public_value1,
                data.public_value2,
                data.description,
            )
            .nonce(nonce);
        let pending = builder.send().await.map_err(GatewayError::from_contract)?;
        let tx_hash = *pending.tx_hash();

        info!(business_id = %data.business_id, tx = %tx_hash, "createBusinessData submitted");
        Ok(tx_hash)
    }

    async fn verify_decryption(
        &self,
        business_id: &str,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> GatewayResult<TxHash> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = self.next_pending_nonce().await?;

        let instance = self.instance();
        let builder = instance
            .verifyDecryption(
                business_id.to_string(),
                abi_encoded_clear_values,
                decryption_proof,
            )
            .nonce(nonce);
        let pending = builder.send().await.map_err(GatewayError::from_contract)?;
        let tx_hash = *pending.tx_hash();

        info!(business_id = %business_id, tx = %tx_hash, "verifyDecryption submitted");
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> GatewayResult<Confirmation> {
        debug!(tx = %tx_hash, "Waiting for confirmation");
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .context("Failed to fetch transaction receipt")?;

        if !receipt.status() {
            return Err(GatewayError::Reverted(tx_hash));
        }

        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}
