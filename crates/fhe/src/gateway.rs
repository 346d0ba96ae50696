// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::engine::{
    DecryptionOutcome, DecryptionResult, DecryptionSubmitter, EncryptedInput, FheEngine,
    SubmitOutcome,
};
use crate::error::{FheError, FheResult};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use dfb_config::FheConfig;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeySet {
    pub public_key_id: String,
}

#[derive(Debug, Serialize)]
struct EncryptRequest<'a> {
    public_key_id: &'a str,
    contract_address: Address,
    user_address: Address,
    value: u32,
}

#[derive(Debug, Deserialize)]
struct EncryptResponse {
    handle: B256,
    input_proof: Bytes,
}

#[derive(Debug, Serialize)]
struct DecryptRequest<'a> {
    handles: &'a [B256],
    contract_address: Address,
}

#[derive(Debug, Deserialize)]
struct DecryptResponse {
    clear_values: HashMap<B256, U256>,
    abi_encoded_clear_values: Bytes,
    decryption_proof: Bytes,
}

/// FHE engine backed by an HTTP gateway that owns the key material and the decryption
/// service. Encryption proofs and decryption proofs are produced by the gateway; this client
/// only relays them.
pub struct HttpFheEngine {
    client: Client,
    base_url: String,
    keys: OnceCell<KeySet>,
}

impl HttpFheEngine {
    pub fn new(config: &FheConfig) -> FheResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FheError::Gateway(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            keys: OnceCell::new(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn keys(&self) -> FheResult<&KeySet> {
        self.keys.get().ok_or(FheError::NotInitialized)
    }

    async fn fetch_keys(&self) -> FheResult<KeySet> {
        let response = self
            .client
            .get(self.endpoint("keys"))
            .send()
            .await
            .map_err(|e| FheError::Gateway(e.to_string()))?;
        read_json(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> FheResult<T> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| FheError::Gateway(e.to_string()))?;
        read_json(response).await
    }
}

/// 4xx means the gateway refused the input; anything else non-2xx is a gateway failure
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> FheResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| FheError::Gateway(format!("Malformed gateway response: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, body))
}

fn classify_status(status: StatusCode, body: String) -> FheError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };
    if status.is_client_error() {
        FheError::Rejected(detail)
    } else {
        FheError::Gateway(detail)
    }
}

#[async_trait]
impl FheEngine for HttpFheEngine {
    async fn initialize(&self) -> FheResult<()> {
        let keys = self.keys.get_or_try_init(|| self.fetch_keys()).await?;
        info!(public_key_id = %keys.public_key_id, "FHE engine initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.keys.initialized()
    }

    async fn encrypt(
        &self,
        contract: Address,
        user: Address,
        value: u32,
    ) -> FheResult<EncryptedInput> {
        let keys = self.keys()?;
        let request = EncryptRequest {
            public_key_id: &keys.public_key_id,
            contract_address: contract,
            user_address: user,
            value,
        };
        let response: EncryptResponse = self.post("encrypt", &request).await?;
        debug!(handle = %response.handle, "Encrypted input");

        Ok(EncryptedInput {
            handle: response.handle,
            input_proof: response.input_proof,
        })
    }

    async fn verify_decryption(
        &self,
        handles: &[B256],
        contract: Address,
        submitter: &dyn DecryptionSubmitter,
    ) -> FheResult<DecryptionOutcome> {
        self.keys()?;
        let request = DecryptRequest {
            handles,
            contract_address: contract,
        };
        let response: DecryptResponse = self.post("decrypt", &request).await?;

        for handle in handles {
            if !response.clear_values.contains_key(handle) {
                return Err(FheError::MissingHandle(*handle));
            }
        }

        let outcome = submitter
            .submit(
                response.abi_encoded_clear_values.clone(),
                response.decryption_proof.clone(),
            )
            .await?;

        Ok(match outcome {
            SubmitOutcome::AlreadyVerified => DecryptionOutcome::AlreadyVerified,
            SubmitOutcome::Submitted => DecryptionOutcome::Verified(DecryptionResult {
                clear_values: response.clear_values,
                abi_encoded_clear_values: response.abi_encoded_clear_values,
                decryption_proof: response.decryption_proof,
            }),
        })
    }
}
