// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Bytes;
use async_trait::async_trait;
use dfb_evm::{FeedbackWrite, GatewayError};
use dfb_fhe::{DecryptionSubmitter, FheError, FheResult, SubmitOutcome};
use tracing::info;

/// Puts a decryption proof on-chain for one record and waits for it to be mined
pub(crate) struct ContractSubmitter<'a, W> {
    writer: &'a W,
    business_id: &'a str,
}

impl<'a, W> ContractSubmitter<'a, W> {
    pub(crate) fn new(writer: &'a W, business_id: &'a str) -> Self {
        Self {
            writer,
            business_id,
        }
    }
}

#[async_trait]
impl<'a, W: FeedbackWrite> DecryptionSubmitter for ContractSubmitter<'a, W> {
    async fn submit(
        &self,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> FheResult<SubmitOutcome> {
        let tx_hash = match self
            .writer
            .verify_decryption(self.business_id, abi_encoded_clear_values, decryption_proof)
            .await
        {
            Ok(tx_hash) => tx_hash,
            Err(GatewayError::AlreadyVerified(_)) => {
                info!(business_id = %self.business_id, "Contract reports record already verified");
                return Ok(SubmitOutcome::AlreadyVerified);
            }
            Err(e) => return Err(FheError::Submission(e.to_string())),
        };

        match self.writer.wait_for_confirmation(tx_hash).await {
            Ok(_) => Ok(SubmitOutcome::Submitted),
            Err(GatewayError::AlreadyVerified(_)) => Ok(SubmitOutcome::AlreadyVerified),
            Err(e) => Err(FheError::Submission(e.to_string())),
        }
    }
}
