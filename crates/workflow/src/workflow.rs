// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{
    FeedbackRecord, RecordId, RefreshReport, SubmitFeedback, Submitted, Verification,
};
use crate::session::WalletSession;
use crate::state::FeedbackState;
use crate::submitter::ContractSubmitter;
use alloy::primitives::{Address, U256};
use dfb_evm::{CreateBusinessData, FeedbackRead, FeedbackWrite};
use dfb_fhe::{DecryptionOutcome, FheEngine, FheResult};
use tracing::{error, info, warn};

/// Show the error's banner and hand it back
fn fail(state: &mut FeedbackState, err: WorkflowError) -> WorkflowError {
    state.fail(&err.status_message());
    err
}

/// Client side feedback workflows over a contract gateway, an FHE engine and a wallet
/// session.
///
/// `writer` is only present when a signing key is available. Every operation that writes
/// checks the session first and touches nothing else when it is disconnected.
pub struct FeedbackWorkflow<R, W, F, S> {
    reader: R,
    writer: Option<W>,
    engine: F,
    session: S,
}

impl<R, W, F, S> FeedbackWorkflow<R, W, F, S>
where
    R: FeedbackRead,
    W: FeedbackWrite,
    F: FheEngine,
    S: WalletSession,
{
    pub fn new(reader: R, writer: Option<W>, engine: F, session: S) -> Self {
        Self {
            reader,
            writer,
            engine,
            session,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn engine(&self) -> &F {
        &self.engine
    }

    fn connected(&self) -> Option<(Address, &W)> {
        Some((self.session.address()?, self.writer.as_ref()?))
    }

    /// Load FHE key material once a wallet is connected. Later calls are no-ops.
    pub async fn initialize_engine(&self, state: &mut FeedbackState) -> WorkflowResult<()> {
        match self.ensure_engine().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("FHE initialization failed: {e}");
                state.fail("FHE initialization failed");
                Err(WorkflowError::Encryption(e))
            }
        }
    }

    async fn ensure_engine(&self) -> FheResult<()> {
        if !self.session.is_connected() || self.engine.is_initialized() {
            return Ok(());
        }
        self.engine.initialize().await
    }

    /// Reload every record. Records that fail to load are skipped; failing to list them
    /// keeps the previous collections.
    pub async fn refresh(&self, state: &mut FeedbackState) -> WorkflowResult<RefreshReport> {
        let ids = match self.reader.get_all_business_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to list records: {e}");
                return Err(fail(state, WorkflowError::Load(e)));
            }
        };

        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();
        for id in ids {
            let id = RecordId::from(id);
            match self.reader.get_business_data(id.as_str()).await {
                Ok(data) => records.push(FeedbackRecord::from_chain(id, data)),
                Err(e) => {
                    warn!(business_id = %id, "Skipping record that failed to load: {e}");
                    skipped.push(id);
                }
            }
        }

        let report = RefreshReport {
            loaded: records.len(),
            skipped,
        };
        state.replace_records(records, self.session.address());
        info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Records reloaded"
        );
        Ok(report)
    }

    /// Encrypt the score, create the record on-chain and wait for it to be mined
    pub async fn submit(
        &self,
        state: &mut FeedbackState,
        request: SubmitFeedback,
    ) -> WorkflowResult<Submitted> {
        let Some((user, writer)) = self.connected() else {
            return Err(fail(state, WorkflowError::NotConnected));
        };
        if request.partner_name.trim().is_empty() {
            let err = WorkflowError::InvalidInput("partner name is required".to_string());
            return Err(fail(state, err));
        }

        self.initialize_engine(state).await?;

        state.pending("Encrypting rating with FHE...");
        let encrypted = match self
            .engine
            .encrypt(self.reader.contract_address(), user, request.score)
            .await
        {
            Ok(encrypted) => encrypted,
            Err(e) => {
                error!("Encryption failed: {e}");
                return Err(fail(state, WorkflowError::Encryption(e)));
            }
        };

        let id = RecordId::generate();
        state.pending("Submitting encrypted feedback...");
        let tx_hash = match writer
            .create_business_data(CreateBusinessData {
                business_id: id.to_string(),
                name: request.partner_name,
                encrypted_value: encrypted.handle,
                input_proof: encrypted.input_proof,
                public_value1: U256::from(request.public_value1),
                public_value2: U256::from(request.public_value2),
                description: request.tags,
            })
            .await
        {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                error!(business_id = %id, "Submission failed: {e}");
                return Err(fail(state, WorkflowError::from_write(e)));
            }
        };

        state.pending("Waiting for transaction confirmation...");
        let confirmation = match writer.wait_for_confirmation(tx_hash).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                error!(business_id = %id, tx = %tx_hash, "Transaction failed: {e}");
                return Err(fail(state, WorkflowError::from_write(e)));
            }
        };
        info!(business_id = %id, tx = %tx_hash, "Feedback created");

        if let Err(e) = self.refresh(state).await {
            warn!("Reload after submission failed: {e}");
        }
        state.succeed("Feedback submitted successfully!");

        Ok(Submitted {
            id,
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
        })
    }

    /// Reveal a record's rating on-chain. A record that is already verified returns its
    /// stored value without any write.
    pub async fn verify(
        &self,
        state: &mut FeedbackState,
        id: &RecordId,
    ) -> WorkflowResult<Verification> {
        let Some((_, writer)) = self.connected() else {
            return Err(fail(state, WorkflowError::NotConnected));
        };

        let current = match self.reader.get_business_data(id.as_str()).await {
            Ok(data) => FeedbackRecord::from_chain(id.clone(), data),
            Err(e) => {
                error!(business_id = %id, "Failed to read record: {e}");
                return Err(fail(state, WorkflowError::Decryption(e.to_string())));
            }
        };
        if let Some(value) = current.decrypted_value() {
            info!(business_id = %id, "Record already verified on-chain");
            state.succeed("Data already verified on-chain");
            return Ok(Verification {
                value,
                already_verified: true,
            });
        }

        if let Err(e) = self.ensure_engine().await {
            error!(business_id = %id, "FHE initialization failed: {e}");
            return Err(fail(state, WorkflowError::Decryption(e.to_string())));
        }

        let handle = match self.reader.get_encrypted_value(id.as_str()).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(business_id = %id, "Failed to read ciphertext handle: {e}");
                return Err(fail(state, WorkflowError::Decryption(e.to_string())));
            }
        };

        state.pending("Decrypting and verifying on-chain...");
        let submitter = ContractSubmitter::new(writer, id.as_str());
        let outcome = match self
            .engine
            .verify_decryption(&[handle], self.reader.contract_address(), &submitter)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(business_id = %id, "Decryption failed: {e}");
                return Err(fail(state, WorkflowError::Decryption(e.to_string())));
            }
        };

        let verification = match outcome {
            DecryptionOutcome::Verified(result) => {
                let value = result
                    .value_for(&handle)
                    .map_err(|e| WorkflowError::Decryption(e.to_string()))
                    .and_then(|v| {
                        u32::try_from(v).map_err(|_| {
                            WorkflowError::Decryption(format!("clear value {v} out of range"))
                        })
                    });
                match value {
                    Ok(value) => Verification {
                        value,
                        already_verified: false,
                    },
                    Err(e) => return Err(fail(state, e)),
                }
            }
            DecryptionOutcome::AlreadyVerified => {
                // Someone else verified it between the check and the write
                let stored = self
                    .reader
                    .get_business_data(id.as_str())
                    .await
                    .map_err(|e| WorkflowError::Decryption(e.to_string()));
                match stored {
                    Ok(data) => Verification {
                        value: data.decrypted_value,
                        already_verified: true,
                    },
                    Err(e) => return Err(fail(state, e)),
                }
            }
        };

        if let Err(e) = self.refresh(state).await {
            warn!("Reload after verification failed: {e}");
        }
        if verification.already_verified {
            state.succeed("Data already verified on-chain");
        } else {
            info!(business_id = %id, value = verification.value, "Record verified");
            state.succeed("Data decrypted and verified successfully!");
        }
        Ok(verification)
    }

    /// Ask the contract whether it is live
    pub async fn probe_availability(&self, state: &mut FeedbackState) -> WorkflowResult<bool> {
        match self.reader.is_available().await {
            Ok(true) => {
                state.succeed("Contract is available!");
                Ok(true)
            }
            Ok(false) => {
                state.fail("Contract is not available");
                Ok(false)
            }
            Err(e) => {
                error!("Availability check failed: {e}");
                Err(fail(state, WorkflowError::Unavailable(e)))
            }
        }
    }
}
