// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use dfb_config::AppConfig;
use dfb_evm::{FeedbackContractFactory, FeedbackReadContract, FeedbackWriteContract};
use dfb_fhe::HttpFheEngine;
use dfb_workflow::{FeedbackState, FeedbackWorkflow, LocalSession, StatusTimings};
use tracing::{info, warn};

pub type ChainWorkflow =
    FeedbackWorkflow<FeedbackReadContract, FeedbackWriteContract, HttpFheEngine, LocalSession>;

/// Wire the workflow for the selected chain. Without a wallet key the session is
/// disconnected and only read commands succeed.
pub async fn connect(config: &AppConfig) -> Result<ChainWorkflow> {
    let chain = config.chain();
    let reader = FeedbackContractFactory::create_read(chain).await?;
    let engine = HttpFheEngine::new(config.fhe())?;

    let (writer, session) = match config.wallet().private_key() {
        Some(key) => {
            let writer = FeedbackContractFactory::create_write(chain, &key).await?;
            let session = LocalSession::from_private_key(&key)?;
            info!(address = %writer.signer_address(), chain = %chain.name, "Wallet connected");
            (Some(writer), session)
        }
        None => {
            warn!("No wallet private key configured; running read-only");
            (None, LocalSession::disconnected())
        }
    };

    Ok(FeedbackWorkflow::new(reader, writer, engine, session))
}

pub fn new_state(config: &AppConfig) -> FeedbackState {
    FeedbackState::new(StatusTimings::from(config.status()))
}
