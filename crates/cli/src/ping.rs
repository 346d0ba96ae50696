// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ChainWorkflow;
use crate::helpers::print_banner;
use anyhow::{bail, Result};
use dfb_workflow::FeedbackState;

pub async fn execute(workflow: &ChainWorkflow, state: &mut FeedbackState) -> Result<()> {
    let available = workflow.probe_availability(state).await;
    print_banner(state);
    if !available? {
        bail!("Contract is not available");
    }
    Ok(())
}
