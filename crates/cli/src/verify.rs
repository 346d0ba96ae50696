// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ChainWorkflow;
use crate::helpers::print_banner;
use anyhow::Result;
use dfb_workflow::{FeedbackState, RecordId};

pub async fn execute(workflow: &ChainWorkflow, state: &mut FeedbackState, id: String) -> Result<()> {
    let id = RecordId::from(id);
    let verification = workflow.verify(state, &id).await;
    print_banner(state);
    let verification = verification?;

    if verification.already_verified {
        println!("{id}: {}/10 (already verified)", verification.value);
    } else {
        println!("{id}: {}/10", verification.value);
    }
    Ok(())
}
