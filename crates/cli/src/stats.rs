// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ChainWorkflow;
use crate::helpers::print_banner;
use anyhow::Result;
use dfb_workflow::FeedbackState;

pub async fn execute(workflow: &ChainWorkflow, state: &mut FeedbackState) -> Result<()> {
    let report = workflow.refresh(state).await;
    print_banner(state);
    let report = report?;

    let stats = state.stats();
    println!("Total feedback:   {}", stats.total);
    println!("Verified ratings: {}", stats.verified);
    println!("Average score:    {:.1}", stats.average_score);
    println!("Your feedback:    {}", state.user_history().len());
    if !report.skipped.is_empty() {
        println!("Unreadable:       {}", report.skipped.len());
    }
    Ok(())
}
