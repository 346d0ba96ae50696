// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ChainWorkflow;
use crate::helpers::print_banner;
use anyhow::Result;
use dfb_config::validation::Score;
use dfb_workflow::{FeedbackState, SubmitFeedback};

pub struct SubmitArgs {
    pub partner: String,
    pub score: Score,
    pub tags: String,
    pub public_value1: u64,
    pub public_value2: u64,
}

pub async fn execute(
    workflow: &ChainWorkflow,
    state: &mut FeedbackState,
    args: SubmitArgs,
) -> Result<()> {
    let request = SubmitFeedback {
        partner_name: args.partner,
        score: u32::from(args.score.value()),
        tags: args.tags,
        public_value1: args.public_value1,
        public_value2: args.public_value2,
    };

    let submitted = workflow.submit(state, request).await;
    print_banner(state);
    let submitted = submitted?;

    println!("{}", submitted.id);
    match submitted.block_number {
        Some(block) => println!("tx {} mined in block {}", submitted.tx_hash, block),
        None => println!("tx {}", submitted.tx_hash),
    }
    Ok(())
}
