// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ChainWorkflow;
use crate::helpers::{format_rating, format_timestamp, print_banner};
use anyhow::{bail, Result};
use dfb_workflow::{FeedbackState, RecordId};

pub async fn execute(
    workflow: &ChainWorkflow,
    state: &mut FeedbackState,
    id: String,
    json: bool,
) -> Result<()> {
    let report = workflow.refresh(state).await;
    print_banner(state);
    report?;

    let id = RecordId::from(id);
    let Some(record) = state.find(&id) else {
        bail!("Record '{}' not found", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("id:        {}", record.id);
    println!("partner:   {}", record.partner_name);
    println!("tags:      {}", record.tags);
    println!("rating:    {}", format_rating(record.rating));
    println!("created:   {}", format_timestamp(record.timestamp));
    println!("creator:   {}", record.creator);
    println!(
        "public:    {} / {}",
        record.public_value1, record.public_value2
    );
    Ok(())
}
