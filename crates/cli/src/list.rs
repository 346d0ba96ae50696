// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::ChainWorkflow;
use crate::helpers::{format_record_line, print_banner};
use anyhow::Result;
use dfb_workflow::{FeedbackRecord, FeedbackState, StatusFilter};

pub struct ListOptions {
    pub filter: StatusFilter,
    pub search: Option<String>,
    pub mine: bool,
    pub json: bool,
}

pub async fn execute(
    workflow: &ChainWorkflow,
    state: &mut FeedbackState,
    options: ListOptions,
) -> Result<()> {
    let report = workflow.refresh(state).await;
    print_banner(state);
    report?;

    state.set_filter(options.filter);
    state.set_search(options.search.unwrap_or_default());

    let records: Vec<&FeedbackRecord> = if options.mine {
        state
            .user_history()
            .iter()
            .filter(|r| options.filter.accepts(r) && r.matches_search(state.search()))
            .collect()
    } else {
        state.visible_records()
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No feedback records found");
        return Ok(());
    }
    for record in records {
        println!("{}", format_record_line(record));
    }
    Ok(())
}
