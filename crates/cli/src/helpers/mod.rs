// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use chrono::DateTime;
use dfb_workflow::{FeedbackRecord, FeedbackState, Rating, TransactionStatus};

pub mod telemetry;

/// Print the current status banner, if any
pub fn print_banner(state: &FeedbackState) {
    let Some(banner) = state.banner() else {
        return;
    };
    match banner.status {
        TransactionStatus::Error => eprintln!("[{}] {}", banner.status, banner.message),
        _ => println!("[{}] {}", banner.status, banner.message),
    }
}

/// Seconds since epoch as `YYYY-MM-DD HH:MM` UTC
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn format_rating(rating: Rating) -> String {
    match rating {
        Rating::Verified(value) => format!("{value}/10"),
        Rating::Encrypted => "encrypted".to_string(),
    }
}

/// One line summary used by `list`
pub fn format_record_line(record: &FeedbackRecord) -> String {
    let tags = if record.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", record.tags)
    };
    format!(
        "{}  {}  {:<10} {}{}",
        record.id,
        format_timestamp(record.timestamp),
        format_rating(record.rating),
        record.partner_name,
        tags
    )
}
