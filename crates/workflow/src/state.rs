// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::models::{FeedbackRecord, FeedbackStats, RecordId};
use crate::status::{StatusBanner, StatusTimings};
use alloy::primitives::Address;
use anyhow::bail;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Verified,
    Pending,
}

impl StatusFilter {
    pub fn accepts(&self, record: &FeedbackRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Verified => record.is_verified(),
            StatusFilter::Pending => !record.is_verified(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "verified" => Ok(StatusFilter::Verified),
            "pending" => Ok(StatusFilter::Pending),
            other => bail!("Unknown status filter '{other}'"),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusFilter::All => "all",
            StatusFilter::Verified => "verified",
            StatusFilter::Pending => "pending",
        };
        f.write_str(label)
    }
}

/// Everything the workflows read and write between calls.
///
/// Record collections are only ever replaced whole, so a reader never observes a
/// half-finished reload. Workflows take `&mut FeedbackState`, which keeps at most one
/// operation in flight per state.
#[derive(Debug, Clone, Default)]
pub struct FeedbackState {
    records: Vec<FeedbackRecord>,
    user_history: Vec<FeedbackRecord>,
    stats: FeedbackStats,
    filter: StatusFilter,
    search: String,
    banner: Option<StatusBanner>,
    timings: StatusTimings,
}

impl FeedbackState {
    pub fn new(timings: StatusTimings) -> Self {
        Self {
            timings,
            ..Default::default()
        }
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    /// Records created by the active address
    pub fn user_history(&self) -> &[FeedbackRecord] {
        &self.user_history
    }

    pub fn stats(&self) -> FeedbackStats {
        self.stats
    }

    pub fn find(&self, id: &RecordId) -> Option<&FeedbackRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Records passing the current status filter and search term
    pub fn visible_records(&self) -> Vec<&FeedbackRecord> {
        self.records
            .iter()
            .filter(|r| self.filter.accepts(r) && r.matches_search(&self.search))
            .collect()
    }

    pub(crate) fn replace_records(&mut self, records: Vec<FeedbackRecord>, owner: Option<Address>) {
        self.user_history = match owner {
            Some(owner) => records
                .iter()
                .filter(|r| r.creator == owner)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        self.stats = FeedbackStats::from_records(&records);
        self.records = records;
    }

    /// The current banner, if it has not expired
    pub fn banner(&self) -> Option<&StatusBanner> {
        self.banner.as_ref().filter(|b| b.is_visible())
    }

    pub(crate) fn pending(&mut self, message: &str) {
        self.banner = Some(StatusBanner::pending(message));
    }

    pub(crate) fn succeed(&mut self, message: &str) {
        self.banner = Some(StatusBanner::success(message, self.timings.success));
    }

    pub(crate) fn fail(&mut self, message: &str) {
        self.banner = Some(StatusBanner::error(message, self.timings.error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use crate::status::TransactionStatus;
    use std::time::Duration;

    fn record(id: &str, name: &str, creator: u8, rating: Rating) -> FeedbackRecord {
        FeedbackRecord {
            id: id.into(),
            partner_name: name.to_string(),
            tags: "Dinner".to_string(),
            timestamp: 0,
            creator: Address::repeat_byte(creator),
            public_value1: 6,
            public_value2: 0,
            rating,
        }
    }

    fn state() -> FeedbackState {
        let mut state = FeedbackState::default();
        state.replace_records(
            vec![
                record("1", "Alex", 1, Rating::Verified(8)),
                record("2", "Blake", 2, Rating::Encrypted),
                record("3", "alexis", 1, Rating::Encrypted),
            ],
            Some(Address::repeat_byte(1)),
        );
        state
    }

    #[test]
    fn test_user_history_is_by_creator() {
        let state = state();
        let ids: Vec<_> = state.user_history().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(state.stats().total, 3);
        assert_eq!(state.stats().verified, 1);
    }

    #[test]
    fn test_no_owner_no_history() {
        let mut state = state();
        let records = state.records().to_vec();
        state.replace_records(records, None);
        assert!(state.user_history().is_empty());
        assert_eq!(state.records().len(), 3);
    }

    #[test]
    fn test_filter_and_search() {
        let mut state = state();
        assert_eq!(state.visible_records().len(), 3);

        state.set_filter(StatusFilter::Pending);
        assert_eq!(state.visible_records().len(), 2);

        state.set_search("ALEX");
        let visible = state.visible_records();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "3");

        state.set_filter(StatusFilter::Verified);
        assert_eq!(state.visible_records()[0].id.as_str(), "1");
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("Verified".parse::<StatusFilter>().unwrap(), StatusFilter::Verified);
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("done".parse::<StatusFilter>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_clears_after_timeout() {
        let mut state = FeedbackState::new(StatusTimings::default());
        state.fail("Failed to load data");
        assert_eq!(state.banner().unwrap().status, TransactionStatus::Error);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(state.banner().is_none());

        state.pending("Encrypting rating...");
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(state.banner().unwrap().message, "Encrypting rating...");
    }
}
