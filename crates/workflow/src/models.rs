// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, TxHash};
use dfb_evm::BusinessData;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const RECORD_ID_PREFIX: &str = "feedback-";

/// Identifier of a feedback record, unique per contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// A fresh identifier carrying 128 random bits
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(format!("{RECORD_ID_PREFIX}{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Whether the encrypted rating has been revealed on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Rating {
    Encrypted,
    Verified(u32),
}

/// One feedback entry as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: RecordId,
    pub partner_name: String,
    pub tags: String,
    pub timestamp: u64,
    pub creator: Address,
    pub public_value1: u64,
    pub public_value2: u64,
    pub rating: Rating,
}

impl FeedbackRecord {
    pub fn from_chain(id: RecordId, data: BusinessData) -> Self {
        // The contract leaves decryptedValue at zero until verification
        let rating = if data.is_verified {
            Rating::Verified(data.decrypted_value)
        } else {
            Rating::Encrypted
        };

        Self {
            id,
            partner_name: data.name,
            tags: data.description,
            timestamp: data.timestamp,
            creator: data.creator,
            public_value1: data.public_value1.saturating_to::<u64>(),
            public_value2: data.public_value2.saturating_to::<u64>(),
            rating,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.rating, Rating::Verified(_))
    }

    pub fn decrypted_value(&self) -> Option<u32> {
        match self.rating {
            Rating::Verified(value) => Some(value),
            Rating::Encrypted => None,
        }
    }

    /// Case-insensitive match against the partner name and tags
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.partner_name.to_lowercase().contains(&term)
            || self.tags.to_lowercase().contains(&term)
    }
}

/// Aggregates recomputed after every reload
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub verified: usize,
    /// Mean of `public_value1` over all records, one decimal place
    pub average_score: f64,
}

impl FeedbackStats {
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let verified = records.iter().filter(|r| r.is_verified()).count();
        let sum: f64 = records.iter().map(|r| r.public_value1 as f64).sum();
        let average = sum / records.len() as f64;

        Self {
            total: records.len(),
            verified,
            average_score: (average * 10.0).round() / 10.0,
        }
    }
}

/// Input of the submit workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedback {
    pub partner_name: String,
    /// Plaintext rating. Only ever handed to the FHE engine.
    pub score: u32,
    pub tags: String,
    pub public_value1: u64,
    pub public_value2: u64,
}

/// A feedback record that was created and mined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub id: RecordId,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Result of the verification workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub value: u32,
    /// True when the record was verified before this call
    pub already_verified: bool,
}

/// Result of a reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub loaded: usize,
    pub skipped: Vec<RecordId>,
}
