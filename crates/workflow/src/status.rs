// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use dfb_config::StatusConfig;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Error,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// How long terminal banners stay visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTimings {
    pub success: Duration,
    pub error: Duration,
}

impl Default for StatusTimings {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(2),
            error: Duration::from_secs(3),
        }
    }
}

impl From<&StatusConfig> for StatusTimings {
    fn from(config: &StatusConfig) -> Self {
        Self {
            success: Duration::from_millis(config.success_ms),
            error: Duration::from_millis(config.error_ms),
        }
    }
}

/// A transient status message. Pending banners stay until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub status: TransactionStatus,
    pub message: String,
    expires_at: Option<Instant>,
}

impl StatusBanner {
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            status: TransactionStatus::Pending,
            message: message.into(),
            expires_at: None,
        }
    }

    pub fn success(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            status: TransactionStatus::Success,
            message: message.into(),
            expires_at: Some(Instant::now() + ttl),
        }
    }

    pub fn error(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            status: TransactionStatus::Error,
            message: message.into(),
            expires_at: Some(Instant::now() + ttl),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }
}
