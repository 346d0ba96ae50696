// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use dfb_evm::GatewayError;
use dfb_fhe::FheError;
use thiserror::Error;

/// Failures surfaced by the feedback workflows.
///
/// Each variant maps to exactly one status message shown to the user. An already verified
/// record is not an error: verification reports it as a successful outcome instead.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Please connect wallet first")]
    NotConnected,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encryption failed: {0}")]
    Encryption(#[source] FheError),

    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("Transaction failed: {0}")]
    Transaction(#[source] GatewayError),

    #[error("Failed to load data: {0}")]
    Load(#[source] GatewayError),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Availability check failed: {0}")]
    Unavailable(#[source] GatewayError),
}

impl WorkflowError {
    /// Map a failed contract write during submission
    pub(crate) fn from_write(err: GatewayError) -> Self {
        match err {
            GatewayError::UserRejected => WorkflowError::UserRejected,
            other => WorkflowError::Transaction(other),
        }
    }

    /// Short message for the status banner
    pub fn status_message(&self) -> String {
        let message = match self {
            WorkflowError::NotConnected => "Please connect wallet first",
            WorkflowError::InvalidInput(_) => "Please check the feedback details",
            WorkflowError::Encryption(_) => "Encryption failed",
            WorkflowError::UserRejected => "Transaction rejected by user",
            WorkflowError::Transaction(_) => "Submission failed",
            WorkflowError::Load(_) => "Failed to load data",
            WorkflowError::Decryption(cause) => return format!("Decryption failed: {cause}"),
            WorkflowError::Unavailable(_) => "Availability check failed",
        };
        message.to_string()
    }
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_errors_keep_rejection_distinct() {
        assert!(matches!(
            WorkflowError::from_write(GatewayError::UserRejected),
            WorkflowError::UserRejected
        ));
        assert!(matches!(
            WorkflowError::from_write(GatewayError::Contract("out of gas".to_string())),
            WorkflowError::Transaction(GatewayError::Contract(_))
        ));
    }

    #[test]
    fn test_decryption_banner_keeps_cause() {
        let err = WorkflowError::Decryption("relayer timeout".to_string());
        assert_eq!(err.status_message(), "Decryption failed: relayer timeout");
        assert_eq!(
            WorkflowError::NotConnected.status_message(),
            "Please connect wallet first"
        );
    }
}
