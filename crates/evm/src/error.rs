// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::contracts::DateFeedback;
use alloy::primitives::TxHash;
use thiserror::Error;

/// EIP-1193 "User Rejected Request"
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("Record '{0}' is already verified")]
    AlreadyVerified(String),

    #[error("Record '{0}' not found")]
    NotFound(String),

    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Classify an alloy contract error using the structured RPC payload and decoded revert
    /// data.
    pub fn from_contract(err: alloy::contract::Error) -> Self {
        if let alloy::contract::Error::TransportError(transport) = &err {
            if let Some(payload) = transport.as_error_resp() {
                if payload.code == USER_REJECTED_CODE {
                    return GatewayError::UserRejected;
                }
            }
        }

        if let Some(decoded) = err.as_decoded_error::<DateFeedback::AlreadyVerified>() {
            return GatewayError::AlreadyVerified(decoded.businessId);
        }

        if let Some(decoded) = err.as_decoded_error::<DateFeedback::NotFound>() {
            return GatewayError::NotFound(decoded.businessId);
        }

        GatewayError::Contract(err.to_string())
    }
}
