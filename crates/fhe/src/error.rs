// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::B256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FheError {
    #[error("FHE engine is not initialized")]
    NotInitialized,

    #[error("FHE engine rejected the request: {0}")]
    Rejected(String),

    #[error("FHE gateway error: {0}")]
    Gateway(String),

    #[error("Submitting decryption proof failed: {0}")]
    Submission(String),

    #[error("No clear value returned for handle {0}")]
    MissingHandle(B256),
}

pub type FheResult<T> = std::result::Result<T, FheError>;
