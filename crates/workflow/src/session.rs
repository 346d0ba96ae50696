// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use anyhow::Result;
use dfb_evm::parse_signer;

/// Source of the active wallet address
pub trait WalletSession: Send + Sync {
    fn address(&self) -> Option<Address>;

    fn is_connected(&self) -> bool {
        self.address().is_some()
    }
}

/// A session with a fixed address, or none at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalSession {
    address: Option<Address>,
}

impl LocalSession {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None }
    }

    /// Session for the address of a local signing key
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        Ok(Self::connected(parse_signer(private_key)?.address()))
    }
}

impl WalletSession for LocalSession {
    fn address(&self) -> Option<Address> {
        self.address
    }
}
