// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A deployed contract, either as a bare address string or with the block it was deployed in
#[derive(Debug, Clone, Hash, Eq, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Contract {
    Full {
        address: String,
        deploy_block: Option<u64>,
    },
    AddressOnly(String),
}

impl Contract {
    pub fn address(&self) -> &String {
        use Contract::*;
        match self {
            Full { address, .. } => address,
            AddressOnly(v) => v,
        }
    }

    pub fn deploy_block(&self) -> Option<u64> {
        use Contract::*;
        match self {
            Full { deploy_block, .. } => *deploy_block,
            AddressOnly(_) => None,
        }
    }

    /// Parse the configured address into a checked `Address`
    pub fn parsed_address(&self) -> Result<Address> {
        self.address()
            .parse::<Address>()
            .with_context(|| format!("Invalid contract address '{}'", self.address()))
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractAddresses {
    /// The date feedback contract holding encrypted ratings
    pub feedback: Contract,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_forms() -> Result<()> {
        let bare: Contract =
            serde_yaml::from_str(r#""0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0""#)?;
        assert_eq!(bare.deploy_block(), None);
        assert_eq!(
            bare.parsed_address()?,
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".parse::<Address>()?
        );

        let full: Contract = serde_yaml::from_str(
            r#"
address: "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"
deploy_block: 42
"#,
        )?;
        assert_eq!(full.deploy_block(), Some(42));
        assert_eq!(full.address(), "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9");
        Ok(())
    }

    #[test]
    fn test_bad_address() {
        let contract = Contract::AddressOnly("not-an-address".to_string());
        assert!(contract.parsed_address().is_err());
    }
}
