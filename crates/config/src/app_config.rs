// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::load_config::find_in_parent;
use crate::load_config::resolve_config_path;
use crate::yaml::load_yaml_with_env;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use std::{env, path::PathBuf};
use zeroize::Zeroizing;

pub const DEFAULT_CONFIG_NAME: &str = "datefeedback.config.yaml";
pub const ENV_PREFIX: &str = "DATEFEEDBACK_";

/// Signing wallet. Without a private key the client runs as a disconnected session and can
/// only read.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    private_key: Option<String>,
}

impl WalletConfig {
    pub fn new(private_key: Option<String>) -> Self {
        Self { private_key }
    }

    pub fn private_key(&self) -> Option<Zeroizing<String>> {
        self.private_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| Zeroizing::new(k.trim().to_string()))
    }
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where the FHE gateway service lives
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct FheConfig {
    pub gateway_url: String,
    pub request_timeout_ms: u64,
}

impl Default for FheConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:7077".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl FheConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// How long transient status banners stay visible
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct StatusConfig {
    pub success_ms: u64,
    pub error_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            success_ms: 2_000,
            error_ms: 3_000,
        }
    }
}

/// The config actually used throughout the app
#[derive(Debug)]
pub struct AppConfig {
    /// The chain selected for this run
    chain: ChainConfig,
    /// All configured chains
    chains: Vec<ChainConfig>,
    wallet: WalletConfig,
    fhe: FheConfig,
    status: StatusConfig,
    /// Open Telemetry collector grpc endpoint. Eg. 127.0.0.1:4317
    otel: Option<String>,
    config_file: PathBuf,
}

impl AppConfig {
    pub fn try_from_unscoped(config: UnscopedAppConfig, chain_name: Option<&str>) -> Result<Self> {
        let wanted = chain_name.map(str::to_owned).or(config.chain.clone());

        let chain = match wanted {
            Some(name) => {
                let Some(chain) = config.chains.iter().find(|c| c.name == name) else {
                    bail!("Could not find chain '{}'. Did you forget to include it in your configuration?", name);
                };
                chain.clone()
            }
            None => {
                let Some(chain) = config.chains.first() else {
                    bail!("No chains configured. Add at least one entry under `chains`.");
                };
                chain.clone()
            }
        };

        // Fail early on an unusable endpoint or address
        chain.rpc_url()?;
        chain.contracts.feedback.parsed_address()?;

        Ok(AppConfig {
            chain,
            chains: config.chains,
            wallet: config.wallet,
            fhe: config.fhe,
            status: config.status,
            otel: config.otel,
            config_file: config.found_config_file.unwrap_or_default(),
        })
    }

    /// Get the selected chain
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Get every configured chain
    pub fn chains(&self) -> &Vec<ChainConfig> {
        &self.chains
    }

    pub fn wallet(&self) -> &WalletConfig {
        &self.wallet
    }

    pub fn fhe(&self) -> &FheConfig {
        &self.fhe
    }

    pub fn status(&self) -> &StatusConfig {
        &self.status
    }

    /// Get the open telemetry collector url
    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }

    /// Get the config file path
    pub fn config_file(&self) -> PathBuf {
        self.config_file.clone()
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UnscopedAppConfig {
    chains: Vec<ChainConfig>,
    /// Name of the chain used when `--chain` is not given
    chain: Option<String>,
    wallet: WalletConfig,
    fhe: FheConfig,
    status: StatusConfig,
    otel: Option<String>,
    /// The config file as found on disk. Set by the loader, not by users.
    found_config_file: Option<PathBuf>,
}

/// Value struct for passing configuration from the cli to the configuration
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel: Option<String>,
    pub found_config_file: Option<PathBuf>,
}

/// Load the config at the config_file or the default location if not provided
pub fn load_config(
    config_file: Option<String>,
    chain: Option<String>,
    otel: Option<String>,
) -> Result<AppConfig> {
    let config_file = config_file.map(PathBuf::from);

    let resolved_config_path = resolve_config_path(
        find_in_parent,
        env::current_dir()?,
        OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        config_file,
    );

    let loaded_yaml =
        load_yaml_with_env(&resolved_config_path).context("Configuration file not found")?;

    let config: UnscopedAppConfig =
        Figment::from(Serialized::defaults(&UnscopedAppConfig::default()))
            .merge(Yaml::string(&loaded_yaml))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(&CliOverrides {
                otel,
                found_config_file: Some(resolved_config_path),
            }))
            .extract()
            .context("Could not parse configuration")?;

    AppConfig::try_from_unscoped(config, chain.as_deref())
        .context("Could not select a chain from the configuration")
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datefeedback")
    }
}
