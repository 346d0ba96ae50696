// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::{
        http::{
            reqwest::{
                header::{HeaderMap, HeaderValue, AUTHORIZATION},
                Client,
            },
            Http,
        },
        ws::WsConnect,
        Authorization,
    },
};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use dfb_config::{ChainConfig, RpcAuth, RPC};

pub trait AuthConversions {
    fn to_header_value(&self) -> Option<HeaderValue>;
    fn to_ws_auth(&self) -> Option<Authorization>;
}

impl AuthConversions for RpcAuth {
    fn to_header_value(&self) -> Option<HeaderValue> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{}:{}", username, password));
                HeaderValue::from_str(&format!("Basic {}", credentials)).ok()
            }
            RpcAuth::Bearer(token) => HeaderValue::from_str(&format!("Bearer {}", token)).ok(),
        }
    }

    fn to_ws_auth(&self) -> Option<Authorization> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => Some(Authorization::basic(username, password)),
            RpcAuth::Bearer(token) => Some(Authorization::bearer(token)),
        }
    }
}

/// Builds read-only and signer-bound providers for one chain
pub struct ProviderConfig {
    rpc: RPC,
    auth: RpcAuth,
}

impl ProviderConfig {
    pub fn new(rpc: RPC, auth: RpcAuth) -> Self {
        Self { rpc, auth }
    }

    pub fn from_chain(chain: &ChainConfig) -> Result<Self> {
        Ok(Self::new(chain.rpc_url()?, chain.rpc_auth.clone()))
    }

    pub async fn create_readonly_provider(&self) -> Result<DynProvider> {
        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .connect_ws(self.create_ws_connect()?)
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?
                .erased()
        } else {
            ProviderBuilder::new()
                .connect_client(self.create_http_client()?)
                .erased()
        };

        Ok(provider)
    }

    pub async fn create_signer_provider(&self, signer: &PrivateKeySigner) -> Result<DynProvider> {
        let wallet = EthereumWallet::from(signer.clone());

        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_ws(self.create_ws_connect()?)
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?
                .erased()
        } else {
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_client(self.create_http_client()?)
                .erased()
        };

        Ok(provider)
    }

    fn create_ws_connect(&self) -> Result<WsConnect> {
        let mut ws_connect = WsConnect::new(self.rpc.as_ws_url()?);

        if let Some(auth) = self.auth.to_ws_auth() {
            ws_connect = ws_connect.with_auth(auth);
        }

        Ok(ws_connect)
    }

    fn create_http_client(&self) -> Result<alloy::rpc::client::RpcClient> {
        let mut headers = HeaderMap::new();
        if let Some(auth_header) = self.auth.to_header_value() {
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let http = Http::with_client(client, self.rpc.as_http_url()?.parse()?);
        Ok(alloy::rpc::client::RpcClient::new(http, self.rpc.is_local()))
    }
}

/// Parse a hex private key into a local signer
pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner> {
    private_key
        .trim()
        .parse::<PrivateKeySigner>()
        .context("Invalid wallet private key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_values() {
        let basic = RpcAuth::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(
            basic.to_header_value().unwrap(),
            HeaderValue::from_static("Basic dXNlcjpwYXNz")
        );
        assert_eq!(
            RpcAuth::Bearer("token".to_string())
                .to_header_value()
                .unwrap(),
            HeaderValue::from_static("Bearer token")
        );
        assert!(RpcAuth::None.to_header_value().is_none());
        assert!(RpcAuth::None.to_ws_auth().is_none());
    }

    #[test]
    fn test_parse_signer() -> Result<()> {
        // anvil account #0
        let signer = parse_signer(
            " 0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80 ",
        )?;
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(parse_signer("0x1234").is_err());
        Ok(())
    }
}
