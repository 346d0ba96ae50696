// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcProtocol {
    Http,
    Https,
    Ws,
    Wss,
}

impl RpcProtocol {
    pub fn is_websocket(&self) -> bool {
        matches!(self, RpcProtocol::Ws | RpcProtocol::Wss)
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, RpcProtocol::Https | RpcProtocol::Wss)
    }
}

/// A validated RPC endpoint
#[derive(Clone, Debug)]
pub struct RPC {
    protocol: RpcProtocol,
    url: Url,
}

impl RPC {
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).context("Invalid URL format")?;
        let protocol = match parsed.scheme() {
            "http" => RpcProtocol::Http,
            "https" => RpcProtocol::Https,
            "ws" => RpcProtocol::Ws,
            "wss" => RpcProtocol::Wss,
            _ => bail!("Invalid protocol. Expected: http://, https://, ws://, wss://"),
        };

        if parsed.host_str().is_none() {
            bail!("URL must contain a host");
        }

        Ok(RPC {
            protocol,
            url: parsed,
        })
    }

    pub fn protocol(&self) -> RpcProtocol {
        self.protocol
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_http_url(&self) -> Result<String> {
        self.with_scheme(false)
    }

    pub fn as_ws_url(&self) -> Result<String> {
        self.with_scheme(true)
    }

    fn with_scheme(&self, websocket: bool) -> Result<String> {
        if self.protocol.is_websocket() == websocket {
            return Ok(self.url.to_string());
        }
        let scheme = match (websocket, self.protocol.is_secure()) {
            (true, true) => "wss",
            (true, false) => "ws",
            (false, true) => "https",
            (false, false) => "http",
        };
        let mut parsed = self.url.clone();
        parsed
            .set_scheme(scheme)
            .map_err(|_| anyhow!("{scheme} is a valid scheme"))?;
        Ok(parsed.to_string())
    }

    pub fn is_websocket(&self) -> bool {
        self.protocol.is_websocket()
    }

    pub fn is_local(&self) -> bool {
        match self.url.host_str() {
            Some("localhost" | "127.0.0.1" | "::1" | "[::1]") => true,
            Some(host) => host.starts_with("127."),
            None => false,
        }
    }
}

#[derive(Debug, Hash, Eq, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(tag = "type", content = "credentials")]
pub enum RpcAuth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_detection() -> Result<()> {
        assert_eq!(RPC::from_url("http://localhost:8545")?.protocol(), RpcProtocol::Http);
        assert_eq!(RPC::from_url("wss://node.io")?.protocol(), RpcProtocol::Wss);
        assert!(RPC::from_url("ftp://node.io").is_err());
        assert!(RPC::from_url("not a url").is_err());
        Ok(())
    }

    #[test]
    fn test_scheme_conversion() -> Result<()> {
        let rpc = RPC::from_url("ws://localhost:8545")?;
        assert_eq!(rpc.as_http_url()?, "http://localhost:8545/");
        assert_eq!(rpc.as_ws_url()?, "ws://localhost:8545/");

        let rpc = RPC::from_url("https://sepolia.example.org/key")?;
        assert_eq!(rpc.as_ws_url()?, "wss://sepolia.example.org/key");
        Ok(())
    }

    #[test]
    fn test_is_local() -> Result<()> {
        assert!(RPC::from_url("http://127.0.0.5:8545")?.is_local());
        assert!(RPC::from_url("ws://localhost:8545")?.is_local());
        assert!(!RPC::from_url("https://sepolia.example.org")?.is_local());
        Ok(())
    }
}
