//! Configuration types for the real backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Address;

/// Chain id of Polygon Amoy, the network the marketplace is deployed on.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

/// Address of the streaming protocol's constant-flow forwarder.
///
/// The forwarder is deployed at the same address on every supported chain.
pub const CFA_FORWARDER_ADDRESS: &str = "0xcfA132E353cB4E398080B9700609bb008eceB125";

/// Configuration for the JSON-RPC ledger and flow executors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL (e.g., "http://localhost:8545").
    pub rpc_url: String,

    /// Chain the marketplace contract lives on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Address of the marketplace contract.
    pub marketplace_address: Address,

    /// Address of the constant-flow forwarder.
    #[serde(default = "default_forwarder")]
    pub forwarder_address: Address,

    /// Streaming token addresses keyed by symbol (e.g., "fDAIx").
    #[serde(default)]
    pub super_tokens: BTreeMap<String, Address>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_chain_id() -> u64 {
    POLYGON_AMOY_CHAIN_ID
}

fn default_forwarder() -> Address {
    Address::new(CFA_FORWARDER_ADDRESS)
}

fn default_timeout() -> u64 {
    30
}

impl ChainConfig {
    /// Create a new chain configuration with default chain and forwarder.
    pub fn new(rpc_url: impl Into<String>, marketplace_address: impl Into<Address>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id: default_chain_id(),
            marketplace_address: marketplace_address.into(),
            forwarder_address: default_forwarder(),
            super_tokens: BTreeMap::new(),
            timeout_secs: default_timeout(),
        }
    }

    /// Configuration for Polygon Amoy.
    pub fn polygon_amoy(rpc_url: impl Into<String>, marketplace_address: impl Into<Address>) -> Self {
        Self::new(rpc_url, marketplace_address).with_chain_id(POLYGON_AMOY_CHAIN_ID)
    }

    /// Set the chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the forwarder address.
    pub fn with_forwarder(mut self, forwarder: impl Into<Address>) -> Self {
        self.forwarder_address = forwarder.into();
        self
    }

    /// Register a streaming token address.
    pub fn with_super_token(mut self, symbol: impl Into<String>, address: impl Into<Address>) -> Self {
        self.super_tokens.insert(symbol.into(), address.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Look up a streaming token by symbol.
    pub fn super_token(&self, symbol: &str) -> Option<&Address> {
        self.super_tokens.get(symbol)
    }
}

/// Configuration for the auxiliary credentials backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Base URL of the backend (e.g., `https://backend.example`).
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl CredentialsConfig {
    /// Create a new credentials backend configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
