//! Testnet and development network configurations.
//!
//! Presets for the networks the marketplace is deployed on, plus loaders
//! that build executor configuration from the environment.
//!
//! # Environment Variables
//!
//! ## Chain Configuration
//! - `GPUFLOW_RPC_URL` - JSON-RPC endpoint (e.g., `http://localhost:8545`)
//! - `GPUFLOW_MARKETPLACE_ADDRESS` - Marketplace contract address
//! - `GPUFLOW_CHAIN_ID` - Chain id (default: 80002)
//! - `GPUFLOW_FORWARDER_ADDRESS` - Flow forwarder address (optional)
//! - `GPUFLOW_SUPER_TOKENS` - Token map, `fDAIx=0x..,USDCx=0x..`
//! - `GPUFLOW_RPC_TIMEOUT` - Request timeout in seconds (default: 30)
//!
//! ## Credentials Backend
//! - `GPUFLOW_CREDENTIALS_URL` - Base URL of the credentials backend
//!
//! # Example
//!
//! ```rust,ignore
//! use gpuflow_lib::executors::testnet::{get_chain_config_from_env, TestnetConfig};
//!
//! let preset = TestnetConfig::local_node("0x...marketplace");
//!
//! if let Some(config) = get_chain_config_from_env() {
//!     let contract = MarketplaceContract::new(config)?;
//! }
//! ```

use std::collections::BTreeMap;

use super::config::{ChainConfig, CredentialsConfig};
use crate::Address;

/// Public Polygon Amoy JSON-RPC endpoint.
pub const AMOY_PUBLIC_RPC: &str = "https://rpc-amoy.polygon.technology";

/// Chain id used by local development nodes (anvil, hardhat).
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// Preconfigured network settings.
#[derive(Clone, Debug)]
pub struct TestnetConfig {
    /// Chain configuration for both executors.
    pub chain: ChainConfig,
    /// Credentials backend (if available).
    pub credentials: Option<CredentialsConfig>,
}

impl TestnetConfig {
    /// Polygon Amoy through the public RPC endpoint.
    ///
    /// Public endpoints expose no unlocked accounts, so writes fail with
    /// `NoSigner` unless the URL points at a signing proxy.
    pub fn polygon_amoy(marketplace_address: impl Into<Address>) -> Self {
        Self {
            chain: ChainConfig::polygon_amoy(AMOY_PUBLIC_RPC, marketplace_address),
            credentials: None,
        }
    }

    /// A local development node on port 8545.
    pub fn local_node(marketplace_address: impl Into<Address>) -> Self {
        Self {
            chain: ChainConfig::new("http://localhost:8545", marketplace_address)
                .with_chain_id(LOCAL_CHAIN_ID)
                .with_timeout(10),
            credentials: Some(CredentialsConfig::new("http://localhost:3001")),
        }
    }

    /// Add credentials backend configuration.
    pub fn with_credentials(mut self, config: CredentialsConfig) -> Self {
        self.credentials = Some(config);
        self
    }
}

// ============================================================================
// Environment Variable Loading
// ============================================================================

/// Load chain configuration from environment variables.
///
/// Requires `GPUFLOW_RPC_URL` and `GPUFLOW_MARKETPLACE_ADDRESS`; the rest
/// are optional.
///
/// ```bash
/// export GPUFLOW_RPC_URL=https://rpc-amoy.polygon.technology
/// export GPUFLOW_MARKETPLACE_ADDRESS=0x...
/// export GPUFLOW_SUPER_TOKENS=fDAIx=0x...
/// ```
pub fn get_chain_config_from_env() -> Option<ChainConfig> {
    let url = std::env::var("GPUFLOW_RPC_URL").ok()?;
    let marketplace = std::env::var("GPUFLOW_MARKETPLACE_ADDRESS").ok()?;

    let mut config = ChainConfig::new(url, marketplace);

    if let Ok(chain_id) = std::env::var("GPUFLOW_CHAIN_ID") {
        if let Ok(id) = chain_id.parse::<u64>() {
            config = config.with_chain_id(id);
        }
    }

    if let Ok(forwarder) = std::env::var("GPUFLOW_FORWARDER_ADDRESS") {
        config = config.with_forwarder(forwarder);
    }

    if let Ok(tokens) = std::env::var("GPUFLOW_SUPER_TOKENS") {
        config.super_tokens.extend(parse_super_tokens(&tokens));
    }

    if let Ok(timeout) = std::env::var("GPUFLOW_RPC_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config = config.with_timeout(secs);
        }
    }

    Some(config)
}

/// Load credentials backend configuration from `GPUFLOW_CREDENTIALS_URL`.
pub fn get_credentials_config_from_env() -> Option<CredentialsConfig> {
    std::env::var("GPUFLOW_CREDENTIALS_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .map(CredentialsConfig::new)
}

/// Load a complete configuration from environment.
///
/// Unset optional values keep their Polygon Amoy defaults.
pub fn get_testnet_config_from_env() -> Option<TestnetConfig> {
    Some(TestnetConfig {
        chain: get_chain_config_from_env()?,
        credentials: get_credentials_config_from_env(),
    })
}

/// Parse a `SYM=0x..,SYM2=0x..` token map. Malformed pairs are skipped.
pub fn parse_super_tokens(s: &str) -> BTreeMap<String, Address> {
    s.split(',')
        .filter_map(|pair| {
            let (symbol, address) = pair.split_once('=')?;
            let (symbol, address) = (symbol.trim(), address.trim());
            if symbol.is_empty() || address.is_empty() {
                return None;
            }
            Some((symbol.to_string(), Address::new(address)))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
