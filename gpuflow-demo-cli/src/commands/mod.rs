//! CLI command implementations

pub mod config;
pub mod create;
pub mod listings;
pub mod rate;
pub mod session;
pub mod shell;
pub mod status;

use anyhow::{Context, Result};
use gpuflow_lib::credentials::CredentialsClient;
use gpuflow_lib::demo::DEMO_RENTER;
use gpuflow_lib::executors::testnet::{get_chain_config_from_env, get_credentials_config_from_env};
use gpuflow_lib::executors::{ChainConfig, CredentialsConfig, FlowForwarder, MarketplaceContract};
use gpuflow_lib::{Address, ListingRegistryClient, Marketplace, PaymentStreamClient};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const CONFIG_FILE: &str = "market.json";

/// Marketplace configuration stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MarketConfig {
    /// Chain and contract settings (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainConfig>,
    /// Credentials backend (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialsConfig>,
    /// Wallet address used to find the user's own rentals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renter: Option<Address>,
}

impl MarketConfig {
    /// Load marketplace configuration from disk
    pub fn load(storage_dir: &Path) -> Result<Option<Self>> {
        let config_path = storage_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&config_path)
            .context("Failed to read marketplace configuration")?;
        let config: Self =
            serde_json::from_str(&contents).context("Failed to parse marketplace configuration")?;
        Ok(Some(config))
    }

    /// Save marketplace configuration to disk
    pub fn save(&self, storage_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(storage_dir)?;
        let config_path = storage_dir.join(CONFIG_FILE);
        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize marketplace config")?;
        std::fs::write(&config_path, contents)
            .context("Failed to write marketplace configuration")?;
        Ok(())
    }

    /// Remove the configuration file. Returns false if there was none.
    pub fn clear(storage_dir: &Path) -> Result<bool> {
        let config_path = storage_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&config_path).context("Failed to remove marketplace configuration")?;
        Ok(true)
    }

    /// Configuration from `GPUFLOW_*` environment variables
    pub fn from_env() -> Self {
        Self {
            chain: get_chain_config_from_env(),
            credentials: get_credentials_config_from_env(),
            renter: None,
        }
    }

    /// The saved file, or the environment when no file exists
    pub fn resolve(storage_dir: &Path) -> Result<Self> {
        Ok(Self::load(storage_dir)?.unwrap_or_else(Self::from_env))
    }
}

/// A marketplace plus the configuration it was built from
pub struct Session {
    pub market: Marketplace,
    pub config: MarketConfig,
}

impl Session {
    /// Build a session from the stored configuration
    pub fn open(storage_dir: &Path, force_demo: bool) -> Result<Self> {
        let config = MarketConfig::resolve(storage_dir)?;
        let market = build_marketplace(&config, force_demo)?;
        Ok(Self { market, config })
    }

    /// Address whose rentals count as "mine"
    ///
    /// Demo sessions are always recorded under the placeholder renter.
    pub fn renter(&self) -> Address {
        if self.market.registry().is_demo_mode() {
            return Address::new(DEMO_RENTER);
        }
        self.config.renter.clone().unwrap_or_default()
    }
}

/// Wire the clients for `config`, seeding the demo ledger
pub fn build_marketplace(config: &MarketConfig, force_demo: bool) -> Result<Marketplace> {
    let mut market = match (&config.chain, force_demo) {
        (Some(chain), false) => {
            let contract =
                MarketplaceContract::new(chain.clone()).context("Invalid chain configuration")?;
            let forwarder =
                FlowForwarder::new(chain.clone()).context("Invalid forwarder configuration")?;
            tracing::debug!(rpc_url = %chain.rpc_url, chain_id = chain.chain_id, "using live backends");
            Marketplace::new(
                ListingRegistryClient::new(Arc::new(contract)),
                PaymentStreamClient::new(Arc::new(forwarder)),
            )
        }
        (None, false) => {
            tracing::info!("no chain configured, running in demo mode");
            Marketplace::new(
                ListingRegistryClient::demo_only(),
                PaymentStreamClient::demo_only(),
            )
        }
        (_, true) => Marketplace::new(
            ListingRegistryClient::demo_only(),
            PaymentStreamClient::demo_only(),
        ),
    };

    if let Some(credentials) = &config.credentials {
        let client = CredentialsClient::new(credentials.clone())
            .context("Invalid credentials backend configuration")?;
        market = market.with_access(Arc::new(client));
    }

    market.registry().demo_ledger().seed();
    Ok(market)
}
