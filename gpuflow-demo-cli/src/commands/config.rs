//! Marketplace configuration commands
//!
//! Stored in `market.json` under the storage directory. When the file does
//! not exist the `GPUFLOW_*` environment variables are used instead.

use anyhow::{Context, Result};
use gpuflow_lib::executors::testnet::{parse_super_tokens, TestnetConfig};
use gpuflow_lib::executors::{ChainConfig, CredentialsConfig};
use gpuflow_lib::Address;
use std::path::Path;

use super::MarketConfig;
use crate::ui;

/// Fields accepted by `config set`
#[derive(Debug, Default, Clone)]
pub struct ConfigUpdate {
    pub rpc_url: Option<String>,
    pub marketplace: Option<String>,
    pub chain_id: Option<u64>,
    pub forwarder: Option<String>,
    pub tokens: Vec<String>,
    pub credentials_url: Option<String>,
    pub renter: Option<String>,
    pub timeout: Option<u64>,
}

/// Show the effective configuration
pub fn show(storage_dir: &Path, json: bool) -> Result<()> {
    let stored = MarketConfig::load(storage_dir)?;
    let from_file = stored.is_some();
    let config = stored.unwrap_or_else(MarketConfig::from_env);

    if json {
        ui::json(&serde_json::to_value(&config)?);
        return Ok(());
    }

    ui::header("Marketplace Configuration");
    ui::key_value(
        "Source",
        if from_file {
            "market.json"
        } else {
            "environment"
        },
    );
    match &config.chain {
        Some(chain) => {
            ui::key_value("RPC", &chain.rpc_url);
            ui::key_value("Chain id", &chain.chain_id.to_string());
            ui::key_value("Marketplace", chain.marketplace_address.as_str());
            ui::key_value("Forwarder", chain.forwarder_address.as_str());
            for (symbol, address) in &chain.super_tokens {
                ui::key_value(&format!("Token {}", symbol), address.as_str());
            }
            ui::key_value("Timeout", &format!("{}s", chain.timeout_secs));
        }
        None => ui::warning("Chain: not configured (demo mode)"),
    }
    match &config.credentials {
        Some(credentials) => ui::key_value("Credentials", &credentials.base_url),
        None => ui::key_value("Credentials", "not configured"),
    }
    if let Some(renter) = &config.renter {
        ui::key_value("Renter", renter.as_str());
    }
    Ok(())
}

/// Merge `update` into the stored configuration
pub fn set(storage_dir: &Path, update: ConfigUpdate) -> Result<()> {
    let mut config = MarketConfig::load(storage_dir)?.unwrap_or_default();
    apply_update(&mut config, update)?;
    config.save(storage_dir)?;
    ui::success("Configuration saved");
    Ok(())
}

fn apply_update(config: &mut MarketConfig, update: ConfigUpdate) -> Result<()> {
    let touches_chain = update.rpc_url.is_some()
        || update.marketplace.is_some()
        || update.chain_id.is_some()
        || update.forwarder.is_some()
        || !update.tokens.is_empty()
        || update.timeout.is_some();

    if touches_chain {
        let mut chain = match config.chain.take() {
            Some(chain) => chain,
            None => {
                let rpc_url = update
                    .rpc_url
                    .clone()
                    .context("--rpc-url is required for a new chain configuration")?;
                let marketplace = update
                    .marketplace
                    .clone()
                    .context("--marketplace is required for a new chain configuration")?;
                ChainConfig::new(rpc_url, marketplace)
            }
        };
        if let Some(url) = update.rpc_url {
            chain.rpc_url = url;
        }
        if let Some(marketplace) = update.marketplace {
            chain.marketplace_address = Address::new(marketplace);
        }
        if let Some(chain_id) = update.chain_id {
            chain = chain.with_chain_id(chain_id);
        }
        if let Some(forwarder) = update.forwarder {
            chain = chain.with_forwarder(forwarder);
        }
        for entry in &update.tokens {
            let parsed = parse_super_tokens(entry);
            if parsed.is_empty() {
                anyhow::bail!("Token must be given as SYMBOL=ADDRESS, got {:?}", entry);
            }
            chain.super_tokens.extend(parsed);
        }
        if let Some(secs) = update.timeout {
            chain = chain.with_timeout(secs);
        }
        config.chain = Some(chain);
    }

    if let Some(url) = update.credentials_url {
        config.credentials = if url.is_empty() {
            None
        } else {
            Some(CredentialsConfig::new(url))
        };
    }
    if let Some(renter) = update.renter {
        config.renter = Some(Address::new(renter));
    }
    Ok(())
}

/// Apply a preset network configuration
pub fn preset(storage_dir: &Path, name: &str, marketplace: &str) -> Result<()> {
    ui::header(&format!("Apply Preset: {}", name));

    let preset = match name.to_lowercase().as_str() {
        "amoy" | "polygon-amoy" => TestnetConfig::polygon_amoy(marketplace),
        "local" | "anvil" | "hardhat" => TestnetConfig::local_node(marketplace),
        other => anyhow::bail!("Unknown preset: {}. Available: amoy, local", other),
    };

    let mut config = MarketConfig::load(storage_dir)?.unwrap_or_default();
    ui::key_value("RPC", &preset.chain.rpc_url);
    ui::key_value("Chain id", &preset.chain.chain_id.to_string());
    config.chain = Some(preset.chain);
    if preset.credentials.is_some() {
        config.credentials = preset.credentials;
    }
    config.save(storage_dir)?;

    ui::success("Preset applied");
    ui::info("Register streaming tokens with `gpuflow-demo config set --token fDAIx=<address>`");
    Ok(())
}

/// Delete the stored configuration
pub fn clear(storage_dir: &Path) -> Result<()> {
    if MarketConfig::clear(storage_dir)? {
        ui::success("Configuration removed");
    } else {
        ui::info("No configuration file to remove");
    }
    Ok(())
}
