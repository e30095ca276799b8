//! Backend and demo-mode status

use anyhow::Result;
use gpuflow_lib::demo::DEMO_BALANCE;
use std::path::Path;

use super::Session;
use crate::ui;

pub async fn run(storage_dir: &Path, demo: bool, _verbose: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    probe(&session).await;
    print_status(&session);
    Ok(())
}

/// Touch the ledger once so an unreachable node flips the registry into demo mode
pub async fn probe(session: &Session) {
    if session.market.registry().is_demo_mode() {
        return;
    }
    let spinner = ui::spinner("Contacting ledger...");
    let result = session.market.registry().next_id().await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => match outcome.failure() {
            Some(err) => ui::warning(&format!("Ledger unreachable: {}", err)),
            None => ui::success(&format!("Ledger reachable, {} ids assigned", outcome.value())),
        },
        Err(err) => ui::error(&format!("Ledger probe failed: {}", err)),
    }
}

pub fn print_status(session: &Session) {
    ui::header("Marketplace Status");

    match &session.config.chain {
        Some(chain) => {
            ui::key_value("RPC", &chain.rpc_url);
            ui::key_value("Chain id", &chain.chain_id.to_string());
            ui::key_value("Marketplace", chain.marketplace_address.as_str());
            ui::key_value("Forwarder", chain.forwarder_address.as_str());
            let tokens: Vec<&str> = chain.super_tokens.keys().map(String::as_str).collect();
            ui::key_value(
                "Tokens",
                &if tokens.is_empty() {
                    "none".to_string()
                } else {
                    tokens.join(", ")
                },
            );
        }
        None => {
            ui::warning("No chain configured");
            ui::info("  gpuflow-demo config set --rpc-url <url> --marketplace <address>");
            ui::info("  gpuflow-demo config preset amoy --marketplace <address>");
        }
    }

    match &session.config.credentials {
        Some(credentials) => ui::key_value("Credentials", &credentials.base_url),
        None => ui::key_value("Credentials", "demo records"),
    }

    ui::separator();
    let status = session.market.demo_status();
    ui::status_line(
        "Registry",
        if status.registry { "demo" } else { "live" },
        !status.registry,
    );
    ui::status_line(
        "Streams",
        if status.streams { "demo" } else { "live" },
        !status.streams,
    );
    if let Some(balance) = balance(session) {
        ui::key_value("Balance", &balance);
    }
}

/// Token balance for the status display. Only the simulated one is known.
fn balance(session: &Session) -> Option<String> {
    session
        .market
        .demo_status()
        .streams
        .then(|| format!("{} fDAIx (simulated)", DEMO_BALANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{build_marketplace, MarketConfig};
    use gpuflow_lib::executors::ChainConfig;

    #[test]
    fn demo_streams_show_simulated_balance() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = Session::open(dir.path(), true).unwrap();
        assert_eq!(balance(&session).as_deref(), Some("1000.00 fDAIx (simulated)"));
    }

    #[test]
    fn live_streams_show_no_balance() {
        let config = MarketConfig {
            chain: Some(ChainConfig::polygon_amoy(
                "http://localhost:8545",
                "0x00000000000000000000000000000000000000c0",
            )),
            ..Default::default()
        };
        let session = Session {
            market: build_marketplace(&config, false).unwrap(),
            config,
        };
        assert!(balance(&session).is_none());
    }
}
