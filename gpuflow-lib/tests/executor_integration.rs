//! Integration tests for the JSON-RPC and credentials executors.
//!
//! All tests run against wiremock servers; no node is required.
//!
//! ```bash
//! cargo test -p gpuflow-lib --features http-executor --test executor_integration
//! ```
//!
//! The `#[ignore]`d test talks to a real node configured through the
//! `GPUFLOW_*` environment variables.

#![cfg(feature = "http-executor")]

use std::sync::Arc;

use gpuflow_lib::credentials::{AccessProvider, CredentialsClient};
use alloy_primitives::{Address as EvmAddress, U256};
use alloy_sol_types::SolValue;
use gpuflow_lib::executors::abi;
use gpuflow_lib::executors::testnet::get_chain_config_from_env;
use gpuflow_lib::executors::{ChainConfig, CredentialsConfig, FlowForwarder, MarketplaceContract};
use gpuflow_lib::{
    Address, FlowBackend, LedgerBackend, ListingRegistryClient, ListingStatus, MarketError,
    NewListing, PaymentStreamClient, StartStream, StopStream,
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, body_string_contains, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const MARKETPLACE: &str = "0x00000000000000000000000000000000000000c0";
const FDAIX: &str = "0x00000000000000000000000000000000000000d1";
const SIGNER: &str = "0x00000000000000000000000000000000000000e1";
const PROVIDER: &str = "0x00000000000000000000000000000000000000aa";

fn chain_config(server: &MockServer) -> ChainConfig {
    ChainConfig::polygon_amoy(server.uri(), MARKETPLACE)
        .with_super_token("fDAIx", FDAIX)
        .with_timeout(5)
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message }
    }))
}

async fn mount_rpc(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_signer_and_chain(server: &MockServer, chain_id: &str) {
    mount_rpc(server, "eth_accounts", rpc_result(json!([SIGNER]))).await;
    mount_rpc(server, "eth_chainId", rpc_result(json!(chain_id))).await;
}

fn evm_address(address: &str) -> EvmAddress {
    abi::parse_address(&Address::new(address)).unwrap()
}

// ============================================================================
// Marketplace Contract Mock Tests
// ============================================================================

#[tokio::test]
async fn test_next_id_mock() {
    let server = MockServer::start().await;
    let encoded = abi::to_hex_data(&U256::from(3).abi_encode());
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .and(body_string_contains("61b8ce8c"))
        .respond_with(rpc_result(json!(encoded)))
        .mount(&server)
        .await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    assert_eq!(contract.next_id().await.unwrap(), 3);
}

#[tokio::test]
async fn test_get_listing_mock() {
    let server = MockServer::start().await;
    let encoded = abi::to_hex_data(
        &(
            evm_address(PROVIDER),
            "fDAIx".to_string(),
            U256::from(277_777_777_777_777u64),
            "RTX 4090 Gaming Rig".to_string(),
            "QmSpecs".to_string(),
            evm_address(SIGNER),
            U256::from(1u8),
            true,
        )
            .abi_encode_params(),
    );
    mount_rpc(&server, "eth_call", rpc_result(json!(encoded))).await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let listing = contract.get_listing(4).await.unwrap();

    assert_eq!(listing.id, 4);
    assert!(listing.provider.matches(&Address::new(PROVIDER)));
    assert_eq!(listing.title, "RTX 4090 Gaming Rig");
    assert_eq!(listing.flow_rate, 277_777_777_777_777);
    assert_eq!(listing.status, ListingStatus::Streaming);
    assert!(listing.is_rented_by(&Address::new(SIGNER)));
}

#[tokio::test]
async fn test_create_listing_sends_transaction() {
    let server = MockServer::start().await;
    mount_signer_and_chain(&server, "0x13882").await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
        .and(body_string_contains("d79819ba"))
        .and(body_string_contains(SIGNER))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(1)
        .mount(&server)
        .await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let tx = contract
        .create_listing(&NewListing::new("fDAIx", 100_000_000_000_000, "Test GPU", "QmTest"))
        .await
        .unwrap();
    assert_eq!(tx.as_str(), "0xabc123");
}

#[tokio::test]
async fn test_write_without_account_is_no_signer() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_accounts", rpc_result(json!([]))).await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let err = contract.start_session(0).await.unwrap_err();
    assert!(matches!(err, MarketError::NoSigner(_)));
    assert!(!err.is_backend_failure());
}

#[tokio::test]
async fn test_wrong_chain_is_network_mismatch() {
    let server = MockServer::start().await;
    mount_signer_and_chain(&server, "0x1").await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let err = contract.stop_session(0).await.unwrap_err();
    assert!(matches!(
        err,
        MarketError::NetworkMismatch {
            expected: 80002,
            actual: 1
        }
    ));
    assert!(err.is_backend_failure());
}

#[tokio::test]
async fn test_revert_is_reported() {
    let server = MockServer::start().await;
    mount_signer_and_chain(&server, "0x13882").await;
    mount_rpc(
        &server,
        "eth_sendTransaction",
        rpc_error(3, "execution reverted: Not the renter"),
    )
    .await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let err = contract.stop_session(1).await.unwrap_err();
    assert!(matches!(err, MarketError::Reverted { .. }));
}

#[tokio::test]
async fn test_http_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let err = contract.next_id().await.unwrap_err();
    assert!(matches!(err, MarketError::Transport(_)));
}

#[tokio::test]
async fn test_registry_falls_back_when_node_errors() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_call", rpc_error(-32603, "internal error")).await;

    let contract = MarketplaceContract::new(chain_config(&server)).unwrap();
    let registry = ListingRegistryClient::new(Arc::new(contract));
    registry.demo_ledger().seed();

    let out = registry.next_id().await.unwrap();
    assert!(out.is_demo());
    assert!(matches!(out.failure(), Some(MarketError::Rpc { code: -32603, .. })));
    assert_eq!(out.into_value(), 2);
    assert!(registry.is_demo_mode());
}

// ============================================================================
// Flow Forwarder Mock Tests
// ============================================================================

#[tokio::test]
async fn test_start_flow_mock() {
    let server = MockServer::start().await;
    mount_signer_and_chain(&server, "0x13882").await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
        .and(body_string_contains("57e6aa36"))
        .and(body_string_contains(
            "0xcfA132E353cB4E398080B9700609bb008eceB125",
        ))
        .respond_with(rpc_result(json!("0xf10w")))
        .expect(1)
        .mount(&server)
        .await;

    let forwarder = FlowForwarder::new(chain_config(&server)).unwrap();
    let tx = forwarder
        .start_flow(&StartStream::new("fDAIx", Address::new(PROVIDER), "277777777777777"))
        .await
        .unwrap();
    assert_eq!(tx.as_str(), "0xf10w");
}

#[tokio::test]
async fn test_stop_flow_mock() {
    let server = MockServer::start().await;
    mount_signer_and_chain(&server, "0x13882").await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
        .and(body_string_contains("b4b333c6"))
        .respond_with(rpc_result(json!("0xd3l")))
        .expect(1)
        .mount(&server)
        .await;

    let forwarder = FlowForwarder::new(chain_config(&server)).unwrap();
    let tx = forwarder
        .stop_flow(&StopStream::new("fDAIx", Address::new(PROVIDER)))
        .await
        .unwrap();
    assert_eq!(tx.as_str(), "0xd3l");
}

#[tokio::test]
async fn test_unknown_token_switches_stream_client_to_demo() {
    let server = MockServer::start().await;
    let forwarder = FlowForwarder::new(chain_config(&server)).unwrap();
    let streams = PaymentStreamClient::new(Arc::new(forwarder));

    let out = streams
        .start_stream(StartStream::new("USDCx", Address::new(PROVIDER), "1"))
        .await
        .unwrap();
    assert!(out.is_demo());
    assert!(matches!(out.failure(), Some(MarketError::UnknownToken(_))));
    assert!(streams.is_demo_mode());
}

// ============================================================================
// Credentials Backend Mock Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_credentials_mock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/credentials/3"))
        .and(query_param("renter", SIGNER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "anydeskId": "111222333",
            "anydeskPassword": "hunter2",
            "note": "A100 80GB"
        })))
        .mount(&server)
        .await;

    let client = CredentialsClient::new(CredentialsConfig::new(server.uri())).unwrap();
    let access = client.fetch_credentials(3, &Address::new(SIGNER)).await.unwrap();
    assert_eq!(access.anydesk_id, "111222333");
    assert_eq!(access.note, "A100 80GB");
}

#[tokio::test]
async fn test_notify_stop_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notify/stop"))
        .and(body_partial_json(json!({ "id": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CredentialsClient::new(CredentialsConfig::new(server.uri())).unwrap();
    client.notify_stop(3).await.unwrap();
}

#[tokio::test]
async fn test_credentials_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/credentials/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = CredentialsClient::new(CredentialsConfig::new(server.uri())).unwrap();
    let err = client.fetch_credentials(9, &Address::new(SIGNER)).await.unwrap_err();
    assert!(matches!(err, MarketError::Transport(_)));
}

// ============================================================================
// Real Node Tests (ignored by default)
// ============================================================================

#[tokio::test]
#[ignore = "requires GPUFLOW_RPC_URL and GPUFLOW_MARKETPLACE_ADDRESS"]
async fn test_real_node_next_id() {
    let config = get_chain_config_from_env().expect("GPUFLOW_* variables not set");
    let contract = MarketplaceContract::new(config).unwrap();
    let next_id = contract.next_id().await.unwrap();
    println!("next listing id: {}", next_id);
}
