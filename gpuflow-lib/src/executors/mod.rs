//! Real backend implementations.
//!
//! Two executors talk to an Ethereum JSON-RPC node:
//!
//! - [`MarketplaceContract`] implements [`LedgerBackend`](crate::LedgerBackend)
//!   against the listing registry contract.
//! - [`FlowForwarder`] implements [`FlowBackend`](crate::FlowBackend) against
//!   the constant-flow forwarder of the streaming protocol.
//!
//! Transactions are sent with `eth_sendTransaction`, so the node (or a
//! signing proxy in front of it) must hold the account.
//!
//! ## Feature Flags
//!
//! The `http-executor` feature flag must be enabled for actual HTTP requests:
//!
//! ```toml
//! [dependencies]
//! gpuflow-lib = { version = "0.1", features = ["http-executor"] }
//! ```
//!
//! Without it every call fails with `Unimplemented`, which the clients
//! treat like an unreachable node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gpuflow_lib::executors::{ChainConfig, FlowForwarder, MarketplaceContract};
//! use gpuflow_lib::{ListingRegistryClient, PaymentStreamClient};
//!
//! let config = ChainConfig::polygon_amoy(rpc_url, marketplace)
//!     .with_super_token("fDAIx", fdaix_address);
//!
//! let registry = ListingRegistryClient::new(Arc::new(MarketplaceContract::new(config.clone())?));
//! let streams = PaymentStreamClient::new(Arc::new(FlowForwarder::new(config)?));
//! ```

pub mod abi;
mod config;
mod forwarder;
mod marketplace;
mod rpc;
pub mod testnet;

pub use config::{ChainConfig, CredentialsConfig, CFA_FORWARDER_ADDRESS, POLYGON_AMOY_CHAIN_ID};
pub use forwarder::{parse_flow_rate, FlowForwarder};
pub use marketplace::{decode_listing, MarketplaceContract};
pub use rpc::{parse_quantity, JsonRpcClient, TransactionRequest};
