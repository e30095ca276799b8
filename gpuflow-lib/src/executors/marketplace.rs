//! Marketplace contract executor.
//!
//! Implements [`LedgerBackend`] over JSON-RPC. Reads go through `eth_call`;
//! writes are sent with `eth_sendTransaction` from the node's first unlocked
//! account after checking the node is on the configured chain.

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use super::abi::{self, IMarketplace};
use super::config::ChainConfig;
use super::rpc::{JsonRpcClient, TransactionRequest};
use crate::registry::LedgerBackend;
use crate::{Address, Listing, ListingStatus, MarketError, NewListing, Result, TxHandle};

/// JSON-RPC backend for the listing registry.
pub struct MarketplaceContract {
    config: ChainConfig,
    rpc: JsonRpcClient,
}

impl MarketplaceContract {
    /// Create a new contract executor with the given configuration.
    pub fn new(config: ChainConfig) -> Result<Self> {
        abi::parse_address(&config.marketplace_address)?;
        let rpc = JsonRpcClient::new(config.rpc_url.clone(), config.timeout_secs)?;
        Ok(Self { config, rpc })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let tx = TransactionRequest {
            from: None,
            to: self.config.marketplace_address.to_string(),
            data: abi::to_hex_data(&call.abi_encode()),
        };
        let hex = self.rpc.eth_call(&tx).await?;
        let data = abi::from_hex_data(&hex)?;
        Ok(C::abi_decode_returns(&data)?)
    }

    async fn write<C: SolCall>(&self, call: C) -> Result<TxHandle> {
        let signer = signer(&self.rpc).await?;
        ensure_chain(&self.rpc, self.config.chain_id).await?;
        let tx = TransactionRequest {
            from: Some(signer.to_string()),
            to: self.config.marketplace_address.to_string(),
            data: abi::to_hex_data(&call.abi_encode()),
        };
        let hash = self.rpc.send_transaction(&tx).await?;
        Ok(TxHandle::new(hash))
    }
}

/// First unlocked account of the node, or a caller error if there is none.
pub(crate) async fn signer(rpc: &JsonRpcClient) -> Result<Address> {
    rpc.accounts()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| MarketError::NoSigner("node exposes no unlocked account".to_string()))
}

/// Fail with `NetworkMismatch` unless the node reports `expected`.
pub(crate) async fn ensure_chain(rpc: &JsonRpcClient, expected: u64) -> Result<()> {
    let actual = rpc.chain_id().await?;
    if actual != expected {
        return Err(MarketError::NetworkMismatch { expected, actual });
    }
    Ok(())
}

/// Convert `getListing` return values into a [`Listing`].
pub fn decode_listing(id: u64, data: &[u8]) -> Result<Listing> {
    listing_from_return(id, IMarketplace::getListingCall::abi_decode_returns(data)?)
}

fn listing_from_return(id: u64, ret: IMarketplace::getListingReturn) -> Result<Listing> {
    let status = ListingStatus::try_from(ret.status)
        .map_err(|_| MarketError::Serialization(format!("unknown listing status {}", ret.status)))?;
    let flow_rate = u128::try_from(ret.flowRate)
        .map_err(|_| MarketError::Serialization("flow rate exceeds u128".to_string()))?;
    Ok(Listing {
        id,
        provider: abi::format_address(ret.provider),
        super_token_symbol: ret.superToken,
        flow_rate,
        title: ret.title,
        specs_cid: ret.specsCID,
        active_renter: abi::format_address(ret.activeRenter),
        status,
        exists: ret.exists,
    })
}

#[async_trait]
impl LedgerBackend for MarketplaceContract {
    async fn next_id(&self) -> Result<u64> {
        let next = self.read(IMarketplace::nextIdCall {}).await?;
        u64::try_from(next).map_err(|_| MarketError::Serialization("nextId exceeds u64".to_string()))
    }

    async fn get_listing(&self, id: u64) -> Result<Listing> {
        let ret = self.read(IMarketplace::getListingCall { id: U256::from(id) }).await?;
        listing_from_return(id, ret)
    }

    async fn create_listing(&self, request: &NewListing) -> Result<TxHandle> {
        self.write(IMarketplace::createListingCall {
            superToken: request.super_token_symbol.clone(),
            flowRate: U256::from(request.flow_rate),
            title: request.title.clone(),
            specsCID: request.specs_cid.clone(),
        })
        .await
    }

    async fn start_session(&self, id: u64) -> Result<TxHandle> {
        self.write(IMarketplace::startSessionCall { id: U256::from(id) }).await
    }

    async fn stop_session(&self, id: u64) -> Result<TxHandle> {
        self.write(IMarketplace::stopSessionCall { id: U256::from(id) }).await
    }
}
