//! Constant-flow forwarder executor.
//!
//! Implements [`FlowBackend`] by calling the forwarder's `setFlowrate` and
//! `deleteFlow` entry points. Token symbols are resolved through
//! [`ChainConfig::super_tokens`].

use alloy_primitives::aliases::I96;
use alloy_primitives::{Address as EvmAddress, Bytes};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use super::abi::{self, ICFAv1Forwarder, INT96_MAX};
use super::config::ChainConfig;
use super::marketplace::{ensure_chain, signer};
use super::rpc::{JsonRpcClient, TransactionRequest};
use crate::stream::{FlowBackend, StartStream, StopStream};
use crate::{Address, MarketError, Result, TxHandle};

/// JSON-RPC backend for payment streams.
pub struct FlowForwarder {
    config: ChainConfig,
    rpc: JsonRpcClient,
}

impl FlowForwarder {
    /// Create a new forwarder executor with the given configuration.
    pub fn new(config: ChainConfig) -> Result<Self> {
        abi::parse_address(&config.forwarder_address)?;
        let rpc = JsonRpcClient::new(config.rpc_url.clone(), config.timeout_secs)?;
        Ok(Self { config, rpc })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn token(&self, symbol: &str) -> Result<EvmAddress> {
        let address = self
            .config
            .super_token(symbol)
            .ok_or_else(|| MarketError::UnknownToken(symbol.to_string()))?;
        abi::parse_address(address)
    }

    async fn send<C: SolCall>(&self, from: &Address, call: C) -> Result<TxHandle> {
        ensure_chain(&self.rpc, self.config.chain_id).await?;
        let tx = TransactionRequest {
            from: Some(from.to_string()),
            to: self.config.forwarder_address.to_string(),
            data: abi::to_hex_data(&call.abi_encode()),
        };
        let hash = self.rpc.send_transaction(&tx).await?;
        Ok(TxHandle::new(hash))
    }
}

/// Parse a wei-per-second flow rate into an `int96`-range integer.
pub fn parse_flow_rate(rate: &str) -> Result<i128> {
    let value: u128 = rate
        .parse()
        .map_err(|_| MarketError::invalid_data("flow_rate", format!("{:?} is not an integer", rate)))?;
    i128::try_from(value)
        .ok()
        .filter(|v| *v <= INT96_MAX)
        .ok_or_else(|| MarketError::invalid_data("flow_rate", format!("{} exceeds int96", rate)))
}

#[async_trait]
impl FlowBackend for FlowForwarder {
    async fn start_flow(&self, request: &StartStream) -> Result<TxHandle> {
        let rate = parse_flow_rate(&request.flow_rate_wei_per_sec)?;
        let flowrate = I96::try_from(rate)
            .map_err(|_| MarketError::invalid_data("flow_rate", format!("{} exceeds int96", rate)))?;
        let token = self.token(&request.super_token_symbol)?;
        let receiver = abi::parse_address(&request.receiver)?;
        let from = signer(&self.rpc).await?;

        let call = ICFAv1Forwarder::setFlowrateCall {
            token,
            receiver,
            flowrate,
        };
        self.send(&from, call).await
    }

    async fn stop_flow(&self, request: &StopStream) -> Result<TxHandle> {
        let token = self.token(&request.super_token_symbol)?;
        let receiver = abi::parse_address(&request.receiver)?;
        let from = signer(&self.rpc).await?;
        let sender = abi::parse_address(request.sender.as_ref().unwrap_or(&from))?;

        let call = ICFAv1Forwarder::deleteFlowCall {
            token,
            sender,
            receiver,
            userData: Bytes::new(),
        };
        self.send(&from, call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flow_rate() {
        assert_eq!(parse_flow_rate("277777777777777").unwrap(), 277_777_777_777_777);
        assert_eq!(parse_flow_rate("0").unwrap(), 0);
        assert_eq!(parse_flow_rate(&INT96_MAX.to_string()).unwrap(), INT96_MAX);

        let too_big = (INT96_MAX as u128 + 1).to_string();
        let err = parse_flow_rate(&too_big).unwrap_err();
        assert!(!err.is_backend_failure());

        assert!(parse_flow_rate("1.5").is_err());
        assert!(parse_flow_rate("-1").is_err());
        assert!(parse_flow_rate("").is_err());
    }

    #[test]
    fn test_set_flowrate_calldata_layout() {
        let rate = parse_flow_rate("277777777777777").unwrap();
        let call = ICFAv1Forwarder::setFlowrateCall {
            token: EvmAddress::repeat_byte(0xd1),
            receiver: EvmAddress::repeat_byte(0xaa),
            flowrate: I96::try_from(rate).unwrap(),
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(data[..4], ICFAv1Forwarder::setFlowrateCall::SELECTOR);
        assert_eq!(data[4 + 12..4 + 32], [0xd1; 20]);
        assert_eq!(
            alloy_primitives::U256::from_be_slice(&data[68..100]),
            alloy_primitives::U256::from(277_777_777_777_777u64)
        );
    }

    #[test]
    fn test_unknown_token_is_backend_failure() {
        let config = ChainConfig::new("http://localhost:8545", "0x00000000000000000000000000000000000000c0");
        let forwarder = FlowForwarder::new(config).unwrap();
        let err = forwarder.token("fDAIx").unwrap_err();
        assert!(matches!(err, MarketError::UnknownToken(_)));
        assert!(err.is_backend_failure());
    }
}
