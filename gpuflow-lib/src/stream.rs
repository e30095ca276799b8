//! Payment stream client.
//!
//! Opens and closes continuous per-second token flows from the renter to a
//! provider. The fallback rule is the one the registry client follows: a
//! backend failure flips this client's own [`DemoFlag`], and from then on
//! every call returns a fixed demo handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::demo::{DemoFlag, DEMO_STREAM_START_TX, DEMO_STREAM_STOP_TX};
use crate::{Address, MarketError, Outcome, Result, TxHandle};

/// Parameters for opening (or replacing) a flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStream {
    /// Streaming-capable token symbol.
    pub super_token_symbol: String,
    /// Flow receiver (the provider).
    pub receiver: Address,
    /// Rate as a decimal integer string of smallest units per second.
    pub flow_rate_wei_per_sec: String,
}

impl StartStream {
    /// Create a new stream request.
    pub fn new(
        super_token_symbol: impl Into<String>,
        receiver: Address,
        flow_rate_wei_per_sec: impl Into<String>,
    ) -> Self {
        Self {
            super_token_symbol: super_token_symbol.into(),
            receiver,
            flow_rate_wei_per_sec: flow_rate_wei_per_sec.into(),
        }
    }
}

/// Parameters for closing a flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopStream {
    /// Streaming-capable token symbol.
    pub super_token_symbol: String,
    /// Flow receiver (the provider).
    pub receiver: Address,
    /// Flow sender; the caller when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
}

impl StopStream {
    /// Create a stop request for a flow sent by the caller.
    pub fn new(super_token_symbol: impl Into<String>, receiver: Address) -> Self {
        Self {
            super_token_symbol: super_token_symbol.into(),
            receiver,
            sender: None,
        }
    }

    /// Close a flow sent by someone other than the caller.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }
}

/// The streaming-payment protocol as seen by the stream client.
#[async_trait]
pub trait FlowBackend: Send + Sync {
    /// Create or update the flow caller → `receiver`.
    async fn start_flow(&self, request: &StartStream) -> Result<TxHandle>;

    /// Delete the flow `sender` → `receiver`.
    async fn stop_flow(&self, request: &StopStream) -> Result<TxHandle>;
}

/// Dual-mode client for continuous payment flows.
pub struct PaymentStreamClient {
    backend: Option<Arc<dyn FlowBackend>>,
    demo_mode: DemoFlag,
}

impl PaymentStreamClient {
    /// Create a client talking to `backend`.
    pub fn new(backend: Arc<dyn FlowBackend>) -> Self {
        Self::with_state(Some(backend), DemoFlag::new(false))
    }

    /// Create a client with no backend, already in demo mode.
    pub fn demo_only() -> Self {
        Self::with_state(None, DemoFlag::new(true))
    }

    /// Create a client from explicit parts.
    pub fn with_state(backend: Option<Arc<dyn FlowBackend>>, demo_mode: DemoFlag) -> Self {
        Self { backend, demo_mode }
    }

    /// Check whether calls are simulated.
    pub fn is_demo_mode(&self) -> bool {
        self.backend.is_none() || self.demo_mode.is_active()
    }

    /// Force demo mode on or off.
    pub fn set_demo_mode(&self, enabled: bool) {
        if enabled {
            self.demo_mode.activate();
        } else {
            self.demo_mode.reset();
        }
    }

    fn live_backend(&self) -> Option<&Arc<dyn FlowBackend>> {
        if self.demo_mode.is_active() {
            return None;
        }
        self.backend.as_ref()
    }

    fn fall_back(&self, operation: &'static str, err: MarketError) -> Result<MarketError> {
        if !err.is_backend_failure() {
            return Err(err);
        }
        tracing::warn!(
            operation,
            code = err.code() as i32,
            error = %err,
            "streaming protocol error, switching to demo mode"
        );
        self.demo_mode.activate();
        Ok(err)
    }

    /// Open or replace the flow from the caller to `request.receiver`.
    pub async fn start_stream(&self, request: StartStream) -> Result<Outcome<TxHandle>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.start_flow(&request).await {
                Ok(tx) => return Ok(Outcome::Live(tx)),
                Err(err) => Some(self.fall_back("start_stream", err)?),
            },
            None => None,
        };
        tracing::info!(
            receiver = %request.receiver,
            flow_rate = %request.flow_rate_wei_per_sec,
            "demo mode: simulating stream start"
        );
        Ok(Outcome::Demo {
            value: TxHandle::new(DEMO_STREAM_START_TX),
            failure,
        })
    }

    /// Close the flow from `request.sender` (default: the caller) to `request.receiver`.
    pub async fn stop_stream(&self, request: StopStream) -> Result<Outcome<TxHandle>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.stop_flow(&request).await {
                Ok(tx) => return Ok(Outcome::Live(tx)),
                Err(err) => Some(self.fall_back("stop_stream", err)?),
            },
            None => None,
        };
        tracing::info!(receiver = %request.receiver, "demo mode: simulating stream stop");
        Ok(Outcome::Demo {
            value: TxHandle::new(DEMO_STREAM_STOP_TX),
            failure,
        })
    }
}
