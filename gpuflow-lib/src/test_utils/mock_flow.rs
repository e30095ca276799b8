//! In-memory streaming protocol and credentials backend for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::credentials::{AccessProvider, RemoteAccess};
use crate::executors::parse_flow_rate;
use crate::stream::{FlowBackend, StartStream, StopStream};
use crate::{Address, MarketError, Result, TxHandle};

fn unreachable_error(target: &str) -> MarketError {
    MarketError::ConnectionFailed {
        target: target.to_string(),
        reason: "service unreachable".to_string(),
    }
}

/// A simulated constant-flow forwarder.
///
/// Flows are keyed by token symbol and receiver; the sender is always the
/// mock signer.
pub struct MockFlowNetwork {
    flows: RwLock<BTreeMap<(String, String), String>>,
    available: AtomicBool,
    calls: AtomicUsize,
}

impl MockFlowNetwork {
    /// Create a reachable network with no flows.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            flows: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        })
    }

    /// Make every call fail with a connection error (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of backend invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Current rate of the flow to `receiver`, if any.
    pub fn flow_rate(&self, symbol: &str, receiver: &Address) -> Option<String> {
        self.flows
            .read()
            .unwrap()
            .get(&flow_key(symbol, receiver))
            .cloned()
    }

    /// Number of open flows.
    pub fn open_flows(&self) -> usize {
        self.flows.read().unwrap().len()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(unreachable_error("mock-forwarder"));
        }
        Ok(())
    }
}

fn flow_key(symbol: &str, receiver: &Address) -> (String, String) {
    (symbol.to_string(), receiver.as_str().to_ascii_lowercase())
}

#[async_trait]
impl FlowBackend for MockFlowNetwork {
    async fn start_flow(&self, request: &StartStream) -> Result<TxHandle> {
        self.enter()?;
        parse_flow_rate(&request.flow_rate_wei_per_sec)?;
        let key = flow_key(&request.super_token_symbol, &request.receiver);
        self.flows
            .write()
            .unwrap()
            .insert(key, request.flow_rate_wei_per_sec.clone());
        Ok(TxHandle::new(format!("0xflowstart{}", self.calls())))
    }

    async fn stop_flow(&self, request: &StopStream) -> Result<TxHandle> {
        self.enter()?;
        let key = flow_key(&request.super_token_symbol, &request.receiver);
        if self.flows.write().unwrap().remove(&key).is_none() {
            return Err(MarketError::reverted("deleteFlow", "flow does not exist"));
        }
        Ok(TxHandle::new(format!("0xflowstop{}", self.calls())))
    }
}

/// A simulated credentials backend.
pub struct MockAccess {
    credentials: RwLock<HashMap<u64, RemoteAccess>>,
    notified: RwLock<Vec<u64>>,
    available: AtomicBool,
    notify_available: AtomicBool,
}

impl MockAccess {
    /// Create a reachable backend with no credentials.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            credentials: RwLock::new(HashMap::new()),
            notified: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            notify_available: AtomicBool::new(true),
        })
    }

    /// Register credentials for a listing.
    pub fn insert(&self, listing_id: u64, access: RemoteAccess) {
        self.credentials.write().unwrap().insert(listing_id, access);
    }

    /// Make credential fetches fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make stop notifications fail (or succeed again).
    pub fn set_notify_available(&self, available: bool) {
        self.notify_available.store(available, Ordering::SeqCst);
    }

    /// Listing ids notified so far, in order.
    pub fn notified(&self) -> Vec<u64> {
        self.notified.read().unwrap().clone()
    }
}

#[async_trait]
impl AccessProvider for MockAccess {
    async fn fetch_credentials(&self, listing_id: u64, _renter: &Address) -> Result<RemoteAccess> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(unreachable_error("mock-credentials"));
        }
        self.credentials
            .read()
            .unwrap()
            .get(&listing_id)
            .cloned()
            .ok_or_else(|| MarketError::Transport(format!("no credentials for listing {}", listing_id)))
    }

    async fn notify_stop(&self, listing_id: u64) -> Result<()> {
        if !self.notify_available.load(Ordering::SeqCst) {
            return Err(unreachable_error("mock-credentials"));
        }
        self.notified.write().unwrap().push(listing_id);
        Ok(())
    }
}
