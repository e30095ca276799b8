//! In-memory marketplace contract for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::registry::LedgerBackend;
use crate::{Address, Listing, MarketError, NewListing, Result, TxHandle};

type FailureFn = Box<dyn Fn() -> MarketError + Send + Sync>;

/// A simulated marketplace contract.
///
/// Behaves like the deployed contract: ids are assigned sequentially,
/// sessions can only start on idle listings and only the renter may stop
/// them. Every call is counted, successful or not.
pub struct MockLedger {
    listings: RwLock<Vec<Listing>>,
    signer: RwLock<Address>,
    available: AtomicBool,
    failure: Mutex<Option<FailureFn>>,
    calls: AtomicUsize,
    tx_counter: AtomicUsize,
}

impl MockLedger {
    /// Create an empty, reachable contract.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            listings: RwLock::new(Vec::new()),
            signer: RwLock::new(Address::new(super::TEST_SIGNER)),
            available: AtomicBool::new(true),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            tx_counter: AtomicUsize::new(0),
        })
    }

    /// Make every call fail with a connection error (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make every call fail with the error produced by `make`.
    pub fn fail_with<F>(&self, make: F)
    where
        F: Fn() -> MarketError + Send + Sync + 'static,
    {
        *self.failure.lock().unwrap() = Some(Box::new(make));
    }

    /// Remove an injected failure.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Change the account that sends transactions.
    pub fn set_signer(&self, signer: impl Into<Address>) {
        *self.signer.write().unwrap() = signer.into();
    }

    /// Number of backend invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Current contract state.
    pub fn listings(&self) -> Vec<Listing> {
        self.listings.read().unwrap().clone()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = self.failure.lock().unwrap().as_ref() {
            return Err(make());
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(MarketError::ConnectionFailed {
                target: "mock-ledger".to_string(),
                reason: "node unreachable".to_string(),
            });
        }
        Ok(())
    }

    fn next_tx(&self) -> TxHandle {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        TxHandle::new(format!("0x{:064x}", n + 1))
    }
}

#[async_trait]
impl LedgerBackend for MockLedger {
    async fn next_id(&self) -> Result<u64> {
        self.enter()?;
        Ok(self.listings.read().unwrap().len() as u64)
    }

    async fn get_listing(&self, id: u64) -> Result<Listing> {
        self.enter()?;
        let listings = self.listings.read().unwrap();
        Ok(usize::try_from(id)
            .ok()
            .and_then(|i| listings.get(i).cloned())
            .unwrap_or_else(|| Listing::missing(id)))
    }

    async fn create_listing(&self, request: &NewListing) -> Result<TxHandle> {
        self.enter()?;
        let provider = self.signer.read().unwrap().clone();
        let mut listings = self.listings.write().unwrap();
        let id = listings.len() as u64;
        listings.push(Listing::created(id, provider, request.clone()));
        Ok(self.next_tx())
    }

    async fn start_session(&self, id: u64) -> Result<TxHandle> {
        self.enter()?;
        let renter = self.signer.read().unwrap().clone();
        let mut listings = self.listings.write().unwrap();
        let listing = listings
            .get_mut(id as usize)
            .filter(|l| l.exists)
            .ok_or_else(|| MarketError::reverted("startSession", "listing does not exist"))?;
        if listing.is_streaming() {
            return Err(MarketError::reverted("startSession", "already rented"));
        }
        listing.begin_session(renter);
        Ok(self.next_tx())
    }

    async fn stop_session(&self, id: u64) -> Result<TxHandle> {
        self.enter()?;
        let caller = self.signer.read().unwrap().clone();
        let mut listings = self.listings.write().unwrap();
        let listing = listings
            .get_mut(id as usize)
            .filter(|l| l.exists)
            .ok_or_else(|| MarketError::reverted("stopSession", "listing does not exist"))?;
        if !listing.is_rented_by(&caller) {
            return Err(MarketError::reverted("stopSession", "not renter"));
        }
        listing.end_session();
        Ok(self.next_tx())
    }
}
