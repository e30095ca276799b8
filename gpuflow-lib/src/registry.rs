//! Listing registry client.
//!
//! [`ListingRegistryClient`] reads and mutates listing records through an
//! injected [`LedgerBackend`]. The first backend failure switches the client
//! into demo mode for good: the failing call is answered from the
//! [`DemoLedger`] and every later call goes straight there.
//!
//! # Example
//!
//! ```
//! use gpuflow_lib::ListingRegistryClient;
//!
//! # async fn demo() -> gpuflow_lib::Result<()> {
//! let registry = ListingRegistryClient::demo_only();
//! registry.demo_ledger().seed();
//!
//! let listing = registry.get_listing(0).await?.into_value();
//! assert_eq!(listing.title, "RTX 4090 Gaming Rig");
//!
//! let missing = registry.get_listing(42).await?.into_value();
//! assert!(!missing.exists);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::demo::{DemoFlag, DemoLedger};
use crate::{Listing, MarketError, NewListing, Outcome, Result, TxHandle};

/// The ledger contract as seen by the registry client.
///
/// Implement this trait to back the registry with a real ledger. Any error
/// for which [`MarketError::is_backend_failure`] holds triggers the demo
/// fallback.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Count of assigned listing ids.
    async fn next_id(&self) -> Result<u64>;

    /// Read the record at `id`.
    ///
    /// Ids that were never assigned yield whatever sentinel record the
    /// ledger returns (normally `exists == false`).
    async fn get_listing(&self, id: u64) -> Result<Listing>;

    /// Submit a listing creation.
    async fn create_listing(&self, request: &NewListing) -> Result<TxHandle>;

    /// Submit a session start for `id` on behalf of the caller.
    async fn start_session(&self, id: u64) -> Result<TxHandle>;

    /// Submit a session stop for `id`.
    async fn stop_session(&self, id: u64) -> Result<TxHandle>;
}

/// Dual-mode client for the listing registry.
pub struct ListingRegistryClient {
    backend: Option<Arc<dyn LedgerBackend>>,
    demo: Arc<DemoLedger>,
    demo_mode: DemoFlag,
}

impl ListingRegistryClient {
    /// Create a client talking to `backend`, with an empty demo ledger.
    pub fn new(backend: Arc<dyn LedgerBackend>) -> Self {
        Self::with_state(Some(backend), Arc::new(DemoLedger::new()), DemoFlag::new(false))
    }

    /// Create a client with no backend, already in demo mode.
    pub fn demo_only() -> Self {
        Self::with_state(None, Arc::new(DemoLedger::new()), DemoFlag::new(true))
    }

    /// Create a client from explicit parts.
    ///
    /// Without a backend the client behaves as if demo mode were active,
    /// whatever `demo_mode` says.
    pub fn with_state(
        backend: Option<Arc<dyn LedgerBackend>>,
        demo: Arc<DemoLedger>,
        demo_mode: DemoFlag,
    ) -> Self {
        Self {
            backend,
            demo,
            demo_mode,
        }
    }

    /// The in-memory ledger used in demo mode.
    pub fn demo_ledger(&self) -> &Arc<DemoLedger> {
        &self.demo
    }

    /// Check whether calls are answered by the demo ledger.
    pub fn is_demo_mode(&self) -> bool {
        self.backend.is_none() || self.demo_mode.is_active()
    }

    /// Switch to demo mode without waiting for a failure.
    pub fn force_demo_mode(&self) {
        self.demo_mode.activate();
    }

    /// Leave demo mode so the next call tries the backend again.
    ///
    /// This is the only way back; the client never recovers on its own.
    pub fn reset_demo_mode(&self) {
        self.demo_mode.reset();
    }

    fn live_backend(&self) -> Option<&Arc<dyn LedgerBackend>> {
        if self.demo_mode.is_active() {
            return None;
        }
        self.backend.as_ref()
    }

    /// Classify a backend error: caller errors propagate, everything else
    /// flips the client into demo mode.
    fn fall_back(&self, operation: &'static str, err: MarketError) -> Result<MarketError> {
        if !err.is_backend_failure() {
            return Err(err);
        }
        tracing::warn!(
            operation,
            code = err.code() as i32,
            error = %err,
            "ledger contract error, switching to demo mode"
        );
        self.demo_mode.activate();
        Ok(err)
    }

    /// Count of assigned listing ids.
    pub async fn next_id(&self) -> Result<Outcome<u64>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.next_id().await {
                Ok(n) => return Ok(Outcome::Live(n)),
                Err(err) => Some(self.fall_back("next_id", err)?),
            },
            None => None,
        };
        Ok(Outcome::Demo {
            value: self.demo.len(),
            failure,
        })
    }

    /// Read the listing at `id`.
    ///
    /// In demo mode an unassigned id yields [`Listing::missing`].
    pub async fn get_listing(&self, id: u64) -> Result<Outcome<Listing>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.get_listing(id).await {
                Ok(listing) => return Ok(Outcome::Live(listing)),
                Err(err) => Some(self.fall_back("get_listing", err)?),
            },
            None => None,
        };
        Ok(Outcome::Demo {
            value: self.demo.simulate_get(id),
            failure,
        })
    }

    /// Create a listing.
    ///
    /// In demo mode the listing is appended with the placeholder provider.
    pub async fn create_listing(&self, request: NewListing) -> Result<Outcome<TxHandle>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.create_listing(&request).await {
                Ok(tx) => return Ok(Outcome::Live(tx)),
                Err(err) => Some(self.fall_back("create_listing", err)?),
            },
            None => None,
        };
        Ok(Outcome::Demo {
            value: self.demo.simulate_create(request),
            failure,
        })
    }

    /// Start a session on `id` for the caller.
    ///
    /// In demo mode an unassigned id is silently ignored.
    pub async fn start_session(&self, id: u64) -> Result<Outcome<TxHandle>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.start_session(id).await {
                Ok(tx) => return Ok(Outcome::Live(tx)),
                Err(err) => Some(self.fall_back("start_session", err)?),
            },
            None => None,
        };
        Ok(Outcome::Demo {
            value: self.demo.simulate_start(id),
            failure,
        })
    }

    /// Stop the session on `id`.
    pub async fn stop_session(&self, id: u64) -> Result<Outcome<TxHandle>> {
        let failure = match self.live_backend() {
            Some(backend) => match backend.stop_session(id).await {
                Ok(tx) => return Ok(Outcome::Live(tx)),
                Err(err) => Some(self.fall_back("stop_session", err)?),
            },
            None => None,
        };
        Ok(Outcome::Demo {
            value: self.demo.simulate_stop(id),
            failure,
        })
    }
}
