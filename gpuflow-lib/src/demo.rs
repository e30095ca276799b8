//! Demo-mode state.
//!
//! Each client owns a [`DemoFlag`]; the registry client additionally owns a
//! [`DemoLedger`] that stands in for the on-chain listing store. Nothing
//! here is persisted, and the ledger lock only covers individual operations.
//!
//! # Thread Safety
//!
//! The ledger uses `RwLock`. Demo operations must not fail, so a poisoned
//! lock is recovered with [`std::sync::PoisonError::into_inner`] instead of
//! being reported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Address, Listing, NewListing, TxHandle};

/// Placeholder provider used for demo-created listings and the first seed entry.
pub const DEMO_PROVIDER: &str = "0xDemoProvider123";
/// Placeholder provider of the second seed entry.
pub const DEMO_PROVIDER_ALT: &str = "0xDemoProvider456";
/// Placeholder renter recorded by demo sessions.
pub const DEMO_RENTER: &str = "0xDemoRenter123";

/// Handle returned by a demo `createListing`.
pub const DEMO_CREATE_TX: &str = "0xDemoTransactionHash";
/// Handle returned by a demo `startSession`.
pub const DEMO_SESSION_START_TX: &str = "0xDemoSessionStartHash";
/// Handle returned by a demo `stopSession`.
pub const DEMO_SESSION_STOP_TX: &str = "0xDemoSessionStopHash";
/// Handle returned by a demo stream start.
pub const DEMO_STREAM_START_TX: &str = "0xDemoSuperfluidStreamStartHash";
/// Handle returned by a demo stream stop.
pub const DEMO_STREAM_STOP_TX: &str = "0xDemoSuperfluidStreamStopHash";
/// Simulated token balance shown while streams run in demo mode.
pub const DEMO_BALANCE: &str = "1000.00";

/// Per-client switch into demo mode.
///
/// Once activated it stays active until [`DemoFlag::reset`] is called
/// explicitly.
#[derive(Debug, Default)]
pub struct DemoFlag(AtomicBool);

impl DemoFlag {
    /// Create a flag with the given initial state.
    pub fn new(active: bool) -> Self {
        Self(AtomicBool::new(active))
    }

    /// Check whether demo mode is active.
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Enter demo mode. Returns true if this call flipped the flag.
    pub fn activate(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    /// Leave demo mode.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The two example listings installed by [`DemoLedger::seed`].
pub fn seed_listings() -> Vec<Listing> {
    vec![
        Listing::created(
            0,
            Address::new(DEMO_PROVIDER),
            NewListing::new("fDAIx", 277_777_777_777_777, "RTX 4090 Gaming Rig", "QmDemo123"),
        ),
        Listing::created(
            1,
            Address::new(DEMO_PROVIDER_ALT),
            NewListing::new("fDAIx", 138_888_888_888_888, "Intel i9 Workstation", "QmDemo456"),
        ),
    ]
}

/// In-memory listing sequence used once the registry is in demo mode.
#[derive(Debug, Default)]
pub struct DemoLedger {
    listings: RwLock<Vec<Listing>>,
}

impl DemoLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger holding the given records.
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Listing>> {
        self.listings.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Listing>> {
        self.listings.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Install the example listings if the ledger is empty.
    ///
    /// Returns true if the ledger was seeded by this call.
    pub fn seed(&self) -> bool {
        let mut listings = self.write();
        if !listings.is_empty() {
            return false;
        }
        *listings = seed_listings();
        true
    }

    /// Number of assigned ids.
    pub fn len(&self) -> u64 {
        self.read().len() as u64
    }

    /// Check if no listing was created yet.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Get a copy of the listing at `id`.
    pub fn get(&self, id: u64) -> Option<Listing> {
        let index = usize::try_from(id).ok()?;
        self.read().get(index).cloned()
    }

    /// Copy of the whole sequence.
    pub fn snapshot(&self) -> Vec<Listing> {
        self.read().clone()
    }

    /// Append a new idle listing and return its id.
    pub fn append(&self, request: NewListing, provider: Address) -> u64 {
        let mut listings = self.write();
        let id = listings.len() as u64;
        listings.push(Listing::created(id, provider, request));
        id
    }

    /// Mark `id` as streaming to `renter`. Out-of-range ids are ignored.
    pub fn start_session(&self, id: u64, renter: Address) -> bool {
        self.update(id, |listing| listing.begin_session(renter))
    }

    /// Return `id` to idle. Out-of-range ids are ignored.
    pub fn stop_session(&self, id: u64) -> bool {
        self.update(id, Listing::end_session)
    }

    fn update(&self, id: u64, f: impl FnOnce(&mut Listing)) -> bool {
        let Ok(index) = usize::try_from(id) else {
            return false;
        };
        match self.write().get_mut(index) {
            Some(listing) => {
                f(listing);
                true
            }
            None => false,
        }
    }

    /// `createListing` against the demo store.
    pub(crate) fn simulate_create(&self, request: NewListing) -> TxHandle {
        self.append(request, Address::new(DEMO_PROVIDER));
        TxHandle::new(DEMO_CREATE_TX)
    }

    /// `startSession` against the demo store.
    pub(crate) fn simulate_start(&self, id: u64) -> TxHandle {
        self.start_session(id, Address::new(DEMO_RENTER));
        TxHandle::new(DEMO_SESSION_START_TX)
    }

    /// `stopSession` against the demo store.
    pub(crate) fn simulate_stop(&self, id: u64) -> TxHandle {
        self.stop_session(id);
        TxHandle::new(DEMO_SESSION_STOP_TX)
    }

    /// `getListing` against the demo store.
    pub(crate) fn simulate_get(&self, id: u64) -> Listing {
        self.get(id).unwrap_or_else(|| Listing::missing(id))
    }
}
