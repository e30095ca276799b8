//! Test utilities for the marketplace clients.
//!
//! In-memory stand-ins for the contract, the streaming protocol and the
//! credentials backend, with switches for simulating outages.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gpuflow_lib::test_utils::MockLedger;
//! use gpuflow_lib::ListingRegistryClient;
//!
//! let ledger = MockLedger::new();
//! let registry = ListingRegistryClient::new(ledger.clone());
//!
//! ledger.set_available(false);
//! let out = registry.next_id().await?;
//! assert!(out.is_demo());
//! ```

mod fixtures;
mod mock_flow;
mod mock_ledger;

/// Account the mocks treat as the transaction sender.
pub const TEST_SIGNER: &str = "0x00000000000000000000000000000000000000e1";

pub use fixtures::{test_address, TestFixtures};
pub use mock_flow::{MockAccess, MockFlowNetwork};
pub use mock_ledger::MockLedger;
