//! gpuflow library.
//!
//! Client-side access layer for a compute-rental marketplace: providers list
//! machines on a ledger contract, renters pay for them with a continuous
//! token flow, and remote-access credentials are handed out once a session
//! is streaming.
//!
//! Both clients run in one of two modes. With a backend configured they talk
//! to the real ledger and streaming protocol; once a backend call fails they
//! switch to an in-memory demo mode for the rest of their lifetime. Every
//! result is tagged with an [`Outcome`] so callers can tell the two apart.
//!
//! # Features
//!
//! - **Listing registry**: read and mutate listing records ([`ListingRegistryClient`])
//! - **Payment streams**: open and close per-second token flows ([`PaymentStreamClient`])
//! - **Rate helpers**: hourly rate to wei-per-second conversion ([`rates`])
//! - **Real backends**: Ethereum JSON-RPC executors behind the `http-executor` feature
//!
//! # Example
//!
//! ```
//! use gpuflow_lib::{ListingRegistryClient, NewListing};
//!
//! # async fn demo() -> gpuflow_lib::Result<()> {
//! let registry = ListingRegistryClient::demo_only();
//! registry.demo_ledger().seed();
//!
//! registry
//!     .create_listing(NewListing::new("fDAIx", 100_000_000_000_000, "Test GPU", "QmTest"))
//!     .await?;
//! assert_eq!(registry.next_id().await?.into_value(), 3);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod demo;
pub mod errors;
pub mod executors;
pub mod listing;
pub mod market;
pub mod outcome;
pub mod prelude;
pub mod rates;
pub mod registry;
pub mod stream;

/// Test utilities for marketplace testing.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use demo::{DemoFlag, DemoLedger};
pub use errors::{MarketError, MarketErrorCode};
pub use listing::{Listing, ListingStatus, NewListing};
pub use market::Marketplace;
pub use outcome::Outcome;
pub use registry::{LedgerBackend, ListingRegistryClient};
pub use stream::{FlowBackend, PaymentStreamClient, StartStream, StopStream};

/// Common result alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Textual wallet or contract address.
///
/// Addresses are kept as the caller supplied them. Demo placeholder
/// addresses such as `0xDemoRenter123` are not valid hex and only the
/// executors insist on the 20-byte form.
///
/// # Example
///
/// ```
/// use gpuflow_lib::Address;
///
/// let idle = Address::zero();
/// assert!(idle.is_zero());
///
/// let renter: Address = "0xDemoRenter123".into();
/// assert!(!renter.is_zero());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Address(pub String);

impl Address {
    /// The zero-address sentinel used for "no renter".
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    /// Create a new Address from a string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The zero address.
    pub fn zero() -> Self {
        Self::new(Self::ZERO)
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the zero-address sentinel (case-insensitive).
    pub fn is_zero(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::ZERO)
    }

    /// Case-insensitive comparison, since checksummed and lowercase forms
    /// of the same address are both in circulation.
    pub fn matches(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a submitted operation.
///
/// A transaction hash when the real backend handled the call, a fixed
/// sentinel string in demo mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TxHandle(pub String);

impl TxHandle {
    /// Create a new handle from a string.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TxHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TxHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TxHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
