//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use gpuflow_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Core types: `Address`, `TxHandle`, `Listing`, `ListingStatus`, `NewListing`, `Outcome`
//! - Error types: `MarketError`, `MarketErrorCode`, `Result`
//! - Clients: `ListingRegistryClient`, `PaymentStreamClient`, `Marketplace`
//! - Backend traits: `LedgerBackend`, `FlowBackend`, `AccessProvider`

// Core types
pub use crate::{Address, Listing, ListingStatus, NewListing, Outcome, TxHandle};

// Error handling
pub use crate::errors::{MarketError, MarketErrorCode};
pub use crate::Result;

// Clients
pub use crate::market::{ListingForm, Marketplace, Rental, StopReceipt};
pub use crate::registry::ListingRegistryClient;
pub use crate::stream::{PaymentStreamClient, StartStream, StopStream};

// Backend traits
pub use crate::credentials::{AccessProvider, RemoteAccess};
pub use crate::registry::LedgerBackend;
pub use crate::stream::FlowBackend;

// Rate helpers
pub use crate::rates::{hourly_rate_to_flow_rate_wei, per_hour_to_per_sec};
