//! Listing records.
//!
//! A [`Listing`] is one advertised compute resource. After creation only the
//! session fields (`status`, `active_renter`) ever change, and they change
//! together: a listing is [`ListingStatus::Streaming`] exactly when its
//! renter is not the zero address.

use serde::{Deserialize, Serialize};

use crate::{Address, MarketError};

/// Session state of a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ListingStatus {
    /// No renter; available.
    #[default]
    Idle = 0,
    /// A renter is paying a continuous flow.
    Streaming = 1,
}

impl ListingStatus {
    /// Get the status name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Streaming => "streaming",
        }
    }
}

impl TryFrom<u8> for ListingStatus {
    type Error = MarketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Streaming),
            other => Err(MarketError::invalid_data(
                "status",
                format!("unknown listing status {}", other),
            )),
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advertised compute resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Sequential identifier, starting at 0.
    pub id: u64,
    /// Wallet address of the lister.
    pub provider: Address,
    /// Streaming-capable token used for rent.
    pub super_token_symbol: String,
    /// Agreed rate in smallest token units per second.
    pub flow_rate: u128,
    /// Free-text label.
    pub title: String,
    /// Opaque content identifier of the machine specification.
    #[serde(rename = "specsCID")]
    pub specs_cid: String,
    /// Current renter, or the zero address when idle.
    pub active_renter: Address,
    /// Session state.
    pub status: ListingStatus,
    /// False for the "never created" sentinel record.
    pub exists: bool,
}

impl Listing {
    /// The sentinel returned for an id that was never assigned.
    pub fn missing(id: u64) -> Self {
        Self {
            id,
            provider: Address::zero(),
            super_token_symbol: String::new(),
            flow_rate: 0,
            title: String::new(),
            specs_cid: String::new(),
            active_renter: Address::zero(),
            status: ListingStatus::Idle,
            exists: false,
        }
    }

    /// Build a freshly created, idle listing.
    pub fn created(id: u64, provider: Address, request: NewListing) -> Self {
        Self {
            id,
            provider,
            super_token_symbol: request.super_token_symbol,
            flow_rate: request.flow_rate,
            title: request.title,
            specs_cid: request.specs_cid,
            active_renter: Address::zero(),
            status: ListingStatus::Idle,
            exists: true,
        }
    }

    /// Check if a renter is currently streaming to this listing.
    pub fn is_streaming(&self) -> bool {
        self.status == ListingStatus::Streaming
    }

    /// Check if `renter` holds the active session.
    pub fn is_rented_by(&self, renter: &Address) -> bool {
        self.is_streaming() && self.active_renter.matches(renter)
    }

    /// Move to [`ListingStatus::Streaming`] with the given renter.
    pub fn begin_session(&mut self, renter: Address) {
        self.status = ListingStatus::Streaming;
        self.active_renter = renter;
    }

    /// Return to [`ListingStatus::Idle`] and clear the renter.
    pub fn end_session(&mut self) {
        self.status = ListingStatus::Idle;
        self.active_renter = Address::zero();
    }
}

/// Parameters of a `createListing` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    /// Streaming-capable token used for rent.
    pub super_token_symbol: String,
    /// Rate in smallest token units per second.
    pub flow_rate: u128,
    /// Free-text label.
    pub title: String,
    /// Opaque content identifier of the machine specification.
    #[serde(rename = "specsCID")]
    pub specs_cid: String,
}

impl NewListing {
    /// Create a new listing request.
    pub fn new(
        super_token_symbol: impl Into<String>,
        flow_rate: u128,
        title: impl Into<String>,
        specs_cid: impl Into<String>,
    ) -> Self {
        Self {
            super_token_symbol: super_token_symbol.into(),
            flow_rate,
            title: title.into(),
            specs_cid: specs_cid.into(),
        }
    }
}
