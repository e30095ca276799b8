//! Marketplace coordinator.
//!
//! Ties the registry client, the stream client and the credentials backend
//! together into the user-level flows: browse, list a machine, rent it and
//! stop the rental. Each flow keeps going when one of the steps lands in
//! demo mode; the per-step [`Outcome`]s are returned for callers that want
//! to know.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::{demo_credentials, AccessProvider, RemoteAccess};
use crate::rates::{hourly_rate_to_flow_rate_wei, DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::{
    Address, Listing, ListingRegistryClient, MarketError, NewListing, Outcome, PaymentStreamClient,
    Result, StartStream, StopStream, TxHandle,
};

/// User input for a new listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingForm {
    /// Streaming token the renter pays with.
    pub super_token_symbol: String,
    /// Price in whole tokens per hour.
    pub rate_per_hour: f64,
    /// Human-readable machine name.
    pub title: String,
    /// Content identifier of the hardware description.
    pub specs_cid: String,
}

impl ListingForm {
    /// Create a listing form.
    pub fn new(
        super_token_symbol: impl Into<String>,
        rate_per_hour: f64,
        title: impl Into<String>,
        specs_cid: impl Into<String>,
    ) -> Self {
        Self {
            super_token_symbol: super_token_symbol.into(),
            rate_per_hour,
            title: title.into(),
            specs_cid: specs_cid.into(),
        }
    }

    /// Convert into contract parameters.
    pub fn to_new_listing(&self, decimals: usize) -> Result<NewListing> {
        if !self.rate_per_hour.is_finite() || self.rate_per_hour < 0.0 {
            return Err(MarketError::invalid_data(
                "rate_per_hour",
                format!("{} is not a valid hourly rate", self.rate_per_hour),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(MarketError::invalid_data("title", "Title cannot be empty"));
        }
        if decimals > MAX_DECIMALS {
            return Err(MarketError::invalid_data(
                "decimals",
                format!("{} exceeds {}", decimals, MAX_DECIMALS),
            ));
        }
        let wei = hourly_rate_to_flow_rate_wei(self.rate_per_hour, decimals);
        let flow_rate = wei.parse::<u128>().map_err(|_| {
            MarketError::invalid_data("rate_per_hour", format!("{} wei/s overflows", wei))
        })?;
        Ok(NewListing::new(
            self.super_token_symbol.clone(),
            flow_rate,
            self.title.clone(),
            self.specs_cid.clone(),
        ))
    }
}

/// Result of [`Marketplace::rent`].
#[derive(Debug)]
pub struct Rental {
    /// Handle of the stream start.
    pub stream_tx: Outcome<TxHandle>,
    /// Handle of the session start.
    pub session_tx: Outcome<TxHandle>,
    /// Remote-access credentials, when any are known for the listing.
    pub credentials: Option<RemoteAccess>,
}

/// Result of [`Marketplace::stop`].
#[derive(Debug)]
pub struct StopReceipt {
    /// Handle of the stream stop.
    pub stream_tx: Outcome<TxHandle>,
    /// Handle of the session stop.
    pub session_tx: Outcome<TxHandle>,
    /// Whether the provider backend acknowledged the stop notice.
    pub notified: bool,
}

/// Kind of payment activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// A rental started.
    Start,
    /// A rental stopped.
    Stop,
}

/// Status of a payment activity entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// The stream is still running.
    Active,
    /// The stream has ended.
    Completed,
}

/// One entry of the payment history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// When the action completed.
    pub timestamp: DateTime<Utc>,
    /// Start or stop.
    pub kind: ActivityKind,
    /// Listing the action applied to.
    pub listing_id: u64,
    /// Listing title at the time.
    pub title: String,
    /// Receiver of the stream.
    pub provider: Address,
    /// Flow rate in wei per second.
    pub flow_rate: u128,
    /// Streaming token symbol.
    pub token: String,
    /// Stream handle.
    pub stream_tx: TxHandle,
    /// Session handle.
    pub session_tx: TxHandle,
    /// Whether the rental is still running.
    pub status: ActivityStatus,
}

/// Demo-mode state of both clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DemoStatus {
    /// Registry client is simulating.
    pub registry: bool,
    /// Stream client is simulating.
    pub streams: bool,
}

impl DemoStatus {
    /// True when either client is simulating.
    pub fn any(&self) -> bool {
        self.registry || self.streams
    }
}

/// Coordinates the rental flows across both clients.
pub struct Marketplace {
    registry: ListingRegistryClient,
    streams: PaymentStreamClient,
    access: Option<Arc<dyn AccessProvider>>,
    activity: RwLock<Vec<ActivityEntry>>,
    decimals: usize,
}

impl Marketplace {
    /// Create a coordinator over the two clients.
    pub fn new(registry: ListingRegistryClient, streams: PaymentStreamClient) -> Self {
        Self {
            registry,
            streams,
            access: None,
            activity: RwLock::new(Vec::new()),
            decimals: DEFAULT_DECIMALS,
        }
    }

    /// Fully simulated marketplace with the example listings installed.
    pub fn demo() -> Self {
        let registry = ListingRegistryClient::demo_only();
        registry.demo_ledger().seed();
        Self::new(registry, PaymentStreamClient::demo_only())
    }

    /// Attach a credentials backend.
    pub fn with_access(mut self, access: Arc<dyn AccessProvider>) -> Self {
        self.access = Some(access);
        self
    }

    /// Use tokens with a different number of decimals.
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// The registry client.
    pub fn registry(&self) -> &ListingRegistryClient {
        &self.registry
    }

    /// The stream client.
    pub fn streams(&self) -> &PaymentStreamClient {
        &self.streams
    }

    fn history(&self) -> RwLockReadGuard<'_, Vec<ActivityEntry>> {
        self.activity.read().unwrap_or_else(|e| e.into_inner())
    }

    fn history_mut(&self) -> RwLockWriteGuard<'_, Vec<ActivityEntry>> {
        self.activity.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Every listing with an assigned id that exists.
    pub async fn load_listings(&self) -> Result<Vec<Listing>> {
        let next_id = self.registry.next_id().await?.into_value();
        let mut listings = Vec::new();
        for id in 0..next_id {
            let listing = self.registry.get_listing(id).await?.into_value();
            if listing.exists {
                listings.push(listing);
            }
        }
        tracing::debug!(count = listings.len(), "loaded listings");
        Ok(listings)
    }

    /// A single listing, or `None` if the id is unassigned.
    pub async fn listing(&self, id: u64) -> Result<Option<Listing>> {
        let listing = self.registry.get_listing(id).await?.into_value();
        Ok(listing.exists.then_some(listing))
    }

    /// Publish a new listing.
    pub async fn create_listing(&self, form: ListingForm) -> Result<Outcome<TxHandle>> {
        let request = form.to_new_listing(self.decimals)?;
        tracing::info!(
            title = %request.title,
            flow_rate = request.flow_rate,
            "creating listing"
        );
        self.registry.create_listing(request).await
    }

    /// Rent `listing` on behalf of `renter`.
    ///
    /// Opens the stream to the provider, starts the session, records the
    /// activity and fetches credentials. When the credentials backend fails
    /// the fixed demo credentials for the listing are used instead.
    pub async fn rent(&self, listing: &Listing, renter: &Address) -> Result<Rental> {
        if !listing.exists {
            return Err(MarketError::invalid_data(
                "listing",
                format!("listing {} does not exist", listing.id),
            ));
        }
        if listing.is_streaming() {
            return Err(MarketError::invalid_data(
                "listing",
                format!("listing {} is already rented", listing.id),
            ));
        }

        let stream_tx = self
            .streams
            .start_stream(StartStream::new(
                listing.super_token_symbol.clone(),
                listing.provider.clone(),
                listing.flow_rate.to_string(),
            ))
            .await?;
        let session_tx = self.registry.start_session(listing.id).await?;

        self.record(listing, ActivityKind::Start, &stream_tx, &session_tx);
        let credentials = self.credentials_for(listing.id, renter).await;

        tracing::info!(
            listing_id = listing.id,
            renter = %renter,
            stream_tx = %stream_tx.value(),
            "rental started"
        );
        Ok(Rental {
            stream_tx,
            session_tx,
            credentials,
        })
    }

    async fn credentials_for(&self, listing_id: u64, renter: &Address) -> Option<RemoteAccess> {
        let Some(access) = &self.access else {
            return demo_credentials(listing_id);
        };
        match access.fetch_credentials(listing_id, renter).await {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                tracing::warn!(listing_id, error = %err, "credentials backend failed, using demo credentials");
                demo_credentials(listing_id)
            }
        }
    }

    /// Stop the rental of `listing`.
    ///
    /// A failed provider notification is logged and reported through
    /// [`StopReceipt::notified`]; it does not fail the stop.
    pub async fn stop(&self, listing: &Listing) -> Result<StopReceipt> {
        let stream_tx = self
            .streams
            .stop_stream(StopStream::new(
                listing.super_token_symbol.clone(),
                listing.provider.clone(),
            ))
            .await?;
        let session_tx = self.registry.stop_session(listing.id).await?;

        self.complete_active(listing.id);
        self.record(listing, ActivityKind::Stop, &stream_tx, &session_tx);

        let notified = match &self.access {
            Some(access) => match access.notify_stop(listing.id).await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(listing_id = listing.id, error = %err, "failed to notify provider");
                    false
                }
            },
            None => false,
        };

        tracing::info!(listing_id = listing.id, notified, "rental stopped");
        Ok(StopReceipt {
            stream_tx,
            session_tx,
            notified,
        })
    }

    fn record(
        &self,
        listing: &Listing,
        kind: ActivityKind,
        stream_tx: &Outcome<TxHandle>,
        session_tx: &Outcome<TxHandle>,
    ) {
        let status = match kind {
            ActivityKind::Start => ActivityStatus::Active,
            ActivityKind::Stop => ActivityStatus::Completed,
        };
        self.history_mut().push(ActivityEntry {
            timestamp: Utc::now(),
            kind,
            listing_id: listing.id,
            title: listing.title.clone(),
            provider: listing.provider.clone(),
            flow_rate: listing.flow_rate,
            token: listing.super_token_symbol.clone(),
            stream_tx: stream_tx.value().clone(),
            session_tx: session_tx.value().clone(),
            status,
        });
    }

    fn complete_active(&self, listing_id: u64) {
        let mut history = self.history_mut();
        if let Some(entry) = history.iter_mut().rev().find(|e| {
            e.listing_id == listing_id
                && e.kind == ActivityKind::Start
                && e.status == ActivityStatus::Active
        }) {
            entry.status = ActivityStatus::Completed;
        }
    }

    /// Streaming listings rented by `renter`.
    pub fn active_streams(&self, listings: &[Listing], renter: &Address) -> Vec<Listing> {
        listings
            .iter()
            .filter(|l| l.is_rented_by(renter))
            .cloned()
            .collect()
    }

    /// Payment history, newest first.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.history().iter().rev().cloned().collect()
    }

    /// Demo-mode state of both clients.
    pub fn demo_status(&self) -> DemoStatus {
        DemoStatus {
            registry: self.registry.is_demo_mode(),
            streams: self.streams.is_demo_mode(),
        }
    }
}
