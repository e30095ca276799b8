//! Remote-access credentials for rented machines.
//!
//! After a rental starts, the renter asks the provider's backend for the
//! remote desktop credentials of the machine; when the rental stops, the
//! backend is notified so it can rotate them.
//!
//! # Feature Flags
//!
//! [`CredentialsClient`] requires the `http-executor` feature for actual
//! HTTP requests; without it every call returns `Unimplemented`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "http-executor")]
use std::time::Duration;

use crate::executors::CredentialsConfig;
use crate::{Address, MarketError, Result};

/// Remote desktop credentials handed to the renter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccess {
    /// AnyDesk address of the machine.
    pub anydesk_id: String,
    /// One-time password.
    pub anydesk_password: String,
    /// Free-form description from the provider.
    #[serde(default)]
    pub note: String,
}

impl RemoteAccess {
    /// Create a credentials record.
    pub fn new(
        anydesk_id: impl Into<String>,
        anydesk_password: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            anydesk_id: anydesk_id.into(),
            anydesk_password: anydesk_password.into(),
            note: note.into(),
        }
    }
}

/// Fixed credentials for the seeded demo listings.
///
/// ```
/// use gpuflow_lib::credentials::demo_credentials;
///
/// assert_eq!(demo_credentials(0).unwrap().anydesk_id, "123456789");
/// assert!(demo_credentials(2).is_none());
/// ```
pub fn demo_credentials(listing_id: u64) -> Option<RemoteAccess> {
    match listing_id {
        0 => Some(RemoteAccess::new(
            "123456789",
            "testpass123",
            "High-Performance GPU - RTX 4090 with 24GB VRAM",
        )),
        1 => Some(RemoteAccess::new(
            "987654321",
            "demo456",
            "Intel i9-13900K CPU with 64GB RAM",
        )),
        _ => None,
    }
}

/// Source of rental credentials.
#[async_trait]
pub trait AccessProvider: Send + Sync {
    /// Fetch credentials for `listing_id` on behalf of `renter`.
    async fn fetch_credentials(&self, listing_id: u64, renter: &Address) -> Result<RemoteAccess>;

    /// Tell the provider that the rental of `listing_id` ended.
    async fn notify_stop(&self, listing_id: u64) -> Result<()>;
}

/// HTTP client for the credentials backend.
pub struct CredentialsClient {
    config: CredentialsConfig,
    #[cfg(feature = "http-executor")]
    client: reqwest::Client,
}

#[derive(Serialize)]
#[cfg_attr(not(feature = "http-executor"), allow(dead_code))]
struct StopNotice {
    id: u64,
}

impl CredentialsClient {
    /// Create a new credentials client.
    #[cfg(feature = "http-executor")]
    pub fn new(config: CredentialsConfig) -> Result<Self> {
        validate_config(&config)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MarketError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a new credentials client (stub when feature disabled).
    #[cfg(not(feature = "http-executor"))]
    pub fn new(config: CredentialsConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &CredentialsConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Map reqwest errors to MarketError.
    #[cfg(feature = "http-executor")]
    fn map_reqwest_error(&self, e: reqwest::Error) -> MarketError {
        if e.is_timeout() {
            MarketError::ConnectionTimeout {
                operation: "credentials request".to_string(),
                timeout_ms: self.config.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            MarketError::ConnectionFailed {
                target: self.config.base_url.clone(),
                reason: e.to_string(),
            }
        } else {
            MarketError::Transport(format!("Credentials request failed: {}", e))
        }
    }

    #[cfg(feature = "http-executor")]
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(MarketError::Transport(format!(
            "Credentials backend error ({}): {}",
            status.as_u16(),
            text
        )))
    }
}

fn validate_config(config: &CredentialsConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(MarketError::invalid_data(
            "base_url",
            "Credentials backend URL cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(feature = "http-executor")]
#[async_trait]
impl AccessProvider for CredentialsClient {
    async fn fetch_credentials(&self, listing_id: u64, renter: &Address) -> Result<RemoteAccess> {
        let url = self.endpoint(&format!("/api/credentials/{}", listing_id));
        tracing::debug!(listing_id, renter = %renter, "fetching rental credentials");

        let response = self
            .client
            .get(&url)
            .query(&[("renter", renter.as_str())])
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| MarketError::Serialization(format!("Failed to parse credentials: {}", e)))
    }

    async fn notify_stop(&self, listing_id: u64) -> Result<()> {
        let url = self.endpoint("/api/notify/stop");
        let response = self
            .client
            .post(&url)
            .json(&StopNotice { id: listing_id })
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(not(feature = "http-executor"))]
#[async_trait]
impl AccessProvider for CredentialsClient {
    async fn fetch_credentials(&self, _listing_id: u64, _renter: &Address) -> Result<RemoteAccess> {
        Err(MarketError::Unimplemented(
            "Credentials client not compiled - enable the 'http-executor' feature",
        ))
    }

    async fn notify_stop(&self, _listing_id: u64) -> Result<()> {
        Err(MarketError::Unimplemented(
            "Credentials client not compiled - enable the 'http-executor' feature",
        ))
    }
}
