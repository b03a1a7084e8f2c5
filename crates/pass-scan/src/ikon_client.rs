use std::sync::Arc;

use tracing::{debug, warn};

use crate::availability::AvailabilityPayload;
use crate::session_manager::SessionManager;
use crate::watch_types::WatchError;
use crate::watcher::AvailabilitySource;

/// Client for the Ikon reservation-availability API
pub struct IkonClient {
    session_manager: Arc<SessionManager>,
    fetch_url: String,
}

impl IkonClient {
    /// Create a client polling one reservation-availability endpoint
    pub fn new(session_manager: Arc<SessionManager>, fetch_url: impl Into<String>) -> Self {
        Self {
            session_manager,
            fetch_url: fetch_url.into(),
        }
    }

    /// GET the availability endpoint through the logged-in session and
    /// decode the body.
    ///
    /// An undecodable body is a `MalformedPayload`, not an API fault: the
    /// caller retries it on the next cycle like any other transient glitch.
    pub async fn fetch(&self) -> Result<AvailabilityPayload, WatchError> {
        self.session_manager.ensure_valid_session().await?;

        debug!("Fetching availability from {}", self.fetch_url);

        let response = self
            .session_manager
            .client()
            .get(&self.fetch_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| WatchError::Network(format!("Availability request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Availability request failed with status {}", status);

            return match status.as_u16() {
                429 => Err(WatchError::RateLimited),
                401 | 403 => {
                    // Session cookies expired server-side; log in again next cycle
                    self.session_manager.invalidate().await;
                    Err(WatchError::AuthenticationFailed)
                }
                404 => Err(WatchError::NotFound),
                _ => Err(WatchError::Api(format!("HTTP {}", status))),
            };
        }

        let body = response
            .text()
            .await
            .map_err(|e| WatchError::Network(format!("Failed to read response body: {}", e)))?;

        let payload: AvailabilityPayload = serde_json::from_str(&body).map_err(|e| {
            WatchError::MalformedPayload(format!("could not decode availability JSON: {}", e))
        })?;

        Ok(payload)
    }
}

#[async_trait::async_trait]
impl AvailabilitySource for IkonClient {
    async fn fetch_availability(&self) -> Result<AvailabilityPayload, WatchError> {
        self.fetch().await
    }
}
