use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use pass_scan::{NotificationError, SmsService};

use crate::types::{SinchConfig, normalize_e164};

const SINCH_API_BASE: &str = "https://zt.us1.sms.api.sinch.com/api/v1";

/// Sinch SMS service implementation, using the project-scoped batches
/// endpoint with API key basic auth
pub struct SinchSmsService {
    client: Client,
    config: SinchConfig,
}

#[derive(Debug, Serialize)]
struct SinchBatchRequest<'a> {
    from: &'a str,
    to: Vec<String>,
    body: &'a str,
    delivery_report: &'a str,
}

#[derive(Debug, Deserialize)]
struct SinchBatchResponse {
    id: String,
}

impl SinchSmsService {
    /// Create a new Sinch SMS service
    pub fn new(config: SinchConfig) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotificationError::Sms(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SmsService for SinchSmsService {
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
        let url = format!(
            "{}/projects/{}/batches",
            SINCH_API_BASE, self.config.project_id
        );

        let request = SinchBatchRequest {
            from: &self.config.from_number,
            to: vec![normalize_e164(to)],
            body: message,
            delivery_report: "none",
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::Sms(format!("Sinch request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(NotificationError::Sms(format!(
                "Sinch API returned {}: {}",
                status, detail
            )));
        }

        let batch: SinchBatchResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::Sms(format!("Failed to parse Sinch response: {}", e)))?;

        info!("Sent SMS to {} via Sinch (batch {})", to, batch.id);
        Ok(batch.id)
    }
}
