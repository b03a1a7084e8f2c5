use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use pass_scan::{NotificationError, SmsService};

use crate::types::{TwilioConfig, normalize_e164};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio SMS service implementation, using the form-encoded Messages
/// endpoint with account SID basic auth
pub struct TwilioSmsService {
    client: Client,
    config: TwilioConfig,
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

impl TwilioSmsService {
    /// Create a new Twilio SMS service
    pub fn new(config: TwilioConfig) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotificationError::Sms(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SmsService for TwilioSmsService {
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.config.account_sid
        );

        let params = [
            ("To", normalize_e164(to)),
            ("From", self.config.from_number.clone()),
            ("Body", message.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| NotificationError::Sms(format!("Twilio request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(NotificationError::Sms(format!(
                "Twilio API returned {}: {}",
                status, detail
            )));
        }

        let sent: TwilioMessageResponse = response.json().await.map_err(|e| {
            NotificationError::Sms(format!("Failed to parse Twilio response: {}", e))
        })?;

        info!("Sent SMS to {} via Twilio (message {})", to, sent.sid);
        Ok(sent.sid)
    }
}
