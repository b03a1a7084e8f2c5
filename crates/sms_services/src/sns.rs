use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client as SnsClient;
use tracing::info;

use pass_scan::{NotificationError, SmsService};

use crate::types::normalize_e164;

/// AWS SNS SMS service implementation. Credentials and region come from the
/// SDK's standard chain (environment, profile, instance role).
pub struct SnsSmsService {
    sns_client: SnsClient,
}

impl SnsSmsService {
    /// Create a new AWS SNS SMS service
    pub async fn new() -> Result<Self, NotificationError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Ok(Self {
            sns_client: SnsClient::new(&config),
        })
    }
}

#[async_trait]
impl SmsService for SnsSmsService {
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
        let formatted_phone = normalize_e164(to);

        let output = self
            .sns_client
            .publish()
            .phone_number(&formatted_phone)
            .message(message)
            .send()
            .await
            .map_err(|e| NotificationError::Sms(format!("AWS SNS error: {}", e)))?;

        let message_id = output.message_id().unwrap_or_default().to_string();

        info!("Sent SMS to {} via SNS (message {})", formatted_phone, message_id);
        Ok(message_id)
    }
}
