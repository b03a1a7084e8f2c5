use async_trait::async_trait;
use tracing::info;

use pass_scan::{NotificationError, SmsService};

/// Mock SMS service for development/testing
pub struct MockSmsService;

#[async_trait]
impl SmsService for MockSmsService {
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
        info!("📱 [MOCK SMS] To: {}", to);
        info!("📱 [MOCK SMS] Message: {}", message);

        let mock_id = format!("mock-sms-{}", uuid::Uuid::new_v4());
        Ok(mock_id)
    }
}
