//! # SMS Services
//!
//! This crate provides the SMS delivery backends for the availability
//! watcher. Each provider implements the `SmsService` trait from
//! `pass-scan`; the watcher core never branches on provider identity.

use std::sync::Arc;

use pass_scan::{NotificationError, SmsService};

/// Mock backend that logs instead of delivering
mod mock;
/// Sinch REST backend
mod sinch;
/// AWS SNS backend
mod sns;
/// Twilio REST backend
mod twilio;
/// Provider selection and credential types
mod types;

pub use mock::MockSmsService;
pub use sinch::SinchSmsService;
pub use sns::SnsSmsService;
pub use twilio::TwilioSmsService;
pub use types::{SinchConfig, SmsConfig, SmsProvider, TwilioConfig};

/// Construct the configured SMS backend.
///
/// Called once at startup; everything downstream holds the trait object.
pub async fn create_sms_service(
    config: SmsConfig,
) -> Result<Arc<dyn SmsService>, NotificationError> {
    match config {
        SmsConfig::Sinch(config) => Ok(Arc::new(SinchSmsService::new(config)?)),
        SmsConfig::Twilio(config) => Ok(Arc::new(TwilioSmsService::new(config)?)),
        SmsConfig::Sns => Ok(Arc::new(SnsSmsService::new().await?)),
        SmsConfig::Mock => Ok(Arc::new(MockSmsService)),
    }
}
