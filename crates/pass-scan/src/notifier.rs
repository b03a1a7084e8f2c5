use std::sync::Arc;

use tracing::{info, warn};

use crate::availability::{AvailabilityReport, DATE_FORMAT};

/// Trait for SMS delivery backends
#[async_trait::async_trait]
pub trait SmsService: Send + Sync {
    /// Delivers one message to one recipient, returning the provider's
    /// message id on success.
    async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError>;
}

/// Errors surfaced by SMS delivery backends
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// SMS error
    #[error("SMS error: {0}")]
    Sms(String),

    /// Invalid phone number format
    #[error("Invalid phone number format")]
    InvalidPhoneNumber,
}

/// Formats availability reports and fans them out to every configured
/// recipient over the injected SMS backend.
pub struct Notifier {
    sms_service: Arc<dyn SmsService>,
    recipients: Vec<String>,
}

impl Notifier {
    /// Creates a notifier over an SMS backend and a fixed recipient list
    pub fn new(sms_service: Arc<dyn SmsService>, recipients: Vec<String>) -> Self {
        Self {
            sms_service,
            recipients,
        }
    }

    /// Delivers one report to all recipients.
    ///
    /// An empty report sends nothing. Each recipient gets the identical text
    /// in one independent send; a failed send is logged with the recipient
    /// and provider detail and the remaining recipients are still attempted.
    /// Never returns an error: partial delivery is an acceptable cycle
    /// outcome, and a failed recipient is only retried on a later cycle if
    /// availability still holds then.
    pub async fn notify(&self, report: &AvailabilityReport) {
        if report.is_empty() {
            info!("No availability found for desired dates");
            return;
        }

        let message = compose_report(report);
        info!("{}", message);

        for recipient in &self.recipients {
            match self.sms_service.send_sms(recipient, &message).await {
                Ok(message_id) => {
                    info!(
                        "Sent availability alert to {} (message id {})",
                        recipient, message_id
                    );
                }
                Err(e) => {
                    warn!("Failed to send availability alert to {}: {}", recipient, e);
                }
            }
        }
    }
}

/// Renders one human-readable report: a header line followed by one line per
/// matched pass, in report order.
fn compose_report(report: &AvailabilityReport) -> String {
    let mut lines = vec!["Found availability for the following pass IDs and dates:".to_string()];

    for entry in report.entries() {
        let pass_id = entry
            .pass_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let dates = entry
            .dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  - Pass ID {}: {}", pass_id, dates));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{AvailabilityPayload, extract_availability};
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct RecordingSmsService {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSmsService {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl SmsService for RecordingSmsService {
        async fn send_sms(&self, to: &str, message: &str) -> Result<String, NotificationError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), message.to_string()));
            Ok("test-message-id".to_string())
        }
    }

    struct FailingSmsService;

    #[async_trait::async_trait]
    impl SmsService for FailingSmsService {
        async fn send_sms(&self, _to: &str, _message: &str) -> Result<String, NotificationError> {
            Err(NotificationError::Sms("provider rejected message".to_string()))
        }
    }

    fn report(json: &str, desired: &[&str]) -> AvailabilityReport {
        let payload: AvailabilityPayload = serde_json::from_str(json).unwrap();
        let desired: Vec<NaiveDate> = desired
            .iter()
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).unwrap())
            .collect();
        extract_availability(&payload, &desired).unwrap()
    }

    #[tokio::test]
    async fn test_empty_report_sends_nothing() {
        let sms = Arc::new(RecordingSmsService::new());
        let notifier = Notifier::new(sms.clone(), vec!["+15551230001".to_string()]);

        let empty = report(r#"{"data":[]}"#, &["2025-03-01"]);
        notifier.notify(&empty).await;

        assert!(sms.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_text_goes_to_every_recipient() {
        let sms = Arc::new(RecordingSmsService::new());
        let notifier = Notifier::new(
            sms.clone(),
            vec!["+15551230001".to_string(), "+15551230002".to_string()],
        );

        let found = report(
            r#"{"data":[{"id":"88A","reservations_available":2,
                "closed_dates":["2025-03-01"]}]}"#,
            &["2025-03-01", "2025-03-02"],
        );
        notifier.notify(&found).await;

        let sent = sms.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "+15551230001");
        assert_eq!(sent[1].0, "+15551230002");
        assert_eq!(sent[0].1, sent[1].1);
        assert_eq!(
            sent[0].1,
            "Found availability for the following pass IDs and dates:\n  - Pass ID 88A: 2025-03-02"
        );
    }

    #[tokio::test]
    async fn test_failed_send_does_not_escape_or_abort() {
        let notifier = Notifier::new(
            Arc::new(FailingSmsService),
            vec!["+15551230001".to_string(), "+15551230002".to_string()],
        );

        let found = report(
            r#"{"data":[{"id":1,"reservations_available":1}]}"#,
            &["2025-03-01"],
        );

        // Returning at all is the assertion: no panic, no propagated error.
        notifier.notify(&found).await;
    }

    #[test]
    fn test_compose_report_lists_passes_in_order() {
        let found = report(
            r#"{"data":[
                {"id":"B","reservations_available":1},
                {"id":7,"reservations_available":1},
                {"reservations_available":1}]}"#,
            &["2025-03-01"],
        );

        let text = compose_report(&found);

        let expected = [
            "Found availability for the following pass IDs and dates:",
            "  - Pass ID B: 2025-03-01",
            "  - Pass ID 7: 2025-03-01",
            "  - Pass ID unknown: 2025-03-01",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }
}
