use std::str::FromStr;

use pass_scan::NotificationError;

/// The SMS provider behind the delivery capability.
///
/// The watcher core only ever sees the `SmsService` trait object; the
/// provider identity is decided here, once, at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsProvider {
    /// Sinch SMS REST API
    Sinch,
    /// Twilio Messages API
    Twilio,
    /// AWS Simple Notification Service
    Sns,
    /// Log-only backend for development and tests
    Mock,
}

impl FromStr for SmsProvider {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sinch" => Ok(SmsProvider::Sinch),
            "twilio" => Ok(SmsProvider::Twilio),
            "sns" | "aws-sns" => Ok(SmsProvider::Sns),
            "mock" => Ok(SmsProvider::Mock),
            other => Err(NotificationError::Sms(format!(
                "Unknown SMS provider '{}' (expected sinch, twilio, sns, or mock)",
                other
            ))),
        }
    }
}

/// Credentials for the Sinch SMS REST API
#[derive(Debug, Clone)]
pub struct SinchConfig {
    /// API key id
    pub key_id: String,
    /// API key secret
    pub key_secret: String,
    /// Sinch project the numbers belong to
    pub project_id: String,
    /// Sending number in E.164 form
    pub from_number: String,
}

/// Credentials for the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID
    pub account_sid: String,
    /// Auth token
    pub auth_token: String,
    /// Sending number in E.164 form
    pub from_number: String,
}

/// Provider selection together with the credentials that provider needs.
/// SNS carries no fields: the AWS SDK reads its own credential chain.
#[derive(Debug, Clone)]
pub enum SmsConfig {
    /// Deliver through Sinch
    Sinch(SinchConfig),
    /// Deliver through Twilio
    Twilio(TwilioConfig),
    /// Deliver through AWS SNS
    Sns,
    /// Log instead of delivering
    Mock,
}

/// Best-effort E.164 normalization: strip common punctuation and prepend
/// `+` when missing. Numbers already in E.164 form pass through untouched.
pub(crate) fn normalize_e164(phone: &str) -> String {
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{}", phone.replace(['(', ')', '-', ' ', '.'], ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("sinch".parse::<SmsProvider>().unwrap(), SmsProvider::Sinch);
        assert_eq!("Twilio".parse::<SmsProvider>().unwrap(), SmsProvider::Twilio);
        assert_eq!("aws-sns".parse::<SmsProvider>().unwrap(), SmsProvider::Sns);
        assert_eq!("mock".parse::<SmsProvider>().unwrap(), SmsProvider::Mock);
        assert!("carrier-pigeon".parse::<SmsProvider>().is_err());
    }

    #[test]
    fn test_normalize_e164() {
        assert_eq!(normalize_e164("+15551230001"), "+15551230001");
        assert_eq!(normalize_e164("(555) 123-0001"), "+5551230001");
        assert_eq!(normalize_e164("1.555.123.0001"), "+15551230001");
    }
}
