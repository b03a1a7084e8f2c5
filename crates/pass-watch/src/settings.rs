use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use regex::Regex;
use validator::{Validate, ValidationError};

use sms_services::{SinchConfig, SmsConfig, SmsProvider, TwilioConfig};

static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{6,14}$").expect("recipient number regex"));

/// Runtime configuration, collected from the environment once at startup.
/// Nothing downstream reads the environment again.
#[derive(Debug, Clone, Validate)]
pub struct Settings {
    /// Account login email
    pub login_email: String,

    /// Account login password
    pub login_password: String,

    /// Reservation-availability endpoint to poll
    pub fetch_url: String,

    /// Dates to alert on, in alert order
    #[validate(length(min = 1, message = "at least one desired date is required"))]
    pub desired_dates: Vec<NaiveDate>,

    /// Phone numbers that receive availability alerts
    #[validate(
        length(min = 1, message = "at least one recipient is required"),
        custom(function = "validate_recipients")
    )]
    pub recipients: Vec<String>,

    /// Delay between polling cycles
    pub poll_interval: Duration,

    /// SMS provider selection and credentials
    pub sms: SmsConfig,
}

impl Settings {
    /// Load and validate settings from the environment.
    ///
    /// Missing or empty variables are collected and reported together so one
    /// run surfaces the whole list, not just the first gap.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut missing = Vec::new();

        let login_email = require_var("LOGIN_EMAIL", &mut missing);
        let login_password = require_var("LOGIN_PASSWORD", &mut missing);
        let fetch_url = require_var("FETCH_URL", &mut missing);
        let desired_dates_raw = require_var("DESIRED_DATES", &mut missing);
        let recipients_raw = require_var("SMS_TO_NUMBERS", &mut missing);
        let provider_raw = require_var("SMS_PROVIDER", &mut missing);

        if !missing.is_empty() {
            anyhow::bail!(
                "The following environment variables are missing or empty: {}",
                missing.join(", ")
            );
        }

        let provider: SmsProvider = provider_raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let sms = sms_config_from_env(provider)?;

        let poll_interval = match env::var("POLL_INTERVAL_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("POLL_INTERVAL_SECS must be an integer number of seconds")?,
            ),
            Err(_) => Duration::from_secs(300),
        };

        let settings = Self {
            login_email,
            login_password,
            fetch_url,
            desired_dates: parse_date_list(&desired_dates_raw)?,
            recipients: parse_number_list(&recipients_raw),
            poll_interval,
            sms,
        };

        settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

        Ok(settings)
    }
}

/// Read the provider-specific credentials for the selected SMS backend
fn sms_config_from_env(provider: SmsProvider) -> anyhow::Result<SmsConfig> {
    let mut missing = Vec::new();

    let config = match provider {
        SmsProvider::Sinch => SmsConfig::Sinch(SinchConfig {
            key_id: require_var("SINCH_KEY_ID", &mut missing),
            key_secret: require_var("SINCH_KEY_SECRET", &mut missing),
            project_id: require_var("SINCH_PROJECT_ID", &mut missing),
            from_number: require_var("SINCH_FROM_NUMBER", &mut missing),
        }),
        SmsProvider::Twilio => SmsConfig::Twilio(TwilioConfig {
            account_sid: require_var("TWILIO_ACCOUNT_SID", &mut missing),
            auth_token: require_var("TWILIO_AUTH_TOKEN", &mut missing),
            from_number: require_var("TWILIO_FROM_NUMBER", &mut missing),
        }),
        SmsProvider::Sns => SmsConfig::Sns,
        SmsProvider::Mock => SmsConfig::Mock,
    };

    if !missing.is_empty() {
        anyhow::bail!(
            "The following environment variables are missing or empty: {}",
            missing.join(", ")
        );
    }

    Ok(config)
}

fn require_var(name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

/// Parse a comma-separated list of YYYY-MM-DD dates, ignoring blank entries
fn parse_date_list(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid desired date '{}' (expected YYYY-MM-DD)", s))
        })
        .collect()
}

/// Parse a comma-separated list of phone numbers, ignoring blank entries
fn parse_number_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_recipients(recipients: &[String]) -> Result<(), ValidationError> {
    for recipient in recipients {
        if !E164_RE.is_match(recipient) {
            return Err(ValidationError::new("invalid_recipient_number"));
        }
    }
    Ok(())
}
