use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, cookie::Jar};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::watch_types::WatchError;

/// Manages the logged-in HTTP session against the Ikon account site.
/// Replaces the browser-driven login of earlier script iterations with a
/// cookie-jar client that re-authenticates when the session goes stale.
pub struct SessionManager {
    client: Client,
    session_state: Arc<RwLock<SessionState>>,
    config: SessionConfig,
}

#[derive(Debug, Clone)]
struct SessionState {
    /// When the session was last validated
    last_validated: Option<DateTime<Utc>>,

    /// Whether the current session is valid
    is_valid: bool,

    /// User agent presented on session requests
    user_agent: String,

    /// Number of consecutive failures
    failure_count: u32,
}

/// Configuration for the account session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Login email for the account
    pub login_email: String,

    /// Login password for the account
    pub login_password: String,

    /// How often to revalidate the session (default: 30 minutes)
    pub validation_interval: Duration,

    /// Maximum failures before recreating the session (default: 3)
    pub max_failures: u32,

    /// Base URL of the account site
    pub base_url: String,

    /// User agents to rotate through on repeated failures
    pub user_agents: Vec<String>,
}

impl SessionConfig {
    /// Session config with the account credentials and default intervals
    pub fn new(login_email: impl Into<String>, login_password: impl Into<String>) -> Self {
        Self {
            login_email: login_email.into(),
            login_password: login_password.into(),
            validation_interval: Duration::from_secs(30 * 60),
            max_failures: 3,
            base_url: "https://account.ikonpass.com".to_string(),
            user_agents: vec![
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
            ],
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(config: SessionConfig) -> Result<Self, WatchError> {
        // Cookie jar carries the session across cycles
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| WatchError::Api(format!("Failed to create session client: {}", e)))?;

        let initial_state = SessionState {
            last_validated: None,
            is_valid: false,
            user_agent: config.user_agents[0].clone(),
            failure_count: 0,
        };

        Ok(Self {
            client,
            session_state: Arc::new(RwLock::new(initial_state)),
            config,
        })
    }

    /// Ensure we are logged in.
    ///
    /// A session that was never established, went invalid, or failed too
    /// often is re-authenticated outright; one that merely aged past the
    /// validation interval is revalidated with a lightweight request first
    /// and only logged in again if that check fails.
    pub async fn ensure_valid_session(&self) -> Result<(), WatchError> {
        enum Action {
            Nothing,
            Revalidate,
            LogIn,
        }

        let action = {
            let state = self.session_state.read().await;

            match state.last_validated {
                None => Action::LogIn,
                Some(last) => {
                    if !state.is_valid || state.failure_count >= self.config.max_failures {
                        Action::LogIn
                    } else {
                        let interval = chrono::Duration::from_std(self.config.validation_interval)
                            .map_err(|e| {
                                WatchError::Config(format!("Invalid validation interval: {}", e))
                            })?;

                        if Utc::now() - last > interval {
                            Action::Revalidate
                        } else {
                            Action::Nothing
                        }
                    }
                }
            }
        };

        match action {
            Action::Nothing => Ok(()),
            Action::LogIn => self.log_in().await,
            Action::Revalidate => {
                if self.validate_session().await? {
                    Ok(())
                } else {
                    self.log_in().await
                }
            }
        }
    }

    /// Log in against the account API, establishing session cookies
    async fn log_in(&self) -> Result<(), WatchError> {
        info!("Logging in to {}", self.config.base_url);

        // Rotate user agents as failures accumulate
        let user_agent = {
            let state = self.session_state.read().await;
            let index = (state.failure_count as usize) % self.config.user_agents.len();
            self.config.user_agents[index].clone()
        };

        debug!("Using user agent: {}", user_agent);

        let login = LoginRequest {
            email: &self.config.login_email,
            password: &self.config.login_password,
        };

        let response = self
            .client
            .post(format!("{}/api/v2/login", self.config.base_url))
            .header("User-Agent", &user_agent)
            .header("Accept", "application/json")
            .json(&login)
            .send()
            .await
            .map_err(|e| WatchError::Network(format!("Login request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();

            {
                let mut state = self.session_state.write().await;
                state.failure_count += 1;
                state.is_valid = false;
            }

            return match status.as_u16() {
                401 | 403 => Err(WatchError::AuthenticationFailed),
                _ => Err(WatchError::Api(format!(
                    "Login failed with status {}",
                    status
                ))),
            };
        }

        {
            let mut state = self.session_state.write().await;
            state.last_validated = Some(Utc::now());
            state.is_valid = true;
            state.user_agent = user_agent;
            state.failure_count = 0;
        }

        info!("Login successful");
        Ok(())
    }

    /// Validate the current session with a lightweight account request
    pub async fn validate_session(&self) -> Result<bool, WatchError> {
        debug!("Validating account session");

        let user_agent = {
            let state = self.session_state.read().await;
            state.user_agent.clone()
        };

        let response = self
            .client
            .get(format!("{}/api/v2/me", self.config.base_url))
            .header("User-Agent", user_agent)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| WatchError::Network(format!("Session validation failed: {}", e)))?;

        let is_valid = response.status().is_success();

        {
            let mut state = self.session_state.write().await;
            state.last_validated = Some(Utc::now());
            state.is_valid = is_valid;

            if !is_valid {
                state.failure_count += 1;
                warn!(
                    "Session validation failed, failure count: {}",
                    state.failure_count
                );
            } else {
                state.failure_count = 0;
                debug!("Session validation successful");
            }
        }

        Ok(is_valid)
    }

    /// Get the HTTP client carrying the session cookies
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get current session statistics
    pub async fn session_stats(&self) -> SessionStats {
        let state = self.session_state.read().await;

        SessionStats {
            is_valid: state.is_valid,
            last_validated: state.last_validated,
            failure_count: state.failure_count,
            user_agent: state.user_agent.clone(),
        }
    }

    /// Mark the session stale so the next cycle logs in again
    pub async fn invalidate(&self) {
        let mut state = self.session_state.write().await;
        state.is_valid = false;
    }
}

/// Statistics about the current session
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Whether the session is currently considered valid
    pub is_valid: bool,
    /// When the session was last validated
    pub last_validated: Option<DateTime<Utc>>,
    /// Consecutive failure count
    pub failure_count: u32,
    /// User agent currently in use
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_manager_starts_unauthenticated() {
        let config = SessionConfig::new("skier@example.com", "hunter2");
        let manager = SessionManager::new(config).unwrap();

        let stats = manager.session_stats().await;

        assert!(!stats.is_valid);
        assert!(stats.last_validated.is_none());
        assert_eq!(stats.failure_count, 0);
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::new("skier@example.com", "hunter2");

        assert_eq!(config.base_url, "https://account.ikonpass.com");
        assert_eq!(config.max_failures, 3);
        assert!(!config.user_agents.is_empty());
    }
}
