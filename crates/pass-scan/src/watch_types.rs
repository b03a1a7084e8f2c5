/// Custom error type for watch operations
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    /// Payload could not be decoded or lacks the top-level `data` key.
    /// Recoverable: the loop logs it and retries after the normal delay.
    #[error("Malformed availability payload: {0}")]
    MalformedPayload(String),

    /// API error
    #[error("API error: {0}")]
    Api(String),

    /// Rate limited by the reservation API
    #[error("Rate limited by the reservation API")]
    RateLimited,

    /// Authentication failed with the reservation site
    #[error("Authentication failed with the reservation site")]
    AuthenticationFailed,

    /// Availability endpoint not found
    #[error("Availability endpoint not found")]
    NotFound,

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
