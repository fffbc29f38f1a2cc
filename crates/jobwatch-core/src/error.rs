use thiserror::Error;

/// Application-wide error types for jobwatch.
#[derive(Error, Debug)]
pub enum AppError {
    /// The source could not be reached or navigated.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A login or security-challenge step is required before the source can be used.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Login or the security challenge was rejected.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// One job's detail page or record was unreachable or malformed.
    #[error("Failed to fetch job detail for {locator}: {reason}")]
    DetailFetchFailed { locator: String, reason: String },

    /// Filter-store lookup miss.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store read or write failed.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// A platform string that does not name a supported source.
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// The chat channel refused a message.
    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    /// Missing or invalid process configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl AppError {
    /// Returns true if this error is transient and worth retrying soon.
    ///
    /// The poller retries every failed cycle; this only decides how long it
    /// waits before doing so.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::SourceUnavailable(_)
            | AppError::AuthRequired(_)
            | AppError::DetailFetchFailed { .. }
            | AppError::PersistenceError(_)
            | AppError::NotificationFailed(_)
            | AppError::Timeout(_)
            | AppError::RateLimitExceeded => true,
            AppError::AuthFailed(_)
            | AppError::NotFound(_)
            | AppError::UnknownPlatform(_)
            | AppError::ConfigError(_)
            | AppError::SerializationError(_) => false,
        }
    }

    /// Short machine-readable name, used as a log field and in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::SourceUnavailable(_) => "source_unavailable",
            AppError::AuthRequired(_) => "auth_required",
            AppError::AuthFailed(_) => "auth_failed",
            AppError::DetailFetchFailed { .. } => "detail_fetch_failed",
            AppError::NotFound(_) => "not_found",
            AppError::PersistenceError(_) => "persistence_error",
            AppError::UnknownPlatform(_) => "unknown_platform",
            AppError::NotificationFailed(_) => "notification_failed",
            AppError::ConfigError(_) => "config_error",
            AppError::SerializationError(_) => "serialization_error",
            AppError::Timeout(_) => "timeout",
            AppError::RateLimitExceeded => "rate_limit_exceeded",
        }
    }
}
