use std::time::Duration;

use crate::error::AppError;

/// Backoff between whole-cycle retries.
///
/// Delay schedule: 5s, 30s, 2min, then `max_delay`. Retries never stop; the
/// schedule only bounds how hard a failing source is hit.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_secs(300),
        }
    }
}

impl RetryConfig {
    /// Delay before retrying after `attempt` consecutive failures (1-indexed).
    ///
    /// - Attempt 1: 5 seconds
    /// - Attempt 2: 30 seconds
    /// - Attempt 3: 2 minutes
    /// - Attempt 4+: `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = match attempt {
            0 | 1 => Duration::from_secs(5),
            2 => Duration::from_secs(30),
            3 => Duration::from_secs(120),
            _ => self.max_delay,
        };
        std::cmp::min(delay, self.max_delay)
    }

    /// Delay after a failure; non-retryable errors wait the full `max_delay`.
    pub fn delay_after(&self, attempt: u32, error: &AppError) -> Duration {
        if error.is_retryable() {
            self.delay_for_attempt(attempt)
        } else {
            self.max_delay
        }
    }
}

/// Configuration for one platform's polling driver.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub retry_config: RetryConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            retry_config: RetryConfig::default(),
        }
    }
}

impl PollerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `JOBWATCH_POLL_INTERVAL_SECS` (optional, defaults to 300)
    /// - `JOBWATCH_MAX_RETRY_DELAY_SECS` (optional, defaults to 300)
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let poll_interval = secs_from_env("JOBWATCH_POLL_INTERVAL_SECS")?
            .unwrap_or(defaults.poll_interval);
        let max_delay = secs_from_env("JOBWATCH_MAX_RETRY_DELAY_SECS")?
            .unwrap_or(defaults.retry_config.max_delay);

        Ok(Self {
            poll_interval,
            retry_config: RetryConfig { max_delay },
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_retry_delay(mut self, max_delay: Duration) -> Self {
        self.retry_config.max_delay = max_delay;
        self
    }
}

fn secs_from_env(name: &str) -> Result<Option<Duration>, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid {name} '{raw}': must be a positive integer"
                ))
            })?;
            if secs == 0 {
                return Err(AppError::ConfigError(format!("{name} must be at least 1")));
            }
            Ok(Some(Duration::from_secs(secs)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(30));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(120));
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(300));
        assert_eq!(config.delay_for_attempt(40), Duration::from_secs(300));
    }

    #[test]
    fn test_retry_delay_capped_by_max() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(10));
    }

    #[test]
    fn test_non_retryable_errors_wait_the_cap() {
        let config = RetryConfig::default();
        let transient = AppError::SourceUnavailable("down".into());
        let fatal = AppError::ConfigError("missing token".into());
        assert_eq!(config.delay_after(1, &transient), Duration::from_secs(5));
        assert_eq!(config.delay_after(1, &fatal), Duration::from_secs(300));
    }

    #[test]
    fn test_poller_config_builder() {
        let config = PollerConfig::default()
            .with_poll_interval(Duration::from_secs(70))
            .with_max_retry_delay(Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(70));
        assert_eq!(config.retry_config.max_delay, Duration::from_secs(60));
    }
}
