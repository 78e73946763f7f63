use std::time::Duration;

use crate::config::LoaderConfig;

/// Why an attempt failed; selects the backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Error,
}

/// Bounded retries with a fixed backoff per failure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// How long one attempt may wait for the surface to signal.
    pub timeout: Duration,
    pub timeout_backoff: Duration,
    pub error_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: Duration::from_millis(config.timeout_ms),
            timeout_backoff: Duration::from_millis(config.timeout_backoff_ms),
            error_backoff: Duration::from_millis(config.error_backoff_ms),
        }
    }

    /// Delay before retrying after `retries` retries have already run, or
    /// `None` once the budget is spent.
    pub fn next_delay(&self, kind: FailureKind, retries: u32) -> Option<Duration> {
        if retries >= self.max_retries {
            return None;
        }
        Some(match kind {
            FailureKind::Timeout => self.timeout_backoff,
            FailureKind::Error => self.error_backoff,
        })
    }
}
