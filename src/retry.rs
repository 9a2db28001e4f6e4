use crate::types::{MonitorError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded retry with exponential backoff, applied only at external
/// collaborator call sites (fetch, model). Business logic never retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
        }
    }

    /// Run `op` up to `max_attempts` times, sleeping between failures.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            max_interval: self.base_delay * 32,
            multiplier: self.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} attempt {}/{} failed: {}", what, attempt, self.max_attempts, e);
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        if let Some(delay) = backoff.next_backoff() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MonitorError::General(format!("{} failed with no attempts", what))))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), 2.0)
    }
}
