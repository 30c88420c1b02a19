use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

const RETRIES: u8 = 2;
const INITIAL_DELAY_MS: f64 = 1000.0;
const BACKOFF: f64 = 2.0;
const MAX_DELAY_MS: f64 = 120_000.0;

/// Statuses worth another attempt.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Statuses whose `Retry-After` header is honored.
const RETRY_AFTER_STATUSES: [u16; 2] = [429, 503];

/// Bounded exponential backoff applied to a single logical request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub retries: u8,
    pub initial_delay: Duration,
    pub backoff: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: RETRIES,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS as u64),
            backoff: BACKOFF,
            max_delay: Duration::from_millis(MAX_DELAY_MS as u64),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries as u32 + 1
    }

    /// Delay before retry number `retry` (zero based).
    pub fn delay(&self, retry: u32) -> Duration {
        let mut delay_ms = self.initial_delay.as_millis() as f64;
        for _ in 0..retry {
            delay_ms *= self.backoff;
            if delay_ms >= self.max_delay.as_millis() as f64 {
                break;
            }
        }
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }

    /// Same as [`RetryPolicy::delay`], unless the server asked for a specific wait.
    pub fn delay_with_hint(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(wait) => wait.min(self.max_delay),
            None => self.delay(retry),
        }
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    RETRY_STATUSES.contains(&status)
}

/// Reads a delta-seconds `Retry-After`. HTTP-date values are ignored.
pub fn retry_after(status: u16, headers: &HeaderMap) -> Option<Duration> {
    if !RETRY_AFTER_STATUSES.contains(&status) {
        return None;
    }

    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
