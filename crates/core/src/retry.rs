//! Retry policy with a fixed delay
//!
//! The delay never grows between attempts. A policy without an attempt
//! limit retries forever, which is what the logcat reconnect loop uses.

use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Fixed delay between attempts
    pub delay: Duration,
    /// Maximum number of attempts; `None` retries indefinitely
    pub max_attempts: Option<u32>,
}

impl RetryConfig {
    /// Retry without limit, waiting `delay` between attempts
    pub fn forever(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Retry at most `max_attempts` times in total
    pub fn limited(max_attempts: u32, delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }

    /// Delay before the given attempt (0-based); the first attempt is immediate
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            self.delay
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made
    pub fn should_retry(&self, attempts: u32) -> bool {
        match self.max_attempts {
            None => true,
            Some(max) => attempts < max,
        }
    }
}
