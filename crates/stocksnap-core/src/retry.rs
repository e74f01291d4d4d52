//! Backoff policy for the startup warm-up refresh.

use std::time::Duration;

/// Delay schedule between warm-up attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`. With `jitter` the result is
    /// scaled by a random factor in `[0.5, 1.5]` so restarted replicas do not
    /// hit the upstream in lockstep.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(15),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay after the 0-based `attempt` failed.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let uncapped = base.as_secs_f64() * factor.powi(exponent);
                let capped = if uncapped.is_finite() {
                    uncapped.min(max.as_secs_f64())
                } else {
                    max.as_secs_f64()
                };

                let scale = if jitter { 0.5 + fastrand::f64() } else { 1.0 };
                Duration::from_secs_f64((capped * scale).max(0.0))
            }
        }
    }
}

/// Bounded retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// Single attempt, no waiting.
    pub fn once() -> Self {
        Self::fixed(Duration::ZERO, 0)
    }

    pub const fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
