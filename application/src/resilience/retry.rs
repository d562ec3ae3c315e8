use std::time::Duration;

/// Delay schedule between two attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
                let secs = initial.as_secs_f64() * multiplier.powi(exponent);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs.max(0.0))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Exponential {
                initial: Duration::from_millis(200),
                multiplier: 2.0,
                max: Duration::from_secs(2),
            },
        }
    }
}

impl RetryPolicy {
    pub fn budget(&self) -> RetryBudget<'_> {
        RetryBudget {
            policy: self,
            attempt: 1,
        }
    }
}

/// Attempt bookkeeping of one logical call.
#[derive(Debug)]
pub struct RetryBudget<'a> {
    policy: &'a RetryPolicy,
    attempt: u32,
}

impl RetryBudget<'_> {
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.policy.max_attempts.max(1)
    }

    /// Moves on to the next attempt and returns how long to wait before it.
    pub fn advance(&mut self) -> Duration {
        let delay = self.policy.backoff.delay(self.attempt);
        self.attempt += 1;
        delay
    }
}
