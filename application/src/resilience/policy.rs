use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use error_stack::Report;
use kernel::interface::client::TransportError;

use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryPolicy};

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retry: RetryPolicy,
    pub breaker: CircuitBreakerConfig,
    /// Upper bound for a single attempt.
    pub call_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            breaker: CircuitBreakerConfig::default(),
            call_timeout: Duration::from_secs(2),
        }
    }
}

/// Why an operation ended up in its fallback.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FallbackCause {
    CircuitOpen,
    Rejected(TransportError),
    RetriesExhausted { attempts: u32, last: TransportError },
}

impl Display for FallbackCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackCause::CircuitOpen => write!(f, "circuit open"),
            FallbackCause::Rejected(error) => write!(f, "rejected: {error}"),
            FallbackCause::RetriesExhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts: {last}")
            }
        }
    }
}

/// Breaker gate, bounded retries and per-attempt timeout around a remote call.
#[derive(Debug, Clone)]
pub struct ResiliencePolicy {
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl ResiliencePolicy {
    pub fn new(breaker: CircuitBreaker, retry: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            breaker,
            retry,
            call_timeout,
        }
    }

    pub fn from_config(name: impl Into<String>, config: ResilienceConfig) -> Self {
        let ResilienceConfig {
            retry,
            breaker,
            call_timeout,
        } = config;
        Self::new(CircuitBreaker::new(name, breaker), retry, call_timeout)
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// exhausts its attempts or is refused by the breaker. Every way of not
    /// succeeding ends in `fallback`.
    ///
    /// The breaker is asked before each attempt. Every failed attempt counts
    /// against it, including non-retryable errors, which only skip the retry
    /// budget. Successes count for it. If the returned future is dropped
    /// mid-attempt the attempt counts as neither.
    pub async fn execute<T, F, Fut, Fb>(&self, operation: F, fallback: Fb) -> T
    where
        F: Fn() -> Fut,
        Fut: Future<Output = error_stack::Result<T, TransportError>>,
        Fb: FnOnce(FallbackCause) -> T,
    {
        let mut budget = self.retry.budget();
        loop {
            let Some(permit) = self.breaker.try_acquire() else {
                return fallback(FallbackCause::CircuitOpen);
            };

            let outcome = match tokio::time::timeout(self.call_timeout, operation()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(Report::new(TransportError::Timeout)
                    .attach_printable(format!("No response within {:?}", self.call_timeout))),
            };

            let report = match outcome {
                Ok(value) => {
                    permit.success();
                    return value;
                }
                Err(report) => report,
            };

            let error = *report.current_context();
            permit.failure();
            if !error.is_retryable() {
                tracing::debug!(breaker = self.breaker.name(), "{report:?}");
                return fallback(FallbackCause::Rejected(error));
            }

            if budget.is_exhausted() {
                tracing::debug!(breaker = self.breaker.name(), "{report:?}");
                return fallback(FallbackCause::RetriesExhausted {
                    attempts: budget.attempt(),
                    last: error,
                });
            }

            if self.breaker.state() == CircuitState::Open {
                tracing::debug!(breaker = self.breaker.name(), "{report:?}");
                return fallback(FallbackCause::CircuitOpen);
            }

            let delay = budget.advance();
            tracing::debug!(
                breaker = self.breaker.name(),
                attempt = budget.attempt(),
                ?delay,
                "{error}, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use error_stack::Report;
    use kernel::interface::client::TransportError;

    use crate::resilience::{
        Backoff, CircuitBreaker, CircuitBreakerConfig, CircuitState, FallbackCause,
        ResiliencePolicy, RetryPolicy,
    };

    type Outcome = Result<(), FallbackCause>;

    fn policy(max_attempts: u32) -> ResiliencePolicy {
        ResiliencePolicy::new(
            CircuitBreaker::new(
                "test",
                CircuitBreakerConfig {
                    failure_rate_threshold: 100.0,
                    window_size: 10,
                    minimum_calls: 10,
                    cooldown: Duration::from_secs(30),
                },
            ),
            RetryPolicy {
                max_attempts,
                backoff: Backoff::Fixed(Duration::from_millis(100)),
            },
            Duration::from_secs(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_within_budget() {
        let policy = policy(3);
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = policy
            .execute(
                move || async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Report::new(TransportError::Status(503)))
                    } else {
                        Ok("stock")
                    }
                },
                |_| "fallback",
            )
            .await;
        assert_eq!(result, "stock");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(policy.breaker().snapshot().failed_calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_falls_back() {
        let policy = policy(3);
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let cause = policy
            .execute(
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Outcome, _>(Report::new(TransportError::Connection))
                },
                |cause| Err(cause),
            )
            .await;
        assert_eq!(
            cause,
            Err(FallbackCause::RetriesExhausted {
                attempts: 3,
                last: TransportError::Connection
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_fails_fast() {
        let policy = policy(5);
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let cause = policy
            .execute(
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Outcome, _>(Report::new(TransportError::Status(404)))
                },
                |cause| Err(cause),
            )
            .await;
        assert_eq!(cause, Err(FallbackCause::Rejected(TransportError::Status(404))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snapshot = policy.breaker().snapshot();
        assert_eq!(snapshot.buffered_calls, 1);
        assert_eq!(snapshot.failed_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_counts_as_timeout() {
        let policy = policy(2);
        let cause = policy
            .execute(
                || async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok::<Outcome, Report<TransportError>>(Ok(()))
                },
                |cause| Err(cause),
            )
            .await;
        assert_eq!(
            cause,
            Err(FallbackCause::RetriesExhausted {
                attempts: 2,
                last: TransportError::Timeout
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn open_breaker_stops_retrying() {
        let policy = ResiliencePolicy::new(
            CircuitBreaker::new(
                "test",
                CircuitBreakerConfig {
                    failure_rate_threshold: 50.0,
                    window_size: 2,
                    minimum_calls: 2,
                    cooldown: Duration::from_secs(30),
                },
            ),
            RetryPolicy {
                max_attempts: 5,
                backoff: Backoff::Fixed(Duration::from_secs(10)),
            },
            Duration::from_secs(1),
        );
        let started = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let cause = policy
            .execute(
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Outcome, _>(Report::new(TransportError::Timeout))
                },
                |cause| Err(cause),
            )
            .await;
        assert_eq!(cause, Err(FallbackCause::CircuitOpen));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(policy.breaker().state(), CircuitState::Open);
        // one backoff between the two attempts, none after the circuit opened
        assert!(started.elapsed() < Duration::from_secs(20));
    }
}
