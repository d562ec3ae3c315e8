use std::time::Duration;

use application::resilience::{Backoff, CircuitBreakerConfig, ResilienceConfig, RetryPolicy};
use driver::env_or;
use error_stack::Report;
use kernel::KernelError;

fn millis(key: &str, default: u64) -> error_stack::Result<Duration, KernelError> {
    env_or(key, default).map(Duration::from_millis)
}

fn backoff(
    kind: &str,
    base: Duration,
    multiplier: f64,
    max: Duration,
) -> error_stack::Result<Backoff, KernelError> {
    match kind.to_ascii_lowercase().as_str() {
        "fixed" => Ok(Backoff::Fixed(base)),
        "exponential" if multiplier >= 1.0 => Ok(Backoff::Exponential {
            initial: base,
            multiplier,
            max,
        }),
        "exponential" => Err(Report::new(KernelError::Internal)
            .attach_printable(format!("Retry multiplier must be at least 1.0, got {multiplier}"))),
        other => Err(Report::new(KernelError::Internal)
            .attach_printable(format!("Unknown retry backoff {other:?}"))),
    }
}

/// Resilience settings of the stock lookup, read from `STOCK_*` variables.
pub fn resilience_from_env() -> error_stack::Result<ResilienceConfig, KernelError> {
    let max_attempts = env_or("STOCK_RETRY_MAX_ATTEMPTS", 3u32)?;
    if max_attempts == 0 {
        return Err(Report::new(KernelError::Internal)
            .attach_printable("STOCK_RETRY_MAX_ATTEMPTS must be at least 1"));
    }
    let backoff = backoff(
        &env_or("STOCK_RETRY_BACKOFF", "exponential".to_string())?,
        millis("STOCK_RETRY_BASE_DELAY_MS", 200)?,
        env_or("STOCK_RETRY_MULTIPLIER", 2.0)?,
        millis("STOCK_RETRY_MAX_DELAY_MS", 2000)?,
    )?;

    let failure_rate_threshold = env_or("STOCK_BREAKER_FAILURE_RATE", 50.0)?;
    if !(0.0..=100.0).contains(&failure_rate_threshold) {
        return Err(Report::new(KernelError::Internal).attach_printable(format!(
            "STOCK_BREAKER_FAILURE_RATE must be within 0..=100, got {failure_rate_threshold}"
        )));
    }
    let window_size = env_or("STOCK_BREAKER_WINDOW_SIZE", 10usize)?;
    let minimum_calls = env_or("STOCK_BREAKER_MINIMUM_CALLS", 5usize)?;
    if window_size == 0 || minimum_calls == 0 {
        return Err(Report::new(KernelError::Internal)
            .attach_printable("Breaker window size and minimum calls must be positive"));
    }

    Ok(ResilienceConfig {
        retry: RetryPolicy {
            max_attempts,
            backoff,
        },
        breaker: CircuitBreakerConfig {
            failure_rate_threshold,
            window_size,
            minimum_calls,
            cooldown: millis("STOCK_BREAKER_COOLDOWN_MS", 10_000)?,
        },
        call_timeout: millis("STOCK_CALL_TIMEOUT_MS", 2000)?,
    })
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use application::resilience::Backoff;
    use kernel::KernelError;

    use super::backoff;

    #[test]
    fn backoff_kinds() {
        let base = Duration::from_millis(100);
        let max = Duration::from_secs(1);
        assert!(matches!(backoff("fixed", base, 2.0, max), Ok(Backoff::Fixed(d)) if d == base));
        assert!(matches!(
            backoff("Exponential", base, 3.0, max),
            Ok(Backoff::Exponential { multiplier, .. }) if multiplier == 3.0
        ));
    }

    #[test]
    fn backoff_rejects_garbage() {
        let base = Duration::from_millis(100);
        let report = backoff("linear", base, 2.0, base).unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Internal));
        assert!(backoff("exponential", base, 0.5, base).is_err());
    }
}
