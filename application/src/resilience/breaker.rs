//! Circuit breaker shared by every caller of one dependency.
//!
//! - Closed: calls pass through and their outcomes fill a count-based window
//! - Open: calls are rejected until the cooldown elapses
//! - HalfOpen: exactly one trial call is admitted, its outcome decides the next state
//!
//! The handle is cheap to clone; all clones observe the same state. The state
//! lives behind a `std::sync::Mutex` which is never held across an `.await`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Percentage (0..=100) of failed calls in the window at which the circuit opens.
    pub failure_rate_threshold: f64,
    /// Number of most recent calls kept in the rolling window.
    pub window_size: usize,
    /// Calls that must be recorded before the failure rate is evaluated.
    pub minimum_calls: usize,
    /// How long the circuit stays open before admitting a trial call.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            window_size: 10,
            minimum_calls: 5,
            cooldown: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub buffered_calls: usize,
    pub failed_calls: usize,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { until: Instant },
    HalfOpen { trial_in_flight: bool },
}

#[derive(Debug)]
struct BreakerState {
    phase: Phase,
    /// `true` marks a failed call.
    window: VecDeque<bool>,
    /// Bumped on every transition so outcomes of permits issued before it are dropped.
    generation: u64,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            phase: Phase::Closed,
            window: VecDeque::new(),
            generation: 0,
        }
    }

    fn transition(&mut self, phase: Phase) {
        self.phase = phase;
        self.window.clear();
        self.generation += 1;
    }

    fn failed_calls(&self) -> usize {
        self.window.iter().filter(|failed| **failed).count()
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    name: Arc<str>,
    config: Arc<CircuitBreakerConfig>,
    state: Arc<Mutex<BreakerState>>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            config: Arc::new(config),
            state: Arc::new(Mutex::new(BreakerState::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state. An open circuit whose cooldown already elapsed is still
    /// reported as open until a caller asks for a permit.
    pub fn state(&self) -> CircuitState {
        match self.lock().phase {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let state = self.lock();
        let current = match state.phase {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        };
        CircuitSnapshot {
            state: current,
            buffered_calls: state.window.len(),
            failed_calls: state.failed_calls(),
        }
    }

    /// Forces the circuit back to closed with an empty window.
    pub fn reset(&self) {
        self.lock().transition(Phase::Closed);
        tracing::info!(breaker = %self.name, "circuit reset to closed");
    }

    /// Asks to place one call. `None` means the call must not be made.
    pub fn try_acquire(&self) -> Option<Permit> {
        let mut state = self.lock();
        let trial = match state.phase {
            Phase::Closed => false,
            Phase::Open { until } if Instant::now() < until => return None,
            Phase::Open { .. } => {
                state.transition(Phase::HalfOpen {
                    trial_in_flight: true,
                });
                tracing::info!(breaker = %self.name, "cooldown elapsed, circuit half-open");
                true
            }
            Phase::HalfOpen {
                trial_in_flight: true,
            } => return None,
            Phase::HalfOpen {
                trial_in_flight: false,
            } => {
                state.phase = Phase::HalfOpen {
                    trial_in_flight: true,
                };
                true
            }
        };
        Some(Permit {
            breaker: self.clone(),
            generation: state.generation,
            trial,
            resolved: false,
        })
    }

    fn record(&self, generation: u64, trial: bool, failed: bool) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        if trial {
            if failed {
                let until = Instant::now() + self.config.cooldown;
                state.transition(Phase::Open { until });
                tracing::warn!(breaker = %self.name, "trial call failed, circuit open again");
            } else {
                state.transition(Phase::Closed);
                tracing::info!(breaker = %self.name, "trial call succeeded, circuit closed");
            }
            return;
        }

        state.window.push_back(failed);
        while state.window.len() > self.config.window_size.max(1) {
            state.window.pop_front();
        }
        let buffered = state.window.len();
        if !failed || buffered < self.config.minimum_calls.clamp(1, self.config.window_size.max(1))
        {
            return;
        }
        let rate = state.failed_calls() as f64 * 100.0 / buffered as f64;
        if rate >= self.config.failure_rate_threshold {
            let until = Instant::now() + self.config.cooldown;
            state.transition(Phase::Open { until });
            tracing::warn!(
                breaker = %self.name,
                failure_rate = rate,
                cooldown = ?self.config.cooldown,
                "failure rate over threshold, circuit open"
            );
        }
    }

    fn release(&self, generation: u64, trial: bool) {
        if !trial {
            return;
        }
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        if matches!(state.phase, Phase::HalfOpen { .. }) {
            state.phase = Phase::HalfOpen {
                trial_in_flight: false,
            };
        }
    }
}

/// Admission for one call. Consuming it with [`Permit::success`] or
/// [`Permit::failure`] records the outcome. Dropping it unresolved records
/// nothing and hands a half-open trial slot back.
#[derive(Debug)]
pub struct Permit {
    breaker: CircuitBreaker,
    generation: u64,
    trial: bool,
    resolved: bool,
}

impl Permit {
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn success(mut self) {
        self.resolved = true;
        self.breaker.record(self.generation, self.trial, false);
    }

    pub fn failure(mut self) {
        self.resolved = true;
        self.breaker.record(self.generation, self.trial, true);
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        if !self.resolved {
            self.breaker.release(self.generation, self.trial);
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_rate_threshold: 50.0,
                window_size: 4,
                minimum_calls: 4,
                cooldown: Duration::from_secs(5),
            },
        )
    }

    fn trip(breaker: &CircuitBreaker) {
        for _ in 0..4 {
            breaker.try_acquire().expect("closed").failure();
        }
    }

    #[tokio::test]
    async fn stays_closed_below_minimum_calls() {
        let breaker = breaker();
        for _ in 0..3 {
            breaker.try_acquire().expect("closed").failure();
        }
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().failed_calls, 3);
    }

    #[tokio::test]
    async fn opens_when_failure_rate_reaches_threshold() {
        let breaker = breaker();
        breaker.try_acquire().expect("closed").success();
        breaker.try_acquire().expect("closed").success();
        breaker.try_acquire().expect("closed").failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.try_acquire().expect("closed").failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.try_acquire().is_none());
    }

    #[tokio::test]
    async fn window_forgets_old_failures() {
        let breaker = breaker();
        breaker.try_acquire().expect("closed").failure();
        breaker.try_acquire().expect("closed").failure();
        for _ in 0..4 {
            breaker.try_acquire().expect("closed").success();
        }
        breaker.try_acquire().expect("closed").failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().buffered_calls, 4);
        assert_eq!(breaker.snapshot().failed_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_admits_single_trial() {
        let breaker = breaker();
        trip(&breaker);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(breaker.try_acquire().is_none());

        tokio::time::advance(Duration::from_secs(1)).await;
        let trial = breaker.try_acquire().expect("trial");
        assert!(trial.is_trial());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(breaker.try_acquire().is_none());

        trial.success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_trial_reopens() {
        let breaker = breaker();
        trip(&breaker);
        tokio::time::advance(Duration::from_secs(5)).await;

        breaker.try_acquire().expect("trial").failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.try_acquire().is_none());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(breaker.try_acquire().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_trial_hands_slot_back() {
        let breaker = breaker();
        trip(&breaker);
        tokio::time::advance(Duration::from_secs(5)).await;

        let trial = breaker.try_acquire().expect("trial");
        drop(trial);
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        let trial = breaker.try_acquire().expect("slot was released");
        assert!(trial.is_trial());
        drop(trial);
        assert!(breaker.try_acquire().is_some());
    }

    #[tokio::test]
    async fn stale_permit_does_not_touch_new_window() {
        let breaker = breaker();
        let stale = breaker.try_acquire().expect("closed");
        trip(&breaker);
        breaker.reset();
        stale.failure();
        assert_eq!(breaker.snapshot().buffered_calls, 0);
    }

    #[tokio::test]
    async fn reset_closes_open_circuit() {
        let breaker = breaker();
        trip(&breaker);
        assert_eq!(breaker.state(), CircuitState::Open);
        breaker.reset();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire().is_some());
    }
}
