//! Circuit breaker in front of the rate-limited stats API.
//!
//! A run of consecutive transport failures opens the circuit. While open,
//! calls are refused with `FetchFailure::CircuitOpen` without touching the
//! network, so the stats path drops straight to its fallbacks. After the
//! recovery timeout the circuit lets calls through again as probes; enough
//! probe successes close it, a probe failure opens it again.
//!
//! Time comes from the engine's [`Clock`], the same one the cache uses.

use crate::cache::Clock;
use crate::error::FetchFailure;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive transport failures that open the circuit
    pub failure_threshold: u32,
    /// Time spent open before probing again
    pub recovery_timeout: Duration,
    /// Probe successes needed to close
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// Circuit position, carrying the bookkeeping each position needs.
#[derive(Debug, Clone, Copy)]
enum Circuit {
    Closed { failures: u32 },
    Open { since: Instant },
    Probing { successes: u32 },
}

impl Circuit {
    fn state(&self) -> BreakerState {
        match self {
            Circuit::Closed { .. } => BreakerState::Closed,
            Circuit::Open { .. } => BreakerState::Open,
            Circuit::Probing { .. } => BreakerState::HalfOpen,
        }
    }
}

pub struct UpstreamBreaker {
    name: String,
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    circuit: Mutex<Circuit>,
}

impl std::fmt::Debug for UpstreamBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamBreaker")
            .field("name", &self.name)
            .field("circuit", &*self.circuit.lock())
            .finish()
    }
}

impl UpstreamBreaker {
    pub fn new(name: &str, config: BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.to_string(),
            config,
            clock,
            circuit: Mutex::new(Circuit::Closed { failures: 0 }),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.circuit.lock().state()
    }

    /// Ok when a call may go out now. An open circuit past its recovery
    /// timeout starts probing.
    pub fn admit(&self) -> Result<(), FetchFailure> {
        let mut circuit = self.circuit.lock();
        if let Circuit::Open { since } = *circuit {
            let open_for = self.clock.now().saturating_duration_since(since);
            if open_for < self.config.recovery_timeout {
                return Err(FetchFailure::CircuitOpen {
                    name: self.name.clone(),
                });
            }
            info!("Upstream breaker '{}' probing after {:?} open", self.name, open_for);
            *circuit = Circuit::Probing { successes: 0 };
        }
        Ok(())
    }

    /// Feed back the outcome of an admitted call. Only transport failures
    /// count against the upstream; a well-formed "no" is a healthy answer.
    pub fn observe<T>(&self, outcome: &Result<T, FetchFailure>) {
        let failed = matches!(outcome, Err(err) if err.is_transport());
        let mut circuit = self.circuit.lock();

        *circuit = match (*circuit, failed) {
            (Circuit::Closed { .. }, false) => Circuit::Closed { failures: 0 },
            (Circuit::Closed { failures }, true) => {
                let failures = failures.saturating_add(1);
                if failures >= self.config.failure_threshold {
                    warn!(
                        "Upstream breaker '{}' opened after {} consecutive failures",
                        self.name, failures
                    );
                    Circuit::Open {
                        since: self.clock.now(),
                    }
                } else {
                    Circuit::Closed { failures }
                }
            }
            (Circuit::Probing { successes }, false) => {
                let successes = successes.saturating_add(1);
                if successes >= self.config.success_threshold {
                    info!("Upstream breaker '{}' closed", self.name);
                    Circuit::Closed { failures: 0 }
                } else {
                    Circuit::Probing { successes }
                }
            }
            (Circuit::Probing { .. }, true) => {
                warn!("Upstream breaker '{}' probe failed, reopening", self.name);
                Circuit::Open {
                    since: self.clock.now(),
                }
            }
            // A call admitted before the circuit opened; its outcome is stale
            (open @ Circuit::Open { .. }, _) => open,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use chrono::NaiveDate;

    fn breaker(failures: u32, recovery_secs: u64, successes: u32) -> (UpstreamBreaker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()));
        let cb = UpstreamBreaker::new(
            "mlb-test",
            BreakerConfig {
                failure_threshold: failures,
                recovery_timeout: Duration::from_secs(recovery_secs),
                success_threshold: successes,
            },
            clock.clone(),
        );
        (cb, clock)
    }

    fn down() -> Result<(), FetchFailure> {
        Err(FetchFailure::transport("/schedule", "timed out"))
    }

    fn up() -> Result<(), FetchFailure> {
        Ok(())
    }

    #[test]
    fn test_opens_after_consecutive_transport_failures() {
        let (cb, _) = breaker(3, 30, 2);
        cb.observe(&down());
        cb.observe(&down());
        assert!(cb.admit().is_ok());

        cb.observe(&down());
        assert_eq!(cb.state(), BreakerState::Open);
        assert!(matches!(cb.admit(), Err(FetchFailure::CircuitOpen { .. })));
    }

    #[test]
    fn test_success_breaks_the_run() {
        let (cb, _) = breaker(3, 30, 2);
        cb.observe(&down());
        cb.observe(&down());
        cb.observe(&up());
        cb.observe(&down());
        cb.observe(&down());
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn test_format_failures_do_not_count() {
        let (cb, _) = breaker(2, 30, 1);
        let bad_body: Result<(), FetchFailure> = Err(FetchFailure::format("/roster", "missing 'roster'"));
        for _ in 0..5 {
            cb.observe(&bad_body);
        }
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn test_recovers_through_probing() {
        let (cb, clock) = breaker(2, 30, 2);
        cb.observe(&down());
        cb.observe(&down());

        clock.advance(Duration::from_secs(29));
        assert!(cb.admit().is_err());

        clock.advance(Duration::from_secs(1));
        assert!(cb.admit().is_ok());
        assert_eq!(cb.state(), BreakerState::HalfOpen);

        cb.observe(&up());
        assert_eq!(cb.state(), BreakerState::HalfOpen);
        cb.observe(&up());
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn test_failed_probe_reopens_for_a_full_timeout() {
        let (cb, clock) = breaker(1, 30, 1);
        cb.observe(&down());
        clock.advance(Duration::from_secs(30));
        assert!(cb.admit().is_ok());

        clock.advance(Duration::from_secs(10));
        cb.observe(&down());
        assert_eq!(cb.state(), BreakerState::Open);

        clock.advance(Duration::from_secs(29));
        assert!(cb.admit().is_err());
        clock.advance(Duration::from_secs(1));
        assert!(cb.admit().is_ok());
    }

    #[test]
    fn test_late_outcome_while_open_is_ignored() {
        let (cb, _) = breaker(1, 30, 1);
        cb.observe(&down());
        cb.observe(&up());
        assert_eq!(cb.state(), BreakerState::Open);
    }
}
