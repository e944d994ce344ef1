//! Retry wrapper.
//!
//! Re-invokes a fallible operation until it succeeds or the attempt budget
//! runs out. The control flow is an explicit state machine:
//!
//! ```text
//! Attempting(n) --Ok--> Succeeded(n)
//! Attempting(n) --Err, n < M--> Retrying(n, delay) --> Attempting(n + 1)
//! Attempting(n) --Err, n = M--> Exhausted(n)
//! ```
//!
//! The delay between attempts comes from a [`DelayPolicy`]. Randomized
//! delays draw from a seedable generator and the wait itself goes through a
//! [`Sleep`] implementation, so both can be controlled in tests.
//!
//! # Example
//!
//! ```
//! use shared::retry::{Retry, RetryPolicy};
//!
//! let mut calls = 0;
//! let mut retry = Retry::new(RetryPolicy::new(3)).unwrap();
//! let result: Result<&str, _> = retry.run("flaky", || {
//!     calls += 1;
//!     if calls < 3 { Err("not yet") } else { Ok("done") }
//! });
//!
//! assert_eq!(result.unwrap(), "done");
//! assert_eq!(calls, 3);
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Errors returned by [`Retry::run`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError<E> {
    /// Every attempt failed. Carries the error of the final attempt.
    #[error("Operation failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error returned by the last attempt.
        last_error: E,
    },
}

impl<E> RetryError<E> {
    /// Returns the error of the final attempt.
    pub fn into_last_error(self) -> E {
        match self {
            Self::RetriesExhausted { last_error, .. } => last_error,
        }
    }

    /// Returns the number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::RetriesExhausted { attempts, .. } => *attempts,
        }
    }
}

/// How long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DelayPolicy {
    /// Retry immediately.
    #[default]
    None,
    /// Wait the same duration before every retry.
    Fixed {
        /// The wait.
        #[serde(with = "duration_ms")]
        delay: Duration,
    },
    /// Wait a uniformly random duration in `[0, max]` before every retry.
    Random {
        /// Upper bound of the wait, inclusive.
        #[serde(with = "duration_ms")]
        max: Duration,
    },
}

impl DelayPolicy {
    /// Draws the delay for one retry.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay } => delay,
            Self::Random { max } => {
                let max_nanos = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
                Duration::from_nanos(rng.random_range(0..=max_nanos))
            }
        }
    }

    /// Returns the longest delay this policy can produce.
    #[must_use]
    pub fn upper_bound(&self) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay } => delay,
            Self::Random { max } => max,
        }
    }
}

/// Attempt budget and delay policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    #[validate(range(min = 1, message = "max_attempts must be at least 1"))]
    pub max_attempts: u32,

    /// Delay between attempts.
    #[serde(default)]
    pub delay: DelayPolicy,
}

impl RetryPolicy {
    /// Creates a policy with `max_attempts` attempts and no delay.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: DelayPolicy::None,
        }
    }

    /// Sets the delay policy.
    #[must_use]
    pub fn with_delay(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    /// Computes the state that follows attempt number `attempt` (1-based).
    ///
    /// A `Retrying` state carries the delay to wait before the next attempt.
    pub fn next_state<R: Rng>(
        &self,
        attempt: u32,
        succeeded: bool,
        rng: &mut R,
    ) -> RetryState {
        if succeeded {
            RetryState::Succeeded { attempts: attempt }
        } else if attempt < self.max_attempts {
            RetryState::Retrying {
                attempt,
                delay: self.delay.sample(rng),
            }
        } else {
            RetryState::Exhausted { attempts: attempt }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// States of a retry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to invoke the operation for the `attempt`-th time.
    Attempting {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Attempt `attempt` failed; wait `delay` before the next one.
    Retrying {
        /// The attempt that failed.
        attempt: u32,
        /// The wait before the next attempt.
        delay: Duration,
    },
    /// The operation succeeded.
    Succeeded {
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed.
    Exhausted {
        /// Attempts used.
        attempts: u32,
    },
}

/// Blocks the caller between attempts.
pub trait Sleep {
    /// Waits for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<F: FnMut(Duration)> Sleep for F {
    fn sleep(&mut self, duration: Duration) {
        self(duration);
    }
}

/// Runs operations under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct Retry<S = ThreadSleep, R = SmallRng> {
    policy: RetryPolicy,
    sleeper: S,
    rng: R,
}

impl Retry {
    /// Creates a runner that sleeps on the current thread and seeds its
    /// random source from the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if `policy.max_attempts` is zero.
    pub fn new(policy: RetryPolicy) -> Result<Self, ValidationErrors> {
        policy.validate()?;
        Ok(Self {
            policy,
            sleeper: ThreadSleep,
            rng: SmallRng::from_os_rng(),
        })
    }
}

impl<S: Sleep, R: Rng> Retry<S, R> {
    /// Replaces the random source with one seeded from `seed`.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Retry<S, SmallRng> {
        self.with_rng(SmallRng::seed_from_u64(seed))
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Retry<S, R2> {
        Retry {
            policy: self.policy,
            sleeper: self.sleeper,
            rng,
        }
    }

    /// Replaces the sleeper.
    #[must_use]
    pub fn with_sleeper<S2: Sleep>(self, sleeper: S2) -> Retry<S2, R> {
        Retry {
            policy: self.policy,
            sleeper,
            rng: self.rng,
        }
    }

    /// Returns the policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes `f` until it succeeds or the attempt budget is spent.
    ///
    /// Every failed attempt except the last emits a warning naming
    /// `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::RetriesExhausted`] with the last error when
    /// every attempt fails.
    pub fn run<T, E, F>(&mut self, operation: &str, mut f: F) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let mut state = RetryState::Attempting { attempt: 1 };
        loop {
            let RetryState::Attempting { attempt } = state else {
                unreachable!("loop only resumes in Attempting");
            };
            let outcome = f();
            state = self
                .policy
                .next_state(attempt, outcome.is_ok(), &mut self.rng);
            match (state, outcome) {
                (RetryState::Succeeded { attempts }, Ok(value)) => {
                    tracing::debug!(operation, attempts, "operation succeeded");
                    return Ok(value);
                }
                (RetryState::Retrying { attempt, delay }, Err(err)) => {
                    tracing::warn!(
                        operation,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retry {attempt}/{} for {operation} due to error: {err}",
                        self.policy.max_attempts
                    );
                    self.sleeper.sleep(delay);
                    state = RetryState::Attempting {
                        attempt: attempt + 1,
                    };
                }
                (RetryState::Exhausted { attempts }, Err(last_error)) => {
                    tracing::warn!(operation, attempts, error = %last_error, "retries exhausted");
                    return Err(RetryError::RetriesExhausted {
                        attempts,
                        last_error,
                    });
                }
                (state, _) => unreachable!("inconsistent retry transition: {state:?}"),
            }
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
