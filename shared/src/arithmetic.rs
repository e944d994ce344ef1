//! Basic arithmetic.
//!
//! Pure binary operations on `f64`, plus a [`Calculator`] that keeps a
//! running value and records every operation through a [`CallLogger`].

use crate::logging::{logged, CallLogger, NoopCallLogger};
use serde_json::json;
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// The divisor was zero.
    #[error("Cannot divide by zero")]
    DivisionByZero,
}

/// Returns `a + b`.
#[must_use]
pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

/// Returns `a - b`.
#[must_use]
pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

/// Returns `a * b`.
#[must_use]
pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Returns `a / b`.
///
/// # Errors
///
/// Returns [`ArithmeticError::DivisionByZero`] if `b` is `0.0` or `-0.0`.
///
/// # Example
///
/// ```
/// use shared::arithmetic::{divide, ArithmeticError};
///
/// assert_eq!(divide(12.0, 3.0), Ok(4.0));
/// assert_eq!(divide(1.0, 0.0), Err(ArithmeticError::DivisionByZero));
/// ```
pub fn divide(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    if b == 0.0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    Ok(a / b)
}

/// A running accumulator whose operations are logged.
///
/// Each operation applies to the current value, stores the new value and
/// returns it. A failed division leaves the value untouched.
///
/// # Example
///
/// ```
/// use shared::arithmetic::Calculator;
/// use shared::logging::InMemoryCallLogger;
///
/// let logger = InMemoryCallLogger::new();
/// let mut calc = Calculator::new(&logger);
///
/// calc.add(5.0);
/// calc.subtract(2.0);
/// calc.multiply(4.0);
/// assert_eq!(calc.divide(3.0), Ok(4.0));
/// assert_eq!(calc.to_string(), "Current value: 4.0");
/// assert_eq!(logger.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Calculator<L: CallLogger = NoopCallLogger> {
    value: f64,
    logger: L,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(NoopCallLogger)
    }
}

impl<L: CallLogger> Calculator<L> {
    /// Creates a calculator starting at `0.0`.
    #[must_use]
    pub fn new(logger: L) -> Self {
        Self::with_initial_value(0.0, logger)
    }

    /// Creates a calculator starting at `initial`.
    #[must_use]
    pub fn with_initial_value(initial: f64, logger: L) -> Self {
        Self {
            value: initial,
            logger,
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Adds `num` to the current value.
    pub fn add(&mut self, num: f64) -> f64 {
        self.apply("add", num, add)
    }

    /// Subtracts `num` from the current value.
    pub fn subtract(&mut self, num: f64) -> f64 {
        self.apply("subtract", num, subtract)
    }

    /// Multiplies the current value by `num`.
    pub fn multiply(&mut self, num: f64) -> f64 {
        self.apply("multiply", num, multiply)
    }

    /// Divides the current value by `num`.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::DivisionByZero`] if `num` is zero. The
    /// current value is unchanged in that case.
    pub fn divide(&mut self, num: f64) -> Result<f64, ArithmeticError> {
        self.try_apply("divide", num, divide)
    }

    /// Resets the current value to `0.0`. Not logged.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    fn apply(&mut self, operation: &str, num: f64, op: impl FnOnce(f64, f64) -> f64) -> f64 {
        match self.try_apply(operation, num, |a, b| Ok::<_, Infallible>(op(a, b))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    fn try_apply<E: fmt::Display>(
        &mut self,
        operation: &str,
        num: f64,
        op: impl FnOnce(f64, f64) -> Result<f64, E>,
    ) -> Result<f64, E> {
        let current = self.value;
        let result = logged(&self.logger, operation, vec![json!(current), json!(num)], || {
            op(current, num)
        })?;
        self.value = result;
        Ok(result)
    }
}

/// Always shows the fractional part, e.g. `Current value: 4.0`.
impl<L: CallLogger> fmt::Display for Calculator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Current value: {:?}", self.value)
    }
}
