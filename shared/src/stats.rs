//! Descriptive statistics over numeric sequences.
//!
//! Every aggregate fails with [`StatsError::EmptyInput`] on an empty slice
//! instead of returning a sentinel. Filters may legitimately return an
//! empty vector.
//!
//! Ordering uses [`f64::total_cmp`], so `NaN` values sort after every
//! finite value instead of panicking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when computing statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The input sequence was empty.
    #[error("Input sequence is empty")]
    EmptyInput,
}

/// Mean, median and population standard deviation of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Returns the strictly positive elements of `data`, preserving order.
///
/// # Example
///
/// ```
/// use shared::stats::filter_positive;
///
/// assert_eq!(filter_positive(&[-1.0, 0.0, 2.0, 3.0]), vec![2.0, 3.0]);
/// ```
#[must_use]
pub fn filter_positive(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| *x > 0.0).collect()
}

/// Returns the elements of `data` that are even whole numbers, preserving order.
#[must_use]
pub fn filter_even(data: &[f64]) -> Vec<f64> {
    data.iter()
        .copied()
        .filter(|x| x.fract() == 0.0 && x.rem_euclid(2.0) == 0.0)
        .collect()
}

/// Returns an ascending copy of `data`.
#[must_use]
pub fn sort(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Computes the arithmetic mean.
///
/// # Errors
///
/// Returns [`StatsError::EmptyInput`] if `data` is empty.
///
/// # Example
///
/// ```
/// use shared::stats::{mean, StatsError};
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Ok(2.5));
/// assert_eq!(mean(&[]), Err(StatsError::EmptyInput));
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn mean(data: &[f64]) -> Result<f64, StatsError> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Computes the median.
///
/// Odd-length input yields the middle element of the sorted sequence;
/// even-length input yields the average of the two middle elements.
///
/// # Errors
///
/// Returns [`StatsError::EmptyInput`] if `data` is empty.
pub fn median(data: &[f64]) -> Result<f64, StatsError> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    let sorted = sort(data);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Computes the population standard deviation (denominator `n`).
///
/// # Errors
///
/// Returns [`StatsError::EmptyInput`] if `data` is empty.
#[allow(clippy::cast_precision_loss)]
pub fn standard_deviation(data: &[f64]) -> Result<f64, StatsError> {
    let mean = mean(data)?;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64;
    Ok(variance.sqrt())
}

/// Computes mean, median and standard deviation in one call.
///
/// # Errors
///
/// Returns [`StatsError::EmptyInput`] if `data` is empty.
///
/// # Example
///
/// ```
/// use shared::stats::summarize;
///
/// let summary = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(summary.mean, 3.5);
/// assert_eq!(summary.median, 3.5);
/// assert!((summary.std_dev - 1.707_825_127_659_933).abs() < 1e-12);
/// ```
pub fn summarize(data: &[f64]) -> Result<Summary, StatsError> {
    Ok(Summary {
        mean: mean(data)?,
        median: median(data)?,
        std_dev: standard_deviation(data)?,
    })
}
