//! monitor::boundary — critical boundary for the monitoring process.
//!
//! Purpose
//! -------
//! Provide the data-independent boundary `b_k` against which `|S_k|` is
//! compared. The process accumulates recursive residuals, which are i.i.d.
//! under the no-change null, so it is a discretized standard Brownian
//! motion on `[0, 1]` and the Brown–Durbin–Evans linear boundary applies:
//!
//! ```text
//! b_k = λ · (1 + 2·k/N),   k = 1..N
//! ```
//!
//! where `λ = λ(level)` solves
//!
//! ```text
//! 2·[1 − Φ(3λ) + exp(−4λ²)·Φ(λ)] = 1 − level
//! ```
//!
//! with `Φ` the standard normal CDF. `level` is the coverage of the
//! boundary: under the no-change null the process stays inside `±b` with
//! probability ≈ `level`. Checking only the `N` discrete positions makes
//! the false-alarm rate slightly lower than `1 − level`.
//!
//! Key behaviors
//! -------------
//! - Higher `level` gives a strictly wider boundary.
//! - `level = 1.0` gives `λ = +∞`: no crossing is possible.
//! - `λ` is found by bisection on the monotone crossing probability, to an
//!   absolute tolerance of `1e-12`.
//!
//! Downstream usage
//! ----------------
//! - The dispatcher builds one [`Boundary`] per batch (it depends only on the
//!   level and the monitoring length) and shares it read-only across
//!   workers.
use crate::monitor::{errors::MonitorResult, validation::validate_level};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Absolute tolerance of the `λ` bisection.
pub const LAMBDA_TOLERANCE: f64 = 1e-12;

const MAX_BISECTION_STEPS: usize = 200;

/// Standard normal CDF.
#[inline]
fn std_normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Probability that the null process crosses the boundary with parameter
/// `lambda`: `2·[1 − Φ(3λ) + exp(−4λ²)·Φ(λ)]`.
///
/// Strictly decreasing on `λ ≥ 0`, from 2 at `λ = 0` toward 0.
pub fn crossing_probability(lambda: f64) -> f64 {
    2.0 * (1.0 - std_normal_cdf(3.0 * lambda) + (-4.0 * lambda * lambda).exp() * std_normal_cdf(lambda))
}

/// Boundary parameter `λ` for a coverage `level`.
///
/// Parameters
/// ----------
/// - `level`: `f64`
///   Coverage in `(0, 1]`.
///
/// Returns
/// -------
/// `MonitorResult<f64>`
///   - `f64::INFINITY` when `level == 1.0`.
///   - Otherwise the root of `crossing_probability(λ) = 1 − level`.
///
/// Errors
/// ------
/// - `MonitorError::InvalidLevel` when `level` is outside `(0, 1]`.
pub fn critical_value(level: f64) -> MonitorResult<f64> {
    validate_level(level)?;
    if level == 1.0 {
        return Ok(f64::INFINITY);
    }
    let target = 1.0 - level;

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    while crossing_probability(hi) > target {
        lo = hi;
        hi *= 2.0;
    }

    for _ in 0..MAX_BISECTION_STEPS {
        if hi - lo <= LAMBDA_TOLERANCE {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if crossing_probability(mid) > target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// Boundary — `b_1..b_N` for one level and monitoring length.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    lambda: f64,
    values: Vec<f64>,
}

impl Boundary {
    /// Evaluate the boundary at every monitoring position `k = 1..=span`.
    ///
    /// Errors
    /// ------
    /// - `MonitorError::InvalidLevel` from [`critical_value`].
    pub fn new(level: f64, span: usize) -> MonitorResult<Self> {
        let lambda = critical_value(level)?;
        let n = span as f64;
        let values = (1..=span).map(|k| lambda * (1.0 + 2.0 * k as f64 / n)).collect();
        Ok(Boundary { lambda, values })
    }

    /// `b_k` for 0-based position `k`.
    #[inline]
    pub fn at(&self, k: usize) -> f64 {
        self.values[k]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The level-dependent parameter `λ`.
    pub fn critical_value(&self) -> f64 {
        self.lambda
    }
}
