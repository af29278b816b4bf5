//! monitor::model — trend + harmonic OLS fit on the history period.
//!
//! Purpose
//! -------
//! Fit the per-pixel baseline model
//!
//! ```text
//! y(t) = β₀ + β₁·t + Σ_{j=1}^{k} [ γⱼ·cos(2πjt/P) + δⱼ·sin(2πjt/P) ] + ε
//! ```
//!
//! to the non-missing history observations by ordinary least squares, and
//! expose predictions and the residual standard deviation needed by the
//! monitoring statistic.
//!
//! Key behaviors
//! -------------
//! - Rows whose observation is not finite (NaN or ±∞) are dropped before
//!   the design matrix is built; the time values of the remaining rows are
//!   kept.
//! - The least-squares problem is solved through an SVD with a relative
//!   singular-value cut-off, so rank-deficient designs (e.g. a harmonic
//!   column that is constant on the sampled dates) still give the
//!   minimum-norm solution instead of failing.
//! - σ̂ uses the degrees-of-freedom corrected denominator `n − p`.
//! - The fit keeps `(XᵀX)⁺`, the pseudo-inverse of the history Gram matrix,
//!   taken from the same SVD. The monitoring process needs it to turn
//!   history-model residuals into recursive residuals.
//!
//! Invariants & assumptions
//! ------------------------
//! - A fit needs at least `p + 1` valid observations, `p = 2 + 2k`.
//! - Time values are expected on a reasonably scaled axis (the dispatcher
//!   shifts them so the first history date is 0).
//! - A successfully fitted [`HarmonicModel`] has finite coefficients and a
//!   finite, non-negative σ̂.
//!
//! Conventions
//! -----------
//! - Coefficient layout: `[β₀, β₁, γ₁, δ₁, …, γₖ, δₖ]`.
//! - Failures are [`FitError`] values; the dispatcher maps them to the
//!   "no break" sentinel for the pixel.
//!
//! Testing notes
//! -------------
//! - Unit tests recover known coefficients from noiseless data, check the
//!   σ̂ denominator, the insufficient-history path, masking of NaN and ±∞,
//!   the Gram inverse, and the rank-deficient case.
use crate::monitor::errors::{FitError, FitResult};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::TAU;

/// Relative singular-value cut-off for the SVD solve.
pub const SVD_RELATIVE_EPS: f64 = 1e-10;

/// σ̂ at or below this fraction of the data scale counts as zero variance.
pub const SIGMA_RELATIVE_FLOOR: f64 = 1e-12;

/// Extra valid observations required beyond the parameter count.
pub const HISTORY_MARGIN: usize = 1;

/// HarmonicModel — fitted coefficients and residual spread for one pixel.
///
/// Fields
/// ------
/// - `coefficients`: `DVector<f64>`
///   `[β₀, β₁, γ₁, δ₁, …]`, length `2 + 2·order`.
/// - `sigma`: `f64`
///   Residual standard deviation `sqrt(SSE / (n − p))`.
/// - `n_obs`: `usize`
///   Number of valid history observations used.
/// - `gram_inverse`: `DMatrix<f64>`
///   `(XᵀX)⁺` of the history design, `p × p`.
/// - `scale`: `f64`
///   Mean absolute observation, used to decide whether σ̂ is zero.
/// - `order`, `period`: harmonic settings needed to predict.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicModel {
    coefficients: DVector<f64>,
    gram_inverse: DMatrix<f64>,
    sigma: f64,
    n_obs: usize,
    scale: f64,
    order: usize,
    period: f64,
}

impl HarmonicModel {
    /// Fit the model to `(times[i], values[i])`, skipping non-finite values.
    ///
    /// Parameters
    /// ----------
    /// - `times`: `&[f64]`
    ///   Model time of each history observation.
    /// - `values`: `&[f64]`
    ///   Observations aligned with `times`; NaN or ±∞ marks a missing
    ///   value.
    /// - `order`: `usize`
    ///   Number of harmonic pairs.
    /// - `period`: `f64`
    ///   Seasonal period on the `times` axis; must be `> 0`.
    ///
    /// Returns
    /// -------
    /// `FitResult<HarmonicModel>`
    ///
    /// Errors
    /// ------
    /// - `FitError::InsufficientHistory` when fewer than `p + 1` values are
    ///   present.
    /// - `FitError::SolveFailed` when the SVD solve rejects the system.
    /// - `FitError::NonFiniteFit` when the solution or σ̂ is not finite.
    ///
    /// Panics
    /// ------
    /// - Panics if `times.len() != values.len()`.
    pub fn fit(times: &[f64], values: &[f64], order: usize, period: f64) -> FitResult<Self> {
        assert_eq!(times.len(), values.len(), "times and values must be aligned");
        let n_params = n_params(order);
        let required = n_params + HISTORY_MARGIN;

        let valid: Vec<usize> = (0..values.len()).filter(|&i| values[i].is_finite()).collect();
        if valid.len() < required {
            return Err(FitError::InsufficientHistory { valid: valid.len(), required });
        }

        let n = valid.len();
        let mut x = DMatrix::<f64>::zeros(n, n_params);
        let mut row = vec![0.0; n_params];
        for (r, &i) in valid.iter().enumerate() {
            design_row(times[i], order, period, &mut row);
            for (c, &v) in row.iter().enumerate() {
                x[(r, c)] = v;
            }
        }
        let y = DVector::from_iterator(n, valid.iter().map(|&i| values[i]));

        let svd = x.clone().svd(true, true);
        let cutoff = SVD_RELATIVE_EPS * svd.singular_values.max().max(f64::MIN_POSITIVE);
        let coefficients = svd.solve(&y, cutoff).map_err(FitError::SolveFailed)?;

        let v_t = svd.v_t.as_ref().ok_or(FitError::SolveFailed("SVD did not compute V^T"))?;
        let mut gram_inverse = DMatrix::<f64>::zeros(n_params, n_params);
        for (k, &s) in svd.singular_values.iter().enumerate() {
            if s > cutoff {
                let v = v_t.row(k);
                gram_inverse += v.transpose() * v / (s * s);
            }
        }

        let residuals = &y - &x * &coefficients;
        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let sigma = (sse / (n - n_params) as f64).sqrt();
        if !sigma.is_finite()
            || coefficients.iter().any(|c| !c.is_finite())
            || gram_inverse.iter().any(|g| !g.is_finite())
        {
            return Err(FitError::NonFiniteFit);
        }

        let scale = y.iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        Ok(HarmonicModel { coefficients, gram_inverse, sigma, n_obs: n, scale, order, period })
    }

    /// Predicted value at model time `t`.
    pub fn predict(&self, t: f64) -> f64 {
        let mut acc = self.coefficients[0] + self.coefficients[1] * t;
        for j in 1..=self.order {
            let angle = TAU * j as f64 * t / self.period;
            acc += self.coefficients[2 * j] * angle.cos() + self.coefficients[2 * j + 1] * angle.sin();
        }
        acc
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    /// `(XᵀX)⁺` of the history design.
    pub fn gram_inverse(&self) -> &DMatrix<f64> {
        &self.gram_inverse
    }

    /// Write the regressors `[1, t, cos, sin, …]` for model time `t` into
    /// `row`, which must hold `n_params(order)` entries.
    pub fn regressors(&self, t: f64, row: &mut [f64]) {
        design_row(t, self.order, self.period, row);
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// `true` when σ̂ is zero relative to the scale of the data, in which case
    /// residuals cannot be normalized.
    pub fn has_zero_variance(&self) -> bool {
        self.sigma <= SIGMA_RELATIVE_FLOOR * self.scale.max(1.0)
    }
}

/// Number of coefficients for a given harmonic order.
#[inline]
pub fn n_params(order: usize) -> usize {
    2 + 2 * order
}

/// Write one design-matrix row for time `t` into `row`.
#[inline]
fn design_row(t: f64, order: usize, period: f64, row: &mut [f64]) {
    row[0] = 1.0;
    row[1] = t;
    for j in 1..=order {
        let angle = TAU * j as f64 * t / period;
        row[2 * j] = angle.cos();
        row[2 * j + 1] = angle.sin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of known coefficients from noiseless harmonic data.
    // - The degrees-of-freedom corrected σ̂.
    // - NaN/±∞ masking and the insufficient-history failure.
    // - The stored Gram inverse.
    // - Rank-deficient designs.
    // -------------------------------------------------------------------------

    const PERIOD: f64 = 23.0;

    fn signal(t: f64) -> f64 {
        3.0 + 0.05 * t + 1.5 * (TAU * t / PERIOD).cos() - 0.5 * (TAU * t / PERIOD).sin()
    }

    #[test]
    // Purpose
    // -------
    // Verify that noiseless trend + harmonic data is fitted exactly.
    //
    // Given
    // -----
    // - 60 equally spaced observations of a known order-1 signal.
    //
    // Expect
    // ------
    // - Coefficients [3.0, 0.05, 1.5, -0.5] and σ̂ ≈ 0.
    fn fit_recovers_known_coefficients() {
        // Arrange
        let times: Vec<f64> = (0..60).map(|t| t as f64).collect();
        let values: Vec<f64> = times.iter().map(|&t| signal(t)).collect();

        // Act
        let model = HarmonicModel::fit(&times, &values, 1, PERIOD).unwrap();

        // Assert
        let expected = [3.0, 0.05, 1.5, -0.5];
        for (c, e) in model.coefficients().iter().zip(expected) {
            assert_relative_eq!(*c, e, epsilon = 1e-8);
        }
        assert!(model.sigma() < 1e-9);
        assert_relative_eq!(model.predict(75.0), signal(75.0), epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Ensure σ̂ uses the `n − p` denominator.
    //
    // Given
    // -----
    // - Order 0 (intercept + trend), y = ±1 alternating on t = 0..6,
    //   which a straight line cannot absorb.
    //
    // Expect
    // ------
    // - σ̂² · (n − p) equals the SSE of the fitted residuals.
    fn fit_sigma_uses_degrees_of_freedom() {
        // Arrange
        let times: Vec<f64> = (0..6).map(|t| t as f64).collect();
        let values = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0];

        // Act
        let model = HarmonicModel::fit(&times, &values, 0, PERIOD).unwrap();

        // Assert
        let sse: f64 =
            times.iter().zip(&values).map(|(&t, &y)| (y - model.predict(t)).powi(2)).sum();
        assert_relative_eq!(model.sigma().powi(2) * 4.0, sse, epsilon = 1e-10);
        assert!(!model.has_zero_variance());
    }

    #[test]
    // Purpose
    // -------
    // Verify that NaN observations are skipped and counted out of `n_obs`.
    //
    // Given
    // -----
    // - 30 observations of the known signal with every 5th set to NaN.
    //
    // Expect
    // ------
    // - `n_obs == 24` and the coefficients are still recovered.
    fn fit_ignores_missing_observations() {
        // Arrange
        let times: Vec<f64> = (0..30).map(|t| t as f64).collect();
        let values: Vec<f64> = times
            .iter()
            .enumerate()
            .map(|(i, &t)| if i % 5 == 0 { f64::NAN } else { signal(t) })
            .collect();

        // Act
        let model = HarmonicModel::fit(&times, &values, 1, PERIOD).unwrap();

        // Assert
        assert_eq!(model.n_obs(), 24);
        assert_relative_eq!(model.coefficients()[0], 3.0, epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Ensure infinite observations are masked exactly like NaN.
    //
    // Given
    // -----
    // - The same 30 observations with positions 3 and 17 set to +∞ / −∞ in
    //   one copy and to NaN in the other.
    //
    // Expect
    // ------
    // - Identical fits with 28 observations and finite σ̂.
    fn fit_treats_infinite_values_as_missing() {
        // Arrange
        let times: Vec<f64> = (0..30).map(|t| t as f64).collect();
        let base: Vec<f64> = times.iter().map(|&t| signal(t) + 0.1 * (t * 1.7).sin()).collect();
        let mut infinite = base.clone();
        infinite[3] = f64::INFINITY;
        infinite[17] = f64::NEG_INFINITY;
        let mut missing = base;
        missing[3] = f64::NAN;
        missing[17] = f64::NAN;

        // Act
        let from_inf = HarmonicModel::fit(&times, &infinite, 1, PERIOD).unwrap();
        let from_nan = HarmonicModel::fit(&times, &missing, 1, PERIOD).unwrap();

        // Assert
        assert_eq!(from_inf.n_obs(), 28);
        assert!(from_inf.sigma().is_finite());
        assert_eq!(from_inf, from_nan);
    }

    #[test]
    // Purpose
    // -------
    // Verify that the stored Gram inverse inverts `XᵀX` for a full-rank
    // design.
    //
    // Given
    // -----
    // - Order 1 on t = 0..40 with a few NaN rows.
    //
    // Expect
    // ------
    // - `gram_inverse · XᵀX ≈ I` over the valid rows.
    fn gram_inverse_inverts_history_design() {
        // Arrange
        let times: Vec<f64> = (0..40).map(|t| t as f64).collect();
        let values: Vec<f64> = times
            .iter()
            .map(|&t| if t as usize % 9 == 4 { f64::NAN } else { signal(t) + (t * 0.37).cos() })
            .collect();

        // Act
        let model = HarmonicModel::fit(&times, &values, 1, PERIOD).unwrap();

        // Assert
        let mut gram = DMatrix::<f64>::zeros(4, 4);
        let mut row = [0.0; 4];
        for (&t, v) in times.iter().zip(&values) {
            if v.is_finite() {
                model.regressors(t, &mut row);
                let x = DVector::from_row_slice(&row);
                gram += &x * x.transpose();
            }
        }
        let product = model.gram_inverse() * gram;
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product[(i, j)], expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure too few valid observations yield `InsufficientHistory`.
    //
    // Given
    // -----
    // - Order 1 (p = 4) with 4 valid values and 2 NaNs.
    //
    // Expect
    // ------
    // - `InsufficientHistory { valid: 4, required: 5 }`.
    fn fit_fails_with_insufficient_history() {
        // Arrange
        let times: Vec<f64> = (0..6).map(|t| t as f64).collect();
        let values = vec![1.0, f64::NAN, 2.0, 3.0, f64::NAN, 4.0];

        // Act
        let result = HarmonicModel::fit(&times, &values, 1, PERIOD);

        // Assert
        assert_eq!(result, Err(FitError::InsufficientHistory { valid: 4, required: 5 }));
    }

    #[test]
    // Purpose
    // -------
    // Verify that a rank-deficient design still fits.
    //
    // Given
    // -----
    // - Integer times with period 1, so cos(2πt) ≡ 1 and sin(2πt) ≡ 0.
    // - y = 2 + 0.1·t.
    //
    // Expect
    // ------
    // - A successful fit that predicts the line exactly.
    fn fit_handles_rank_deficient_design() {
        // Arrange
        let times: Vec<f64> = (0..20).map(|t| t as f64).collect();
        let values: Vec<f64> = times.iter().map(|&t| 2.0 + 0.1 * t).collect();

        // Act
        let model = HarmonicModel::fit(&times, &values, 1, 1.0).unwrap();

        // Assert
        assert_relative_eq!(model.predict(25.0), 4.5, epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a constant history is flagged as zero variance.
    //
    // Given
    // -----
    // - 40 observations all equal to 0.5.
    //
    // Expect
    // ------
    // - `has_zero_variance()` is true and the prediction is 0.5.
    fn constant_history_has_zero_variance() {
        // Arrange
        let times: Vec<f64> = (0..40).map(|t| t as f64).collect();
        let values = vec![0.5; 40];

        // Act
        let model = HarmonicModel::fit(&times, &values, 1, PERIOD).unwrap();

        // Assert
        assert!(model.has_zero_variance(), "sigma = {}", model.sigma());
        assert_relative_eq!(model.predict(50.0), 0.5, epsilon = 1e-10);
    }
}
