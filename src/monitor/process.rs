//! monitor::process — standardized cumulative residual process.
//!
//! Purpose
//! -------
//! Turn the monitoring-period observations and a fitted history model into
//! the CUSUM-style process that the break detector compares against the
//! boundary:
//!
//! ```text
//! r_k = y_k − ŷ_k                                  (history-model residual)
//! w_k = (y_k − x_kᵀβ_{k−1}) / sqrt(1 + x_kᵀ G_{k−1} x_k)
//! S_k = (1/√N) · Σ_{i ≤ k} w_i / σ̂,              k = 1..N
//! ```
//!
//! `β₀` and `G₀ = (XᵀX)⁺` come from the history fit; each valid monitoring
//! observation then updates them by one recursive least-squares step
//! (Sherman–Morrison). `w_k` is the part of `r_k` that the residuals
//! already seen in the monitoring period do not predict. Without a
//! structural change the `w_k / σ` are i.i.d. standard normal whatever the
//! trend and harmonic design, so `S` is a discretized Brownian motion on
//! `[0, 1]`. The plain cumulative sum of `r_k` is not: every `r_k` shares
//! the estimation error of the history coefficients, and the extrapolated
//! trend makes that error grow with `k`.
//!
//! Key behaviors
//! -------------
//! - `N` counts every monitoring position, missing ones included, so the
//!   process stays aligned with the monitoring dates.
//! - Missing observations (NaN or ±∞) contribute a zero increment, a NaN
//!   residual, and leave the recursive state untouched.
//! - When σ̂ is zero or no monitoring observation is present, the process is
//!   identically zero and can never cross a positive boundary.
//! - A level shift at the first monitoring date gives
//!   `w_1 = r_1 / sqrt(1 + x_1ᵀG₀x_1)`, so an abrupt shift enters the
//!   process at nearly full size.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values.len() == residuals.len() == innovations.len() ==
//!   observations.len()`.
//! - Every process value is finite: only finite observations enter the
//!   sums and `1 + x_kᵀG_{k−1}x_k ≥ 1`.
//! - The fitted [`HarmonicModel`] itself is never modified.
use crate::monitor::model::HarmonicModel;
use nalgebra::DVector;

/// MonitoringProcess — the cumulative standardized residual sequence.
///
/// Fields
/// ------
/// - `values`: `Vec<f64>`
///   `S_1..S_N`.
/// - `residuals`: `Vec<f64>`
///   History-model residuals `y_k − ŷ_k`; NaN where the observation is
///   missing.
/// - `innovations`: `Vec<f64>`
///   Recursive residuals `w_k`; 0.0 where the observation is missing.
/// - `n_valid`: `usize`
///   Number of finite monitoring observations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoringProcess {
    values: Vec<f64>,
    residuals: Vec<f64>,
    innovations: Vec<f64>,
    n_valid: usize,
}

impl MonitoringProcess {
    /// Build the process from a fitted model.
    ///
    /// Parameters
    /// ----------
    /// - `model`: `&HarmonicModel`
    ///   History fit supplying predictions, σ̂ and `(XᵀX)⁺`.
    /// - `times`: `&[f64]`
    ///   Model time of each monitoring position (same axis as the fit).
    /// - `observations`: `&[f64]`
    ///   Monitoring observations; NaN or ±∞ marks a missing value.
    ///
    /// Panics
    /// ------
    /// - Panics if `times.len() != observations.len()`.
    pub fn build(model: &HarmonicModel, times: &[f64], observations: &[f64]) -> Self {
        let mut process = MonitoringProcess::default();
        process.rebuild(model, times, observations);
        process
    }

    /// Recompute in place, reusing the existing allocations.
    pub(crate) fn rebuild(&mut self, model: &HarmonicModel, times: &[f64], observations: &[f64]) {
        assert_eq!(times.len(), observations.len(), "times and observations must be aligned");
        let n = observations.len();

        self.residuals.clear();
        self.residuals.extend(times.iter().zip(observations).map(|(&t, &y)| {
            if y.is_finite() { y - model.predict(t) } else { f64::NAN }
        }));
        self.n_valid = self.residuals.iter().filter(|r| !r.is_nan()).count();

        self.values.clear();
        self.innovations.clear();
        if self.n_valid == 0 || model.has_zero_variance() {
            self.values.resize(n, 0.0);
            self.innovations.resize(n, 0.0);
            return;
        }

        let mut beta = model.coefficients().clone();
        let mut gram = model.gram_inverse().clone();
        let mut x = DVector::<f64>::zeros(beta.len());

        let scale = model.sigma() * (n as f64).sqrt();
        let mut cumsum = 0.0;
        for (&t, &y) in times.iter().zip(observations) {
            let mut w = 0.0;
            if y.is_finite() {
                model.regressors(t, x.as_mut_slice());
                let gx = &gram * &x;
                let f = (1.0 + x.dot(&gx)).max(1.0);
                let error = y - x.dot(&beta);
                w = error / f.sqrt();
                beta.axpy(error / f, &gx, 1.0);
                gram.ger(-1.0 / f, &gx, &gx, 1.0);
            }
            cumsum += w;
            self.innovations.push(w);
            self.values.push(cumsum / scale);
        }
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

    pub fn n_valid(&self) -> usize {
        self.n_valid
    }

    /// History-model residual at position `k` (0-based); NaN when missing.
    pub fn residual(&self, k: usize) -> f64 {
        self.residuals[k]
    }

    /// Recursive residuals `w_1..w_N` (unscaled).
    pub fn innovations(&self) -> &[f64] {
        &self.innovations
    }
}
