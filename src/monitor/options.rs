//! monitor::options — configuration for the break-monitoring pipeline.
//!
//! Purpose
//! -------
//! Collect every tunable of the per-pixel pipeline and of the batch
//! dispatcher in one validated value, [`MonitorOptions`], together with the
//! small enums it is built from ([`DateFormat`], [`MagnitudeKind`]).
//!
//! Key behaviors
//! -------------
//! - [`MonitorOptions::new`] validates the model settings (harmonic order,
//!   seasonal period); the builder-style `with_*` setters validate the
//!   execution settings (chunk size, worker count).
//! - [`MonitorOptions::validate`] re-checks all fields, since they are
//!   public and may be edited after construction. The dispatcher calls it
//!   once per batch.
//! - [`DateFormat::model_time`] maps an integer acquisition date onto the
//!   continuous time axis used by the regression design matrix.
//!
//! Conventions
//! -----------
//! - `DateFormat::Ordinal` treats dates as plain time steps; the seasonal
//!   period is then expressed in steps (default 23, one year of 16-day
//!   composites).
//! - `DateFormat::Yyyymmdd` converts calendar dates to fractional years and
//!   always uses a period of one year.
use crate::monitor::errors::{MonitorError, MonitorResult};

/// Default number of harmonic (cos/sin) pairs in the history model.
pub const DEFAULT_ORDER: usize = 1;

/// Largest accepted harmonic order.
pub const MAX_ORDER: usize = 16;

/// Default seasonal period in time steps for [`DateFormat::Ordinal`].
pub const DEFAULT_PERIOD: f64 = 23.0;

/// Default number of pixels per parallel work unit.
pub const DEFAULT_PIXELS_PER_CHUNK: usize = 1024;

/// How integer acquisition dates are mapped onto model time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// Dates are time-step indices (or any evenly comparable integers).
    #[default]
    Ordinal,
    /// Dates are `YYYYMMDD` integers, modelled as fractional years.
    Yyyymmdd,
}

impl DateFormat {
    /// Map one acquisition date onto the model's continuous time axis.
    ///
    /// Parameters
    /// ----------
    /// - `date`: `i64`
    ///   Acquisition date in the caller's units.
    ///
    /// Returns
    /// -------
    /// `MonitorResult<f64>`
    ///   - `Ordinal`: the date itself as `f64`.
    ///   - `Yyyymmdd`: `year + (month − 1)/12 + (day − 1)/365.25`.
    ///
    /// Errors
    /// ------
    /// - `MonitorError::InvalidCalendarDate`
    ///   Returned for `Yyyymmdd` when the month is outside `1..=12`, the
    ///   day is outside `1..=31` or the date is negative.
    pub fn model_time(&self, date: i64) -> MonitorResult<f64> {
        match self {
            DateFormat::Ordinal => Ok(date as f64),
            DateFormat::Yyyymmdd => {
                let year = date / 10_000;
                let month = (date % 10_000) / 100;
                let day = date % 100;
                if date < 0 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
                    return Err(MonitorError::InvalidCalendarDate { date });
                }
                Ok(year as f64 + (month - 1) as f64 / 12.0 + (day - 1) as f64 / 365.25)
            }
        }
    }
}

/// Which quantity is reported as the magnitude of a detected break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagnitudeKind {
    /// Absolute value of the monitoring process at the break position.
    #[default]
    Process,
    /// Absolute raw residual (observed − predicted) at the break position.
    Residual,
}

/// MonitorOptions — model and execution settings for break monitoring.
///
/// Fields
/// ------
/// - `order`: `usize`
///   Number of harmonic pairs in the history model; `0 ≤ order ≤ MAX_ORDER`.
/// - `period`: `f64`
///   Seasonal period in model time units for `DateFormat::Ordinal`;
///   finite and `> 0`. Ignored for `DateFormat::Yyyymmdd`.
/// - `date_format`: [`DateFormat`]
///   Interpretation of the integer dates.
/// - `magnitude`: [`MagnitudeKind`]
///   Magnitude policy for detected breaks.
/// - `pixels_per_chunk`: `usize`
///   Pixels per parallel work unit; `> 0`. Affects scheduling only, never
///   results.
/// - `num_threads`: `Option<usize>`
///   `None` runs on the global rayon pool; `Some(n)` builds a dedicated
///   pool of `n > 0` workers for the batch.
///
/// Notes
/// -----
/// - The `Default` implementation is one annual harmonic, period 23,
///   ordinal dates, process magnitude, 1024-pixel chunks, global pool.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOptions {
    pub order: usize,
    pub period: f64,
    pub date_format: DateFormat,
    pub magnitude: MagnitudeKind,
    pub pixels_per_chunk: usize,
    pub num_threads: Option<usize>,
}

impl MonitorOptions {
    /// Construct validated options with default execution settings.
    ///
    /// Errors
    /// ------
    /// - `MonitorError::InvalidOrder` when `order > MAX_ORDER`.
    /// - `MonitorError::InvalidPeriod` when `period` is not finite or `≤ 0`.
    pub fn new(
        order: usize, period: f64, date_format: DateFormat, magnitude: MagnitudeKind,
    ) -> MonitorResult<Self> {
        let opts = MonitorOptions {
            order,
            period,
            date_format,
            magnitude,
            pixels_per_chunk: DEFAULT_PIXELS_PER_CHUNK,
            num_threads: None,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Replace the chunk size. Fails with `InvalidChunkSize` for zero.
    pub fn with_pixels_per_chunk(mut self, pixels_per_chunk: usize) -> MonitorResult<Self> {
        if pixels_per_chunk == 0 {
            return Err(MonitorError::InvalidChunkSize);
        }
        self.pixels_per_chunk = pixels_per_chunk;
        Ok(self)
    }

    /// Run batches on a dedicated pool of `num_threads` workers.
    pub fn with_num_threads(mut self, num_threads: usize) -> MonitorResult<Self> {
        if num_threads == 0 {
            return Err(MonitorError::InvalidThreadCount);
        }
        self.num_threads = Some(num_threads);
        Ok(self)
    }

    /// Re-check every field against its documented constraint.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.order > MAX_ORDER {
            return Err(MonitorError::InvalidOrder { order: self.order, max: MAX_ORDER });
        }
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(MonitorError::InvalidPeriod { period: self.period });
        }
        if self.pixels_per_chunk == 0 {
            return Err(MonitorError::InvalidChunkSize);
        }
        if self.num_threads == Some(0) {
            return Err(MonitorError::InvalidThreadCount);
        }
        Ok(())
    }

    /// Seasonal period actually used by the design matrix.
    pub fn season_length(&self) -> f64 {
        match self.date_format {
            DateFormat::Ordinal => self.period,
            DateFormat::Yyyymmdd => 1.0,
        }
    }

    /// Number of regression coefficients: intercept, trend, cos/sin pairs.
    pub fn n_params(&self) -> usize {
        crate::monitor::model::n_params(self.order)
    }
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            order: DEFAULT_ORDER,
            period: DEFAULT_PERIOD,
            date_format: DateFormat::default(),
            magnitude: MagnitudeKind::default(),
            pixels_per_chunk: DEFAULT_PIXELS_PER_CHUNK,
            num_threads: None,
        }
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
    // - Default values and their validity.
    // - Each validation branch of `MonitorOptions`.
    // - Date mapping for both `DateFormat` variants.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that the default configuration is itself valid and matches the
    // documented defaults.
    //
    // Given
    // -----
    // - `MonitorOptions::default()`.
    //
    // Expect
    // ------
    // - `validate()` succeeds; order 1 gives 4 parameters.
    fn default_options_are_valid() {
        // Arrange
        let opts = MonitorOptions::default();

        // Act
        let result = opts.validate();

        // Assert
        assert!(result.is_ok(), "Got: {result:?}");
        assert_eq!(opts.n_params(), 4);
        assert_eq!(opts.pixels_per_chunk, DEFAULT_PIXELS_PER_CHUNK);
        assert_relative_eq!(opts.season_length(), DEFAULT_PERIOD);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that out-of-range model settings are rejected by `new`.
    //
    // Given
    // -----
    // - order = MAX_ORDER + 1; period = 0 and NaN.
    //
    // Expect
    // ------
    // - `InvalidOrder` and `InvalidPeriod` respectively.
    fn new_rejects_invalid_order_and_period() {
        // Act
        let order_err =
            MonitorOptions::new(MAX_ORDER + 1, 23.0, DateFormat::Ordinal, MagnitudeKind::Process);
        let zero_period = MonitorOptions::new(1, 0.0, DateFormat::Ordinal, MagnitudeKind::Process);
        let nan_period =
            MonitorOptions::new(1, f64::NAN, DateFormat::Ordinal, MagnitudeKind::Process);

        // Assert
        assert!(matches!(order_err, Err(MonitorError::InvalidOrder { .. })));
        assert!(matches!(zero_period, Err(MonitorError::InvalidPeriod { .. })));
        assert!(matches!(nan_period, Err(MonitorError::InvalidPeriod { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Ensure that zero chunk sizes and zero worker counts are rejected,
    // both through the setters and through `validate` after direct edits.
    //
    // Given
    // -----
    // - Setters called with 0; a struct edited to `num_threads = Some(0)`.
    //
    // Expect
    // ------
    // - `InvalidChunkSize` and `InvalidThreadCount`.
    fn execution_settings_reject_zero() {
        // Arrange
        let mut edited = MonitorOptions::default();
        edited.num_threads = Some(0);

        // Act / Assert
        assert_eq!(
            MonitorOptions::default().with_pixels_per_chunk(0),
            Err(MonitorError::InvalidChunkSize)
        );
        assert_eq!(
            MonitorOptions::default().with_num_threads(0),
            Err(MonitorError::InvalidThreadCount)
        );
        assert_eq!(edited.validate(), Err(MonitorError::InvalidThreadCount));
    }

    #[test]
    // Purpose
    // -------
    // Verify the calendar-date conversion and its validation.
    //
    // Given
    // -----
    // - 20200101, 20200701 and the invalid 20201301.
    //
    // Expect
    // ------
    // - 2020.0, 2020.5 and `InvalidCalendarDate`.
    fn yyyymmdd_maps_to_fractional_years() {
        // Arrange
        let fmt = DateFormat::Yyyymmdd;

        // Act
        let jan = fmt.model_time(20200101).unwrap();
        let jul = fmt.model_time(20200701).unwrap();
        let bad = fmt.model_time(20201301);

        // Assert
        assert_relative_eq!(jan, 2020.0, epsilon = 1e-12);
        assert_relative_eq!(jul, 2020.5, epsilon = 1e-12);
        assert_eq!(bad, Err(MonitorError::InvalidCalendarDate { date: 20201301 }));
    }

    #[test]
    // Purpose
    // -------
    // Ordinal dates pass through unchanged and calendar dates use a
    // one-year season regardless of `period`.
    //
    // Given
    // -----
    // - Ordinal date 42; options with `Yyyymmdd` and period 23.
    //
    // Expect
    // ------
    // - 42.0 and a season length of 1.0.
    fn ordinal_passthrough_and_calendar_season() {
        // Arrange
        let opts =
            MonitorOptions::new(2, 23.0, DateFormat::Yyyymmdd, MagnitudeKind::Residual).unwrap();

        // Act / Assert
        assert_relative_eq!(DateFormat::Ordinal.model_time(42).unwrap(), 42.0);
        assert_relative_eq!(opts.season_length(), 1.0);
        assert_eq!(opts.n_params(), 6);
    }
}
