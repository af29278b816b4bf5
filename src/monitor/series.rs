//! monitor::series — per-pixel series extraction and period splitting.
//!
//! Purpose
//! -------
//! Turn a `(time, rows, cols)` raster stack into the ordered per-pixel
//! series consumed by the model fitter, and describe how that series is
//! divided into a stable history period and a monitoring period.
//!
//! Key behaviors
//! -------------
//! - [`extract_series`] reads one pixel's values along the time axis into a
//!   [`TimeSeries`], keeping missing values (NaN, ±∞) at their original
//!   positions so downstream masking stays aligned with the dates.
//! - [`PeriodSplit`] holds the two cut points and enforces
//!   `history_start < monitor_start` at construction.
//! - [`PeriodSplit::windows`] resolves the cut points against a date vector
//!   into index sets ([`SeriesWindows`]) that are shared by every pixel;
//!   [`TimeSeries::split`] applies the same windows to one series.
//!
//! Invariants & assumptions
//! ------------------------
//! - The history window is `[history_start, monitor_start)`; the monitoring
//!   window is every date `≥ monitor_start`. Dates before `history_start`
//!   belong to neither window.
//! - Extraction is a pure read; no value is dropped, clamped or filled.
//!
//! Testing notes
//! -------------
//! - Unit tests cover NaN preservation, window resolution on ordinal dates,
//!   exclusion of dates before `history_start`, and split validation.
use crate::monitor::errors::{MonitorError, MonitorResult};
use ndarray::{ArrayView3, s};

/// TimeSeries — one pixel's ordered `(date, value)` sequence.
///
/// Invariants
/// ----------
/// - `dates.len() == values.len()`.
/// - Values may be non-finite (missing); positions are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<'d> {
    dates: &'d [i64],
    values: Vec<f64>,
}

impl<'d> TimeSeries<'d> {
    /// Pair a date vector with a value vector of the same length.
    ///
    /// Errors
    /// ------
    /// - `MonitorError::DatesLengthMismatch` when the lengths differ.
    /// - `MonitorError::DatesNotIncreasing` when dates are not strictly
    ///   increasing.
    pub fn new(dates: &'d [i64], values: Vec<f64>) -> MonitorResult<Self> {
        if dates.len() != values.len() {
            return Err(MonitorError::DatesLengthMismatch {
                time_len: values.len(),
                dates_len: dates.len(),
            });
        }
        crate::monitor::validation::validate_dates(dates)?;
        Ok(TimeSeries { dates, values })
    }

    pub fn dates(&self) -> &'d [i64] {
        self.dates
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

    /// Number of missing (non-finite) observations.
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Iterate `(date, value)` pairs in temporal order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Restrict the series to the history and monitoring windows of `split`.
    ///
    /// Returns
    /// -------
    /// `(history, monitor)` — two sub-series borrowing the same date slice,
    /// resolved through [`PeriodSplit::windows`]. Either may be empty.
    pub fn split(&self, split: &PeriodSplit) -> (TimeSeries<'d>, TimeSeries<'d>) {
        let windows = split.windows(self.dates);
        (self.restrict(windows.history()), self.restrict(windows.monitor()))
    }

    /// Sub-series at `indices`, which must be a contiguous increasing run.
    fn restrict(&self, indices: &[usize]) -> TimeSeries<'d> {
        let dates = match (indices.first(), indices.last()) {
            (Some(&lo), Some(&hi)) => &self.dates[lo..=hi],
            _ => &self.dates[..0],
        };
        let mut values = Vec::with_capacity(indices.len());
        SeriesWindows::gather(indices, &self.values, &mut values);
        TimeSeries { dates, values }
    }
}

/// Extract the time series of pixel `(row, col)` from a `(time, rows, cols)`
/// stack.
///
/// Parameters
/// ----------
/// - `stack`: `&ArrayView3<f64>`
///   Input stack; NaN or ±∞ marks a missing observation.
/// - `row`, `col`: `usize`
///   Pixel coordinate; must be in bounds.
/// - `dates`: `&[i64]`
///   Acquisition dates, one per time slice.
///
/// Returns
/// -------
/// `MonitorResult<TimeSeries>` with exactly `stack.shape()[0]` entries.
///
/// Errors
/// ------
/// - Propagates the length and ordering checks of [`TimeSeries::new`].
///
/// Panics
/// ------
/// - Panics if `(row, col)` is outside the stack's spatial extent.
pub fn extract_series<'d>(
    stack: &ArrayView3<f64>, row: usize, col: usize, dates: &'d [i64],
) -> MonitorResult<TimeSeries<'d>> {
    let mut values = Vec::with_capacity(stack.shape()[0]);
    fill_pixel_values(stack, row, col, &mut values);
    TimeSeries::new(dates, values)
}

/// Overwrite `buf` with pixel `(row, col)` along the time axis.
///
/// Used by the dispatcher to reuse one buffer per worker instead of
/// allocating a [`TimeSeries`] per pixel.
#[inline]
pub(crate) fn fill_pixel_values(stack: &ArrayView3<f64>, row: usize, col: usize, buf: &mut Vec<f64>) {
    buf.clear();
    buf.extend(stack.slice(s![.., row, col]).iter().copied());
}

/// PeriodSplit — history / monitoring cut points in the date domain.
///
/// Invariants
/// ----------
/// - `history_start < monitor_start` (enforced by [`PeriodSplit::new`]).
/// - Whether `monitor_start` lies within a given date range is checked
///   against the actual dates in `validation::validate_request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSplit {
    history_start: i64,
    monitor_start: i64,
}

impl PeriodSplit {
    /// Errors with `MonitorError::InvalidSplit` unless
    /// `history_start < monitor_start`.
    pub fn new(history_start: i64, monitor_start: i64) -> MonitorResult<Self> {
        if history_start >= monitor_start {
            return Err(MonitorError::InvalidSplit { history_start, monitor_start });
        }
        Ok(PeriodSplit { history_start, monitor_start })
    }

    pub fn history_start(&self) -> i64 {
        self.history_start
    }

    pub fn monitor_start(&self) -> i64 {
        self.monitor_start
    }

    /// Resolve the split against `dates` into history / monitoring indices.
    pub fn windows(&self, dates: &[i64]) -> SeriesWindows {
        let mut history = Vec::new();
        let mut monitor = Vec::new();
        for (idx, &date) in dates.iter().enumerate() {
            if date >= self.monitor_start {
                monitor.push(idx);
            } else if date >= self.history_start {
                history.push(idx);
            }
        }
        SeriesWindows { history, monitor }
    }
}

/// SeriesWindows — time indices of the history and monitoring periods.
///
/// Both index lists are strictly increasing and disjoint; every history
/// index precedes every monitoring index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesWindows {
    history: Vec<usize>,
    monitor: Vec<usize>,
}

impl SeriesWindows {
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn monitor(&self) -> &[usize] {
        &self.monitor
    }

    /// Gather the values at `indices` from a full-length series into `buf`.
    #[inline]
    pub(crate) fn gather(indices: &[usize], values: &[f64], buf: &mut Vec<f64>) {
        buf.clear();
        buf.extend(indices.iter().map(|&i| values[i]));
    }
}
