//! monitor::validation — fail-fast guards for batch monitoring requests.
//!
//! Purpose
//! -------
//! Centralize the argument checks that must pass before any pixel is
//! processed: stack/date shape agreement, strictly increasing dates, split
//! points inside the date range, a level in `(0, 1]`, and valid options.
//!
//! Key behaviors
//! -------------
//! - [`validate_request`] is the single entry point used by the dispatcher.
//! - [`validate_dates`] and [`validate_level`] are reused by the smaller
//!   entry points (`TimeSeries::new`, `Boundary::new`).
//!
//! Conventions
//! -----------
//! - Purely about validation: no allocation beyond error construction.
//! - The first violated constraint is reported; checks run in the order
//!   shape → dates → split → level → options.
use crate::monitor::{
    errors::{MonitorError, MonitorResult},
    options::{DateFormat, MonitorOptions},
    series::PeriodSplit,
};

/// Validate a complete monitoring request.
///
/// Parameters
/// ----------
/// - `time_len`: `usize`
///   Size of the stack's leading (time) axis.
/// - `dates`: `&[i64]`
///   Acquisition dates; must have `time_len` strictly increasing entries.
/// - `split`: `&PeriodSplit`
///   Cut points; `monitor_start` must not exceed the last date.
/// - `level`: `f64`
///   Boundary level in `(0, 1]`.
/// - `options`: `&MonitorOptions`
///   Model and execution settings.
///
/// Returns
/// -------
/// `MonitorResult<()>` — `Ok(())` when every constraint holds.
///
/// Errors
/// ------
/// - `EmptyDates`, `DatesLengthMismatch`, `DatesNotIncreasing`,
///   `MonitorStartOutOfRange`, `InvalidLevel`, any option error, and
///   `InvalidCalendarDate` when `DateFormat::Yyyymmdd` is selected and a
///   date cannot be parsed.
pub fn validate_request(
    time_len: usize, dates: &[i64], split: &PeriodSplit, level: f64, options: &MonitorOptions,
) -> MonitorResult<()> {
    if dates.len() != time_len {
        return Err(MonitorError::DatesLengthMismatch { time_len, dates_len: dates.len() });
    }
    validate_dates(dates)?;

    let last_date = *dates.last().ok_or(MonitorError::EmptyDates)?;
    if split.monitor_start() > last_date {
        return Err(MonitorError::MonitorStartOutOfRange {
            monitor_start: split.monitor_start(),
            last_date,
        });
    }

    validate_level(level)?;
    options.validate()?;

    if options.date_format == DateFormat::Yyyymmdd {
        for &date in dates {
            options.date_format.model_time(date)?;
        }
    }
    Ok(())
}

/// Require a non-empty, strictly increasing date vector.
pub fn validate_dates(dates: &[i64]) -> MonitorResult<()> {
    if dates.is_empty() {
        return Err(MonitorError::EmptyDates);
    }
    for (index, pair) in dates.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(MonitorError::DatesNotIncreasing {
                index: index + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}

/// Require `level` to be finite and in `(0, 1]`.
pub fn validate_level(level: f64) -> MonitorResult<()> {
    if !level.is_finite() || level <= 0.0 || level > 1.0 {
        return Err(MonitorError::InvalidLevel { level });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover every error branch of `validate_request` and a
    // success path. Option-level branches are covered in `options`.
    // -------------------------------------------------------------------------

    fn ordinal_dates(n: i64) -> Vec<i64> {
        (0..n).collect()
    }

    #[test]
    // Purpose
    // -------
    // Verify that a well-formed request passes.
    //
    // Given
    // -----
    // - 100 ordinal dates, split (0, 50), level 0.5, default options.
    //
    // Expect
    // ------
    // - `Ok(())`.
    fn validate_request_accepts_well_formed_input() {
        // Arrange
        let dates = ordinal_dates(100);
        let split = PeriodSplit::new(0, 50).unwrap();

        // Act
        let result = validate_request(100, &dates, &split, 0.5, &MonitorOptions::default());

        // Assert
        assert!(result.is_ok(), "Got: {result:?}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure a time-length mismatch is reported before anything else.
    //
    // Given
    // -----
    // - time_len = 99 with 100 dates.
    //
    // Expect
    // ------
    // - `DatesLengthMismatch { time_len: 99, dates_len: 100 }`.
    fn validate_request_rejects_length_mismatch() {
        // Arrange
        let dates = ordinal_dates(100);
        let split = PeriodSplit::new(0, 50).unwrap();

        // Act
        let result = validate_request(99, &dates, &split, 0.5, &MonitorOptions::default());

        // Assert
        assert_eq!(
            result,
            Err(MonitorError::DatesLengthMismatch { time_len: 99, dates_len: 100 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure duplicate or decreasing dates are rejected with the index of
    // the first offending entry.
    //
    // Given
    // -----
    // - dates = [0, 1, 1, 2].
    //
    // Expect
    // ------
    // - `DatesNotIncreasing { index: 2, .. }`.
    fn validate_dates_rejects_repeated_dates() {
        // Act
        let result = validate_dates(&[0, 1, 1, 2]);

        // Assert
        assert_eq!(
            result,
            Err(MonitorError::DatesNotIncreasing { index: 2, previous: 1, current: 1 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure `monitor_start` past the last date is rejected.
    //
    // Given
    // -----
    // - 10 dates (0..=9), monitor_start = 10.
    //
    // Expect
    // ------
    // - `MonitorStartOutOfRange`.
    fn validate_request_rejects_monitor_start_after_last_date() {
        // Arrange
        let dates = ordinal_dates(10);
        let split = PeriodSplit::new(0, 10).unwrap();

        // Act
        let result = validate_request(10, &dates, &split, 0.5, &MonitorOptions::default());

        // Assert
        assert_eq!(
            result,
            Err(MonitorError::MonitorStartOutOfRange { monitor_start: 10, last_date: 9 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the level domain `(0, 1]`.
    //
    // Given
    // -----
    // - 0.0, -0.1, 1.0001, NaN, and the boundary value 1.0.
    //
    // Expect
    // ------
    // - Errors for the first four; `Ok` for 1.0.
    fn validate_level_enforces_half_open_unit_interval() {
        // Act / Assert
        for bad in [0.0, -0.1, 1.0001, f64::NAN] {
            assert!(
                matches!(validate_level(bad), Err(MonitorError::InvalidLevel { .. })),
                "level {bad} should be rejected"
            );
        }
        assert!(validate_level(1.0).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Ensure calendar dates are parsed up front when the calendar format
    // is selected.
    //
    // Given
    // -----
    // - dates [20200101, 20200199] with `DateFormat::Yyyymmdd`.
    //
    // Expect
    // ------
    // - `InvalidCalendarDate { date: 20200199 }`.
    fn validate_request_rejects_bad_calendar_dates() {
        // Arrange
        let dates = [20200101_i64, 20200199];
        let split = PeriodSplit::new(20200101, 20200199).unwrap();
        let opts = MonitorOptions { date_format: DateFormat::Yyyymmdd, ..Default::default() };

        // Act
        let result = validate_request(2, &dates, &split, 0.5, &opts);

        // Assert
        assert_eq!(result, Err(MonitorError::InvalidCalendarDate { date: 20200199 }));
    }
}
