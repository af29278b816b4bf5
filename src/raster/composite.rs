//! raster::composite — reductions over the leading time axis.
//!
//! Purpose
//! -------
//! Collapse a `(time, …)` stack into one value per spatial (and band)
//! cell: a median composite for cloud-robust mosaics and a temporal mean.
//!
//! Key behaviors
//! -------------
//! - Axis 0 is always time; the result has the input shape minus axis 0.
//! - With `skip_na = true`, missing (NaN) observations are excluded and a
//!   lane with no valid observation yields NaN. With `skip_na = false`,
//!   any missing observation in a lane makes the result NaN.
//! - Median of an even number of values is the mean of the two middle
//!   values.
//! - Lanes are reduced in parallel with `Zip::par_map_collect`.
use crate::raster::{
    errors::{RasterError, RasterResult},
    median::nan_median,
};
use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis, Zip};

/// Per-cell temporal median of a 3-D `(time, y, x)` or 4-D
/// `(time, band, y, x)` stack.
///
/// Errors
/// ------
/// - `RasterError::UnsupportedRank` for ranks other than 3 or 4.
/// - `RasterError::EmptyTimeAxis` when the time axis has length 0.
pub fn median_composite(stack: ArrayViewD<f64>, skip_na: bool) -> RasterResult<ArrayD<f64>> {
    check_time_stack(&stack, &[3, 4], "3 or 4")?;
    Ok(Zip::from(stack.lanes(Axis(0))).par_map_collect(|lane| lane_median(lane, skip_na)))
}

/// Per-cell temporal mean of a 1-D to 4-D stack.
///
/// A 1-D input reduces to a 0-D array; see [`temporal_mean_1d`] for the
/// scalar form.
///
/// Errors
/// ------
/// - `RasterError::UnsupportedRank` for rank 0 or above 4.
/// - `RasterError::EmptyTimeAxis` when the time axis has length 0.
pub fn temporal_mean(stack: ArrayViewD<f64>, skip_na: bool) -> RasterResult<ArrayD<f64>> {
    check_time_stack(&stack, &[1, 2, 3, 4], "1 to 4")?;
    Ok(Zip::from(stack.lanes(Axis(0))).par_map_collect(|lane| lane_mean(lane, skip_na)))
}

/// Mean of a single series.
///
/// Errors
/// ------
/// - `RasterError::EmptyTimeAxis` for an empty series.
pub fn temporal_mean_1d(series: ArrayView1<f64>, skip_na: bool) -> RasterResult<f64> {
    if series.is_empty() {
        return Err(RasterError::EmptyTimeAxis);
    }
    Ok(lane_mean(series, skip_na))
}

fn check_time_stack(stack: &ArrayViewD<f64>, ranks: &[usize], expected: &'static str) -> RasterResult<()> {
    let ndim = stack.ndim();
    if !ranks.contains(&ndim) {
        return Err(RasterError::UnsupportedRank { ndim, expected });
    }
    if stack.len_of(Axis(0)) == 0 {
        return Err(RasterError::EmptyTimeAxis);
    }
    Ok(())
}

fn lane_median(lane: ArrayView1<f64>, skip_na: bool) -> f64 {
    if !skip_na && lane.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let mut values = lane.to_vec();
    nan_median(&mut values)
}

fn lane_mean(lane: ArrayView1<f64>, skip_na: bool) -> f64 {
    if !skip_na {
        return lane.sum() / lane.len() as f64;
    }
    let (sum, count) = lane
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0_usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}
