//! monitor::dispatch — batch break monitoring over a raster stack.
//!
//! Purpose
//! -------
//! Run the per-pixel pipeline (extract → fit history → build process →
//! detect) for every pixel of a `(time, rows, cols)` stack and assemble the
//! `(2, rows, cols)` output stack of break dates and magnitudes.
//!
//! Key behaviors
//! -------------
//! - All argument checks run once, up front, through
//!   `validation::validate_request`; nothing is computed for an invalid
//!   request.
//! - Everything that does not depend on pixel values (history/monitoring
//!   windows, model times, the boundary) is resolved once into a shared
//!   read-only `PixelContext`.
//! - Pixels are processed in parallel over disjoint chunks of the flattened
//!   pixel range; each chunk owns the matching slices of the output
//!   channels and one set of scratch buffers.
//! - Degenerate pixels (insufficient history, zero variance, no monitoring
//!   data) resolve to the `(0, 0.0)` sentinel without failing the batch.
//! - [`monitor_stack_cancellable`] checks a caller-owned `AtomicBool` before
//!   each pixel and reports which pixels were completed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output cells depend only on their own pixel's series, so results are
//!   bit-identical for any chunk size or worker count.
//! - No locks: workers share only immutable data.
//!
//! Conventions
//! -----------
//! - Channel [`BREAK_DATE_CHANNEL`] holds the break date in the caller's date
//!   units as `f64` (0 for none); channel [`MAGNITUDE_CHANNEL`] holds the
//!   non-negative magnitude (0.0 for none).
//! - Model time is the date mapped through `DateFormat::model_time` and
//!   shifted so that the first history date is 0.
//!
//! Downstream usage
//! ----------------
//! - `monitor_stack` is the main entry point; `monitor_stack_dyn` accepts a
//!   dynamic-rank view; `monitor_pixel` runs the same pipeline on a single
//!   [`TimeSeries`].
use crate::monitor::{
    boundary::Boundary,
    detector::{BreakResult, detect_break},
    errors::{MonitorError, MonitorResult},
    model::HarmonicModel,
    options::{MagnitudeKind, MonitorOptions},
    process::MonitoringProcess,
    series::{PeriodSplit, SeriesWindows, TimeSeries, fill_pixel_values},
    validation::validate_request,
};
use ndarray::{Array2, Array3, ArrayView3, ArrayViewD, Ix3};
use rayon::{ThreadPoolBuilder, prelude::*};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// `(2, rows, cols)` array of break dates and magnitudes.
pub type OutputStack = Array3<f64>;

/// Index of the break-date channel in an [`OutputStack`].
pub const BREAK_DATE_CHANNEL: usize = 0;

/// Index of the magnitude channel in an [`OutputStack`].
pub const MAGNITUDE_CHANNEL: usize = 1;

/// MonitorRun — result of a possibly cancelled batch.
///
/// Fields
/// ------
/// - `output`: [`OutputStack`]
///   Valid for every pixel whose `processed` flag is set; untouched pixels
///   hold the sentinel.
/// - `processed`: `Array2<bool>`
///   `(rows, cols)` mask of completed pixels.
/// - `cancelled`: `bool`
///   `true` when at least one pixel was skipped due to cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRun {
    pub output: OutputStack,
    pub processed: Array2<bool>,
    pub cancelled: bool,
}

/// Detect structural breaks for every pixel of a `(time, rows, cols)` stack.
///
/// Parameters
/// ----------
/// - `stack`: `ArrayView3<f64>`
///   Observations; NaN or ±∞ marks a missing value.
/// - `dates`: `&[i64]`
///   One strictly increasing date per time slice.
/// - `history_start`, `monitor_start`: `i64`
///   History window `[history_start, monitor_start)`, monitoring window
///   `≥ monitor_start`; `monitor_start` must not exceed the last date.
/// - `level`: `f64`
///   Boundary coverage in `(0, 1]`; lower values detect more breaks.
/// - `options`: `&MonitorOptions`
///
/// Returns
/// -------
/// `MonitorResult<OutputStack>` of shape `(2, rows, cols)`.
///
/// Errors
/// ------
/// - Any argument error of `validation::validate_request`,
///   `MonitorError::InvalidSplit`, or `MonitorError::ThreadPool`.
pub fn monitor_stack(
    stack: ArrayView3<f64>, dates: &[i64], history_start: i64, monitor_start: i64, level: f64,
    options: &MonitorOptions,
) -> MonitorResult<OutputStack> {
    let never = AtomicBool::new(false);
    let run = monitor_stack_cancellable(
        stack,
        dates,
        history_start,
        monitor_start,
        level,
        options,
        &never,
    )?;
    Ok(run.output)
}

/// [`monitor_stack`] for a dynamic-rank view.
///
/// Errors
/// ------
/// - `MonitorError::InvalidStackRank` when `stack.ndim() != 3`, plus every
///   error of [`monitor_stack`].
pub fn monitor_stack_dyn(
    stack: ArrayViewD<f64>, dates: &[i64], history_start: i64, monitor_start: i64, level: f64,
    options: &MonitorOptions,
) -> MonitorResult<OutputStack> {
    let ndim = stack.ndim();
    let stack = stack
        .into_dimensionality::<Ix3>()
        .map_err(|_| MonitorError::InvalidStackRank { ndim })?;
    monitor_stack(stack, dates, history_start, monitor_start, level, options)
}

/// [`monitor_stack`] with cooperative cancellation.
///
/// Workers check `cancel` before each pixel; once it is set, remaining
/// pixels are skipped and keep the sentinel. Pixels completed before the
/// flag was observed stay valid and are marked in `processed`.
pub fn monitor_stack_cancellable(
    stack: ArrayView3<f64>, dates: &[i64], history_start: i64, monitor_start: i64, level: f64,
    options: &MonitorOptions, cancel: &AtomicBool,
) -> MonitorResult<MonitorRun> {
    let split = PeriodSplit::new(history_start, monitor_start)?;
    let (time_len, rows, cols) = stack.dim();
    validate_request(time_len, dates, &split, level, options)?;

    let ctx = PixelContext::new(dates, &split, level, options)?;
    let n_pixels = rows * cols;
    let chunk = options.pixels_per_chunk;
    debug!(
        time_len,
        rows,
        cols,
        n_history = ctx.windows.history().len(),
        n_monitor = ctx.windows.monitor().len(),
        lambda = ctx.boundary.critical_value(),
        pixels_per_chunk = chunk,
        num_threads = ?options.num_threads,
        "starting break monitoring batch"
    );

    let mut break_dates = vec![0.0_f64; n_pixels];
    let mut magnitudes = vec![0.0_f64; n_pixels];
    let mut processed = vec![false; n_pixels];

    let mut run = || {
        break_dates
            .par_chunks_mut(chunk)
            .zip(magnitudes.par_chunks_mut(chunk))
            .zip(processed.par_chunks_mut(chunk))
            .enumerate()
            .map(|(chunk_idx, ((date_chunk, mag_chunk), done_chunk))| {
                let start = chunk_idx * chunk;
                let mut scratch = PixelScratch::with_capacity(time_len, &ctx.windows);
                let mut n_done = 0_usize;
                let mut n_breaks = 0_usize;

                for local in 0..date_chunk.len() {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    let pix = start + local;
                    fill_pixel_values(&stack, pix / cols, pix % cols, &mut scratch.values);
                    let result = ctx.evaluate(&mut scratch);

                    date_chunk[local] = result.date_value();
                    mag_chunk[local] = result.magnitude;
                    done_chunk[local] = true;
                    n_done += 1;
                    n_breaks += usize::from(result.is_break());
                }
                trace!(chunk = chunk_idx, pixels = n_done, breaks = n_breaks, "chunk complete");
                (n_done, n_breaks)
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    };

    let (n_done, n_breaks) = match options.num_threads {
        Some(n) => ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| MonitorError::ThreadPool(e.to_string()))?
            .install(run),
        None => run(),
    };
    let cancelled = n_done < n_pixels;
    debug!(n_pixels, processed = n_done, breaks = n_breaks, cancelled, "break monitoring batch finished");

    let output = Array3::from_shape_fn((2, rows, cols), |(channel, r, c)| {
        let pix = r * cols + c;
        if channel == BREAK_DATE_CHANNEL { break_dates[pix] } else { magnitudes[pix] }
    });
    let processed = Array2::from_shape_fn((rows, cols), |(r, c)| processed[r * cols + c]);
    Ok(MonitorRun { output, processed, cancelled })
}

/// Run the monitoring pipeline on a single pixel series.
///
/// Applies the same argument checks as [`monitor_stack`] with the series
/// length as the time dimension.
///
/// Returns
/// -------
/// `MonitorResult<BreakResult>` — [`BreakResult::NO_BREAK`] for degenerate
/// series.
pub fn monitor_pixel(
    series: &TimeSeries<'_>, split: &PeriodSplit, level: f64, options: &MonitorOptions,
) -> MonitorResult<BreakResult> {
    validate_request(series.len(), series.dates(), split, level, options)?;
    let ctx = PixelContext::new(series.dates(), split, level, options)?;
    let mut scratch = PixelScratch::with_capacity(series.len(), &ctx.windows);
    scratch.values.extend_from_slice(series.values());
    Ok(ctx.evaluate(&mut scratch))
}

/// Data-independent state shared by every pixel of a batch.
struct PixelContext {
    windows: SeriesWindows,
    history_times: Vec<f64>,
    monitor_times: Vec<f64>,
    monitor_dates: Vec<i64>,
    boundary: Boundary,
    order: usize,
    period: f64,
    magnitude: MagnitudeKind,
}

impl PixelContext {
    fn new(
        dates: &[i64], split: &PeriodSplit, level: f64, options: &MonitorOptions,
    ) -> MonitorResult<Self> {
        let windows = split.windows(dates);
        let format = options.date_format;
        let origin = match windows.history().first() {
            Some(&i) => format.model_time(dates[i])?,
            None => 0.0,
        };
        let to_times = |indices: &[usize]| -> MonitorResult<Vec<f64>> {
            indices.iter().map(|&i| format.model_time(dates[i]).map(|t| t - origin)).collect()
        };
        let history_times = to_times(windows.history())?;
        let monitor_times = to_times(windows.monitor())?;
        let monitor_dates = windows.monitor().iter().map(|&i| dates[i]).collect();
        let boundary = Boundary::new(level, windows.monitor().len())?;

        Ok(PixelContext {
            windows,
            history_times,
            monitor_times,
            monitor_dates,
            boundary,
            order: options.order,
            period: options.season_length(),
            magnitude: options.magnitude,
        })
    }

    /// Evaluate the pixel whose full series is in `scratch.values`.
    fn evaluate(&self, scratch: &mut PixelScratch) -> BreakResult {
        SeriesWindows::gather(self.windows.history(), &scratch.values, &mut scratch.history);
        let model = match HarmonicModel::fit(&self.history_times, &scratch.history, self.order, self.period) {
            Ok(model) => model,
            Err(err) => {
                trace!(%err, "history fit failed; pixel has no break");
                return BreakResult::NO_BREAK;
            }
        };

        SeriesWindows::gather(self.windows.monitor(), &scratch.values, &mut scratch.monitor);
        scratch.process.rebuild(&model, &self.monitor_times, &scratch.monitor);
        detect_break(&scratch.process, &self.boundary, &self.monitor_dates, self.magnitude)
    }
}

/// Per-worker buffers reused across the pixels of one chunk.
struct PixelScratch {
    values: Vec<f64>,
    history: Vec<f64>,
    monitor: Vec<f64>,
    process: MonitoringProcess,
}

impl PixelScratch {
    fn with_capacity(time_len: usize, windows: &SeriesWindows) -> Self {
        PixelScratch {
            values: Vec::with_capacity(time_len),
            history: Vec::with_capacity(windows.history().len()),
            monitor: Vec::with_capacity(windows.monitor().len()),
            process: MonitoringProcess::default(),
        }
    }
}
