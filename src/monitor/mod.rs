//! monitor — per-pixel structural break monitoring for raster stacks.
//!
//! Purpose
//! -------
//! Detect, for every pixel of a `(time, rows, cols)` stack, the first date
//! in a monitoring period at which observations depart from a trend +
//! harmonic model fitted on a stable history period. The output is a
//! `(2, rows, cols)` stack of break dates and break magnitudes.
//!
//! Key behaviors
//! -------------
//! - [`series`] extracts each pixel's ordered series and resolves the
//!   history / monitoring split.
//! - [`model`] fits the history model by SVD least squares.
//! - [`process`] builds the standardized cumulative sum of recursive
//!   residuals of the history model.
//! - [`boundary`] evaluates the level-dependent critical boundary.
//! - [`detector`] reports the first boundary crossing.
//! - [`dispatch`] runs the pipeline over all pixels in parallel with rayon,
//!   optionally on a dedicated pool and with cooperative cancellation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Argument errors ([`MonitorError`]) fail the whole call before any
//!   pixel is processed.
//! - Degenerate pixels never fail a batch; they resolve to the `(0, 0.0)`
//!   sentinel.
//! - Every pixel is independent, so outputs do not depend on scheduling.
//!
//! Conventions
//! -----------
//! - Any non-finite value (NaN, ±∞) is a missing observation everywhere in
//!   this subtree.
//! - `level` is the boundary coverage in `(0, 1]`: higher means a wider
//!   boundary and fewer detections; `1.0` disables detection.
//!
//! Downstream usage
//! ----------------
//! - Typical Rust code imports the main surface as:
//!
//!   ```rust,ignore
//!   use eo_breaks::monitor::prelude::*;
//!
//!   let out = monitor_stack(stack.view(), &dates, 0, 50, 0.95, &MonitorOptions::default())?;
//!   let break_dates = out.index_axis(ndarray::Axis(0), BREAK_DATE_CHANNEL);
//!   ```
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests for its own contract.
//! - `tests/integration_monitor_pipeline.rs` covers end-to-end scenarios,
//!   determinism, scheduling independence and level monotonicity.

pub mod boundary;
pub mod detector;
pub mod dispatch;
pub mod errors;
pub mod model;
pub mod options;
pub mod process;
pub mod series;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::boundary::{Boundary, critical_value};
pub use self::detector::{BreakDetector, BreakResult, DetectorState, detect_break};
pub use self::dispatch::{
    BREAK_DATE_CHANNEL, MAGNITUDE_CHANNEL, MonitorRun, OutputStack, monitor_pixel, monitor_stack,
    monitor_stack_cancellable, monitor_stack_dyn,
};
pub use self::errors::{FitError, FitResult, MonitorError, MonitorResult};
pub use self::model::HarmonicModel;
pub use self::options::{DateFormat, MagnitudeKind, MonitorOptions};
pub use self::process::MonitoringProcess;
pub use self::series::{PeriodSplit, SeriesWindows, TimeSeries, extract_series};
pub use self::validation::validate_request;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::dispatch::{
        BREAK_DATE_CHANNEL, MAGNITUDE_CHANNEL, MonitorRun, OutputStack, monitor_pixel,
        monitor_stack, monitor_stack_cancellable,
    };
    pub use super::errors::{MonitorError, MonitorResult};
    pub use super::options::{DateFormat, MagnitudeKind, MonitorOptions};
    pub use super::series::{PeriodSplit, TimeSeries};
}
