//! eo_breaks — per-pixel structural break monitoring for Earth-observation
//! raster stacks.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers. The crate detects, for every
//! pixel of a `(time, rows, cols)` stack, the first date after a stable
//! history period at which observations leave a fitted trend + seasonal
//! baseline, and ships the array-level collaborators (band indices,
//! temporal composites, spatial filters) that usually surround that step.
//!
//! Key behaviors
//! -------------
//! - [`monitor`] implements the break-monitoring pipeline: series
//!   extraction, history model fit, cumulative residual process, boundary
//!   evaluation, first-crossing detection and the parallel pixel
//!   dispatcher.
//! - [`raster`] implements normalized-difference indices, EVI, median and
//!   mean composites over time, and a 2-D median filter.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are `ndarray` views of `f64`. NaN marks missing data; the
//!   monitoring pipeline also treats ±∞ as missing.
//! - Invalid arguments are reported as typed errors
//!   ([`monitor::MonitorError`], [`raster::RasterError`]) before any
//!   computation; per-pixel degeneracies never fail a batch.
//!
//! Conventions
//! -----------
//! - Axis 0 is time for every stack-shaped input.
//! - Parallelism uses rayon; results never depend on the worker count.
//! - Diagnostics are emitted through `tracing`; the crate installs no
//!   subscriber.
//!
//! Downstream usage
//! ----------------
//! - Import `eo_breaks::monitor::prelude::*` for batch monitoring and
//!   `eo_breaks::raster` for the band/composite helpers.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each module; `tests/integration_*.rs` exercise
//!   the public surface end to end.

pub mod monitor;
pub mod raster;
