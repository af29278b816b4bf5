//! monitor::detector — first-crossing break detection.
//!
//! Purpose
//! -------
//! Scan a [`MonitoringProcess`] against a [`Boundary`] and report the first
//! monitoring position where `|S_k| > b_k`, together with a magnitude.
//!
//! Key behaviors
//! -------------
//! - [`BreakDetector`] is a small state machine:
//!   `Scanning → BreakFound` or `Scanning → Exhausted`, both terminal.
//! - [`detect_break`] drives a detector to completion and returns the
//!   [`BreakResult`] value object written into the output stack.
//! - No crossing yields [`BreakResult::NO_BREAK`], which encodes to the
//!   `(0, 0.0)` sentinel.
//!
//! Invariants & assumptions
//! ------------------------
//! - `process.len() == boundary.len() == monitor_dates.len()`.
//! - A reported magnitude is finite and non-negative: the process only
//!   accumulates finite observations, and a crossing always lands on one.
use crate::monitor::{boundary::Boundary, options::MagnitudeKind, process::MonitoringProcess};

/// BreakResult — outcome for one pixel.
///
/// Fields
/// ------
/// - `break_date`: `Option<i64>`
///   Date of the first crossing, `None` if no break was found.
/// - `magnitude`: `f64`
///   Non-negative break size under the configured [`MagnitudeKind`];
///   `0.0` when no break was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakResult {
    pub break_date: Option<i64>,
    pub magnitude: f64,
}

impl BreakResult {
    /// The "no break" outcome.
    pub const NO_BREAK: BreakResult = BreakResult { break_date: None, magnitude: 0.0 };

    /// Break date as written to the output channel (`0.0` when none).
    pub fn date_value(&self) -> f64 {
        self.break_date.map_or(0.0, |d| d as f64)
    }

    pub fn is_break(&self) -> bool {
        self.break_date.is_some()
    }
}

/// DetectorState — progress of a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorState {
    /// Next position to examine (0-based).
    Scanning { position: usize },
    BreakFound(BreakResult),
    Exhausted,
}

/// BreakDetector — stepwise scan of one process against one boundary.
#[derive(Debug)]
pub struct BreakDetector<'a> {
    process: &'a MonitoringProcess,
    boundary: &'a Boundary,
    monitor_dates: &'a [i64],
    magnitude: MagnitudeKind,
    state: DetectorState,
}

impl<'a> BreakDetector<'a> {
    /// Panics
    /// ------
    /// - Panics if the process, boundary and dates lengths disagree.
    pub fn new(
        process: &'a MonitoringProcess, boundary: &'a Boundary, monitor_dates: &'a [i64],
        magnitude: MagnitudeKind,
    ) -> Self {
        assert_eq!(process.len(), boundary.len(), "process and boundary must be aligned");
        assert_eq!(process.len(), monitor_dates.len(), "process and dates must be aligned");
        BreakDetector {
            process,
            boundary,
            monitor_dates,
            magnitude,
            state: DetectorState::Scanning { position: 0 },
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Examine one position. Terminal states are left unchanged.
    pub fn step(&mut self) -> DetectorState {
        if let DetectorState::Scanning { position } = self.state {
            self.state = if position >= self.process.len() {
                DetectorState::Exhausted
            } else {
                let s_k = self.process.values()[position];
                if s_k.abs() > self.boundary.at(position) {
                    DetectorState::BreakFound(self.result_at(position))
                } else {
                    DetectorState::Scanning { position: position + 1 }
                }
            };
        }
        self.state
    }

    /// Step until a terminal state is reached.
    pub fn run(&mut self) -> BreakResult {
        loop {
            match self.step() {
                DetectorState::Scanning { .. } => continue,
                DetectorState::BreakFound(result) => return result,
                DetectorState::Exhausted => return BreakResult::NO_BREAK,
            }
        }
    }

    fn result_at(&self, position: usize) -> BreakResult {
        let magnitude = match self.magnitude {
            MagnitudeKind::Process => self.process.values()[position].abs(),
            // A crossing can only happen where the process moved, i.e. at a
            // valid observation, so the residual is present.
            MagnitudeKind::Residual => self.process.residual(position).abs(),
        };
        BreakResult { break_date: Some(self.monitor_dates[position]), magnitude }
    }
}

/// Find the first boundary crossing of `process`.
///
/// Parameters
/// ----------
/// - `process`: `&MonitoringProcess`
/// - `boundary`: `&Boundary`
///   Same length as `process`.
/// - `monitor_dates`: `&[i64]`
///   Date of each monitoring position.
/// - `magnitude`: [`MagnitudeKind`]
///
/// Returns
/// -------
/// [`BreakResult`] for the first `k` with `|S_k| > b_k`, or
/// [`BreakResult::NO_BREAK`].
pub fn detect_break(
    process: &MonitoringProcess, boundary: &Boundary, monitor_dates: &[i64], magnitude: MagnitudeKind,
) -> BreakResult {
    BreakDetector::new(process, boundary, monitor_dates, magnitude).run()
}
