//! monitor::errors — argument and per-pixel fit errors for break monitoring.
//!
//! Purpose
//! -------
//! Provide the error enums and result aliases used by the break-monitoring
//! subtree, split into two families:
//!
//! - [`MonitorError`] covers *argument errors*: malformed shapes, bad split
//!   points, an invalid level or invalid options. They fail a whole batch
//!   call before any pixel is processed.
//! - [`FitError`] covers *degenerate-pixel conditions* raised while fitting
//!   the history model for a single pixel. They never reach the caller of
//!   the batch API; the dispatcher absorbs them into the "no break"
//!   sentinel for that pixel only.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every [`MonitorError`] variant carries the offending value(s) so that
//!   the `Display` message names the violated constraint without any extra
//!   context.
//! - Both enums are small, `Clone` and `PartialEq`.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of domain constraints ("history_start
//!   must be < monitor_start") rather than implementation details.
//! - Indices are 0-based.
//!
//! Testing notes
//! -------------
//! - Unit tests check that `Display` output embeds the payload of each
//!   variant that carries one.

/// Result alias for batch-level monitoring operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Result alias for the per-pixel history fit.
pub type FitResult<T> = Result<T, FitError>;

/// MonitorError — caller-visible argument errors.
///
/// Variants
/// --------
/// - `InvalidStackRank { ndim }`
///   The input stack is not three-dimensional `(time, rows, cols)`.
/// - `EmptyDates`
///   The date vector is empty, so no monitoring period can exist.
/// - `DatesLengthMismatch { time_len, dates_len }`
///   `dates.len()` differs from the stack's time dimension.
/// - `DatesNotIncreasing { index, previous, current }`
///   `dates[index]` is not strictly greater than `dates[index - 1]`.
/// - `InvalidSplit { history_start, monitor_start }`
///   `history_start >= monitor_start`.
/// - `MonitorStartOutOfRange { monitor_start, last_date }`
///   `monitor_start` falls after the last acquisition date.
/// - `InvalidLevel { level }`
///   `level` is not a finite value in `(0, 1]`.
/// - `InvalidPeriod { period }`
///   The seasonal period is not finite and strictly positive.
/// - `InvalidOrder { order, max }`
///   The harmonic order exceeds the supported maximum.
/// - `InvalidChunkSize`
///   `pixels_per_chunk == 0`.
/// - `InvalidThreadCount`
///   `num_threads == Some(0)`.
/// - `InvalidCalendarDate { date }`
///   A date is not a valid `YYYYMMDD` integer while the calendar date
///   format is selected.
/// - `ThreadPool(message)`
///   The dedicated worker pool could not be built.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    // ---- Shapes ----
    InvalidStackRank { ndim: usize },
    EmptyDates,
    DatesLengthMismatch { time_len: usize, dates_len: usize },
    DatesNotIncreasing { index: usize, previous: i64, current: i64 },

    // ---- Split points and level ----
    InvalidSplit { history_start: i64, monitor_start: i64 },
    MonitorStartOutOfRange { monitor_start: i64, last_date: i64 },
    InvalidLevel { level: f64 },

    // ---- Options ----
    InvalidPeriod { period: f64 },
    InvalidOrder { order: usize, max: usize },
    InvalidChunkSize,
    InvalidThreadCount,
    InvalidCalendarDate { date: i64 },

    // ---- Execution ----
    ThreadPool(String),
}

impl std::error::Error for MonitorError {}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            MonitorError::InvalidStackRank { ndim } => write!(
                f,
                "Input stack must be 3-dimensional (time, rows, cols), but got {ndim} dimensions."
            ),
            MonitorError::EmptyDates => {
                write!(f, "Dates must contain at least one acquisition date.")
            }
            MonitorError::DatesLengthMismatch { time_len, dates_len } => write!(
                f,
                "Time dimension of stack ({time_len}) does not match length of dates ({dates_len})."
            ),
            MonitorError::DatesNotIncreasing { index, previous, current } => write!(
                f,
                "Dates must be strictly increasing: dates[{index}] = {current} follows {previous}."
            ),

            // ---- Split points and level ----
            MonitorError::InvalidSplit { history_start, monitor_start } => write!(
                f,
                "history_start ({history_start}) must be < monitor_start ({monitor_start})."
            ),
            MonitorError::MonitorStartOutOfRange { monitor_start, last_date } => write!(
                f,
                "monitor_start ({monitor_start}) must be on or before the last date ({last_date})."
            ),
            MonitorError::InvalidLevel { level } => {
                write!(f, "Invalid level: {level}. Must be a finite value in (0, 1].")
            }

            // ---- Options ----
            MonitorError::InvalidPeriod { period } => {
                write!(f, "Invalid seasonal period: {period}. Must be finite and > 0.")
            }
            MonitorError::InvalidOrder { order, max } => {
                write!(f, "Invalid harmonic order: {order}. Must satisfy order ≤ {max}.")
            }
            MonitorError::InvalidChunkSize => write!(f, "pixels_per_chunk must be > 0."),
            MonitorError::InvalidThreadCount => write!(f, "num_threads must be > 0 when set."),
            MonitorError::InvalidCalendarDate { date } => {
                write!(f, "Invalid calendar date: {date}. Expected a YYYYMMDD integer.")
            }

            // ---- Execution ----
            MonitorError::ThreadPool(msg) => write!(f, "Failed to build worker pool: {msg}"),
        }
    }
}

/// FitError — reasons a single pixel's history model could not be fitted.
///
/// Variants
/// --------
/// - `InsufficientHistory { valid, required }`
///   Fewer non-missing history observations than model parameters plus
///   one degree of freedom.
/// - `SolveFailed(reason)`
///   The SVD least-squares solve rejected the system.
/// - `NonFiniteFit`
///   The solve produced non-finite coefficients or residual spread.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    InsufficientHistory { valid: usize, required: usize },
    SolveFailed(&'static str),
    NonFiniteFit,
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientHistory { valid, required } => write!(
                f,
                "Not enough history observations to fit model: {valid} valid, {required} required."
            ),
            FitError::SolveFailed(reason) => write!(f, "Least-squares solve failed: {reason}"),
            FitError::NonFiniteFit => write!(f, "Fitted model is not finite."),
        }
    }
}
