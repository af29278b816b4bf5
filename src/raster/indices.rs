//! raster::indices — spectral band indices.
//!
//! Purpose
//! -------
//! Elementwise band math on co-registered band arrays of rank 1, 2 or 3:
//! the generic normalized difference `(a − b)/(a + b)`, its common
//! aliases NDVI and NDWI, and the Enhanced Vegetation Index.
//!
//! Key behaviors
//! -------------
//! - Denominators with magnitude below [`DENOMINATOR_EPSILON`] yield `0.0`
//!   instead of ±∞ or NaN.
//! - NaN inputs propagate to NaN outputs.
//! - Computation runs in parallel through `ndarray::Zip`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All bands share one shape; otherwise `RasterError::ShapeMismatch`.
//! - Rank outside `1..=3` is `RasterError::UnsupportedRank`.
use crate::raster::{
    errors::RasterResult,
    rank::{map_binary, map_ternary},
};
use ndarray::{ArrayD, ArrayViewD};

/// Denominators below this magnitude produce `0.0`.
pub const DENOMINATOR_EPSILON: f64 = 1e-10;

/// EVI gain factor `G`.
pub const EVI_GAIN: f64 = 2.5;
/// EVI red aerosol coefficient `C1`.
pub const EVI_C1: f64 = 6.0;
/// EVI blue aerosol coefficient `C2`.
pub const EVI_C2: f64 = 7.5;
/// EVI canopy background adjustment `L`.
pub const EVI_L: f64 = 1.0;

#[inline]
fn normalized_difference_value(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.abs() < DENOMINATOR_EPSILON { 0.0 } else { (a - b) / sum }
}

/// Elementwise `(a − b)/(a + b)`.
///
/// Parameters
/// ----------
/// - `a`, `b`: `ArrayViewD<f64>`
///   Bands of identical shape and rank 1, 2 or 3.
///
/// Returns
/// -------
/// `RasterResult<ArrayD<f64>>` with the operands' shape.
///
/// Errors
/// ------
/// - `RasterError::ShapeMismatch`, `RasterError::UnsupportedRank`.
pub fn normalized_difference(a: ArrayViewD<f64>, b: ArrayViewD<f64>) -> RasterResult<ArrayD<f64>> {
    map_binary(a, b, normalized_difference_value)
}

/// NDVI = (NIR − Red)/(NIR + Red).
pub fn ndvi(nir: ArrayViewD<f64>, red: ArrayViewD<f64>) -> RasterResult<ArrayD<f64>> {
    normalized_difference(nir, red)
}

/// NDWI = (Green − NIR)/(Green + NIR).
pub fn ndwi(green: ArrayViewD<f64>, nir: ArrayViewD<f64>) -> RasterResult<ArrayD<f64>> {
    normalized_difference(green, nir)
}

/// EVI = G·(NIR − Red)/(NIR + C1·Red − C2·Blue + L).
///
/// Errors
/// ------
/// - Same as [`normalized_difference`], applied to all three bands.
pub fn enhanced_vegetation_index(
    nir: ArrayViewD<f64>, red: ArrayViewD<f64>, blue: ArrayViewD<f64>,
) -> RasterResult<ArrayD<f64>> {
    map_ternary(nir, red, blue, |n, r, b| {
        let denominator = n + EVI_C1 * r - EVI_C2 * b + EVI_L;
        if denominator.abs() < DENOMINATOR_EPSILON { 0.0 } else { EVI_GAIN * (n - r) / denominator }
    })
}
