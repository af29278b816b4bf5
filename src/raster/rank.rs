//! raster::rank — rank resolution and per-rank elementwise kernels.
//!
//! Purpose
//! -------
//! Band-math entry points accept dynamic-rank views. The rank is resolved
//! once into [`Rank`] and each arm converts the views to a fixed
//! dimensionality (`Ix1`, `Ix2`, `Ix3`) before running a parallel `Zip`,
//! so the inner loop is monomorphized per rank.
//!
//! Invariants & assumptions
//! ------------------------
//! - All operands have identical shapes; checked before dispatch.
//! - Results are returned as `ArrayD<f64>` with the operands' shape.
use crate::raster::errors::{RasterError, RasterResult};
use ndarray::{ArrayD, ArrayViewD, Dimension, Ix1, Ix2, Ix3, Zip};

const SUPPORTED_RANKS: &str = "1, 2 or 3";

/// Supported band-array ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    One,
    Two,
    Three,
}

impl Rank {
    /// Errors with `RasterError::UnsupportedRank` outside `1..=3`.
    pub fn from_ndim(ndim: usize) -> RasterResult<Self> {
        match ndim {
            1 => Ok(Rank::One),
            2 => Ok(Rank::Two),
            3 => Ok(Rank::Three),
            _ => Err(RasterError::UnsupportedRank { ndim, expected: SUPPORTED_RANKS }),
        }
    }

    pub fn ndim(self) -> usize {
        match self {
            Rank::One => 1,
            Rank::Two => 2,
            Rank::Three => 3,
        }
    }
}

/// Apply `f` elementwise over two equally shaped arrays.
pub(crate) fn map_binary<F>(a: ArrayViewD<f64>, b: ArrayViewD<f64>, f: F) -> RasterResult<ArrayD<f64>>
where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    ensure_same_shape(&a, &b)?;
    match Rank::from_ndim(a.ndim())? {
        Rank::One => zip_binary::<Ix1, _>(a, b, f),
        Rank::Two => zip_binary::<Ix2, _>(a, b, f),
        Rank::Three => zip_binary::<Ix3, _>(a, b, f),
    }
}

/// Apply `f` elementwise over three equally shaped arrays.
pub(crate) fn map_ternary<F>(
    a: ArrayViewD<f64>, b: ArrayViewD<f64>, c: ArrayViewD<f64>, f: F,
) -> RasterResult<ArrayD<f64>>
where
    F: Fn(f64, f64, f64) -> f64 + Sync + Send,
{
    ensure_same_shape(&a, &b)?;
    ensure_same_shape(&a, &c)?;
    match Rank::from_ndim(a.ndim())? {
        Rank::One => zip_ternary::<Ix1, _>(a, b, c, f),
        Rank::Two => zip_ternary::<Ix2, _>(a, b, c, f),
        Rank::Three => zip_ternary::<Ix3, _>(a, b, c, f),
    }
}

fn ensure_same_shape(a: &ArrayViewD<f64>, b: &ArrayViewD<f64>) -> RasterResult<()> {
    if a.shape() != b.shape() {
        return Err(RasterError::ShapeMismatch {
            expected: a.shape().to_vec(),
            found: b.shape().to_vec(),
        });
    }
    Ok(())
}

fn fixed<D: Dimension>(view: ArrayViewD<'_, f64>) -> RasterResult<ndarray::ArrayView<'_, f64, D>> {
    let ndim = view.ndim();
    view.into_dimensionality::<D>()
        .map_err(|_| RasterError::UnsupportedRank { ndim, expected: SUPPORTED_RANKS })
}

fn zip_binary<D, F>(a: ArrayViewD<f64>, b: ArrayViewD<f64>, f: F) -> RasterResult<ArrayD<f64>>
where
    D: Dimension,
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    let (a, b) = (fixed::<D>(a)?, fixed::<D>(b)?);
    Ok(Zip::from(&a).and(&b).par_map_collect(|&x, &y| f(x, y)).into_dyn())
}

fn zip_ternary<D, F>(
    a: ArrayViewD<f64>, b: ArrayViewD<f64>, c: ArrayViewD<f64>, f: F,
) -> RasterResult<ArrayD<f64>>
where
    D: Dimension,
    F: Fn(f64, f64, f64) -> f64 + Sync + Send,
{
    let (a, b, c) = (fixed::<D>(a)?, fixed::<D>(b)?, fixed::<D>(c)?);
    Ok(Zip::from(&a).and(&b).and(&c).par_map_collect(|&x, &y, &z| f(x, y, z)).into_dyn())
}
