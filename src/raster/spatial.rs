//! raster::spatial — neighborhood filters on single 2-D bands.
use crate::raster::{
    errors::{RasterError, RasterResult},
    median::nan_median,
};
use ndarray::{Array2, ArrayView2, Zip, s};

/// Square median filter for salt-and-pepper noise.
///
/// Parameters
/// ----------
/// - `data`: `ArrayView2<f64>`
///   Band to filter; NaN marks a missing pixel.
/// - `kernel_size`: `usize`
///   Window side; odd and `> 0`.
///
/// Returns
/// -------
/// `RasterResult<Array2<f64>>` of the input shape.
///
/// Errors
/// ------
/// - `RasterError::InvalidKernelSize` for zero or even `kernel_size`.
///
/// Notes
/// -----
/// - Windows are clipped at the array edges rather than padded.
/// - NaN pixels inside a window are ignored; an all-NaN window yields NaN.
/// - A window with an even number of valid pixels (clipped at an edge or
///   thinned by NaN) yields the mean of its two middle values, not the
///   upper-middle element: the top-left cell of a 3×3 ramp `1..=9` filters
///   to 3.0, not 4.0.
pub fn median_filter_2d(data: ArrayView2<f64>, kernel_size: usize) -> RasterResult<Array2<f64>> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(RasterError::InvalidKernelSize { kernel_size });
    }
    let half = kernel_size / 2;
    let (height, width) = data.dim();

    Ok(Zip::indexed(&data).par_map_collect(|(y, x), _| {
        let window = data.slice(s![
            y.saturating_sub(half)..(y + half + 1).min(height),
            x.saturating_sub(half)..(x + half + 1).min(width)
        ]);
        let mut values: Vec<f64> = window.iter().copied().collect();
        nan_median(&mut values)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the interior median, edge clipping, NaN handling and
    // kernel validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify interior and corner values of a 3×3 filter.
    //
    // Given
    // -----
    // - [[1, 2, 3], [4, 5, 6], [7, 8, 9]], kernel 3.
    //
    // Expect
    // ------
    // - Center 5; top-left window {1, 2, 4, 5} → 3, the mean of the middle
    //   pair rather than the upper-middle 4.
    fn median_filter_interior_and_corner() {
        // Arrange
        let data = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);

        // Act
        let out = median_filter_2d(data.view(), 3).unwrap();

        // Assert
        assert_eq!(out[[1, 1]], 5.0);
        assert_eq!(out[[0, 0]], 3.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure an isolated spike is removed and NaN pixels are skipped.
    //
    // Given
    // -----
    // - A 3×3 field of 1.0 with a spike of 100 at the center and a NaN at
    //   (0, 1).
    //
    // Expect
    // ------
    // - Center becomes 1.0; the NaN cell is filled from its neighbors.
    fn median_filter_removes_spike_and_skips_missing() {
        // Arrange
        let mut data = Array2::<f64>::ones((3, 3));
        data[[1, 1]] = 100.0;
        data[[0, 1]] = f64::NAN;

        // Act
        let out = median_filter_2d(data.view(), 3).unwrap();

        // Assert
        assert_eq!(out[[1, 1]], 1.0);
        assert_eq!(out[[0, 1]], 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify kernel-size validation.
    //
    // Given
    // -----
    // - kernel sizes 0 and 4.
    //
    // Expect
    // ------
    // - `InvalidKernelSize` for both.
    fn median_filter_rejects_even_or_zero_kernel() {
        // Arrange
        let data = Array2::<f64>::zeros((3, 3));

        // Act / Assert
        for k in [0, 4] {
            assert_eq!(
                median_filter_2d(data.view(), k),
                Err(RasterError::InvalidKernelSize { kernel_size: k })
            );
        }
    }
}
