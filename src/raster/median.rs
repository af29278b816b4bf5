//! raster::median — NaN-aware median of a small sample.

/// Median of the non-NaN entries of `values`, reordering `values` in place.
///
/// Returns
/// -------
/// - NaN when `values` is empty or entirely NaN.
/// - For an even count, the mean of the two middle values.
pub(crate) fn nan_median(values: &mut Vec<f64>) -> f64 {
    values.retain(|v| !v.is_nan());
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    values.sort_unstable_by(f64::total_cmp);
    if n % 2 == 1 { values[n / 2] } else { 0.5 * (values[n / 2 - 1] + values[n / 2]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify odd, even, NaN-skipping and empty cases.
    //
    // Given
    // -----
    // - [3, 1, 2], [4, 1, 3, 2], [NaN, 5, 1], [NaN].
    //
    // Expect
    // ------
    // - 2, 2.5, 3, NaN.
    fn nan_median_handles_parity_and_missing() {
        // Act / Assert
        assert_eq!(nan_median(&mut vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(nan_median(&mut vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(nan_median(&mut vec![f64::NAN, 5.0, 1.0]), 3.0);
        assert!(nan_median(&mut vec![f64::NAN]).is_nan());
    }
}
