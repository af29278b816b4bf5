//! raster::errors — argument errors for raster collaborators.
//!
//! Every raster operation validates ranks, shapes and window sizes before
//! touching data and reports the first violated constraint as a
//! [`RasterError`]. Numerical edge cases (zero denominators, all-missing
//! lanes) are not errors; they resolve to documented fill values.

/// Result alias for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// RasterError — invalid arguments to a raster operation.
///
/// Variants
/// --------
/// - `UnsupportedRank { ndim, expected }`
///   The input has a rank the operation does not implement.
/// - `ShapeMismatch { expected, found }`
///   Two band arrays that must align elementwise have different shapes.
/// - `InvalidKernelSize { kernel_size }`
///   A filter window is zero or even-sized.
/// - `EmptyTimeAxis`
///   A temporal reduction was asked to reduce a zero-length axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    UnsupportedRank { ndim: usize, expected: &'static str },
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },
    InvalidKernelSize { kernel_size: usize },
    EmptyTimeAxis,
}

impl std::error::Error for RasterError {}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::UnsupportedRank { ndim, expected } => {
                write!(f, "Unsupported array rank: {ndim}. Expected rank {expected}.")
            }
            RasterError::ShapeMismatch { expected, found } => write!(
                f,
                "Input arrays must have the same shape: expected {expected:?}, found {found:?}."
            ),
            RasterError::InvalidKernelSize { kernel_size } => {
                write!(f, "Invalid kernel size: {kernel_size}. Must be odd and > 0.")
            }
            RasterError::EmptyTimeAxis => write!(f, "Time axis must contain at least one slice."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that shape and rank messages carry their payloads.
    //
    // Given
    // -----
    // - A shape mismatch [2, 3] vs [3, 2] and a rank-5 error.
    //
    // Expect
    // ------
    // - Both shapes and the rank appear in the messages.
    fn display_embeds_shapes_and_rank() {
        // Arrange
        let shape = RasterError::ShapeMismatch { expected: vec![2, 3], found: vec![3, 2] };
        let rank = RasterError::UnsupportedRank { ndim: 5, expected: "1, 2 or 3" };

        // Act
        let shape_msg = shape.to_string();
        let rank_msg = rank.to_string();

        // Assert
        assert!(shape_msg.contains("[2, 3]") && shape_msg.contains("[3, 2]"), "Got: {shape_msg}");
        assert!(rank_msg.contains('5') && rank_msg.contains("1, 2 or 3"), "Got: {rank_msg}");
    }
}
