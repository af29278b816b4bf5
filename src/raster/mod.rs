//! raster — band math, temporal composites and spatial filters.
//!
//! Purpose
//! -------
//! Collect the array-level collaborators that typically run before or
//! alongside break monitoring: spectral indices computed from band arrays,
//! reductions of time stacks into composites, and a 2-D median filter.
//!
//! Key behaviors
//! -------------
//! - [`indices`]: normalized difference, NDVI, NDWI and EVI on rank-1/2/3
//!   arrays, dispatched through [`Rank`].
//! - [`composite`]: per-cell median composite (3-D/4-D) and temporal mean
//!   (1-D to 4-D) over the leading time axis, with optional NaN skipping.
//! - [`spatial`]: edge-clipped, NaN-aware square median filter.
//!
//! Invariants & assumptions
//! ------------------------
//! - NaN marks missing data.
//! - Invalid ranks, shapes and kernel sizes are [`RasterError`]s raised
//!   before any computation; numerical edge cases resolve to fill values.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each operation.
//! - `tests/integration_raster_ops.rs` covers the public surface end to end.

pub mod composite;
pub mod errors;
pub mod indices;
mod median;
pub mod rank;
pub mod spatial;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::composite::{median_composite, temporal_mean, temporal_mean_1d};
pub use self::errors::{RasterError, RasterResult};
pub use self::indices::{enhanced_vegetation_index, ndvi, ndwi, normalized_difference};
pub use self::rank::Rank;
pub use self::spatial::median_filter_2d;
