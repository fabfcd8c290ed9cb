//! Error types for LUT operators.

use oxlut_core::{BitDepth, Interpolation};
use thiserror::Error;

/// Result type for LUT operator operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur while building or transforming LUT operators.
#[derive(Debug, Error)]
pub enum LutError {
    /// Grid edge length exceeds the supported ceiling.
    #[error("LUT 3D grid size '{length}' must not be greater than '{max}'")]
    GridTooLarge {
        /// Requested edge length.
        length: usize,
        /// Largest supported edge length.
        max: usize,
    },

    /// Interpolation selector is not valid for a 3D LUT.
    #[error("LUT 3D has an invalid interpolation type: {0}")]
    InvalidInterpolation(Interpolation),

    /// Sample array does not hold three color components.
    #[error("LUT 3D has an incorrect number of color components: {0}")]
    BadChannelCount(usize),

    /// Adjacent operators disagree on the connecting bit depth.
    #[error("a bit depth mismatch forbids the composition of LUTs ({out} vs {inp})")]
    BitDepthMismatch {
        /// Output depth of the first operator.
        out: BitDepth,
        /// Input depth of the second operator.
        inp: BitDepth,
    },

    /// A fast forward rendition was requested for a forward LUT.
    #[error("a fast LUT 3D can only be built from an inverse LUT")]
    ExpectsInverse,

    /// Raw sample data does not match the grid dimensions.
    #[error("LUT 3D length does not match the vector size: expected {expected}, got {got}")]
    LengthMismatch {
        /// Value count implied by the grid.
        expected: usize,
        /// Value count supplied.
        got: usize,
    },
}
