//! Error type shared by every stage of the endmember search.
//!
//! Configuration problems are reported before any data is processed. Numerical
//! degeneracy inside the volume evaluator is not an error: it is absorbed as a
//! zero score (see [`crate::volume::SimplexVolume`]).

use thiserror::Error;

/// Errors raised by dataset construction, configuration checks, metrics and
/// the dimensionality reduction collaborator.
///
/// # Examples
///
/// ```rust
/// use nfindr::errors::NFindrError;
///
/// let err = NFindrError::TooFewPixels { p: 4, pixels: 3 };
/// assert!(err.to_string().contains("4 distinct pixels"));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NFindrError {
    /// More endmembers requested than there are pixels to draw from.
    #[error("cannot draw {p} distinct pixels from a scene of {pixels} pixels")]
    TooFewPixels {
        /// Requested number of endmembers.
        p: usize,
        /// Pixels available in the scene.
        pixels: usize,
    },

    /// `p` outside `[2, min(bands, pixels - 1) + 1]`.
    #[error(
        "number of endmembers p={p} must be in [2, {max}] for a scene of {bands} bands x {pixels} pixels"
    )]
    InvalidEndmemberCount {
        /// Requested number of endmembers.
        p: usize,
        /// Largest admissible `p` for this scene.
        max: usize,
        /// Spectral bands in the scene.
        bands: usize,
        /// Pixels in the scene.
        pixels: usize,
    },

    /// Reduction target outside `[1, min(bands, pixels - 1)]`.
    #[error("target dimension {target} must be in [1, {max}]")]
    InvalidTargetDimension {
        /// Requested target dimension.
        target: usize,
        /// Largest admissible target dimension.
        max: usize,
    },

    /// Caller-supplied starting indices are not p distinct in-range pixels.
    #[error("invalid initial endmember selection: {0}")]
    InvalidInitialSelection(String),

    /// The dataset has no bands or no pixels.
    #[error("spectral dataset is empty")]
    EmptyDataset,

    /// A sample is NaN or infinite.
    #[error("non-finite sample at band {band}, pixel {pixel}")]
    NonFiniteSample {
        /// Band (row) of the offending sample.
        band: usize,
        /// Pixel (column) of the offending sample.
        pixel: usize,
    },

    /// Two matrices that must agree in shape do not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Actual `(rows, cols)`.
        actual: (usize, usize),
    },

    /// A spectrum with zero norm has no defined angle.
    #[error("spectrum in column {column} has zero norm")]
    ZeroNormSpectrum {
        /// Column index of the zero spectrum.
        column: usize,
    },

    /// Invalid parameter for the synthetic scene generator.
    #[error("invalid scene parameter: {0}")]
    InvalidSceneParameter(String),

    /// Failure reported by the linear algebra library during reduction.
    #[error("dimensionality reduction failed: {0}")]
    Reduction(String),
}

impl NFindrError {
    /// True for the errors raised by configuration checks at the entry point.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NFindrError::TooFewPixels { .. }
                | NFindrError::InvalidEndmemberCount { .. }
                | NFindrError::InvalidTargetDimension { .. }
                | NFindrError::InvalidInitialSelection(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NFindrError>;
