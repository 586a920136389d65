//! # Principal-component reduction for simplex search
//!
//! ## Why reduce at all
//!
//! N-FINDR scores candidate endmember sets by the volume of the simplex they
//! span. A simplex with `p` vertices is only full-dimensional in `p - 1`
//! dimensions, so the spectra (often hundreds of bands) are first projected onto
//! a `(p - 1)`-dimensional subspace where the volume is a plain determinant of a
//! square `(p - 1) × (p - 1)` matrix.
//!
//! ## Which subspace
//!
//! Under the linear mixing model every pixel is a convex combination of the `p`
//! endmembers, so the noise-free data lives in a `(p - 1)`-dimensional affine
//! subspace. The principal directions of the mean-centred data recover that
//! subspace: the top `p - 1` components capture all of the mixing variance and
//! leave only noise in the remaining ones. Projecting onto them preserves the
//! simplex geometry up to a rigid motion, so volume ratios, and therefore the
//! argmax the refiner is looking for, are unchanged.
//!
//! ## Layout
//!
//! Spectral data in this crate is bands × pixels (one pixel per column). The
//! PCA estimator treats rows as samples, so the data is transposed to
//! pixels × bands for fitting and the projection is transposed back to
//! d × pixels.
//!
//! ## Collaborator seam
//!
//! The reduction is behind the [`DimensionalityReducer`] trait. The default
//! [`PcaReducer`] delegates to smartcore's PCA; tests and callers with their own
//! projection (or data that is already reduced) can plug in another
//! implementation without touching the refiner.

use log::{debug, info};
use smartcore::decomposition::pca::{PCAParameters, PCA};
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::ReducedDataset;
use crate::errors::{NFindrError, Result};

/// Largest admissible reduction target for a bands × pixels matrix:
/// `min(bands, pixels - 1)`.
#[inline]
pub fn max_target_dim(nbands: usize, npixels: usize) -> usize {
    nbands.min(npixels.saturating_sub(1))
}

/// Checks `1 <= target_dim <= min(bands, pixels - 1)`.
pub fn validate_target_dim(nbands: usize, npixels: usize, target_dim: usize) -> Result<()> {
    let max = max_target_dim(nbands, npixels);
    if target_dim == 0 || target_dim > max {
        return Err(NFindrError::InvalidTargetDimension {
            target: target_dim,
            max,
        });
    }
    Ok(())
}

/// Projects bands × pixels spectra onto a `target_dim`-dimensional subspace.
///
/// Implementations must be deterministic for a given input and return a
/// `target_dim × pixels` matrix with one column per input pixel, in order.
pub trait DimensionalityReducer {
    fn reduce(&self, spectra: &DenseMatrix<f64>, target_dim: usize) -> Result<ReducedDataset>;
}

/// Principal component projection of the mean-centred spectra.
///
/// # Examples
///
/// ```
/// use nfindr::reduction::{DimensionalityReducer, PcaReducer};
/// use smartcore::linalg::basic::matrix::DenseMatrix;
///
/// // 3 bands x 4 pixels
/// let spectra = DenseMatrix::from_2d_vec(&vec![
///     vec![0.1, 0.4, 0.2, 0.9],
///     vec![0.3, 0.1, 0.7, 0.2],
///     vec![0.5, 0.5, 0.1, 0.3],
/// ]).unwrap();
///
/// let reduced = PcaReducer::default().reduce(&spectra, 2).unwrap();
/// assert_eq!(reduced.shape(), (2, 4));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PcaReducer {
    /// Use the correlation instead of the covariance matrix (standardises bands).
    pub use_correlation_matrix: bool,
}

impl PcaReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_correlation_matrix(mut self, use_correlation_matrix: bool) -> Self {
        self.use_correlation_matrix = use_correlation_matrix;
        self
    }
}

impl DimensionalityReducer for PcaReducer {
    fn reduce(&self, spectra: &DenseMatrix<f64>, target_dim: usize) -> Result<ReducedDataset> {
        let (nbands, npixels) = spectra.shape();
        validate_target_dim(nbands, npixels, target_dim)?;

        info!(
            "PCA reduction: {} bands x {} pixels -> {} components",
            nbands, npixels, target_dim
        );

        // samples as rows
        let samples = spectra.transpose();
        let params = PCAParameters::default()
            .with_n_components(target_dim)
            .with_use_correlation_matrix(self.use_correlation_matrix);

        let pca = PCA::fit(&samples, params)
            .map_err(|e| NFindrError::Reduction(e.to_string()))?;
        let projected: DenseMatrix<f64> = pca
            .transform(&samples)
            .map_err(|e| NFindrError::Reduction(e.to_string()))?;

        debug!("PCA projection shape (pixels x components): {:?}", projected.shape());

        Ok(ReducedDataset::new(projected.transpose()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_target_dim() {
        assert_eq!(max_target_dim(162, 94249), 162);
        assert_eq!(max_target_dim(10, 4), 3);
        assert_eq!(max_target_dim(10, 0), 0);
    }

    #[test]
    fn test_validate_target_dim_bounds() {
        assert!(validate_target_dim(5, 10, 1).is_ok());
        assert!(validate_target_dim(5, 10, 5).is_ok());
        assert_eq!(
            validate_target_dim(5, 10, 0),
            Err(NFindrError::InvalidTargetDimension { target: 0, max: 5 })
        );
        assert_eq!(
            validate_target_dim(5, 3, 3),
            Err(NFindrError::InvalidTargetDimension { target: 3, max: 2 })
        );
    }
}
