//! SpectralDataset and ReducedDataset: column-major views over pixel spectra.
//!
//! Both containers wrap a smartcore `DenseMatrix<f64>` laid out with one pixel
//! per column:
//!
//! - SpectralDataset: bands × pixels, the raw reflectance/radiance samples.
//!   Immutable once built; construction rejects NaN and infinite samples.
//! - ReducedDataset: d × pixels, the same pixels expressed in a d-dimensional
//!   principal subspace (d = p - 1 for N-FINDR).
//!
//! Column accessors are the hot path of the refiner (one column read per
//! candidate pixel); they copy `d` values straight out of the matrix.
//!
//! # Examples
//!
//! ```
//! use nfindr::core::SpectralDataset;
//!
//! // three pixels, two bands each
//! let ds = SpectralDataset::from_pixels(&[
//!     vec![0.1, 0.2],
//!     vec![0.3, 0.4],
//!     vec![0.5, 0.6],
//! ]).unwrap();
//!
//! assert_eq!(ds.shape(), (2, 3));
//! assert_eq!(ds.pixel(1), vec![0.3, 0.4]);
//! ```
//!
//! # Panics
//!
//! - Column accessors panic on out-of-bounds pixel indices.

use log::debug;
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::errors::{NFindrError, Result};

/// Copies column `j` of `m` into an owned vector.
#[inline]
pub fn column(m: &DenseMatrix<f64>, j: usize) -> Vec<f64> {
    let (nrows, ncols) = m.shape();
    assert!(j < ncols, "column index {} out of bounds ({} columns)", j, ncols);
    (0..nrows).map(|r| *m.get((r, j))).collect()
}

/// Builds a matrix whose i-th column is column `indices[i]` of `m`.
///
/// # Panics
///
/// Panics if any index is out of bounds.
pub fn select_columns(m: &DenseMatrix<f64>, indices: &[usize]) -> DenseMatrix<f64> {
    let (nrows, ncols) = m.shape();
    assert!(
        indices.iter().all(|&j| j < ncols),
        "selected column out of bounds ({} columns)",
        ncols
    );
    let flat: Vec<f64> = (0..nrows)
        .flat_map(|r| indices.iter().map(move |&j| *m.get((r, j))))
        .collect();
    DenseMatrix::from_iterator(flat.into_iter(), nrows, indices.len(), 0)
}

/// Stacks equally long vectors as the columns of a `nrows × columns.len()` matrix.
fn columns_to_matrix(columns: &[Vec<f64>], nrows: usize) -> DenseMatrix<f64> {
    // row-major fill (axis 0)
    let flat: Vec<f64> = (0..nrows)
        .flat_map(|r| columns.iter().map(move |c| c[r]))
        .collect();
    DenseMatrix::from_iterator(flat.into_iter(), nrows, columns.len(), 0)
}

/// Bands × pixels matrix of finite spectral samples; columns are pixel spectra.
#[derive(Clone, Debug)]
pub struct SpectralDataset {
    data: DenseMatrix<f64>,
    nbands: usize,
    npixels: usize,
}

impl SpectralDataset {
    /// Wraps a bands × pixels matrix, checking every sample is finite.
    pub fn new(data: DenseMatrix<f64>) -> Result<Self> {
        let (nbands, npixels) = data.shape();
        if nbands == 0 || npixels == 0 {
            return Err(NFindrError::EmptyDataset);
        }
        for pixel in 0..npixels {
            for band in 0..nbands {
                if !data.get((band, pixel)).is_finite() {
                    return Err(NFindrError::NonFiniteSample { band, pixel });
                }
            }
        }
        Ok(Self {
            data,
            nbands,
            npixels,
        })
    }

    /// Builds from a list of pixel spectra (one inner vector per pixel).
    pub fn from_pixels(pixels: &[Vec<f64>]) -> Result<Self> {
        let nbands = pixels.first().map(|p| p.len()).unwrap_or(0);
        if nbands == 0 {
            return Err(NFindrError::EmptyDataset);
        }
        if let Some((j, bad)) = pixels.iter().enumerate().find(|(_, p)| p.len() != nbands) {
            debug!("pixel {} has {} bands, expected {}", j, bad.len(), nbands);
            return Err(NFindrError::ShapeMismatch {
                expected: (nbands, 1),
                actual: (bad.len(), 1),
            });
        }
        Self::new(columns_to_matrix(pixels, nbands))
    }

    /// Returns (bands, pixels).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nbands, self.npixels)
    }

    #[inline]
    pub fn nbands(&self) -> usize {
        self.nbands
    }

    #[inline]
    pub fn npixels(&self) -> usize {
        self.npixels
    }

    /// Shared reference to the underlying bands × pixels matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<f64> {
        &self.data
    }

    /// Owned copy of the spectrum of pixel `j`.
    #[inline]
    pub fn pixel(&self, j: usize) -> Vec<f64> {
        column(&self.data, j)
    }

    /// Bands × k matrix of the spectra at `indices`, in the given order.
    pub fn select_pixels(&self, indices: &[usize]) -> DenseMatrix<f64> {
        select_columns(&self.data, indices)
    }
}

/// d × pixels coordinates of every pixel in a reduced subspace.
#[derive(Clone, Debug)]
pub struct ReducedDataset {
    coords: DenseMatrix<f64>,
}

impl ReducedDataset {
    /// Wraps a d × pixels coordinate matrix.
    pub fn new(coords: DenseMatrix<f64>) -> Self {
        Self { coords }
    }

    /// Builds from reduced points, one inner vector per pixel.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty or points have differing lengths.
    pub fn from_points(points: &[Vec<f64>]) -> Self {
        assert!(!points.is_empty(), "reduced points cannot be empty");
        let dim = points[0].len();
        assert!(
            points.iter().all(|p| p.len() == dim),
            "all reduced points must have the same dimension"
        );
        Self::new(columns_to_matrix(points, dim))
    }

    /// Dimension of the subspace (rows).
    #[inline]
    pub fn dim(&self) -> usize {
        self.coords.shape().0
    }

    #[inline]
    pub fn npixels(&self) -> usize {
        self.coords.shape().1
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.coords.shape()
    }

    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<f64> {
        &self.coords
    }

    /// Reduced coordinates of pixel `j`.
    #[inline]
    pub fn point(&self, j: usize) -> Vec<f64> {
        column(&self.coords, j)
    }

    /// d × k matrix of the points at `indices`, in the given order.
    pub fn select_points(&self, indices: &[usize]) -> DenseMatrix<f64> {
        select_columns(&self.coords, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pixels_is_column_major() {
        let ds = SpectralDataset::from_pixels(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .unwrap();
        assert_eq!(ds.shape(), (3, 2));
        assert_eq!(*ds.matrix().get((2, 0)), 3.0);
        assert_eq!(*ds.matrix().get((0, 1)), 4.0);
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = SpectralDataset::from_pixels(&[vec![1.0, 2.0], vec![f64::NAN, 0.0]])
            .unwrap_err();
        assert_eq!(err, NFindrError::NonFiniteSample { band: 0, pixel: 1 });
    }

    #[test]
    fn test_rejects_ragged_pixels() {
        let err = SpectralDataset::from_pixels(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, NFindrError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_select_preserves_order() {
        let ds = SpectralDataset::from_pixels(&[vec![0.0, 0.5], vec![1.0, 1.5], vec![2.0, 2.5]])
            .unwrap();
        let sel = ds.select_pixels(&[2, 0]);
        assert_eq!(sel.shape(), (2, 2));
        assert_eq!(column(&sel, 0), vec![2.0, 2.5]);
        assert_eq!(column(&sel, 1), vec![0.0, 0.5]);
    }
}
