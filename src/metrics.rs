//! Spectral Angle Mapper (SAM) between two endmember matrices.
//!
//! The comparison is strictly positional: column `i` of the reference is
//! compared with column `i` of the estimate. No matching or permutation is
//! performed, so callers must align the columns beforehand (N-FINDR returns
//! endmembers in an arbitrary order).

use log::debug;
use rayon::prelude::*;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::column;
use crate::errors::{NFindrError, Result};

fn norm(a: &[f64]) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Angle in `[0, π]` between two spectra, `None` if either has zero norm.
///
/// # Panics
///
/// Panics if the lengths differ.
pub fn spectral_angle(a: &[f64], b: &[f64]) -> Option<f64> {
    assert_eq!(a.len(), b.len(), "spectra must have the same length");
    let (na, nb) = (norm(a), norm(b));
    if na == 0.0 || nb == 0.0 {
        return None;
    }
    let cos: f64 = a.iter().zip(b).map(|(x, y)| (x / na) * (y / nb)).sum();
    Some(cos.clamp(-1.0, 1.0).acos())
}

/// Per-column spectral angles between `reference` and `estimate`.
///
/// # Examples
///
/// ```
/// use nfindr::metrics::spectral_angle_mapper;
/// use smartcore::linalg::basic::matrix::DenseMatrix;
///
/// let reference = DenseMatrix::from_2d_vec(&vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// let estimate = DenseMatrix::from_2d_vec(&vec![vec![2.0, 1.0], vec![0.0, 0.0]]).unwrap();
///
/// let angles = spectral_angle_mapper(&reference, &estimate).unwrap();
/// assert!(angles[0].abs() < 1e-12);
/// assert!((angles[1] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn spectral_angle_mapper(
    reference: &DenseMatrix<f64>,
    estimate: &DenseMatrix<f64>,
) -> Result<Vec<f64>> {
    if reference.shape() != estimate.shape() {
        return Err(NFindrError::ShapeMismatch {
            expected: reference.shape(),
            actual: estimate.shape(),
        });
    }
    let (_, ncols) = reference.shape();

    let angles = (0..ncols)
        .into_par_iter()
        .map(|i| {
            spectral_angle(&column(reference, i), &column(estimate, i))
                .ok_or(NFindrError::ZeroNormSpectrum { column: i })
        })
        .collect::<Result<Vec<f64>>>()?;

    debug!("SAM angles [rad]: {:?}", angles);
    Ok(angles)
}

/// Mean of `angles`; NaN for an empty slice.
pub fn mean_spectral_angle(angles: &[f64]) -> f64 {
    angles.iter().sum::<f64>() / angles.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identical_vectors_have_zero_angle() {
        let a = [0.2, 0.5, 0.9];
        let b = [0.4, 1.0, 1.8];
        assert!(spectral_angle(&a, &b).unwrap().abs() < 1e-7);
    }

    #[test]
    fn test_orthogonal_and_antiparallel() {
        assert!((spectral_angle(&[1.0, 0.0], &[0.0, 3.0]).unwrap() - FRAC_PI_2).abs() < 1e-12);
        assert!((spectral_angle(&[1.0, 2.0], &[-1.0, -2.0]).unwrap() - PI).abs() < 1e-7);
    }

    #[test]
    fn test_zero_vector_has_no_angle() {
        assert_eq!(spectral_angle(&[0.0, 0.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean_spectral_angle(&[0.5, 1.5]), 1.0);
        assert!(mean_spectral_angle(&[]).is_nan());
    }
}
