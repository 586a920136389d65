//! # Simplex volume evaluation
//!
//! For p vertices in (p-1)-dimensional space, stacked as the columns of a
//! (p-1) × p matrix `V`, the simplex volume is
//!
//! ```ignore
//! vol(V) = |det([v_1 - v_0, v_2 - v_0, ..., v_{p-1} - v_0])| / (p-1)!
//! ```
//!
//! The determinant comes from smartcore's LU factorisation. Flat simplices
//! (duplicated, collinear or coplanar vertices) are a normal outcome of the
//! endmember search, not a fault: they evaluate to [`SimplexVolume::Degenerate`],
//! whose value is `0.0`.
//!
//! Only exactly flat simplices are degenerate: a zero-length edge, a zero or
//! non-finite determinant, or a failed factorisation. There is no relative
//! cutoff, so long thin simplices (typical of PCA-reduced spectra at large p)
//! keep their tiny but positive volume.
//!
//! Both entry points are stateless and side-effect free:
//! - [`simplex_volume`] evaluates a full vertex matrix;
//! - [`replaced_vertex_volume`] evaluates the same matrix with one vertex
//!   swapped for a candidate point, without cloning the matrix. This is the
//!   scoring call made once per candidate pixel by the refiner.

use log::trace;
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linalg::traits::lu::LUDecomposable;

/// Outcome of one volume evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimplexVolume {
    /// A non-degenerate simplex and its (positive) volume.
    Computed(f64),
    /// Affinely dependent vertices or a failed factorisation.
    Degenerate,
}

impl SimplexVolume {
    /// Volume as a score: `Degenerate` scores `0.0`.
    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            SimplexVolume::Computed(v) => *v,
            SimplexVolume::Degenerate => 0.0,
        }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, SimplexVolume::Degenerate)
    }
}

/// `n!` as a float.
#[inline]
pub fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Volume of the simplex whose vertices are the columns of `vertices`.
///
/// # Panics
///
/// Panics unless `vertices` is d × (d + 1) with d ≥ 1.
///
/// # Examples
///
/// ```
/// use nfindr::volume::{simplex_volume, SimplexVolume};
/// use smartcore::linalg::basic::matrix::DenseMatrix;
///
/// // right triangle with legs 4 and 3, vertices as columns
/// let v = DenseMatrix::from_2d_vec(&vec![
///     vec![0.0, 4.0, 0.0],
///     vec![0.0, 0.0, 3.0],
/// ]).unwrap();
/// assert_eq!(simplex_volume(&v), SimplexVolume::Computed(6.0));
/// ```
pub fn simplex_volume(vertices: &DenseMatrix<f64>) -> SimplexVolume {
    let (d, p) = check_shape(vertices);
    let origin = crate::core::column(vertices, 0);

    let mut edges = DenseMatrix::<f64>::zeros(d, d);
    for k in 1..p {
        for r in 0..d {
            edges.set((r, k - 1), *vertices.get((r, k)) - origin[r]);
        }
    }
    volume_from_edges(edges)
}

/// Volume of `vertices` with column `position` replaced by `candidate`.
///
/// Agrees exactly with [`simplex_volume`] on the trial matrix, but reads the
/// unchanged vertices in place.
///
/// # Panics
///
/// Panics on a malformed vertex matrix, if `position` is out of range, or if
/// `candidate.len()` differs from the vertex dimension.
pub fn replaced_vertex_volume(
    vertices: &DenseMatrix<f64>,
    position: usize,
    candidate: &[f64],
) -> SimplexVolume {
    let (d, p) = check_shape(vertices);
    assert!(position < p, "vertex position {} out of range", position);
    assert_eq!(candidate.len(), d, "candidate dimension mismatch");

    let vertex = |k: usize, r: usize| -> f64 {
        if k == position {
            candidate[r]
        } else {
            *vertices.get((r, k))
        }
    };

    let mut edges = DenseMatrix::<f64>::zeros(d, d);
    for k in 1..p {
        for r in 0..d {
            edges.set((r, k - 1), vertex(k, r) - vertex(0, r));
        }
    }
    volume_from_edges(edges)
}

fn check_shape(vertices: &DenseMatrix<f64>) -> (usize, usize) {
    let (d, p) = vertices.shape();
    assert!(
        d >= 1 && p == d + 1,
        "simplex needs a d x (d+1) vertex matrix, got {}x{}",
        d,
        p
    );
    (d, p)
}

/// `|det(edges)| / d!`, or `Degenerate` for flat or unfactorisable input.
fn volume_from_edges(edges: DenseMatrix<f64>) -> SimplexVolume {
    let (d, _) = edges.shape();

    let zero_edge = (0..d).any(|k| (0..d).all(|r| *edges.get((r, k)) == 0.0));
    if zero_edge {
        trace!("zero-length edge");
        return SimplexVolume::Degenerate;
    }

    // L has a unit diagonal and pivoting only flips the sign, so |det| is the
    // product of U's diagonal
    let det = match edges.lu() {
        Ok(lu) => {
            let u = lu.U();
            (0..d).map(|i| *u.get((i, i))).product::<f64>().abs()
        }
        Err(e) => {
            trace!("LU factorisation failed: {}", e);
            return SimplexVolume::Degenerate;
        }
    };
    if !det.is_finite() || det == 0.0 {
        trace!("flat simplex: det={:e}", det);
        return SimplexVolume::Degenerate;
    }

    SimplexVolume::Computed(det / factorial(d))
}
