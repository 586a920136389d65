use approx::relative_eq;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::column;
use crate::tests::test_data::stretched_corners;
use crate::volume::{replaced_vertex_volume, simplex_volume, SimplexVolume};

fn vertices(rows: Vec<Vec<f64>>) -> DenseMatrix<f64> {
    DenseMatrix::from_2d_vec(&rows).unwrap()
}

#[test]
fn test_unit_triangle() {
    let v = vertices(vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]);
    let vol = simplex_volume(&v);
    assert!(relative_eq!(vol.value(), 0.5, epsilon = 1e-12));
    assert!(!vol.is_degenerate());
}

#[test]
fn test_unit_tetrahedron() {
    let v = vertices(vec![
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0],
    ]);
    assert!(relative_eq!(simplex_volume(&v).value(), 1.0 / 6.0, epsilon = 1e-12));
}

#[test]
fn test_segment_length() {
    // d = 1: two points on a line, volume is their distance
    let v = vertices(vec![vec![2.5, -1.0]]);
    assert!(relative_eq!(simplex_volume(&v).value(), 3.5, epsilon = 1e-12));
}

#[test]
fn test_duplicate_vertex_is_degenerate() {
    let v = vertices(vec![vec![0.0, 1.0, 1.0], vec![0.0, 2.0, 2.0]]);
    assert_eq!(simplex_volume(&v), SimplexVolume::Degenerate);

    let segment = vertices(vec![vec![1.5, 1.5]]);
    assert_eq!(simplex_volume(&segment), SimplexVolume::Degenerate);
}

#[test]
fn test_collinear_is_degenerate() {
    let v = vertices(vec![vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 6.0]]);
    assert_eq!(simplex_volume(&v), SimplexVolume::Degenerate);
    assert_eq!(simplex_volume(&v).value(), 0.0);
}

#[test]
fn test_nearly_collinear_keeps_tiny_volume() {
    let v = vertices(vec![
        vec![0.0, 1.0, 2.0],
        vec![0.0, 1.0, 2.0 + 1e-15],
    ]);
    let vol = simplex_volume(&v);
    assert!(!vol.is_degenerate());
    assert!(vol.value() > 0.0 && vol.value() < 1e-15);
}

#[test]
fn test_small_scale_is_not_degenerate() {
    let s = 1e-5;
    let v = vertices(vec![vec![0.0, s, 0.0], vec![0.0, 0.0, s]]);
    let vol = simplex_volume(&v);
    assert!(!vol.is_degenerate());
    assert!(relative_eq!(vol.value(), 0.5 * s * s, max_relative = 1e-9));
}

#[test]
fn test_stretched_simplex_is_not_degenerate() {
    // edges run along the first axis with spread s in the others
    for s in [1e-3, 1e-4, 1e-5] {
        let corners = stretched_corners(4, s);
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|r| corners.iter().map(|c| c[r]).collect())
            .collect();
        let vol = simplex_volume(&vertices(rows.clone()));
        assert!(!vol.is_degenerate(), "s={}", s);
        assert!(relative_eq!(vol.value(), s.powi(3) / 24.0, max_relative = 1e-9));

        // same answer whichever vertex the edges start from
        let reversed: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.iter().rev().copied().collect())
            .collect();
        let vol_rev = simplex_volume(&vertices(reversed));
        assert!(relative_eq!(vol.value(), vol_rev.value(), max_relative = 1e-9));
    }
}

#[test]
fn test_vertex_order_does_not_matter() {
    let a = vertices(vec![vec![0.3, 2.0, -1.0], vec![0.1, 0.5, 1.7]]);
    let b = vertices(vec![vec![-1.0, 0.3, 2.0], vec![1.7, 0.1, 0.5]]);
    assert!(relative_eq!(
        simplex_volume(&a).value(),
        simplex_volume(&b).value(),
        max_relative = 1e-12
    ));
}

#[test]
fn test_translation_invariance() {
    let a = vertices(vec![vec![0.0, 4.0, 0.0], vec![0.0, 0.0, 3.0]]);
    let b = vertices(vec![vec![10.0, 14.0, 10.0], vec![-7.0, -7.0, -4.0]]);
    assert!(relative_eq!(simplex_volume(&a).value(), 6.0, epsilon = 1e-12));
    assert!(relative_eq!(simplex_volume(&b).value(), 6.0, epsilon = 1e-9));
}

#[test]
fn test_replaced_vertex_matches_full_recompute() {
    let v = vertices(vec![
        vec![0.0, 1.0, 0.0, 0.2],
        vec![0.0, 0.0, 1.0, 0.3],
        vec![0.0, 0.0, 0.0, 1.1],
    ]);
    let candidate = [0.7, -0.4, 0.9];

    for position in 0..4 {
        let mut rows: Vec<Vec<f64>> = (0..3)
            .map(|r| (0..4).map(|k| *v.get((r, k))).collect())
            .collect();
        for (r, row) in rows.iter_mut().enumerate() {
            row[position] = candidate[r];
        }
        let full = simplex_volume(&vertices(rows));
        let replaced = replaced_vertex_volume(&v, position, &candidate);
        assert_eq!(full, replaced, "position {}", position);
    }
    // the input matrix is untouched
    assert_eq!(column(&v, 3), vec![0.2, 0.3, 1.1]);
}

#[test]
fn test_replacing_with_existing_vertex_is_degenerate() {
    let v = vertices(vec![vec![0.0, 4.0, 0.0], vec![0.0, 0.0, 3.0]]);
    let existing = column(&v, 1);
    assert!(replaced_vertex_volume(&v, 0, &existing).is_degenerate());
}

#[test]
#[should_panic]
fn test_malformed_vertex_matrix_panics() {
    let v = vertices(vec![vec![0.0, 1.0], vec![0.0, 1.0]]);
    simplex_volume(&v);
}

