//! # Endmember refinement (N-FINDR vertex replacement)
//!
//! The refiner owns the current candidate simplex and grows its volume by
//! sequential coordinate ascent over the vertex positions.
//!
//! ## State
//!
//! A [`SimplexState`] is an arena of `p` slots. Slot `i` holds the pixel index
//! of vertex `i` and the matching column of the vertex matrix, so the invariant
//! `vertices[:, i] == reduced[:, indices[i]]` holds after every commit. The
//! simplex volume is stored next to them and recomputed on every change.
//!
//! ## One sweep
//!
//! For each position `i = 0 .. p-1`, in order:
//!
//! 1. **Scan** (`&self`): every pixel not currently selected is tried as a
//!    replacement for vertex `i` and scored with
//!    [`replaced_vertex_volume`]. Only candidates whose volume strictly exceeds
//!    the volume before the scan are eligible; the largest wins and ties go to
//!    the lowest pixel index, which is what an ascending sequential scan with a
//!    strict `>` would pick.
//! 2. **Commit** (`&mut self`): the winner, if any, replaces slot `i`.
//!
//! Later positions see the committed simplex. The scan only borrows the state
//! immutably, so candidates always read a frozen snapshot and nothing is
//! written until the scan has finished. Candidates are independent, so the
//! scan runs as a rayon map + max-reduce; the sequential path gives identical
//! results and is kept for small inputs and debugging.
//!
//! ## Budget
//!
//! The loop always runs exactly `max_iter` sweeps, even when a sweep commits
//! nothing. The volume never decreases.

use log::{debug, info, trace};
use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;
use smartcore::linalg::basic::arrays::MutArray;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::ReducedDataset;
use crate::errors::{NFindrError, Result};
use crate::volume::{replaced_vertex_volume, simplex_volume, SimplexVolume};

/// Best replacement found for one vertex position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Replacement {
    /// Pixel index that replaces the vertex.
    pub pixel: usize,
    /// Volume of the simplex after the replacement.
    pub volume: f64,
}

/// Current endmember index set, its reduced-space vertices and their volume.
#[derive(Clone, Debug)]
pub struct SimplexState {
    indices: Vec<usize>,
    vertices: DenseMatrix<f64>,
    volume: SimplexVolume,
}

impl SimplexState {
    fn from_indices(reduced: &ReducedDataset, indices: Vec<usize>) -> Self {
        let vertices = reduced.select_points(&indices);
        let volume = simplex_volume(&vertices);
        Self {
            indices,
            vertices,
            volume,
        }
    }

    /// Pixel index of every vertex, by position.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// d × p matrix of vertex coordinates.
    #[inline]
    pub fn vertices(&self) -> &DenseMatrix<f64> {
        &self.vertices
    }

    #[inline]
    pub fn volume(&self) -> SimplexVolume {
        self.volume
    }

    #[inline]
    pub fn contains(&self, pixel: usize) -> bool {
        self.indices.contains(&pixel)
    }
}

/// Sequential coordinate-ascent refiner over a reduced dataset.
#[derive(Clone, Debug)]
pub struct EndmemberRefiner<'a> {
    reduced: &'a ReducedDataset,
    state: SimplexState,
    parallel: bool,
    // volume after initialisation, then after every sweep
    history: Vec<f64>,
    replacements: usize,
}

impl<'a> EndmemberRefiner<'a> {
    /// Starts from `p` distinct pixels drawn uniformly without replacement.
    ///
    /// `p` must be `reduced.dim() + 1`; any other count is reported as
    /// [`NFindrError::InvalidEndmemberCount`] with the reduced dimension in
    /// place of the band count.
    ///
    /// # Examples
    ///
    /// ```
    /// use nfindr::core::ReducedDataset;
    /// use nfindr::refiner::EndmemberRefiner;
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let reduced = ReducedDataset::from_points(&[
    ///     vec![0.0, 0.0], vec![4.0, 0.0], vec![0.0, 3.0], vec![1.0, 1.0],
    /// ]);
    /// let mut rng = ChaCha8Rng::seed_from_u64(7);
    /// let mut refiner = EndmemberRefiner::random(&reduced, 3, &mut rng).unwrap();
    /// refiner.run(2);
    ///
    /// let mut found = refiner.indices().to_vec();
    /// found.sort();
    /// assert_eq!(found, vec![0, 1, 2]);
    /// ```
    pub fn random<R: Rng + ?Sized>(
        reduced: &'a ReducedDataset,
        p: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let npixels = reduced.npixels();
        if p > npixels {
            return Err(NFindrError::TooFewPixels { p, pixels: npixels });
        }
        // a d-dimensional reduction fixes p at d + 1
        if p != reduced.dim() + 1 {
            return Err(NFindrError::InvalidEndmemberCount {
                p,
                max: reduced.dim() + 1,
                bands: reduced.dim(),
                pixels: npixels,
            });
        }
        let indices = index::sample(rng, npixels, p).into_vec();
        debug!("Random initial endmember indices: {:?}", indices);
        Self::from_indices(reduced, indices)
    }

    /// Starts from caller-chosen pixels.
    ///
    /// `indices` must hold `reduced.dim() + 1` distinct pixel indices, all in
    /// `[0, pixels)`.
    pub fn from_indices(reduced: &'a ReducedDataset, indices: Vec<usize>) -> Result<Self> {
        validate_indices(&indices, reduced.dim() + 1, reduced.npixels())?;

        let state = SimplexState::from_indices(reduced, indices);
        info!(
            "Refiner initialised: p={}, pixels={}, volume={:.6e}{}",
            state.indices.len(),
            reduced.npixels(),
            state.volume.value(),
            if state.volume.is_degenerate() {
                " (degenerate)"
            } else {
                ""
            }
        );

        Ok(Self {
            reduced,
            history: vec![state.volume.value()],
            state,
            parallel: true,
            replacements: 0,
        })
    }

    /// Run candidate scans on the rayon pool (default) or sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    pub fn state(&self) -> &SimplexState {
        &self.state
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.state.indices
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.state.volume.value()
    }

    /// Volume after initialisation followed by the volume after each sweep.
    #[inline]
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Replacements committed so far.
    #[inline]
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    #[inline]
    pub fn sweeps(&self) -> usize {
        self.history.len() - 1
    }

    /// Finds the best strictly-improving replacement for vertex `position`.
    ///
    /// Read-only: the state is not touched, whatever the outcome.
    pub fn scan_position(&self, position: usize) -> Option<Replacement> {
        assert!(
            position < self.state.indices.len(),
            "vertex position {} out of range",
            position
        );
        let baseline = self.state.volume.value();
        let npixels = self.reduced.npixels();

        let evaluate = |pixel: usize| -> Option<Replacement> {
            if self.state.contains(pixel) {
                return None;
            }
            let candidate = self.reduced.point(pixel);
            let volume = replaced_vertex_volume(&self.state.vertices, position, &candidate).value();
            (volume > baseline).then_some(Replacement { pixel, volume })
        };

        if self.parallel {
            (0..npixels)
                .into_par_iter()
                .filter_map(evaluate)
                .reduce_with(better)
        } else {
            (0..npixels).filter_map(evaluate).reduce(better)
        }
    }

    /// Writes `replacement` into slot `position` and refreshes the volume.
    fn commit(&mut self, position: usize, replacement: Replacement) {
        let point = self.reduced.point(replacement.pixel);
        for (r, x) in point.into_iter().enumerate() {
            self.state.vertices.set((r, position), x);
        }
        self.state.indices[position] = replacement.pixel;
        self.state.volume = simplex_volume(&self.state.vertices);
        self.replacements += 1;

        trace!(
            "position {}: pixel {} committed, volume {:.6e}",
            position,
            replacement.pixel,
            self.state.volume.value()
        );
    }

    /// One pass over every vertex position. Returns the number of commits.
    pub fn sweep(&mut self) -> usize {
        let mut committed = 0;
        for position in 0..self.state.indices.len() {
            match self.scan_position(position) {
                Some(replacement) => {
                    self.commit(position, replacement);
                    committed += 1;
                }
                None => trace!("position {}: no improving candidate", position),
            }
        }
        self.history.push(self.state.volume.value());
        debug!(
            "Sweep {}: {} replacement(s), volume {:.6e}",
            self.sweeps(),
            committed,
            self.state.volume.value()
        );
        committed
    }

    /// Runs exactly `max_iter` sweeps.
    pub fn run(&mut self, max_iter: usize) {
        info!(
            "Refining {} endmembers over {} pixels for {} sweep(s) ({})",
            self.state.indices.len(),
            self.reduced.npixels(),
            max_iter,
            if self.parallel { "parallel" } else { "sequential" }
        );
        for _ in 0..max_iter {
            self.sweep();
        }
        info!(
            "Refinement complete: {} replacement(s), final volume {:.6e}",
            self.replacements,
            self.volume()
        );
    }

    /// Consumes the refiner, returning the final state and volume history.
    pub fn finish(self) -> (SimplexState, Vec<f64>) {
        (self.state, self.history)
    }
}

/// Larger volume wins; equal volumes keep the lower pixel index.
#[inline]
fn better(a: Replacement, b: Replacement) -> Replacement {
    if b.volume > a.volume || (b.volume == a.volume && b.pixel < a.pixel) {
        b
    } else {
        a
    }
}

/// Checks `indices` holds `p` distinct values in `[0, npixels)`.
pub fn validate_indices(indices: &[usize], p: usize, npixels: usize) -> Result<()> {
    if indices.len() != p {
        return Err(NFindrError::InvalidInitialSelection(format!(
            "expected {} indices, got {}",
            p,
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&j| j >= npixels) {
        return Err(NFindrError::InvalidInitialSelection(format!(
            "index {} out of range for {} pixels",
            bad, npixels
        )));
    }
    for (k, j) in indices.iter().enumerate() {
        if indices[..k].contains(j) {
            return Err(NFindrError::InvalidInitialSelection(format!(
                "index {} selected more than once",
                j
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_better_prefers_volume_then_lower_pixel() {
        let a = Replacement { pixel: 5, volume: 1.0 };
        let b = Replacement { pixel: 2, volume: 1.0 };
        let c = Replacement { pixel: 9, volume: 2.0 };
        assert_eq!(better(a, b), b);
        assert_eq!(better(b, a), b);
        assert_eq!(better(a, c), c);
        assert_eq!(better(c, b), c);
    }

    #[test]
    fn test_validate_indices() {
        assert!(validate_indices(&[0, 3, 1], 3, 4).is_ok());
        assert!(validate_indices(&[0, 3], 3, 4).is_err());
        assert!(validate_indices(&[0, 4, 1], 3, 4).is_err());
        assert!(validate_indices(&[1, 3, 1], 3, 4).is_err());
    }
}
