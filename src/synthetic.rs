//! Synthetic hyperspectral scenes under the linear mixing model.
//!
//! Each pixel is `x = M a + n`, with `M` the bands × p endmember matrix, `a` an
//! abundance vector on the probability simplex and `n` optional white Gaussian
//! noise. Exactly one pixel per endmember is forced to be pure, so the scene
//! satisfies the pure pixel assumption and the ground-truth answer of N-FINDR
//! is known. Used by the tests, the benchmarks and the demo.
//!
//! **DETERMINISTIC**: every draw comes from a `ChaCha8Rng` seeded by the caller.

use log::{debug, info};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::SpectralDataset;
use crate::errors::{NFindrError, Result};

/// A mixed scene together with the truth it was generated from.
#[derive(Clone, Debug)]
pub struct LinearMixtureScene {
    /// Bands × pixels mixed (and possibly noisy) spectra.
    pub spectra: SpectralDataset,
    /// Bands × p generating endmembers.
    pub endmembers: DenseMatrix<f64>,
    /// p × pixels abundances; every column sums to one.
    pub abundances: DenseMatrix<f64>,
    /// `pure_pixels[k]` is the pixel made only of endmember `k`.
    pub pure_pixels: Vec<usize>,
}

impl LinearMixtureScene {
    /// Endmember with the largest abundance at `pixel`.
    pub fn dominant_endmember(&self, pixel: usize) -> usize {
        let (p, _) = self.abundances.shape();
        (0..p)
            .max_by(|&a, &b| {
                self.abundances
                    .get((a, pixel))
                    .partial_cmp(self.abundances.get((b, pixel)))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0)
    }
}

/// `bands × p` smooth, strictly positive spectra.
///
/// Each spectrum is a baseline plus three Gaussian absorption/reflection bumps
/// with random centre, width and height.
pub fn smooth_spectra(bands: usize, p: usize, seed: u64) -> DenseMatrix<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut uniform = move || -> f64 { rng.random::<f64>() };

    let mut spectra = DenseMatrix::<f64>::zeros(bands, p);
    for k in 0..p {
        let baseline = 0.05 + 0.2 * uniform();
        let bumps: Vec<(f64, f64, f64)> = (0..3)
            .map(|_| {
                let centre = uniform() * bands as f64;
                let width = (0.05 + 0.25 * uniform()) * bands as f64;
                let height = 0.1 + 0.6 * uniform();
                (centre, width, height)
            })
            .collect();
        for b in 0..bands {
            let x = b as f64;
            let value = baseline
                + bumps
                    .iter()
                    .map(|(c, w, h)| h * (-0.5 * ((x - c) / w).powi(2)).exp())
                    .sum::<f64>();
            spectra.set((b, k), value);
        }
    }
    spectra
}

/// Mixes `endmembers` into `n_pixels` pixels with uniformly distributed
/// abundances, one pure pixel per endmember and Gaussian noise of standard
/// deviation `noise_std`.
///
/// # Examples
///
/// ```
/// use nfindr::synthetic::{linear_mixture_scene, smooth_spectra};
///
/// let m = smooth_spectra(20, 3, 1);
/// let scene = linear_mixture_scene(&m, 100, 0.0, 2).unwrap();
/// assert_eq!(scene.spectra.shape(), (20, 100));
/// assert_eq!(scene.pure_pixels.len(), 3);
/// ```
pub fn linear_mixture_scene(
    endmembers: &DenseMatrix<f64>,
    n_pixels: usize,
    noise_std: f64,
    seed: u64,
) -> Result<LinearMixtureScene> {
    let (bands, p) = endmembers.shape();
    if p == 0 || bands == 0 {
        return Err(NFindrError::InvalidSceneParameter(
            "endmember matrix is empty".to_string(),
        ));
    }
    if n_pixels < p {
        return Err(NFindrError::InvalidSceneParameter(format!(
            "{} pixels cannot hold {} pure pixels",
            n_pixels, p
        )));
    }
    if !(noise_std.is_finite() && noise_std >= 0.0) {
        return Err(NFindrError::InvalidSceneParameter(format!(
            "noise standard deviation must be finite and non-negative, got {}",
            noise_std
        )));
    }

    info!(
        "Generating linear mixture scene: {} bands x {} pixels, p={}, noise={}",
        bands, n_pixels, p, noise_std
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let pure_pixels = index::sample(&mut rng, n_pixels, p).into_vec();
    debug!("Pure pixels: {:?}", pure_pixels);

    // Uniform on the simplex: normalised Exp(1) draws (flat Dirichlet)
    let mut abundances = DenseMatrix::<f64>::zeros(p, n_pixels);
    for j in 0..n_pixels {
        if let Some(k) = pure_pixels.iter().position(|&q| q == j) {
            abundances.set((k, j), 1.0);
            continue;
        }
        let draws: Vec<f64> = (0..p).map(|_| Exp1.sample(&mut rng)).collect();
        let total: f64 = draws.iter().sum();
        for (k, a) in draws.into_iter().enumerate() {
            abundances.set((k, j), a / total);
        }
    }

    let mut mixed = DenseMatrix::<f64>::zeros(bands, n_pixels);
    for j in 0..n_pixels {
        for b in 0..bands {
            let clean: f64 = (0..p)
                .map(|k| endmembers.get((b, k)) * abundances.get((k, j)))
                .sum();
            let noise = if noise_std > 0.0 {
                let n: f64 = StandardNormal.sample(&mut rng);
                noise_std * n
            } else {
                0.0
            };
            mixed.set((b, j), clean + noise);
        }
    }

    Ok(LinearMixtureScene {
        spectra: SpectralDataset::new(mixed)?,
        endmembers: endmembers.clone(),
        abundances,
        pure_pixels,
    })
}
