//! # nfindr
//!
//! Endmember extraction for hyperspectral images with the N-FINDR algorithm.
//!
//! Given a bands × pixels matrix of mixed spectra and a number of endmembers
//! `p`, N-FINDR looks for the `p` observed pixels whose spectra span the
//! largest simplex once projected onto a `(p - 1)`-dimensional principal
//! subspace. Under the linear mixing model with pure pixels present, those are
//! the pure-material spectra.
//!
//! # Pipeline
//!
//! 1. **Reduction** ([`reduction`]): PCA projection of the spectra to `p - 1`
//!    dimensions through the [`reduction::DimensionalityReducer`] seam.
//! 2. **Initialisation**: `p` distinct pixels drawn from an explicit, seedable
//!    random source.
//! 3. **Refinement** ([`refiner`]): a fixed number of sweeps; each sweep
//!    replaces one vertex at a time with the unselected pixel that most
//!    increases the simplex volume ([`volume`]).
//! 4. **Output** ([`builder`]): the selected pixels' spectra in the original
//!    band space, plus indices and the volume history.
//!
//! Supporting modules: [`metrics`] (positional Spectral Angle Mapper) and
//! [`synthetic`] (linear-mixture scenes with known pure pixels).
//!
//! # Usage Example
//!
//! ```
//! use nfindr::builder::NFindrBuilder;
//! use nfindr::synthetic::{linear_mixture_scene, smooth_spectra};
//!
//! let truth = smooth_spectra(30, 4, 3);
//! let scene = linear_mixture_scene(&truth, 200, 0.0, 5).unwrap();
//!
//! let out = NFindrBuilder::new()
//!     .with_endmembers(4)
//!     .with_max_iter(3)
//!     .with_seed(42)
//!     .build(&scene.spectra)
//!     .unwrap();
//!
//! let mut found = out.indices.clone();
//! let mut pure = scene.pure_pixels.clone();
//! found.sort();
//! pure.sort();
//! assert_eq!(found, pure);
//! ```
//!
//! # Logging
//!
//! Every stage logs through the `log` facade (`info` per stage, `debug` per
//! sweep, `trace` per vertex position); install `env_logger` or any other
//! backend to see it.

pub mod builder;
pub mod core;
pub mod errors;
pub mod metrics;
pub mod reduction;
pub mod refiner;
pub mod synthetic;
pub mod volume;

#[cfg(test)]
mod tests;
