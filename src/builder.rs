use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::SpectralDataset;
use crate::errors::{NFindrError, Result};
use crate::reduction::{max_target_dim, DimensionalityReducer, PcaReducer};
use crate::refiner::{validate_indices, EndmemberRefiner};

use log::{debug, info, trace};

/// Run configuration. Every field has a default, so partial configs
/// deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NFindrParams {
    /// Number of endmembers to extract (p).
    pub n_endmembers: usize,
    /// Refinement sweeps; the search always runs all of them.
    pub max_iter: usize,
    /// Seed for the initial random selection; drawn fresh when `None`.
    pub seed: Option<u64>,
    /// Scan candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for NFindrParams {
    fn default() -> Self {
        Self {
            n_endmembers: 3,
            max_iter: 5,
            seed: None,
            parallel: true,
        }
    }
}

/// Result of one N-FINDR run.
#[derive(Clone, Debug)]
pub struct NFindrOutput {
    /// Bands × p endmember spectra, column i taken from pixel `indices[i]`.
    pub endmembers: DenseMatrix<f64>,
    /// Final pixel index of every endmember.
    pub indices: Vec<usize>,
    /// Pixel indices the refinement started from.
    pub initial_indices: Vec<usize>,
    /// Simplex volume of the final selection in the reduced space.
    pub volume: f64,
    /// Volume after initialisation, then after each sweep (`max_iter + 1` values).
    pub volume_history: Vec<f64>,
    /// Committed vertex replacements over the whole run.
    pub replacements: usize,
    /// Seed that drove the initial draw, `None` when the caller supplied the
    /// random source or the initial indices.
    pub seed: Option<u64>,
}

pub struct NFindrBuilder<D: DimensionalityReducer = PcaReducer> {
    params: NFindrParams,
    reducer: D,
    initial_indices: Option<Vec<usize>>,
}

impl Default for NFindrBuilder<PcaReducer> {
    fn default() -> Self {
        debug!("Creating NFindrBuilder with default parameters");
        Self {
            params: NFindrParams::default(),
            reducer: PcaReducer::default(),
            initial_indices: None,
        }
    }
}

impl NFindrBuilder<PcaReducer> {
    pub fn new() -> Self {
        info!("Initializing new NFindrBuilder");
        Self::default()
    }
}

impl<D: DimensionalityReducer> NFindrBuilder<D> {
    // -------------------- Configuration --------------------

    /// Number of endmembers `p` to extract.
    pub fn with_endmembers(mut self, p: usize) -> Self {
        info!("Setting number of endmembers: {}", p);
        self.params.n_endmembers = p;
        self
    }

    /// Number of refinement sweeps.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        info!("Setting refinement sweeps: {}", max_iter);
        self.params.max_iter = max_iter;
        self
    }

    /// Seed for reproducible initialisation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        info!("Setting seed: {}", seed);
        self.params.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        info!("Setting parallel candidate scan: {}", parallel);
        self.params.parallel = parallel;
        self
    }

    /// Replace the random draw with explicit starting pixels.
    pub fn with_initial_indices(mut self, indices: Vec<usize>) -> Self {
        info!("Using caller-supplied initial indices: {:?}", indices);
        self.initial_indices = Some(indices);
        self
    }

    /// Replace every parameter at once (e.g. from a deserialized config).
    pub fn with_params(mut self, params: NFindrParams) -> Self {
        info!("Applying parameters: {:?}", params);
        self.params = params;
        self
    }

    /// Swap the dimensionality reduction collaborator.
    pub fn with_reducer<R: DimensionalityReducer>(self, reducer: R) -> NFindrBuilder<R> {
        NFindrBuilder {
            params: self.params,
            reducer,
            initial_indices: self.initial_indices,
        }
    }

    pub fn params(&self) -> &NFindrParams {
        &self.params
    }

    // -------------------- Validation --------------------

    /// Checks the configuration against a scene of `nbands` × `npixels`.
    ///
    /// Order: enough pixels for p distinct draws, then
    /// `2 <= p <= min(bands, pixels - 1) + 1`, then the initial indices.
    pub fn validate(&self, nbands: usize, npixels: usize) -> Result<()> {
        let p = self.params.n_endmembers;
        if p > npixels {
            return Err(NFindrError::TooFewPixels { p, pixels: npixels });
        }
        let max = max_target_dim(nbands, npixels) + 1;
        if p < 2 || p > max {
            return Err(NFindrError::InvalidEndmemberCount {
                p,
                max,
                bands: nbands,
                pixels: npixels,
            });
        }
        if let Some(indices) = &self.initial_indices {
            validate_indices(indices, p, npixels)?;
        }
        Ok(())
    }

    // -------------------- Build --------------------

    /// Runs N-FINDR on `data`.
    ///
    /// The initial draw uses a `ChaCha8Rng` seeded from the configured seed, or
    /// from a freshly drawn one (logged and returned in the output) when no
    /// seed is set.
    pub fn build(&self, data: &SpectralDataset) -> Result<NFindrOutput> {
        let (nbands, npixels) = data.shape();
        self.validate(nbands, npixels)?;

        let seed = self.params.seed.unwrap_or_else(rand::random);
        info!("Initial selection seed: {}", seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut output = self.run(data, &mut rng)?;
        if self.initial_indices.is_none() {
            output.seed = Some(seed);
        }
        Ok(output)
    }

    /// Runs N-FINDR drawing the initial selection from `rng`.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        data: &SpectralDataset,
        rng: &mut R,
    ) -> Result<NFindrOutput> {
        let (nbands, npixels) = data.shape();
        self.validate(nbands, npixels)?;
        self.run(data, rng)
    }

    fn run<R: Rng + ?Sized>(&self, data: &SpectralDataset, rng: &mut R) -> Result<NFindrOutput> {
        let (nbands, npixels) = data.shape();
        let p = self.params.n_endmembers;

        info!(
            "Building N-FINDR endmembers: p={} from {} bands x {} pixels",
            p, nbands, npixels
        );
        debug!("Build configuration: {:?}", self.params);

        // 1) Reduce to p-1 dimensions
        trace!("Reducing spectra to {} dimensions", p - 1);
        let reduced = self.reducer.reduce(data.matrix(), p - 1)?;
        if reduced.shape() != (p - 1, npixels) {
            return Err(NFindrError::ShapeMismatch {
                expected: (p - 1, npixels),
                actual: reduced.shape(),
            });
        }

        // 2) Initial selection
        let refiner = match &self.initial_indices {
            Some(indices) => EndmemberRefiner::from_indices(&reduced, indices.clone())?,
            None => EndmemberRefiner::random(&reduced, p, rng)?,
        };
        let mut refiner = refiner.with_parallel(self.params.parallel);
        let initial_indices = refiner.indices().to_vec();

        // 3) Fixed-budget refinement
        refiner.run(self.params.max_iter);
        let replacements = refiner.replacements();
        let (state, volume_history) = refiner.finish();

        // 4) Back to the original spectral space
        let indices = state.indices().to_vec();
        let endmembers = data.select_pixels(&indices);

        info!(
            "N-FINDR completed: indices={:?}, volume={:.6e}",
            indices,
            state.volume().value()
        );

        Ok(NFindrOutput {
            endmembers,
            indices,
            initial_indices,
            volume: state.volume().value(),
            volume_history,
            replacements,
            seed: None,
        })
    }
}

/// Extracts `p` endmembers with default PCA reduction and `max_iter` sweeps.
///
/// # Examples
///
/// ```
/// use nfindr::builder::extract_endmembers;
/// use nfindr::core::SpectralDataset;
/// use smartcore::linalg::basic::arrays::Array;
///
/// let data = SpectralDataset::from_pixels(&[
///     vec![1.0, 0.0, 0.0],
///     vec![0.0, 1.0, 0.0],
///     vec![0.0, 0.0, 1.0],
///     vec![0.4, 0.3, 0.3],
///     vec![0.2, 0.5, 0.3],
/// ]).unwrap();
///
/// let endmembers = extract_endmembers(&data, 3, 3, Some(11)).unwrap();
/// assert_eq!(endmembers.shape(), (3, 3));
/// ```
pub fn extract_endmembers(
    data: &SpectralDataset,
    p: usize,
    max_iter: usize,
    seed: Option<u64>,
) -> Result<DenseMatrix<f64>> {
    let params = NFindrParams {
        n_endmembers: p,
        max_iter,
        seed,
        ..NFindrParams::default()
    };
    NFindrBuilder::new()
        .with_params(params)
        .build(data)
        .map(|out| out.endmembers)
}
