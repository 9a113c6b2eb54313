//! Configuration builder for bagged ensemble training.

use crate::dataset::Dataset;
use crate::error::Id3Error;
use crate::result::ForestResult;
use crate::tree::TreeConfig;

/// Whether to compute out-of-bag evaluation during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    /// Compute OOB accuracy and confusion counts.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}

/// Configuration for bagged ID3 ensemble training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter  | Default    |
/// |------------|------------|
/// | `seed`     | 42         |
/// | `oob_mode` | `Disabled` |
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) seed: u64,
    pub(crate) oob_mode: OobMode,
}

impl ForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, Id3Error> {
        if n_trees == 0 {
            return Err(Id3Error::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            seed: 42,
            oob_mode: OobMode::Disabled,
        })
    }

    /// Set the master seed from which every per-tree seed is derived.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the OOB evaluation mode.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the OOB evaluation mode.
    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Train a bagged ensemble of ID3 trees on `dataset`.
    ///
    /// Every member uses the target and candidate list of `tree_config`.
    /// Trees are built in parallel; the result depends only on the seed, not
    /// on the number of worker threads.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                           |
    /// |------------------------------------|------------------------------------------------|
    /// | [`Id3Error::TargetOutOfRange`]     | target column ≥ dataset width                  |
    /// | [`Id3Error::CandidateOutOfRange`]  | a candidate column ≥ dataset width             |
    /// | [`Id3Error::TargetIsCandidate`]    | the target is listed as a candidate            |
    /// | [`Id3Error::DuplicateCandidate`]   | a candidate is listed twice                    |
    /// | [`Id3Error::OobEvaluationFailed`]  | OOB enabled but no record has any OOB tree     |
    pub fn fit(&self, dataset: &Dataset, tree_config: &TreeConfig) -> Result<ForestResult, Id3Error> {
        crate::forest::train(self, dataset, tree_config)
    }
}
