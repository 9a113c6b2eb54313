//! Training result types for the bagged ensemble.

use crate::forest::Forest;
use crate::importance::RankedAttribute;
use crate::node::AttributeIndex;
use crate::oob::OobScore;

/// Metadata about the training run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrainingMetadata {
    /// Number of trees trained.
    pub n_trees: usize,
    /// Number of training records (also the size of every bootstrap draw).
    pub n_records: usize,
    /// Record width.
    pub width: usize,
    /// Target column.
    pub target: AttributeIndex,
    /// Number of candidate attributes each tree could split on.
    pub n_candidates: usize,
    /// Master seed the per-tree seeds were derived from.
    pub seed: u64,
}

/// Result of ensemble training.
///
/// Contains the fitted forest, attribute importances, optional OOB score,
/// per-tree OOB row indices, and training metadata.
#[derive(Debug)]
pub struct ForestResult {
    forest: Forest,
    importances: Vec<RankedAttribute>,
    oob_score: Option<OobScore>,
    oob_indices_per_tree: Vec<Vec<usize>>,
    metadata: TrainingMetadata,
}

impl ForestResult {
    pub(crate) fn new(
        forest: Forest,
        importances: Vec<RankedAttribute>,
        oob_score: Option<OobScore>,
        oob_indices_per_tree: Vec<Vec<usize>>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            importances,
            oob_score,
            oob_indices_per_tree,
            metadata,
        }
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Consume the result and return the fitted forest.
    #[must_use]
    pub fn into_forest(self) -> Forest {
        self.forest
    }

    /// Return the ranked attribute importances.
    #[must_use]
    pub fn importances(&self) -> &[RankedAttribute] {
        &self.importances
    }

    /// Return the OOB score, if computed.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.oob_score.as_ref()
    }

    /// Return the per-tree out-of-bag row indices.
    #[must_use]
    pub fn oob_indices_per_tree(&self) -> &[Vec<usize>] {
        &self.oob_indices_per_tree
    }

    /// Return training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}
