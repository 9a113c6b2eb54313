//! Bagged ensemble training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{ForestConfig, OobMode};
use crate::dataset::Dataset;
use crate::error::Id3Error;
use crate::importance::aggregate_importances;
use crate::node::AttributeIndex;
use crate::oob::compute_oob;
use crate::result::{ForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, TreeConfig, grow};

/// A fitted bagged ensemble of ID3 trees.
#[derive(Debug, Clone)]
pub struct Forest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) target: AttributeIndex,
    pub(crate) candidates: Vec<AttributeIndex>,
    pub(crate) width: usize,
}

/// Draw `n_records` row indices uniformly with replacement.
///
/// Returns the bootstrap view and the rows it never drew (out-of-bag).
fn bootstrap_sample(n_records: usize, rng: &mut impl Rng) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_records];
    let mut bootstrap_indices = Vec::with_capacity(n_records);
    for _ in 0..n_records {
        let idx = rng.gen_range(0..n_records);
        bootstrap_indices.push(idx);
        in_bag[idx] = true;
    }
    let oob_indices: Vec<usize> = (0..n_records).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}

impl Forest {
    /// Build `n_trees` members sequentially, drawing every bootstrap from `rng`.
    ///
    /// Each member is grown on `|dataset|` rows sampled with replacement,
    /// with the full candidate list of `tree_config`.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::InvalidTreeCount`] if `n_trees` is zero, or any
    /// target/candidate validation error from [`TreeConfig`].
    #[instrument(skip_all, fields(n_trees = n_trees, n_records = dataset.len()))]
    pub fn fit_with_rng(
        dataset: &Dataset,
        tree_config: &TreeConfig,
        n_trees: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, Id3Error> {
        if n_trees == 0 {
            return Err(Id3Error::InvalidTreeCount { n_trees });
        }
        let candidates = tree_config.resolve_candidates(dataset)?;
        let target = tree_config.target();

        let trees: Vec<DecisionTree> = (0..n_trees)
            .map(|_| {
                let (bootstrap, _) = bootstrap_sample(dataset.len(), &mut *rng);
                grow(dataset, &bootstrap, target, &candidates)
            })
            .collect();

        debug!(n_trees_trained = trees.len(), "sequential ensemble built");

        Ok(Self {
            trees,
            target,
            candidates,
            width: dataset.width(),
        })
    }
}

/// Train the ensemble with one derived seed per tree.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_records = dataset.len()))]
pub(crate) fn train(
    config: &ForestConfig,
    dataset: &Dataset,
    tree_config: &TreeConfig,
) -> Result<ForestResult, Id3Error> {
    let candidates = tree_config.resolve_candidates(dataset)?;
    let target = tree_config.target();
    let n_records = dataset.len();

    info!(
        n_trees = config.n_trees,
        n_records,
        width = dataset.width(),
        target = target.index(),
        n_candidates = candidates.len(),
        seed = config.seed,
        "training bagged ensemble"
    );

    // Per-tree seeds come from the master RNG, so results do not depend on scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_results: Vec<(DecisionTree, Vec<usize>)> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (bootstrap, oob) = bootstrap_sample(n_records, &mut rng);
            (grow(dataset, &bootstrap, target, &candidates), oob)
        })
        .collect();

    let mut trees = Vec::with_capacity(config.n_trees);
    let mut oob_indices_per_tree = Vec::with_capacity(config.n_trees);
    for (tree, oob) in tree_results {
        trees.push(tree);
        oob_indices_per_tree.push(oob);
    }

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let per_tree_importances: Vec<Vec<f64>> =
        trees.iter().map(DecisionTree::attribute_importances).collect();
    let importances = aggregate_importances(&per_tree_importances, &candidates);

    let oob_score = if config.oob_mode == OobMode::Enabled {
        Some(compute_oob(&trees, dataset, target, &oob_indices_per_tree)?)
    } else {
        None
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_records,
        width: dataset.width(),
        target,
        n_candidates: candidates.len(),
        seed: config.seed,
    };

    let forest = Forest {
        trees,
        target,
        candidates,
        width: dataset.width(),
    };

    info!(
        oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
        "ensemble training complete"
    );

    Ok(ForestResult::new(
        forest,
        importances,
        oob_score,
        oob_indices_per_tree,
        metadata,
    ))
}
