//! Out-of-bag (OOB) evaluation for the bagged ensemble.

use crate::dataset::Dataset;
use crate::error::Id3Error;
use crate::evaluate::Evaluation;
use crate::node::AttributeIndex;
use crate::predict::{Prediction, VoteTally};
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// OOB accuracy (fraction of OOB-evaluated records predicted correctly).
    pub accuracy: f64,
    /// Confusion counts over the OOB-evaluated records.
    pub evaluation: Evaluation,
    /// Number of records that had at least one OOB tree.
    pub n_oob_records: usize,
}

/// Compute out-of-bag predictions and accuracy.
///
/// Each record is classified by majority vote among only the trees whose
/// bootstrap did not draw it. Records with no such tree are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    dataset: &Dataset,
    target: AttributeIndex,
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, Id3Error> {
    let mut tallies: Vec<VoteTally> = vec![VoteTally::default(); dataset.len()];
    for (tree, oob_indices) in trees.iter().zip(oob_indices_per_tree) {
        for &row in oob_indices {
            tallies[row].record(tree.traverse(dataset.record(row)));
        }
    }

    let mut expected = Vec::new();
    let mut predicted = Vec::new();
    for (row, tally) in tallies.iter().enumerate() {
        let Some(winner) = tally.winner() else {
            continue;
        };
        expected.push(dataset.value(row, target));
        predicted.push(winner);
    }

    if predicted.is_empty() {
        return Err(Id3Error::OobEvaluationFailed {
            reason: "no record has any OOB tree".to_string(),
        });
    }

    let evaluation = Evaluation::from_predictions(&expected, &predicted)?;
    Ok(OobScore {
        accuracy: evaluation.accuracy(),
        n_oob_records: predicted.len(),
        evaluation,
    })
}
