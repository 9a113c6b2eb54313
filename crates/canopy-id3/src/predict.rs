//! Prediction types and majority voting for the bagged ensemble.

use std::collections::BTreeMap;
use std::fmt;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::Id3Error;
use crate::forest::Forest;
use crate::node::AttributeIndex;
use crate::tree::DecisionTree;

/// Outcome of classifying one record.
///
/// Ordering puts every `Label` (numerically) before `Unclassifiable`; the
/// ensemble uses it to break vote ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    /// A label value read from a leaf.
    Label(u32),
    /// Traversal met an attribute value never seen at that node during training.
    Unclassifiable,
}

impl Prediction {
    /// Return the predicted label, or `None` when unclassifiable.
    #[must_use]
    pub fn label(self) -> Option<u32> {
        match self {
            Prediction::Label(label) => Some(label),
            Prediction::Unclassifiable => None,
        }
    }

    /// Return `true` for [`Prediction::Unclassifiable`].
    #[must_use]
    pub fn is_unclassifiable(self) -> bool {
        matches!(self, Prediction::Unclassifiable)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Label(label) => write!(f, "{label}"),
            Prediction::Unclassifiable => f.write_str("unclassifiable"),
        }
    }
}

/// Per-prediction vote counts from the members of an ensemble.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTally {
    counts: BTreeMap<Prediction, usize>,
    n_votes: usize,
}

impl VoteTally {
    /// Count one vote.
    pub(crate) fn record(&mut self, prediction: Prediction) {
        *self.counts.entry(prediction).or_insert(0) += 1;
        self.n_votes += 1;
    }

    /// Tally the votes of `trees` on `record` (already width-checked).
    pub(crate) fn from_trees<'a>(
        trees: impl IntoIterator<Item = &'a DecisionTree>,
        record: &[u32],
    ) -> Self {
        let mut tally = Self::default();
        for tree in trees {
            tally.record(tree.traverse(record));
        }
        tally
    }

    /// The prediction with the highest count.
    ///
    /// Ties go to the smallest prediction: the lowest label, with
    /// `Unclassifiable` losing to any label. `None` when no votes were cast.
    #[must_use]
    pub fn winner(&self) -> Option<Prediction> {
        let mut best: Option<(Prediction, usize)> = None;
        // BTreeMap iterates in ascending order, so strict `>` keeps the smallest tie.
        for (&prediction, &count) in &self.counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((prediction, count)),
            }
        }
        best.map(|(prediction, _)| prediction)
    }

    /// Return the number of votes for `prediction`.
    #[must_use]
    pub fn count(&self, prediction: Prediction) -> usize {
        self.counts.get(&prediction).copied().unwrap_or(0)
    }

    /// Return the total number of votes cast.
    #[must_use]
    pub fn n_votes(&self) -> usize {
        self.n_votes
    }

    /// Iterate `(prediction, count)` pairs in ascending prediction order.
    pub fn iter(&self) -> impl Iterator<Item = (Prediction, usize)> + '_ {
        self.counts.iter().map(|(&p, &c)| (p, c))
    }
}

impl Forest {
    /// Classify a single record by majority vote over every member tree.
    ///
    /// `Unclassifiable` member results form their own vote category. Ties
    /// are broken as described on [`VoteTally::winner`].
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::RecordWidthMismatch`] when `record.len()` differs
    /// from the training width.
    pub fn classify(&self, record: &[u32]) -> Result<Prediction, Id3Error> {
        Ok(self
            .votes(record)?
            .winner()
            .unwrap_or(Prediction::Unclassifiable))
    }

    /// Return the full vote tally for a single record.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::RecordWidthMismatch`] when `record.len()` differs
    /// from the training width.
    pub fn votes(&self, record: &[u32]) -> Result<VoteTally, Id3Error> {
        if record.len() != self.width {
            return Err(Id3Error::RecordWidthMismatch {
                expected: self.width,
                got: record.len(),
            });
        }
        Ok(VoteTally::from_trees(&self.trees, record))
    }

    /// Classify a batch of records in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::RecordWidthMismatch`] if any record has the wrong width.
    pub fn classify_batch(&self, records: &[Vec<u32>]) -> Result<Vec<Prediction>, Id3Error> {
        records
            .into_par_iter()
            .map(|record| self.classify(record))
            .collect()
    }

    /// Return the member trees in construction order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the record width this forest was trained on.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the target column.
    #[must_use]
    pub fn target(&self) -> AttributeIndex {
        self.target
    }

    /// Return the candidate attributes every member was built with.
    #[must_use]
    pub fn candidates(&self) -> &[AttributeIndex] {
        &self.candidates
    }
}
