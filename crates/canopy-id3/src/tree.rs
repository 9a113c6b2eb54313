use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;

use tracing::{debug, instrument};

use crate::{
    Id3Error,
    dataset::Dataset,
    gain::{best_split, majority_label, partition},
    node::{AttributeIndex, Node, NodeIndex},
    predict::Prediction,
};

/// Configuration for a single ID3 decision tree.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter    | Default                                          |
/// |--------------|--------------------------------------------------|
/// | `candidates` | every column except the target, ascending order |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) target: AttributeIndex,
    pub(crate) candidates: Option<Vec<AttributeIndex>>,
}

impl TreeConfig {
    /// Create a new config predicting the given target column.
    #[must_use]
    pub fn new(target: AttributeIndex) -> Self {
        Self {
            target,
            candidates: None,
        }
    }

    /// Set the candidate attributes, in the order ties are resolved.
    ///
    /// Earlier candidates win gain ties.
    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<AttributeIndex>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    // --- Getters ---

    /// Return the target column.
    #[must_use]
    pub fn target(&self) -> AttributeIndex {
        self.target
    }

    /// Return the explicit candidate list, if one was set.
    #[must_use]
    pub fn candidates(&self) -> Option<&[AttributeIndex]> {
        self.candidates.as_deref()
    }

    /// Validate the target against `dataset` and return the candidate list to use.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`Id3Error::TargetOutOfRange`] | target column ≥ dataset width |
    /// | [`Id3Error::CandidateOutOfRange`] | a candidate column ≥ dataset width |
    /// | [`Id3Error::TargetIsCandidate`] | the target is listed as a candidate |
    /// | [`Id3Error::DuplicateCandidate`] | a candidate is listed twice |
    pub(crate) fn resolve_candidates(&self, dataset: &Dataset) -> Result<Vec<AttributeIndex>, Id3Error> {
        let width = dataset.width();
        if self.target.index() >= width {
            return Err(Id3Error::TargetOutOfRange {
                target: self.target.index(),
                width,
            });
        }

        let Some(candidates) = &self.candidates else {
            return Ok(dataset.attributes_except(self.target));
        };

        let mut seen = HashSet::with_capacity(candidates.len());
        for &attribute in candidates {
            if attribute.index() >= width {
                return Err(Id3Error::CandidateOutOfRange {
                    attribute: attribute.index(),
                    width,
                });
            }
            if attribute == self.target {
                return Err(Id3Error::TargetIsCandidate {
                    target: self.target.index(),
                });
            }
            if !seen.insert(attribute) {
                return Err(Id3Error::DuplicateCandidate {
                    attribute: attribute.index(),
                });
            }
        }
        Ok(candidates.clone())
    }

    /// Induce a tree from every record of `dataset`.
    ///
    /// # Errors
    ///
    /// See [`TreeConfig::fit_samples`].
    pub fn fit(&self, dataset: &Dataset) -> Result<DecisionTree, Id3Error> {
        self.fit_samples(dataset, &dataset.all_rows())
    }

    /// Induce a tree from the records named by `samples` (row indices, repeats allowed).
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`Id3Error::SampleOutOfRange`] | a row index ≥ `dataset.len()` |
    /// | [`Id3Error::TargetOutOfRange`] | target column ≥ dataset width |
    /// | [`Id3Error::CandidateOutOfRange`] | a candidate column ≥ dataset width |
    /// | [`Id3Error::TargetIsCandidate`] | the target is listed as a candidate |
    /// | [`Id3Error::DuplicateCandidate`] | a candidate is listed twice |
    #[instrument(skip(self, dataset, samples), fields(n_samples = samples.len()))]
    pub fn fit_samples(&self, dataset: &Dataset, samples: &[usize]) -> Result<DecisionTree, Id3Error> {
        if let Some(&row) = samples.iter().find(|&&row| row >= dataset.len()) {
            return Err(Id3Error::SampleOutOfRange {
                row,
                n_records: dataset.len(),
            });
        }
        let candidates = self.resolve_candidates(dataset)?;

        debug!(
            n_samples = samples.len(),
            width = dataset.width(),
            target = self.target.index(),
            n_candidates = candidates.len(),
            "fitting decision tree"
        );

        let tree = grow(dataset, samples, self.target, &candidates);

        debug!(n_nodes = tree.n_nodes(), depth = tree.depth(), "decision tree built");

        Ok(tree)
    }
}

/// Build a tree over pre-validated inputs.
pub(crate) fn grow(
    dataset: &Dataset,
    samples: &[usize],
    target: AttributeIndex,
    candidates: &[AttributeIndex],
) -> DecisionTree {
    let mut arena: Vec<Node> = Vec::new();
    build_tree(dataset, samples, target, candidates, &mut arena);
    DecisionTree {
        nodes: arena,
        width: dataset.width(),
        target,
    }
}

/// Recursively build the arena-based decision tree.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
fn build_tree(
    dataset: &Dataset,
    samples: &[usize],
    target: AttributeIndex,
    candidates: &[AttributeIndex],
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let n_samples = samples.len();
    let majority = majority_label(dataset, samples, target);

    let make_leaf = |arena: &mut Vec<Node>| -> NodeIndex {
        let idx = arena.len();
        arena.push(Node::Leaf {
            target,
            label: majority,
            n_samples,
        });
        NodeIndex::new(idx)
    };

    // Stopping conditions → leaf.
    if samples.is_empty() || candidates.len() <= 1 {
        return make_leaf(arena);
    }
    let first = dataset.value(samples[0], target);
    if samples.iter().all(|&row| dataset.value(row, target) == first) {
        return make_leaf(arena);
    }

    let Some((best, gain)) = best_split(dataset, samples, target, candidates) else {
        return make_leaf(arena);
    };

    let remaining: Vec<AttributeIndex> = candidates
        .iter()
        .copied()
        .filter(|&attribute| attribute != best)
        .collect();

    // Arena pattern: reserve index, recurse, then overwrite with the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        target,
        label: majority,
        n_samples,
    });

    let mut children = BTreeMap::new();
    for (value, subset) in partition(dataset, samples, best) {
        let child = build_tree(dataset, &subset, target, &remaining, arena);
        children.insert(value, child);
    }

    arena[node_idx] = Node::Split {
        attribute: best,
        children,
        gain,
        n_samples,
    };

    NodeIndex::new(node_idx)
}

/// A fitted ID3 decision tree.
///
/// Stored as an arena-based `Vec<Node>` with the root at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) width: usize,
    pub(crate) target: AttributeIndex,
}

impl DecisionTree {
    /// Classify a single record.
    ///
    /// Traverses from the root, following the child keyed by the record's
    /// value of each split attribute. Returns [`Prediction::Unclassifiable`]
    /// when a value was never seen at that node during training.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::RecordWidthMismatch`] when `record.len()` differs
    /// from the training width.
    pub fn classify(&self, record: &[u32]) -> Result<Prediction, Id3Error> {
        if record.len() != self.width {
            return Err(Id3Error::RecordWidthMismatch {
                expected: self.width,
                got: record.len(),
            });
        }
        Ok(self.traverse(record))
    }

    /// Classify every record in order.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::RecordWidthMismatch`] if any record has the wrong width.
    pub fn classify_batch(&self, records: &[Vec<u32>]) -> Result<Vec<Prediction>, Id3Error> {
        records.iter().map(|record| self.classify(record)).collect()
    }

    /// Walk from the root; `record` must already have the training width.
    pub(crate) fn traverse(&self, record: &[u32]) -> Prediction {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { label, .. } => {
                    return label.map_or(Prediction::Unclassifiable, Prediction::Label);
                }
                Node::Split {
                    attribute,
                    children,
                    ..
                } => match children.get(&record[attribute.index()]) {
                    Some(child) => idx = child.index(),
                    None => return Prediction::Unclassifiable,
                },
            }
        }
    }

    /// Return the root node index.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Borrow the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this tree.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    /// Borrow the whole node arena.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate `(value, child node)` pairs of the node at `index`, ascending by value.
    pub fn children(&self, index: NodeIndex) -> impl Iterator<Item = (u32, &Node)> + '_ {
        self.node(index)
            .children()
            .map(|(value, child)| (value, self.node(child)))
    }

    /// Node indices in breadth-first order from the root.
    #[must_use]
    pub fn breadth_first(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        queue.push_back(self.root());
        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            queue.extend(self.node(idx).children().map(|(_, child)| child));
        }
        order
    }

    /// Return the target column this tree predicts.
    #[must_use]
    pub fn target(&self) -> AttributeIndex {
        self.target
    }

    /// Return the record width this tree was trained on.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = VecDeque::new();
        queue.push_back((self.root(), 0usize));
        while let Some((idx, d)) = queue.pop_front() {
            max_depth = max_depth.max(d);
            queue.extend(self.node(idx).children().map(|(_, child)| (child, d + 1)));
        }
        max_depth
    }

    /// Information-gain attribute importances.
    ///
    /// Each `Split` contributes `gain × n_samples` to its attribute; totals are
    /// normalized to sum to 1.0. Returns a `Vec` of length `width`, all zeros
    /// when the tree is a single leaf.
    #[must_use]
    pub fn attribute_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.width];
        for node in &self.nodes {
            if let Node::Split {
                attribute,
                gain,
                n_samples,
                ..
            } = node
            {
                totals[attribute.index()] += gain * *n_samples as f64;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }
}

/// One line per node in breadth-first order: `#index Node: ...`.
impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in self.breadth_first() {
            writeln!(f, "{idx} {}", self.node(idx))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(i: usize) -> AttributeIndex {
        AttributeIndex::new(i)
    }

    fn label(l: u32) -> Prediction {
        Prediction::Label(l)
    }

    /// Target in column 0, fully determined by column 1; column 2 is noise.
    fn example() -> Dataset {
        Dataset::new(vec![vec![0, 1, 0], vec![0, 1, 1], vec![1, 0, 0], vec![1, 0, 1]]).unwrap()
    }

    /// Target = a AND b (columns 1 and 2); column 3 is constant.
    fn conjunction() -> Dataset {
        Dataset::new(vec![
            vec![0, 0, 0, 7],
            vec![0, 0, 1, 7],
            vec![0, 1, 0, 7],
            vec![1, 1, 1, 7],
        ])
        .unwrap()
    }

    #[test]
    fn end_to_end_single_split() {
        let tree = TreeConfig::new(attr(0)).fit(&example()).unwrap();

        match tree.node(tree.root()) {
            Node::Split {
                attribute,
                children,
                gain,
                n_samples,
            } => {
                assert_eq!(*attribute, attr(1));
                assert_eq!(children.len(), 2);
                assert!((gain - 1.0).abs() < 1e-12);
                assert_eq!(*n_samples, 4);
            }
            Node::Leaf { .. } => panic!("root should split"),
        }

        let kids: Vec<(u32, Option<u32>)> = tree
            .children(tree.root())
            .map(|(value, node)| match node {
                Node::Leaf { label, .. } => (value, *label),
                Node::Split { .. } => panic!("children should be leaves"),
            })
            .collect();
        assert_eq!(kids, vec![(0, Some(1)), (1, Some(0))]);

        assert_eq!(tree.classify(&[9, 1, 9]).unwrap(), label(0));
        assert_eq!(tree.classify(&[9, 0, 9]).unwrap(), label(1));
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn single_record_is_leaf_with_its_label() {
        let ds = Dataset::new(vec![vec![4, 1, 2, 3]]).unwrap();
        let tree = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert!(matches!(
            tree.node(tree.root()),
            Node::Leaf { label: Some(4), .. }
        ));
        assert_eq!(tree.classify(&[0, 0, 0, 0]).unwrap(), label(4));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let ds = Dataset::new(vec![vec![1, 0, 5], vec![1, 1, 6], vec![1, 2, 7]]).unwrap();
        let tree = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.classify(&[0, 2, 3]).unwrap(), label(1));
    }

    #[test]
    fn single_candidate_stops_recursion() {
        let tree = TreeConfig::new(attr(0))
            .with_candidates(vec![attr(1)])
            .fit(&example())
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        // Majority tie between 0 and 1 keeps the first seen.
        assert_eq!(tree.classify(&[0, 0, 0]).unwrap(), label(0));
    }

    #[test]
    fn xor_has_no_gain_at_root() {
        let ds = Dataset::new(vec![
            vec![0, 0, 0],
            vec![1, 0, 1],
            vec![1, 1, 0],
            vec![0, 1, 1],
        ])
        .unwrap();
        let tree = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        // 1 is first to reach a count of two.
        assert_eq!(tree.classify(&[9, 1, 1]).unwrap(), label(1));
    }

    #[test]
    fn conjunction_needs_depth_two() {
        let ds = conjunction();
        let tree = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.node(tree.root()).attribute(), attr(1));
        for record in ds.records() {
            assert_eq!(tree.classify(record).unwrap(), label(record[0]));
        }
    }

    #[test]
    fn determining_attribute_reproduces_training_labels() {
        // Column 2 maps 10→3, 20→5, 30→3, 40→8 one-to-one onto values.
        let ds = Dataset::new(vec![
            vec![3, 0, 10],
            vec![5, 1, 20],
            vec![3, 0, 30],
            vec![8, 1, 40],
            vec![5, 0, 20],
            vec![3, 1, 10],
        ])
        .unwrap();
        let tree = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        for record in ds.records() {
            assert_eq!(tree.classify(record).unwrap(), label(record[0]));
        }
    }

    #[test]
    fn unseen_value_is_unclassifiable() {
        let tree = TreeConfig::new(attr(0)).fit(&example()).unwrap();
        assert_eq!(tree.classify(&[0, 5, 0]).unwrap(), Prediction::Unclassifiable);
    }

    #[test]
    fn empty_view_leaf_is_unclassifiable() {
        let ds = example();
        let tree = TreeConfig::new(attr(0)).fit_samples(&ds, &[]).unwrap();
        assert!(matches!(
            tree.node(tree.root()),
            Node::Leaf { label: None, n_samples: 0, .. }
        ));
        assert_eq!(tree.classify(&[0, 1, 0]).unwrap(), Prediction::Unclassifiable);
    }

    #[test]
    fn fit_samples_uses_only_the_view() {
        // Rows 2 and 3 only: label 1 everywhere.
        let tree = TreeConfig::new(attr(0)).fit_samples(&example(), &[2, 3, 3]).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.classify(&[0, 1, 0]).unwrap(), label(1));
    }

    #[test]
    fn sample_out_of_range_error() {
        let err = TreeConfig::new(attr(0)).fit_samples(&example(), &[0, 4]).unwrap_err();
        assert!(matches!(err, Id3Error::SampleOutOfRange { row: 4, n_records: 4 }));
    }

    #[test]
    fn target_out_of_range_error() {
        let err = TreeConfig::new(attr(3)).fit(&example()).unwrap_err();
        assert!(matches!(err, Id3Error::TargetOutOfRange { target: 3, width: 3 }));
    }

    #[test]
    fn candidate_errors() {
        let ds = example();
        let err = TreeConfig::new(attr(0))
            .with_candidates(vec![attr(1), attr(5)])
            .fit(&ds)
            .unwrap_err();
        assert!(matches!(err, Id3Error::CandidateOutOfRange { attribute: 5, .. }));

        let err = TreeConfig::new(attr(0))
            .with_candidates(vec![attr(0), attr(1)])
            .fit(&ds)
            .unwrap_err();
        assert!(matches!(err, Id3Error::TargetIsCandidate { target: 0 }));

        let err = TreeConfig::new(attr(0))
            .with_candidates(vec![attr(2), attr(1), attr(2)])
            .fit(&ds)
            .unwrap_err();
        assert!(matches!(err, Id3Error::DuplicateCandidate { attribute: 2 }));
    }

    #[test]
    fn record_width_mismatch() {
        let tree = TreeConfig::new(attr(0)).fit(&example()).unwrap();
        let err = tree.classify(&[1]).unwrap_err();
        assert!(matches!(
            err,
            Id3Error::RecordWidthMismatch { expected: 3, got: 1 }
        ));
    }

    #[test]
    fn classify_batch_in_order() {
        let tree = TreeConfig::new(attr(0)).fit(&example()).unwrap();
        let preds = tree
            .classify_batch(&[vec![0, 0, 0], vec![0, 1, 0], vec![0, 3, 0]])
            .unwrap();
        assert_eq!(preds, vec![label(1), label(0), Prediction::Unclassifiable]);
    }

    #[test]
    fn attribute_importances_favor_split_attribute() {
        let tree = TreeConfig::new(attr(0)).fit(&conjunction()).unwrap();
        let imp = tree.attribute_importances();
        assert_eq!(imp.len(), 4);
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        assert_eq!(imp[0], 0.0);
        assert_eq!(imp[3], 0.0);
        assert!(imp[1] > 0.0 && imp[2] > 0.0);
    }

    #[test]
    fn attribute_importances_zero_for_leaf() {
        let ds = Dataset::new(vec![vec![1, 0], vec![1, 1]]).unwrap();
        let tree = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        assert_eq!(tree.attribute_importances(), vec![0.0, 0.0]);
    }

    #[test]
    fn display_is_breadth_first() {
        let tree = TreeConfig::new(attr(0)).fit(&example()).unwrap();
        let printed = format!("{tree}");
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(
            lines,
            vec![
                "#0 Node: 1, Children: 0->#1 1->#2",
                "#1 Node: 0, Value: 1, Leaf",
                "#2 Node: 0, Value: 0, Leaf",
            ]
        );
    }

    #[test]
    fn deterministic_structure() {
        let ds = conjunction();
        let a = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        let b = TreeConfig::new(attr(0)).fit(&ds).unwrap();
        assert_eq!(a.nodes(), b.nodes());
    }
}
