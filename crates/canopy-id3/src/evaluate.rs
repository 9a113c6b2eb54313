//! Accuracy, confusion counts, and per-label metrics for categorical predictions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::Id3Error;
use crate::predict::Prediction;

/// One cell of a confusion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionEntry {
    /// The known label.
    pub expected: u32,
    /// What the classifier returned.
    pub predicted: Prediction,
    /// Number of records with this pair.
    pub count: usize,
}

/// Per-label precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LabelMetrics {
    /// The label value.
    pub label: u32,
    /// Precision: TP / (TP + FP). 0.0 if the label was never predicted.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no record carries this label.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of records whose known label is this one.
    pub support: usize,
}

/// Outcome counts of a batch of predictions against known labels.
///
/// An `Unclassifiable` prediction is neither correct nor incorrect; it is
/// counted separately and still counts toward the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    confusion: BTreeMap<(u32, Prediction), usize>,
    n_correct: usize,
    n_incorrect: usize,
    n_unclassifiable: usize,
}

impl Evaluation {
    /// Tally `predictions` against `expected` labels, pairwise.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`Id3Error::EmptyEvaluation`] | zero predictions |
    /// | [`Id3Error::EvaluationLengthMismatch`] | slices differ in length |
    pub fn from_predictions(expected: &[u32], predictions: &[Prediction]) -> Result<Self, Id3Error> {
        if expected.len() != predictions.len() {
            return Err(Id3Error::EvaluationLengthMismatch {
                expected: expected.len(),
                predicted: predictions.len(),
            });
        }
        if expected.is_empty() {
            return Err(Id3Error::EmptyEvaluation);
        }

        let mut evaluation = Self {
            confusion: BTreeMap::new(),
            n_correct: 0,
            n_incorrect: 0,
            n_unclassifiable: 0,
        };
        for (&label, &prediction) in expected.iter().zip(predictions) {
            *evaluation.confusion.entry((label, prediction)).or_insert(0) += 1;
            match prediction {
                Prediction::Unclassifiable => evaluation.n_unclassifiable += 1,
                Prediction::Label(p) if p == label => evaluation.n_correct += 1,
                Prediction::Label(_) => evaluation.n_incorrect += 1,
            }
        }
        Ok(evaluation)
    }

    /// Proportion of correct predictions over all predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.n_correct as f64 / self.n_total() as f64
    }

    /// Return the number of evaluated predictions.
    #[must_use]
    pub fn n_total(&self) -> usize {
        self.n_correct + self.n_incorrect + self.n_unclassifiable
    }

    /// Return the number of predictions equal to the known label.
    #[must_use]
    pub fn n_correct(&self) -> usize {
        self.n_correct
    }

    /// Return the number of predictions naming a different label.
    #[must_use]
    pub fn n_incorrect(&self) -> usize {
        self.n_incorrect
    }

    /// Return the number of `Unclassifiable` predictions.
    #[must_use]
    pub fn n_unclassifiable(&self) -> usize {
        self.n_unclassifiable
    }

    /// Return how many records with label `expected` were predicted as `predicted`.
    #[must_use]
    pub fn count(&self, expected: u32, predicted: Prediction) -> usize {
        self.confusion.get(&(expected, predicted)).copied().unwrap_or(0)
    }

    /// Non-zero confusion cells, ordered by expected label then prediction.
    #[must_use]
    pub fn entries(&self) -> Vec<ConfusionEntry> {
        self.confusion
            .iter()
            .map(|(&(expected, predicted), &count)| ConfusionEntry {
                expected,
                predicted,
                count,
            })
            .collect()
    }

    /// Per-label precision, recall, F1, and support.
    ///
    /// Covers every label seen as either a known label or a prediction, in
    /// ascending order.
    #[must_use]
    pub fn label_metrics(&self) -> Vec<LabelMetrics> {
        let labels: BTreeSet<u32> = self
            .confusion
            .keys()
            .flat_map(|&(expected, predicted)| std::iter::once(expected).chain(predicted.label()))
            .collect();

        labels
            .into_iter()
            .map(|label| {
                let tp = self.count(label, Prediction::Label(label));
                let predicted_as: usize = self
                    .confusion
                    .iter()
                    .filter(|&(&(_, p), _)| p == Prediction::Label(label))
                    .map(|(_, &c)| c)
                    .sum();
                let support: usize = self
                    .confusion
                    .iter()
                    .filter(|&(&(e, _), _)| e == label)
                    .map(|(_, &c)| c)
                    .sum();
                let precision = if predicted_as == 0 {
                    0.0
                } else {
                    tp as f64 / predicted_as as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                LabelMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected: BTreeSet<u32> = self.confusion.keys().map(|&(e, _)| e).collect();
        let predicted: BTreeSet<Prediction> = self.confusion.keys().map(|&(_, p)| p).collect();

        write!(f, "{:>8}", "")?;
        for p in &predicted {
            match p {
                Prediction::Label(l) => write!(f, " pred_{l:>3}")?,
                Prediction::Unclassifiable => write!(f, " {:>8}", "unclass")?,
            }
        }
        writeln!(f)?;

        for &e in &expected {
            write!(f, "true_{e:>3}")?;
            for &p in &predicted {
                write!(f, " {:>8}", self.count(e, p))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[u32]) -> Vec<Prediction> {
        values.iter().map(|&l| Prediction::Label(l)).collect()
    }

    #[test]
    fn perfect_predictions() {
        let expected = [0, 0, 1, 1, 2, 2];
        let eval = Evaluation::from_predictions(&expected, &labels(&expected)).unwrap();
        assert!((eval.accuracy() - 1.0).abs() < f64::EPSILON);
        for m in eval.label_metrics() {
            assert!((m.precision - 1.0).abs() < f64::EPSILON);
            assert!((m.recall - 1.0).abs() < f64::EPSILON);
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn known_confusion_counts() {
        let expected = [0, 0, 0, 1, 1, 1, 2, 2, 2];
        let predicted = labels(&[0, 0, 1, 1, 1, 2, 2, 2, 0]);
        let eval = Evaluation::from_predictions(&expected, &predicted).unwrap();

        assert_eq!(eval.n_correct(), 6);
        assert_eq!(eval.n_incorrect(), 3);
        assert_eq!(eval.count(0, Prediction::Label(1)), 1);
        assert!((eval.accuracy() - 6.0 / 9.0).abs() < 1e-10);

        let metrics = eval.label_metrics();
        assert!((metrics[0].precision - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics[0].recall - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(metrics[0].support, 3);
    }

    #[test]
    fn unclassifiable_counts_against_accuracy() {
        let expected = [1, 1, 0, 0];
        let predicted = vec![
            Prediction::Label(1),
            Prediction::Unclassifiable,
            Prediction::Label(0),
            Prediction::Label(1),
        ];
        let eval = Evaluation::from_predictions(&expected, &predicted).unwrap();
        assert_eq!(eval.n_correct(), 2);
        assert_eq!(eval.n_incorrect(), 1);
        assert_eq!(eval.n_unclassifiable(), 1);
        assert_eq!(eval.n_total(), 4);
        assert!((eval.accuracy() - 0.5).abs() < f64::EPSILON);
        assert_eq!(eval.count(1, Prediction::Unclassifiable), 1);

        let label_one = &eval.label_metrics()[1];
        assert_eq!(label_one.label, 1);
        assert!((label_one.recall - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entries_ordered() {
        let eval = Evaluation::from_predictions(
            &[1, 0, 1],
            &[Prediction::Unclassifiable, Prediction::Label(0), Prediction::Label(1)],
        )
        .unwrap();
        let cells: Vec<(u32, Prediction, usize)> = eval
            .entries()
            .into_iter()
            .map(|c| (c.expected, c.predicted, c.count))
            .collect();
        assert_eq!(
            cells,
            vec![
                (0, Prediction::Label(0), 1),
                (1, Prediction::Label(1), 1),
                (1, Prediction::Unclassifiable, 1),
            ]
        );
    }

    #[test]
    fn metrics_for_label_only_predicted() {
        let eval = Evaluation::from_predictions(&[0, 0], &labels(&[0, 5])).unwrap();
        let metrics = eval.label_metrics();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[1].label, 5);
        assert_eq!(metrics[1].support, 0);
        assert_eq!(metrics[1].recall, 0.0);
        assert_eq!(metrics[1].precision, 0.0);
    }

    #[test]
    fn empty_input_error() {
        let err = Evaluation::from_predictions(&[], &[]).unwrap_err();
        assert!(matches!(err, Id3Error::EmptyEvaluation));
    }

    #[test]
    fn length_mismatch_error() {
        let err = Evaluation::from_predictions(&[1, 2], &labels(&[1])).unwrap_err();
        assert!(matches!(
            err,
            Id3Error::EvaluationLengthMismatch {
                expected: 2,
                predicted: 1
            }
        ));
    }

    #[test]
    fn display_formatting() {
        let eval = Evaluation::from_predictions(
            &[0, 1],
            &[Prediction::Label(0), Prediction::Unclassifiable],
        )
        .unwrap();
        let output = format!("{eval}");
        assert!(output.contains("pred_"));
        assert!(output.contains("true_"));
        assert!(output.contains("unclass"));
    }
}
