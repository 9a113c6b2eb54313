/// Errors from ID3 tree induction, bagging, and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Id3Error {
    /// Returned when the dataset has zero records.
    #[error("dataset has zero records")]
    EmptyDataset,

    /// Returned when a split point would leave the head or the tail empty.
    #[error("split point {at} leaves an empty side for a dataset of {n_records} records")]
    InvalidSplitPoint {
        /// The requested split position.
        at: usize,
        /// The number of records in the dataset.
        n_records: usize,
    },

    /// Returned when the records have zero columns.
    #[error("dataset records have zero columns")]
    ZeroWidth,

    /// Returned when a record has a different number of columns than the first one.
    #[error("record {record_index} has {got} columns, expected {expected}")]
    RaggedRecord {
        /// The width of the first record.
        expected: usize,
        /// The width of the offending record.
        got: usize,
        /// The zero-based index of the offending record.
        record_index: usize,
    },

    /// Returned when the target column does not exist in the dataset.
    #[error("target column {target} is out of range for records of width {width}")]
    TargetOutOfRange {
        /// The requested target column.
        target: usize,
        /// The record width.
        width: usize,
    },

    /// Returned when a candidate attribute does not exist in the dataset.
    #[error("candidate attribute {attribute} is out of range for records of width {width}")]
    CandidateOutOfRange {
        /// The offending candidate column.
        attribute: usize,
        /// The record width.
        width: usize,
    },

    /// Returned when the target column is listed among the candidate attributes.
    #[error("target column {target} cannot also be a candidate attribute")]
    TargetIsCandidate {
        /// The target column.
        target: usize,
    },

    /// Returned when a candidate attribute is listed more than once.
    #[error("candidate attribute {attribute} is listed more than once")]
    DuplicateCandidate {
        /// The repeated candidate column.
        attribute: usize,
    },

    /// Returned when a sample view refers to a row outside the dataset.
    #[error("sample row {row} is out of range for a dataset of {n_records} records")]
    SampleOutOfRange {
        /// The offending row index.
        row: usize,
        /// The number of records in the dataset.
        n_records: usize,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when a record passed for classification differs in width from the training records.
    #[error("record has {got} columns, expected {expected}")]
    RecordWidthMismatch {
        /// The width of the training records.
        expected: usize,
        /// The width of the record being classified.
        got: usize,
    },

    /// Returned when an evaluation is requested over zero predictions.
    #[error("cannot evaluate zero predictions")]
    EmptyEvaluation,

    /// Returned when expected labels and predictions differ in length.
    #[error("{expected} expected labels but {predicted} predictions")]
    EvaluationLengthMismatch {
        /// Number of expected labels.
        expected: usize,
        /// Number of predictions.
        predicted: usize,
    },

    /// Returned when OOB evaluation fails (no record has any OOB tree).
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Human-readable description of why OOB evaluation failed.
        reason: String,
    },
}
