//! Ordered train/test partition of a loaded dataset.

use canopy_id3::Dataset;
use tracing::debug;

use crate::IoError;

/// Split `dataset` so the first `training_size` records train and the rest test.
///
/// Record order is preserved on both sides; nothing is shuffled.
///
/// # Errors
///
/// Returns [`IoError::InvalidSplit`] if either part would be empty.
pub fn split_train_test(dataset: &Dataset, training_size: usize) -> Result<(Dataset, Dataset), IoError> {
    let n_records = dataset.len();
    if training_size == 0 || training_size >= n_records {
        return Err(IoError::InvalidSplit {
            training_size,
            n_records,
        });
    }
    let (train, test) = dataset.split_at(training_size)?;
    debug!(n_train = train.len(), n_test = test.len(), "dataset split");
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: u32) -> Dataset {
        Dataset::new((0..n).map(|i| vec![i % 2, i]).collect()).unwrap()
    }

    #[test]
    fn first_rows_train() {
        let (train, test) = split_train_test(&records(5), 3).unwrap();
        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 2);
        assert_eq!(train.record(2), &[0, 2]);
        assert_eq!(test.record(0), &[1, 3]);
    }

    #[test]
    fn empty_side_rejected() {
        for size in [0, 5, 9] {
            let err = split_train_test(&records(5), size).unwrap_err();
            assert!(matches!(err, IoError::InvalidSplit { n_records: 5, .. }));
        }
    }
}
