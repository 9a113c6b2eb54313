//! Comma-delimited categorical record reader with full input validation.

use std::path::{Path, PathBuf};

use canopy_id3::Dataset;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads categorical records from a comma-delimited text file.
///
/// Expected format:
/// - No header row
/// - One record per line, values separated by commas
/// - Every value a non-negative decimal integer; surrounding whitespace is ignored
/// - All records have the same number of values
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero records |
/// | [`IoError::InconsistentRowLength`] | Record has a different value count than the first |
/// | [`IoError::InvalidValue`] | Value is negative, fractional, or not a number |
pub struct RecordReader {
    path: PathBuf,
}

impl RecordReader {
    /// Create a new reader for the given file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows surface as InconsistentRowLength, not CsvParse.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut records: Vec<Vec<u32>> = Vec::new();
        let mut expected_cols = None;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let expected = *expected_cols.get_or_insert(record.len());
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let values = record
                .iter()
                .enumerate()
                .map(|(col_index, raw)| {
                    raw.parse::<u32>().map_err(|_| IoError::InvalidValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    })
                })
                .collect::<Result<Vec<u32>, IoError>>()?;
            records.push(values);
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        debug!(width = expected_cols.unwrap_or(0), "records parsed");

        let dataset = Dataset::new(records)?;

        info!(
            n_records = dataset.len(),
            width = dataset.width(),
            "dataset loaded"
        );

        Ok(dataset)
    }
}
