//! Immutable record matrix shared by tree induction and bagging.

use crate::error::Id3Error;
use crate::node::AttributeIndex;

/// A validated matrix of non-negative integer records.
///
/// Invariants: at least one record, at least one column, and every record
/// has the same width. Records are read-only once constructed; trees and
/// bootstrap samples refer to them by row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Vec<u32>>,
    width: usize,
}

impl Dataset {
    /// Validate and wrap the given records.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`Id3Error::EmptyDataset`] | `records` is empty |
    /// | [`Id3Error::ZeroWidth`] | the first record has no columns |
    /// | [`Id3Error::RaggedRecord`] | a record's width differs from the first |
    pub fn new(records: Vec<Vec<u32>>) -> Result<Self, Id3Error> {
        let width = match records.first() {
            Some(first) => first.len(),
            None => return Err(Id3Error::EmptyDataset),
        };
        if width == 0 {
            return Err(Id3Error::ZeroWidth);
        }
        for (record_index, record) in records.iter().enumerate() {
            if record.len() != width {
                return Err(Id3Error::RaggedRecord {
                    expected: width,
                    got: record.len(),
                    record_index,
                });
            }
        }
        Ok(Self { records, width })
    }

    /// Return the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; a dataset holds at least one record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the number of columns shared by every record.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Borrow the record at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn record(&self, index: usize) -> &[u32] {
        &self.records[index]
    }

    /// Borrow all records in order.
    #[must_use]
    pub fn records(&self) -> &[Vec<u32>] {
        &self.records
    }

    /// Return the value at (`row`, `attribute`).
    #[inline]
    pub(crate) fn value(&self, row: usize, attribute: AttributeIndex) -> u32 {
        self.records[row][attribute.index()]
    }

    /// Assert that every row of `samples` and every column of `attributes` is in range.
    ///
    /// # Panics
    ///
    /// Panics naming the first row `>= self.len()` or column `>= self.width()`.
    pub(crate) fn check_view(&self, samples: &[usize], attributes: &[AttributeIndex]) {
        for attribute in attributes {
            assert!(
                attribute.index() < self.width,
                "attribute {} is out of range for records of width {}",
                attribute.index(),
                self.width
            );
        }
        if let Some(&row) = samples.iter().find(|&&row| row >= self.records.len()) {
            panic!(
                "sample row {row} is out of range for a dataset of {} records",
                self.records.len()
            );
        }
    }

    /// Row indices `0..len`, the view covering the whole dataset.
    #[must_use]
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.records.len()).collect()
    }

    /// Every column except `target`, in ascending order.
    #[must_use]
    pub fn attributes_except(&self, target: AttributeIndex) -> Vec<AttributeIndex> {
        (0..self.width)
            .filter(|&c| c != target.index())
            .map(AttributeIndex::new)
            .collect()
    }

    /// Split into the first `at` records and the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`Id3Error::InvalidSplitPoint`] when either side would be empty.
    pub fn split_at(&self, at: usize) -> Result<(Dataset, Dataset), Id3Error> {
        if at == 0 || at >= self.records.len() {
            return Err(Id3Error::InvalidSplitPoint {
                at,
                n_records: self.records.len(),
            });
        }
        let (head, tail) = self.records.split_at(at);
        Ok((
            Dataset {
                records: head.to_vec(),
                width: self.width,
            },
            Dataset {
                records: tail.to_vec(),
                width: self.width,
            },
        ))
    }
}
