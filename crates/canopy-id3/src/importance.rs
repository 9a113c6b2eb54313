//! Attribute importance aggregation across trees.

use crate::node::AttributeIndex;

/// A candidate attribute with its importance score and rank.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedAttribute {
    /// Column index of the attribute.
    pub attribute: AttributeIndex,
    /// Normalized importance (sums to 1.0 across candidates, or all zeros).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Aggregate per-tree importance vectors into ranked candidates.
///
/// Sums each candidate's column across trees, normalizes to sum to 1.0 and
/// sorts descending. Equal scores keep candidate order.
pub(crate) fn aggregate_importances(
    per_tree: &[Vec<f64>],
    candidates: &[AttributeIndex],
) -> Vec<RankedAttribute> {
    let mut totals: Vec<f64> = candidates
        .iter()
        .map(|attribute| {
            per_tree
                .iter()
                .filter_map(|tree| tree.get(attribute.index()))
                .sum()
        })
        .collect();

    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedAttribute> = candidates
        .iter()
        .zip(totals)
        .map(|(&attribute, importance)| RankedAttribute {
            attribute,
            importance,
            rank: 0,
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    ranked
}
