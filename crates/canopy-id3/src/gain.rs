//! Entropy and information gain over categorical record views.
//!
//! Every function here takes a `samples` view: row indices into a shared
//! [`Dataset`], possibly repeated (bootstrap samples). Iteration follows the
//! order of `samples`.

use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::node::AttributeIndex;

/// Shannon entropy (bits) of a frequency table holding `n_samples` observations.
///
/// Returns 0.0 when `n_samples` is zero.
pub(crate) fn entropy_of_counts(counts: impl IntoIterator<Item = usize>, n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    let value = -counts
        .into_iter()
        .filter(|&c| c > 0)
        .map(|c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>();
    // A single class yields -0.0.
    value.max(0.0)
}

fn value_counts(dataset: &Dataset, samples: &[usize], attribute: AttributeIndex) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for &row in samples {
        *counts.entry(dataset.value(row, attribute)).or_insert(0) += 1;
    }
    counts
}

/// Shannon entropy (base 2) of the `target` column over `samples`.
///
/// 0.0 for an empty view.
///
/// # Panics
///
/// Panics if a row of `samples` is `>= dataset.len()` or `target` is
/// `>= dataset.width()`.
#[must_use]
pub fn entropy(dataset: &Dataset, samples: &[usize], target: AttributeIndex) -> f64 {
    dataset.check_view(samples, &[target]);
    let counts = value_counts(dataset, samples, target);
    entropy_of_counts(counts.into_values(), samples.len())
}

/// Reduction in `target` entropy from partitioning `samples` on `split`.
///
/// `entropy(all) - Σ_v (|subset_v| / |all|) · entropy(subset_v)` over every
/// value `v` of `split` present in the view. Never negative; 0.0 for an
/// empty view.
///
/// # Panics
///
/// Panics if a row of `samples` is `>= dataset.len()`, or `split` or
/// `target` is `>= dataset.width()`.
#[must_use]
pub fn information_gain(
    dataset: &Dataset,
    samples: &[usize],
    split: AttributeIndex,
    target: AttributeIndex,
) -> f64 {
    dataset.check_view(samples, &[split, target]);
    gain_of(dataset, samples, split, target)
}

fn gain_of(dataset: &Dataset, samples: &[usize], split: AttributeIndex, target: AttributeIndex) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut target_counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut by_value: BTreeMap<u32, (usize, BTreeMap<u32, usize>)> = BTreeMap::new();
    for &row in samples {
        let label = dataset.value(row, target);
        *target_counts.entry(label).or_insert(0) += 1;
        let (size, labels) = by_value.entry(dataset.value(row, split)).or_default();
        *size += 1;
        *labels.entry(label).or_insert(0) += 1;
    }

    let n = samples.len() as f64;
    let parent = entropy_of_counts(target_counts.into_values(), samples.len());
    let children: f64 = by_value
        .into_values()
        .map(|(size, labels)| (size as f64 / n) * entropy_of_counts(labels.into_values(), size))
        .sum();

    (parent - children).max(0.0)
}

/// Pick the candidate with the strictly highest positive gain, along with that gain.
///
/// Candidates are evaluated in slice order and ties keep the earliest. A
/// candidate equal to `target` is skipped. Rows and columns are assumed in range.
pub(crate) fn best_split(
    dataset: &Dataset,
    samples: &[usize],
    target: AttributeIndex,
    candidates: &[AttributeIndex],
) -> Option<(AttributeIndex, f64)> {
    let mut best: Option<AttributeIndex> = None;
    let mut max_gain = 0.0f64;
    for &attribute in candidates {
        if attribute == target {
            continue;
        }
        let gain = gain_of(dataset, samples, attribute, target);
        if gain > max_gain {
            max_gain = gain;
            best = Some(attribute);
        }
    }
    best.map(|attribute| (attribute, max_gain))
}

/// Choose the attribute to split `samples` on.
///
/// Candidates are evaluated in the order given. An attribute replaces the
/// current best only when its gain is strictly greater, so ties keep the
/// earliest candidate. Returns `None` when no candidate has gain above zero.
///
/// # Panics
///
/// Panics if a row of `samples` is `>= dataset.len()`, or `target` or any
/// candidate is `>= dataset.width()`.
#[must_use]
pub fn choose_split_attribute(
    dataset: &Dataset,
    samples: &[usize],
    target: AttributeIndex,
    candidates: &[AttributeIndex],
) -> Option<AttributeIndex> {
    dataset.check_view(samples, &[target]);
    dataset.check_view(&[], candidates);
    best_split(dataset, samples, target, candidates).map(|(attribute, _)| attribute)
}

/// Most frequent `target` value over `samples`.
///
/// Ties go to the first value, in view order, that reached the running
/// maximum count: `[0, 0, 1, 1]` gives 0 and `[1, 0, 0, 1]` also gives 0
/// because 0 is first to reach two. Returns `None` for an empty view.
///
/// # Panics
///
/// Panics if a row of `samples` is `>= dataset.len()` or `target` is
/// `>= dataset.width()`.
#[must_use]
pub fn majority_label(dataset: &Dataset, samples: &[usize], target: AttributeIndex) -> Option<u32> {
    dataset.check_view(samples, &[target]);
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut majority: Option<(u32, usize)> = None;
    for &row in samples {
        let label = dataset.value(row, target);
        let count = counts.entry(label).or_insert(0);
        *count += 1;
        let count = *count;
        match majority {
            Some((_, best)) if count <= best => {}
            _ => majority = Some((label, count)),
        }
    }
    majority.map(|(label, _)| label)
}

/// Partition `samples` by their value of `attribute`, keyed in ascending value order.
///
/// Each subset keeps the relative order of `samples`.
pub(crate) fn partition(
    dataset: &Dataset,
    samples: &[usize],
    attribute: AttributeIndex,
) -> BTreeMap<u32, Vec<usize>> {
    let mut subsets: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for &row in samples {
        subsets
            .entry(dataset.value(row, attribute))
            .or_default()
            .push(row);
    }
    subsets
}
