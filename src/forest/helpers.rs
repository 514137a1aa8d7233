//! Helper functions for decision tree induction.
//!
//! Gini impurity, majority-category selection, and sample partitioning
//! used by the forest builder.

use crate::features::{Feature, StudentFeatures};
use std::collections::BTreeMap;

/// Calculate Gini impurity for a set of category labels.
///
/// Gini impurity measures the probability of incorrectly classifying a
/// randomly chosen element if it were labeled according to the label
/// distribution.
///
/// Formula: Gini = 1 - `Σ(p_i²)` where `p_i` is the proportion of class i
pub fn gini_impurity<S: AsRef<str>>(labels: &[S]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }

    // Count occurrences of each category (BTreeMap for deterministic order)
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label.as_ref()).or_insert(0) += 1;
    }

    let n = labels.len() as f64;
    let mut gini = 1.0;

    for count in counts.values() {
        let p = *count as f64 / n;
        gini -= p * p;
    }

    gini
}

/// Weighted Gini impurity of a two-way split.
pub fn weighted_gini<S: AsRef<str>>(left: &[S], right: &[S]) -> f64 {
    let n_left = left.len() as f64;
    let n_right = right.len() as f64;
    let n_total = n_left + n_right;

    if n_total == 0.0 {
        return 0.0;
    }

    (n_left * gini_impurity(left) + n_right * gini_impurity(right)) / n_total
}

/// Finds the most frequent category among samples, "Unknown" when empty.
///
/// Ties break to the lexicographically smallest category: counts iterate
/// in BTreeMap key order and only a strictly greater count displaces the
/// current winner.
pub(super) fn majority_category(samples: &[&StudentFeatures]) -> String {
    if samples.is_empty() {
        return "Unknown".to_string();
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.category.as_str()).or_insert(0) += 1;
    }

    let mut best = "";
    let mut best_count = 0;
    for (category, count) in counts {
        if count > best_count {
            best = category;
            best_count = count;
        }
    }
    best.to_string()
}

/// Returns true if every sample carries the same category.
pub(super) fn is_pure(samples: &[&StudentFeatures]) -> bool {
    samples
        .windows(2)
        .all(|pair| pair[0].category == pair[1].category)
}

/// Partitions samples around a feature threshold. Returns `None` when
/// either side would be empty (the split separates nothing).
pub(super) fn split_by_threshold<'a>(
    samples: &[&'a StudentFeatures],
    feature: Feature,
    threshold: f64,
) -> Option<(Vec<&'a StudentFeatures>, Vec<&'a StudentFeatures>)> {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for sample in samples {
        if feature.value(sample) <= threshold {
            left.push(*sample);
        } else {
            right.push(*sample);
        }
    }

    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

/// Collects the category labels of a sample set.
pub(super) fn categories<'a>(samples: &[&'a StudentFeatures]) -> Vec<&'a str> {
    samples.iter().map(|s| s.category.as_str()).collect()
}
