//! Random forest performance classifier.
//!
//! This module implements:
//! - CART-style decision tree induction over candidate features using
//!   Gini impurity and a fixed candidate-threshold grid
//! - Bootstrap-aggregated ensemble training with reproducible seeding
//! - Majority-vote prediction with a rule-based fallback for untrained
//!   models
//! - Structured report synthesis (category, overall score, strengths,
//!   weaknesses, recommendations)
//!
//! # Example
//!
//! ```
//! use evaluar::forest::RandomForestClassifier;
//! use evaluar::features::{assign_category, StudentFeatures};
//!
//! let features = StudentFeatures {
//!     topic_mastery_primary: 0.9,
//!     topic_mastery_secondary: 0.85,
//!     topic_mastery_general: 0.92,
//!     difficulty_resilience: 0.8,
//!     accuracy: 92.0,
//!     time_efficiency: 70.0,
//!     confidence: 85.0,
//!     category: String::new(),
//! };
//!
//! // Untrained models fall back to the rule-based classifier.
//! let forest = RandomForestClassifier::new();
//! assert_eq!(forest.predict(&features), assign_category(&features));
//! ```

pub mod helpers;

use crate::error::Result;
use crate::features::{assign_category, Feature, StudentFeatures};
use helpers::{categories, gini_impurity, is_pure, majority_category, split_by_threshold, weighted_gini};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of trees in a trained forest.
pub const NUM_TREES: usize = 100;
/// Maximum tree depth.
pub const MAX_DEPTH: usize = 10;
/// Impurity floor: a node whose label mix is already this pure stops
/// splitting and becomes a majority leaf.
pub const GINI_THRESHOLD: f64 = 0.1;
/// Candidate split thresholds shared by every feature dimension.
pub const SPLIT_THRESHOLDS: [f64; 4] = [0.3, 0.5, 0.7, 0.8];

/// Leaf node carrying a category prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    /// Predicted category for samples reaching this leaf
    pub prediction: String,
}

/// Internal node with a split condition and boxed subtrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Feature dimension to split on
    pub feature: Feature,
    /// Split threshold
    pub threshold: f64,
    /// Subtree for samples where feature <= threshold
    pub left: Box<TreeNode>,
    /// Subtree for samples where feature > threshold
    pub right: Box<TreeNode>,
}

/// A node in a decision tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with category prediction
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Predicts the category for one feature vector.
    pub fn predict(&self, features: &StudentFeatures) -> &str {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return &leaf.prediction,
                TreeNode::Node(internal) => {
                    if internal.feature.value(features) <= internal.threshold {
                        node = &internal.left;
                    } else {
                        node = &internal.right;
                    }
                }
            }
        }
    }
}

/// Finds the feature/threshold pair with minimum weighted Gini.
///
/// Pairs whose partition leaves either side empty are rejected. Returns
/// `None` when no candidate separates the samples.
fn find_best_split(samples: &[&StudentFeatures]) -> Option<(Feature, f64)> {
    let mut best: Option<(Feature, f64, f64)> = None;

    for feature in Feature::ALL {
        for threshold in SPLIT_THRESHOLDS {
            let Some((left, right)) = split_by_threshold(samples, feature, threshold) else {
                continue;
            };
            let gini = weighted_gini(&categories(&left), &categories(&right));
            if best.map_or(true, |(_, _, best_gini)| gini < best_gini) {
                best = Some((feature, threshold, gini));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Builds a decision tree recursively.
fn build_tree(samples: &[&StudentFeatures], depth: usize) -> TreeNode {
    if samples.is_empty() || depth >= MAX_DEPTH {
        return TreeNode::Leaf(Leaf {
            prediction: majority_category(samples),
        });
    }

    if is_pure(samples) {
        return TreeNode::Leaf(Leaf {
            prediction: samples[0].category.clone(),
        });
    }

    // Nearly pure nodes are not worth splitting further.
    if gini_impurity(&categories(samples)) < GINI_THRESHOLD {
        return TreeNode::Leaf(Leaf {
            prediction: majority_category(samples),
        });
    }

    let Some((feature, threshold)) = find_best_split(samples) else {
        return TreeNode::Leaf(Leaf {
            prediction: majority_category(samples),
        });
    };

    let (left_samples, right_samples) = split_by_threshold(samples, feature, threshold)
        .expect("best split was validated against empty partitions");

    TreeNode::Node(Node {
        feature,
        threshold,
        left: Box::new(build_tree(&left_samples, depth + 1)),
        right: Box::new(build_tree(&right_samples, depth + 1)),
    })
}

/// Creates a bootstrap sample (random sample with replacement).
///
/// Returns indices of samples to include in the bootstrap sample.
fn bootstrap_sample(n_samples: usize, seed: u64) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};

    let dist = Uniform::from(0..n_samples);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
}

/// Random forest over candidate feature vectors.
///
/// Training draws [`NUM_TREES`] bootstrap samples from the historical
/// dataset and induces one tree per sample; prediction is a plurality
/// vote across all trees, ties broken to the lexicographically smallest
/// category. An untrained forest falls back to the ordered rule
/// classifier from [`assign_category`].
///
/// Retraining builds a complete new forest before replacing the old one,
/// so a forest shared for prediction never exposes a partially built
/// ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<TreeNode>,
    random_state: u64,
    trained: bool,
}

impl RandomForestClassifier {
    /// Creates an untrained forest with the default reproducible seed.
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            random_state: 42,
            trained: false,
        }
    }

    /// Sets the bootstrap seed.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Returns true once a forest has been fitted.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Number of trees in the current forest (0 before training).
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Trains the forest on historical labeled feature vectors.
    ///
    /// Each tree sees a bootstrap sample of the full dataset, seeded from
    /// `random_state` plus the tree index so training is reproducible.
    ///
    /// # Errors
    ///
    /// Returns an error when the dataset is empty.
    pub fn fit(&mut self, historical: &[StudentFeatures]) -> Result<()> {
        if historical.is_empty() {
            return Err("Cannot train a forest on an empty dataset".into());
        }

        let mut trees = Vec::with_capacity(NUM_TREES);
        for i in 0..NUM_TREES {
            let indices = bootstrap_sample(historical.len(), self.random_state + i as u64);
            let sample: Vec<&StudentFeatures> =
                indices.iter().map(|&idx| &historical[idx]).collect();
            trees.push(build_tree(&sample, 0));
        }

        self.trees = trees;
        self.trained = true;
        Ok(())
    }

    /// Predicts a performance category for one candidate.
    ///
    /// Untrained forests use the rule-based classifier; trained forests
    /// take the plurality vote over all trees.
    pub fn predict(&self, features: &StudentFeatures) -> String {
        if !self.trained || self.trees.is_empty() {
            return assign_category(features);
        }

        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict(features)).or_insert(0) += 1;
        }

        let mut best = "";
        let mut best_count = 0;
        for (category, count) in votes {
            if count > best_count {
                best = category;
                best_count = count;
            }
        }
        best.to_string()
    }

    /// Synthesizes a full performance report for one candidate.
    pub fn report(&self, features: &StudentFeatures) -> PerformanceReport {
        let mut features = features.clone();
        features.sanitize();

        let predicted_category = self.predict(&features);

        // Weighted overall score, scaled to 0-100 for display.
        let overall_score = (features.topic_mastery_general * 0.30
            + features.difficulty_resilience * 0.25
            + features.accuracy / 100.0 * 0.20
            + features.time_efficiency / 100.0 * 0.15
            + features.confidence / 100.0 * 0.10)
            * 100.0;

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        if features.topic_mastery_primary >= 0.6 {
            strengths.push("Primary Topic Mastery".to_string());
        } else if features.topic_mastery_primary < 0.4 {
            weaknesses.push("Primary Topic Understanding".to_string());
        }

        if features.topic_mastery_secondary >= 0.6 {
            strengths.push("Secondary Topic Mastery".to_string());
        } else if features.topic_mastery_secondary < 0.4 {
            weaknesses.push("Secondary Topic Understanding".to_string());
        }

        if features.difficulty_resilience >= 0.6 {
            strengths.push("Handles Difficult Questions".to_string());
        } else if features.difficulty_resilience < 0.4 {
            weaknesses.push("Struggles with Hard Questions".to_string());
        }

        if features.time_efficiency >= 60.0 {
            strengths.push("Time Management".to_string());
        }
        if features.confidence >= 80.0 {
            strengths.push("High Engagement".to_string());
        }

        let recommendations = generate_recommendations(&features, &predicted_category);

        PerformanceReport {
            predicted_category,
            overall_score,
            topic_mastery_primary: features.topic_mastery_primary * 100.0,
            topic_mastery_secondary: features.topic_mastery_secondary * 100.0,
            topic_mastery_general: features.topic_mastery_general * 100.0,
            difficulty_resilience: features.difficulty_resilience * 100.0,
            accuracy: features.accuracy,
            time_efficiency: features.time_efficiency,
            confidence: features.confidence,
            strengths,
            weaknesses,
            recommendations,
        }
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Structured per-candidate analytics report.
///
/// Mastery and resilience metrics are expressed as 0-100 percentages for
/// display; strengths, weaknesses, and recommendations are ordered lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Category predicted by the forest (or rule fallback)
    pub predicted_category: String,
    /// Weighted overall score, 0-100
    pub overall_score: f64,
    pub topic_mastery_primary: f64,
    pub topic_mastery_secondary: f64,
    pub topic_mastery_general: f64,
    pub difficulty_resilience: f64,
    pub accuracy: f64,
    pub time_efficiency: f64,
    pub confidence: f64,
    /// Dimensions the candidate is strong in
    pub strengths: Vec<String>,
    /// Dimensions needing attention
    pub weaknesses: Vec<String>,
    /// Personalized study recommendations
    pub recommendations: Vec<String>,
}

/// Fixed recommendation rule table keyed by category and weak dimensions.
fn generate_recommendations(features: &StudentFeatures, category: &str) -> Vec<String> {
    let mut recommendations = Vec::new();

    if category.contains("Topic Risk - Primary") {
        recommendations.push("Focus on primary topic area - review fundamental concepts".to_string());
        recommendations.push("Practice more questions in this subject before next assessment".to_string());
    } else if category.contains("Topic Risk - Secondary") {
        recommendations.push("Strengthen secondary topic knowledge".to_string());
        recommendations.push("Review related concepts and examples".to_string());
    } else if category == "Difficulty Risk" {
        recommendations.push("Practice harder questions to build resilience".to_string());
        recommendations.push("Work on problem-solving strategies".to_string());
        recommendations.push("Seek help with challenging concepts".to_string());
    }

    if features.difficulty_resilience < 0.5 && category != "Difficulty Risk" {
        recommendations.push("Continue practicing hard questions".to_string());
    }

    if features.time_efficiency < 50.0 {
        recommendations.push("Work on time management during exams".to_string());
    }

    if features.confidence < 70.0 {
        recommendations.push("Attempt more questions to build confidence".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("Excellent performance! Keep up the good work.".to_string());
    }

    recommendations
}
