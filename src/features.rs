//! Candidate feature extraction for performance modeling.
//!
//! Converts graded responses plus topic and difficulty tags into the
//! normalized feature vector the random forest consumes: topic mastery
//! (correct/attempts per topic), difficulty resilience (performance on
//! hard items), and three externally computed 0-100 scalars.

use crate::exam::Difficulty;
use crate::grading::GradedResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized per-candidate feature vector.
///
/// Mastery and resilience fields are fractions in [0, 1]; accuracy, time
/// efficiency, and confidence are 0-100 scalars sourced from the caller's
/// heuristic analytics pass. All numeric fields are finite; extraction
/// coerces NaN and infinity to 0.0 before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentFeatures {
    /// Mastery of the most-attempted topic
    pub topic_mastery_primary: f64,
    /// Mastery of the second-most-attempted topic
    pub topic_mastery_secondary: f64,
    /// Overall mastery across all topics
    pub topic_mastery_general: f64,
    /// Correct fraction among Hard-tagged attempts
    pub difficulty_resilience: f64,
    /// Overall accuracy, 0-100
    pub accuracy: f64,
    /// Time management score, 0-100
    pub time_efficiency: f64,
    /// Engagement score, 0-100
    pub confidence: f64,
    /// Performance category label
    pub category: String,
}

impl StudentFeatures {
    /// Coerces any non-finite numeric field to 0.0.
    pub fn sanitize(&mut self) {
        for value in [
            &mut self.topic_mastery_primary,
            &mut self.topic_mastery_secondary,
            &mut self.topic_mastery_general,
            &mut self.difficulty_resilience,
            &mut self.accuracy,
            &mut self.time_efficiency,
            &mut self.confidence,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
    }
}

/// The seven numeric dimensions a decision tree may split on.
///
/// Mastery and resilience are already fractions; the 0-100 scalars are
/// rescaled to [0, 1] so every dimension shares the tree's threshold
/// space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    TopicMasteryPrimary,
    TopicMasterySecondary,
    TopicMasteryGeneral,
    DifficultyResilience,
    Accuracy,
    TimeEfficiency,
    Confidence,
}

impl Feature {
    /// All features, in split-search order.
    pub const ALL: [Feature; 7] = [
        Feature::TopicMasteryPrimary,
        Feature::TopicMasterySecondary,
        Feature::TopicMasteryGeneral,
        Feature::DifficultyResilience,
        Feature::Accuracy,
        Feature::TimeEfficiency,
        Feature::Confidence,
    ];

    /// Extracts this dimension's value from a feature vector, coercing
    /// non-finite values to 0.0.
    pub fn value(&self, features: &StudentFeatures) -> f64 {
        let raw = match self {
            Feature::TopicMasteryPrimary => features.topic_mastery_primary,
            Feature::TopicMasterySecondary => features.topic_mastery_secondary,
            Feature::TopicMasteryGeneral => features.topic_mastery_general,
            Feature::DifficultyResilience => features.difficulty_resilience,
            Feature::Accuracy => features.accuracy / 100.0,
            Feature::TimeEfficiency => features.time_efficiency / 100.0,
            Feature::Confidence => features.confidence / 100.0,
        };
        if raw.is_finite() {
            raw
        } else {
            0.0
        }
    }
}

fn mastery(correct: usize, attempts: usize) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    correct as f64 / attempts as f64
}

/// Extracts a feature vector from graded responses and tag metadata.
///
/// `topics` and `difficulties` are indexed by original 1-based response
/// position; positions past either sequence default to "General" and
/// `Medium`. Primary and secondary topics are the two most-attempted
/// topics, ties broken by attempt count descending then topic name
/// ascending. A single-topic exam copies primary mastery into secondary.
///
/// The three 0-100 scalars come from a simpler analytics pass outside
/// this crate and are consumed as-is (after non-finite coercion).
pub fn extract_features(
    responses: &[GradedResponse],
    topics: &[String],
    difficulties: &[Difficulty],
    accuracy: f64,
    time_efficiency: f64,
    confidence: f64,
) -> StudentFeatures {
    let mut topic_attempts: BTreeMap<String, usize> = BTreeMap::new();
    let mut topic_corrects: BTreeMap<String, usize> = BTreeMap::new();
    let mut hard_total = 0usize;
    let mut hard_correct = 0usize;
    let mut total_correct = 0usize;

    for response in responses {
        let idx = response.position.saturating_sub(1);
        let topic = topics.get(idx).map_or("General", String::as_str);
        let difficulty = difficulties.get(idx).copied().unwrap_or(Difficulty::Medium);

        *topic_attempts.entry(topic.to_string()).or_insert(0) += 1;
        if response.is_correct {
            *topic_corrects.entry(topic.to_string()).or_insert(0) += 1;
            total_correct += 1;
        }

        if difficulty == Difficulty::Hard {
            hard_total += 1;
            if response.is_correct {
                hard_correct += 1;
            }
        }
    }

    // Top-2 topics by attempt count; BTreeMap feeds names in ascending
    // order so a stable sort on count keeps the tie-break deterministic.
    let mut ranked: Vec<(&String, &usize)> = topic_attempts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));

    let topic_mastery_primary = ranked.first().map_or(0.0, |(topic, &attempts)| {
        mastery(topic_corrects.get(*topic).copied().unwrap_or(0), attempts)
    });
    let topic_mastery_secondary = match ranked.get(1) {
        Some((topic, &attempts)) => {
            mastery(topic_corrects.get(*topic).copied().unwrap_or(0), attempts)
        }
        None => topic_mastery_primary,
    };

    let mut features = StudentFeatures {
        topic_mastery_primary,
        topic_mastery_secondary,
        topic_mastery_general: mastery(total_correct, responses.len()),
        difficulty_resilience: mastery(hard_correct, hard_total),
        accuracy,
        time_efficiency,
        confidence,
        category: String::new(),
    };
    features.sanitize();
    features.category = assign_category(&features);
    features
}

/// Assigns a performance category from a feature vector.
///
/// Rules are evaluated in order and the first match wins: topic-specific
/// risks, then difficulty risk, then overall-mastery bands.
pub fn assign_category(features: &StudentFeatures) -> String {
    let overall = features.topic_mastery_general * 100.0;

    if features.topic_mastery_primary < 0.5 && features.topic_mastery_secondary > 0.8 {
        "Topic Risk - Primary Area".to_string()
    } else if features.topic_mastery_secondary < 0.5 && features.topic_mastery_primary > 0.8 {
        "Topic Risk - Secondary Area".to_string()
    } else if features.difficulty_resilience < 0.4 {
        "Difficulty Risk".to_string()
    } else if overall >= 90.0 {
        "Excellent".to_string()
    } else if overall >= 70.0 {
        "Pass".to_string()
    } else if overall >= 50.0 {
        "Partial Mastery".to_string()
    } else {
        "Fail".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(position: usize, is_correct: bool) -> GradedResponse {
        GradedResponse {
            position,
            student_answer: if is_correct { "right" } else { "wrong" }.to_string(),
            correct_answer: "right".to_string(),
            is_correct,
        }
    }

    fn baseline() -> StudentFeatures {
        StudentFeatures {
            topic_mastery_primary: 0.7,
            topic_mastery_secondary: 0.7,
            topic_mastery_general: 0.7,
            difficulty_resilience: 0.7,
            accuracy: 70.0,
            time_efficiency: 70.0,
            confidence: 70.0,
            category: String::new(),
        }
    }

    #[test]
    fn test_topic_mastery_per_topic() {
        let responses = vec![
            response(1, true),
            response(2, true),
            response(3, false),
            response(4, true),
        ];
        let topics: Vec<String> = ["Algebra", "Algebra", "Algebra", "Geometry"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let difficulties = vec![Difficulty::Medium; 4];

        let features = extract_features(&responses, &topics, &difficulties, 75.0, 60.0, 80.0);

        // Algebra is primary (3 attempts, 2 correct), Geometry secondary.
        assert!((features.topic_mastery_primary - 2.0 / 3.0).abs() < 1e-9);
        assert!((features.topic_mastery_secondary - 1.0).abs() < 1e-9);
        assert!((features.topic_mastery_general - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_topic_tie_break_is_lexicographic() {
        // Two topics with equal attempt counts: the alphabetically first
        // becomes primary.
        let responses = vec![response(1, true), response(2, false)];
        let topics: Vec<String> = ["Zoology", "Algebra"].iter().map(|t| t.to_string()).collect();
        let difficulties = vec![Difficulty::Medium; 2];

        let features = extract_features(&responses, &topics, &difficulties, 50.0, 50.0, 50.0);

        // Algebra (position 2, wrong) is primary by name order.
        assert_eq!(features.topic_mastery_primary, 0.0);
        assert_eq!(features.topic_mastery_secondary, 1.0);
    }

    #[test]
    fn test_single_topic_copies_primary_into_secondary() {
        let responses = vec![response(1, true), response(2, true)];
        let topics: Vec<String> = vec!["General".to_string(); 2];
        let difficulties = vec![Difficulty::Medium; 2];

        let features = extract_features(&responses, &topics, &difficulties, 100.0, 50.0, 50.0);
        assert_eq!(features.topic_mastery_primary, features.topic_mastery_secondary);
    }

    #[test]
    fn test_difficulty_resilience_counts_hard_only() {
        let responses = vec![
            response(1, true),
            response(2, false),
            response(3, true),
            response(4, false),
        ];
        let topics: Vec<String> = vec!["General".to_string(); 4];
        let difficulties = vec![
            Difficulty::Hard,
            Difficulty::Hard,
            Difficulty::Easy,
            Difficulty::Easy,
        ];

        let features = extract_features(&responses, &topics, &difficulties, 50.0, 50.0, 50.0);
        assert!((features.difficulty_resilience - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_hard_attempts_yields_zero_resilience() {
        let responses = vec![response(1, true)];
        let topics: Vec<String> = vec!["General".to_string()];
        let difficulties = vec![Difficulty::Easy];

        let features = extract_features(&responses, &topics, &difficulties, 100.0, 50.0, 50.0);
        assert_eq!(features.difficulty_resilience, 0.0);
    }

    #[test]
    fn test_empty_responses_yield_zero_masteries() {
        let features = extract_features(&[], &[], &[], 0.0, 0.0, 0.0);
        assert_eq!(features.topic_mastery_general, 0.0);
        assert_eq!(features.topic_mastery_primary, 0.0);
        assert_eq!(features.category, "Difficulty Risk");
    }

    #[test]
    fn test_non_finite_scalars_coerced_to_zero() {
        let responses = vec![response(1, true)];
        let topics: Vec<String> = vec!["General".to_string()];
        let difficulties = vec![Difficulty::Hard];

        let features = extract_features(
            &responses,
            &topics,
            &difficulties,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        assert_eq!(features.accuracy, 0.0);
        assert_eq!(features.time_efficiency, 0.0);
        assert_eq!(features.confidence, 0.0);
    }

    #[test]
    fn test_category_rules_in_order() {
        let mut topic_risk = baseline();
        topic_risk.topic_mastery_primary = 0.4;
        topic_risk.topic_mastery_secondary = 0.9;
        assert_eq!(assign_category(&topic_risk), "Topic Risk - Primary Area");

        let mut secondary_risk = baseline();
        secondary_risk.topic_mastery_primary = 0.9;
        secondary_risk.topic_mastery_secondary = 0.4;
        assert_eq!(assign_category(&secondary_risk), "Topic Risk - Secondary Area");

        let mut difficulty_risk = baseline();
        difficulty_risk.difficulty_resilience = 0.2;
        assert_eq!(assign_category(&difficulty_risk), "Difficulty Risk");

        let mut excellent = baseline();
        excellent.topic_mastery_general = 0.95;
        assert_eq!(assign_category(&excellent), "Excellent");

        assert_eq!(assign_category(&baseline()), "Pass");

        let mut partial = baseline();
        partial.topic_mastery_general = 0.55;
        assert_eq!(assign_category(&partial), "Partial Mastery");

        let mut fail = baseline();
        fail.topic_mastery_general = 0.3;
        assert_eq!(assign_category(&fail), "Fail");
    }

    #[test]
    fn test_feature_values_share_unit_scale() {
        let features = baseline();
        assert!((Feature::Accuracy.value(&features) - 0.7).abs() < 1e-9);
        assert!((Feature::TopicMasteryGeneral.value(&features) - 0.7).abs() < 1e-9);
        assert_eq!(Feature::ALL.len(), 7);
    }
}
