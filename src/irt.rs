//! Item Response Theory three-parameter logistic (3PL) model.
//!
//! The 3PL model gives the probability of a correct response as
//! `P(theta) = c + (1 - c) / (1 + e^(-a(theta - b)))` where `a` is item
//! discrimination, `b` item difficulty, and `c` the pseudo-guessing
//! floor. This module estimates latent ability by Newton-Raphson maximum
//! likelihood, derives standard errors from Fisher information, performs
//! a simplified p-value calibration, and supports greedy max-information
//! item selection for adaptive testing.

use crate::error::{EvaluarError, Result};
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Newton-Raphson iteration cap.
const MAX_ITERATIONS: usize = 50;
/// Convergence criterion on the theta update.
const CONVERGENCE: f64 = 0.001;
/// Ability estimates are clamped to this range.
const THETA_RANGE: (f64, f64) = (-4.0, 4.0);
/// Standard-error sentinel for undefined or unreliable estimates.
const UNRELIABLE_SE: f64 = 999.0;
/// Guard against vanishing denominators in the score function.
const DERIVATIVE_EPSILON: f64 = 1e-4;

/// 3PL item parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemParameters {
    /// Discrimination `a` (> 0; higher separates abilities more sharply)
    pub discrimination: f64,
    /// Difficulty `b` (ability level giving 50% above the guessing floor)
    pub difficulty: f64,
    /// Pseudo-guessing `c` in [0, 1)
    pub guessing: f64,
}

impl ItemParameters {
    /// Creates item parameters.
    pub fn new(discrimination: f64, difficulty: f64, guessing: f64) -> Self {
        Self {
            discrimination,
            difficulty,
            guessing,
        }
    }
}

/// Ability estimation result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AbilityEstimate {
    /// Estimated latent ability, clamped to [-4, 4]
    pub theta: f64,
    /// Standard error of the estimate; 999.0 when undefined
    pub standard_error: f64,
    /// Number of items answered
    pub items_answered: usize,
    /// Number answered correctly
    pub correct_answers: usize,
}

/// Probability of a correct response under the 3PL model.
///
/// # Examples
///
/// ```
/// use evaluar::irt::{probability, ItemParameters};
///
/// // At theta == b with no guessing, the probability is exactly 0.5.
/// let item = ItemParameters::new(1.0, 0.7, 0.0);
/// assert!((probability(0.7, &item) - 0.5).abs() < 1e-12);
/// ```
pub fn probability(theta: f64, item: &ItemParameters) -> f64 {
    let exponent = -item.discrimination * (theta - item.difficulty);
    item.guessing + (1.0 - item.guessing) / (1.0 + exponent.exp())
}

/// Item information under the 3PL model at a given ability.
fn item_information(theta: f64, item: &ItemParameters) -> f64 {
    let a = item.discrimination;
    let c = item.guessing;
    let p = probability(theta, item);
    let p_star = (p - c) / (1.0 - c);
    a * a * p_star * (1.0 - p_star) * (1.0 - c) * (1.0 - c)
}

/// Total Fisher information of an item set at a given ability.
pub fn information(theta: f64, items: &[ItemParameters]) -> f64 {
    items.iter().map(|item| item_information(theta, item)).sum()
}

/// Estimates latent ability by Newton-Raphson maximum likelihood.
///
/// Starts at theta 0 and iterates up to 50 times or until the update
/// falls below 0.001, clamping theta to [-4, 4] after every step. The
/// standard error is `1 / sqrt(information)` at the final theta, or the
/// 999.0 sentinel when the information is not positive. Empty inputs
/// yield the sentinel estimate `(0, 999, 0, 0)` rather than an error.
///
/// # Errors
///
/// Returns `DimensionMismatch` when responses and item parameters have
/// different lengths.
pub fn estimate_ability(
    responses: &[bool],
    items: &[ItemParameters],
) -> Result<AbilityEstimate> {
    if responses.is_empty() || items.is_empty() {
        return Ok(AbilityEstimate {
            theta: 0.0,
            standard_error: UNRELIABLE_SE,
            items_answered: 0,
            correct_answers: 0,
        });
    }
    if responses.len() != items.len() {
        return Err(EvaluarError::dimension_mismatch(
            "responses",
            responses.len(),
            items.len(),
        ));
    }

    let correct_answers = responses.iter().filter(|r| **r).count();
    let mut theta = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let previous_theta = theta;

        let mut first_derivative = 0.0;
        let mut second_derivative = 0.0;

        for (item, &response) in items.iter().zip(responses) {
            let a = item.discrimination;
            let c = item.guessing;
            let p = probability(theta, item);
            let u = if response { 1.0 } else { 0.0 };
            let p_star = (p - c) / (1.0 - c);

            let denominator = p * (1.0 - p);
            if denominator > DERIVATIVE_EPSILON {
                first_derivative += a * p_star * (1.0 - p_star) * (u - p) / denominator;
            }

            second_derivative -= a * a * p_star * (1.0 - p_star) * (1.0 - c) * (1.0 - c);
        }

        if second_derivative.abs() > DERIVATIVE_EPSILON {
            theta = previous_theta - first_derivative / second_derivative;
        }
        theta = theta.clamp(THETA_RANGE.0, THETA_RANGE.1);

        if (theta - previous_theta).abs() < CONVERGENCE {
            break;
        }
    }

    let total_information = information(theta, items);
    let standard_error = if total_information > 0.0 {
        1.0 / total_information.sqrt()
    } else {
        UNRELIABLE_SE
    };

    Ok(AbilityEstimate {
        theta,
        standard_error,
        items_answered: responses.len(),
        correct_answers,
    })
}

/// Generates plausible item parameters for uncalibrated questions.
///
/// Discrimination ~ U(0.8, 2.0), difficulty ~ U(-1.5, 1.5), guessing
/// ~ U(0.15, 0.25) per item, the typical ranges for 4-option multiple
/// choice. A seed makes the draw reproducible; without one the draw
/// comes from OS entropy.
pub fn default_item_parameters(
    n_items: usize,
    random_state: Option<u64>,
) -> Vec<ItemParameters> {
    match random_state {
        Some(seed) => draw_default_parameters(n_items, &mut StdRng::seed_from_u64(seed)),
        None => draw_default_parameters(n_items, &mut OsRng),
    }
}

fn draw_default_parameters<R: Rng>(n_items: usize, rng: &mut R) -> Vec<ItemParameters> {
    (0..n_items)
        .map(|_| {
            ItemParameters::new(
                rng.gen_range(0.8..2.0),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(0.15..0.25),
            )
        })
        .collect()
}

/// Simplified item calibration from a response matrix.
///
/// For each item the p-value (proportion correct across respondents)
/// drives the difficulty: `b = -ln(p / (1 - p + 0.001))`, clamped to
/// [-3, 3]. Discrimination is fixed at 1.0 and guessing at 0.20. True
/// maximum-likelihood calibration is out of scope.
pub fn calibrate_items(all_responses: &[Vec<bool>]) -> Vec<ItemParameters> {
    let Some(first) = all_responses.first() else {
        return Vec::new();
    };
    let n_items = first.len();

    (0..n_items)
        .map(|item_idx| {
            let mut correct = 0usize;
            let mut total = 0usize;
            for responses in all_responses {
                if let Some(&response) = responses.get(item_idx) {
                    if response {
                        correct += 1;
                    }
                    total += 1;
                }
            }

            let p_value = if total > 0 {
                correct as f64 / total as f64
            } else {
                0.5
            };

            let b = (-(p_value / (1.0 - p_value + 0.001)).ln()).clamp(-3.0, 3.0);
            ItemParameters::new(1.0, b, 0.20)
        })
        .collect()
}

/// Selects the unused item with maximum information at the current
/// ability (greedy adaptive selection). Returns `None` when every item
/// has been used.
pub fn select_next_item(
    theta: f64,
    items: &[ItemParameters],
    used: &HashSet<usize>,
) -> Option<usize> {
    let mut best_index = None;
    let mut max_information = -1.0;

    for (i, item) in items.iter().enumerate() {
        if used.contains(&i) {
            continue;
        }
        let info = item_information(theta, item);
        if info > max_information {
            max_information = info;
            best_index = Some(i);
        }
    }

    best_index
}

/// Converts theta to a scaled score such as a 200-800 band.
pub fn theta_to_scaled_score(theta: f64, mean: i32, sd: i32) -> i32 {
    (f64::from(mean) + theta * f64::from(sd)).round() as i32
}

/// Converts a scaled score back to theta.
pub fn scaled_score_to_theta(score: i32, mean: i32, sd: i32) -> f64 {
    f64::from(score - mean) / f64::from(sd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_half_at_difficulty_without_guessing() {
        let item = ItemParameters::new(1.0, 0.0, 0.0);
        assert!((probability(0.0, &item) - 0.5).abs() < 1e-12);

        let shifted = ItemParameters::new(1.0, 1.3, 0.0);
        assert!((probability(1.3, &shifted) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probability_floors_at_guessing() {
        let item = ItemParameters::new(2.0, 0.0, 0.25);
        // Far below the difficulty, probability approaches the guessing floor.
        let p = probability(-4.0, &item);
        assert!(p > 0.25 && p < 0.30);
    }

    #[test]
    fn test_probability_is_monotone_in_theta() {
        let item = ItemParameters::new(1.5, 0.5, 0.2);
        let mut previous = 0.0;
        for step in -8..=8 {
            let p = probability(f64::from(step) * 0.5, &item);
            assert!(p >= previous);
            previous = p;
        }
    }

    #[test]
    fn test_estimate_ability_empty_inputs_yield_sentinel() {
        let estimate = estimate_ability(&[], &[]).expect("empty inputs are not an error");
        assert_eq!(estimate.theta, 0.0);
        assert_eq!(estimate.standard_error, 999.0);
        assert_eq!(estimate.items_answered, 0);
        assert_eq!(estimate.correct_answers, 0);
    }

    #[test]
    fn test_estimate_ability_length_mismatch_is_error() {
        let items = vec![ItemParameters::new(1.0, 0.0, 0.2)];
        let result = estimate_ability(&[true, false], &items);
        assert!(matches!(
            result,
            Err(EvaluarError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_estimate_ability_all_correct_is_high() {
        let items: Vec<ItemParameters> =
            (0..10).map(|_| ItemParameters::new(1.2, 0.0, 0.2)).collect();
        let responses = vec![true; 10];
        let estimate = estimate_ability(&responses, &items).expect("estimation should succeed");

        assert!(estimate.theta > 1.0);
        assert!(estimate.theta <= 4.0);
        assert_eq!(estimate.correct_answers, 10);
        assert_eq!(estimate.items_answered, 10);
    }

    #[test]
    fn test_estimate_ability_all_wrong_is_low() {
        let items: Vec<ItemParameters> =
            (0..10).map(|_| ItemParameters::new(1.2, 0.0, 0.2)).collect();
        let responses = vec![false; 10];
        let estimate = estimate_ability(&responses, &items).expect("estimation should succeed");

        assert!(estimate.theta < -1.0);
        assert!(estimate.theta >= -4.0);
        assert_eq!(estimate.correct_answers, 0);
    }

    #[test]
    fn test_estimate_ability_mixed_is_moderate() {
        let items: Vec<ItemParameters> =
            (0..10).map(|_| ItemParameters::new(1.0, 0.0, 0.2)).collect();
        let responses: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();
        let estimate = estimate_ability(&responses, &items).expect("estimation should succeed");

        assert!(estimate.theta.abs() < 1.5);
        assert!(estimate.standard_error < 999.0);
        assert!(estimate.standard_error > 0.0);
    }

    #[test]
    fn test_more_items_shrink_standard_error() {
        let few: Vec<ItemParameters> =
            (0..5).map(|_| ItemParameters::new(1.0, 0.0, 0.2)).collect();
        let many: Vec<ItemParameters> =
            (0..40).map(|_| ItemParameters::new(1.0, 0.0, 0.2)).collect();

        let few_estimate = estimate_ability(&vec![true, false, true, false, true], &few)
            .expect("estimation should succeed");
        let many_responses: Vec<bool> = (0..40).map(|i| i % 2 == 0).collect();
        let many_estimate =
            estimate_ability(&many_responses, &many).expect("estimation should succeed");

        assert!(many_estimate.standard_error < few_estimate.standard_error);
    }

    #[test]
    fn test_default_parameters_stay_in_documented_ranges() {
        let params = default_item_parameters(100, Some(42));
        assert_eq!(params.len(), 100);
        for item in &params {
            assert!(item.discrimination >= 0.8 && item.discrimination < 2.0);
            assert!(item.difficulty >= -1.5 && item.difficulty < 1.5);
            assert!(item.guessing >= 0.15 && item.guessing < 0.25);
        }
    }

    #[test]
    fn test_default_parameters_reproducible_with_seed() {
        let a = default_item_parameters(10, Some(7));
        let b = default_item_parameters(10, Some(7));
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.difficulty, y.difficulty);
        }
    }

    #[test]
    fn test_calibration_maps_p_value_to_difficulty() {
        // Item 0: everyone correct (easy, low b). Item 1: everyone wrong
        // (hard, high b). Item 2: half correct (near zero).
        let responses = vec![
            vec![true, false, true],
            vec![true, false, false],
            vec![true, false, true],
            vec![true, false, false],
        ];
        let params = calibrate_items(&responses);
        assert_eq!(params.len(), 3);

        assert_eq!(params[0].difficulty, -3.0);
        assert_eq!(params[1].difficulty, 3.0);
        assert!(params[2].difficulty.abs() < 0.01);

        for item in &params {
            assert_eq!(item.discrimination, 1.0);
            assert_eq!(item.guessing, 0.20);
        }
    }

    #[test]
    fn test_calibration_of_empty_matrix_is_empty() {
        assert!(calibrate_items(&[]).is_empty());
    }

    #[test]
    fn test_select_next_item_prefers_matched_difficulty() {
        let items = vec![
            ItemParameters::new(1.0, -2.0, 0.2),
            ItemParameters::new(1.0, 0.0, 0.2),
            ItemParameters::new(1.0, 2.0, 0.2),
        ];
        let used = HashSet::new();
        // At average ability the middle-difficulty item is most informative.
        assert_eq!(select_next_item(0.0, &items, &used), Some(1));
    }

    #[test]
    fn test_select_next_item_skips_used() {
        let items = vec![
            ItemParameters::new(1.0, 0.0, 0.2),
            ItemParameters::new(1.0, 0.5, 0.2),
        ];
        let used: HashSet<usize> = [0].into_iter().collect();
        assert_eq!(select_next_item(0.0, &items, &used), Some(1));

        let all_used: HashSet<usize> = [0, 1].into_iter().collect();
        assert_eq!(select_next_item(0.0, &items, &all_used), None);
    }

    #[test]
    fn test_scaled_score_round_trip() {
        assert_eq!(theta_to_scaled_score(0.0, 500, 100), 500);
        assert_eq!(theta_to_scaled_score(1.0, 500, 100), 600);
        assert_eq!(theta_to_scaled_score(-1.5, 500, 100), 350);

        assert!((scaled_score_to_theta(600, 500, 100) - 1.0).abs() < 1e-12);
        assert!((scaled_score_to_theta(500, 500, 100)).abs() < 1e-12);
    }
}
