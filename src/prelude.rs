//! Convenience re-exports for common usage.

pub use crate::error::{EvaluarError, Result};
pub use crate::exam::{AssignedExam, Difficulty, ExamAssembler, ExamTemplate, Question};
pub use crate::features::{assign_category, extract_features, Feature, StudentFeatures};
pub use crate::forest::{PerformanceReport, RandomForestClassifier};
pub use crate::grading::{
    grade, is_answer_correct, percentage, score, AnswerKey, AnswerKeyStore, GradedResponse,
};
pub use crate::irt::{
    calibrate_items, default_item_parameters, estimate_ability, probability, select_next_item,
    theta_to_scaled_score, AbilityEstimate, ItemParameters,
};
pub use crate::shuffle::{fisher_yates, shuffle};
