//! Error types for Evaluar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Evaluar operations.
///
/// Covers assembly over empty banks, missing answer keys at grading time,
/// invalid hyperparameters, and parallel-sequence length mismatches.
///
/// # Examples
///
/// ```
/// use evaluar::error::EvaluarError;
///
/// let err = EvaluarError::NoAnswerKey {
///     candidate: "s1042@example.edu".to_string(),
/// };
/// assert!(err.to_string().contains("no answer key"));
/// ```
#[derive(Debug)]
pub enum EvaluarError {
    /// Exam assembly was requested over a template with zero questions.
    EmptyBank,

    /// No answer key is stored for the candidate; grading cannot proceed.
    NoAnswerKey {
        /// Candidate identifier the caller asked to grade
        candidate: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Parallel sequences don't match in length.
    DimensionMismatch {
        /// Expected length description
        expected: String,
        /// Actual length found
        actual: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for EvaluarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluarError::EmptyBank => {
                write!(f, "Question bank is empty: cannot assemble an exam")
            }
            EvaluarError::NoAnswerKey { candidate } => {
                write!(f, "no answer key stored for candidate {candidate}")
            }
            EvaluarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            EvaluarError::DimensionMismatch { expected, actual } => {
                write!(f, "Sequence length mismatch: expected {expected}, got {actual}")
            }
            EvaluarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EvaluarError {}

impl From<&str> for EvaluarError {
    fn from(msg: &str) -> Self {
        EvaluarError::Other(msg.to_string())
    }
}

impl From<String> for EvaluarError {
    fn from(msg: String) -> Self {
        EvaluarError::Other(msg)
    }
}

impl EvaluarError {
    /// Create a sequence length mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, EvaluarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bank_display() {
        let err = EvaluarError::EmptyBank;
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_no_answer_key_names_candidate() {
        let err = EvaluarError::NoAnswerKey {
            candidate: "alice".to_string(),
        };
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = EvaluarError::InvalidHyperparameter {
            param: "difficulty_mix".to_string(),
            value: "30/50/30".to_string(),
            constraint: "percentages summing to 100".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("difficulty_mix"));
        assert!(msg.contains("summing to 100"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = EvaluarError::dimension_mismatch("responses", 10, 7);
        let msg = err.to_string();
        assert!(msg.contains("responses=10"));
        assert!(msg.contains("7"));
    }

    #[test]
    fn test_from_str_and_string() {
        let a: EvaluarError = "boom".into();
        let b: EvaluarError = String::from("boom").into();
        assert_eq!(a.to_string(), "boom");
        assert_eq!(b.to_string(), "boom");
    }
}
