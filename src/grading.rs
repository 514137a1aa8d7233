//! Answer grading and per-candidate key storage.
//!
//! The matcher is deliberately flexible for free-text answers: exact
//! case-insensitive equality always wins, single-letter multiple-choice
//! answers never fuzzy-match, and answers of three or more words are
//! accepted when the candidate's text contains enough of their words.
//! Correctness is always recomputed here, never trusted from caller
//! input.

use crate::error::{EvaluarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-candidate answer key: 1-based position to correct answer text.
pub type AnswerKey = BTreeMap<usize, String>;

/// One graded answer. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedResponse {
    /// 1-based exam position
    pub position: usize,
    /// What the candidate submitted (trimmed; empty if unanswered)
    pub student_answer: String,
    /// The keyed correct answer
    pub correct_answer: String,
    /// Recomputed correctness
    pub is_correct: bool,
}

/// Checks whether a student answer matches the correct answer.
///
/// Matching rules, in order:
/// 1. empty or whitespace-only on either side is wrong;
/// 2. trimmed case-insensitive equality is correct;
/// 3. a correct answer that is exactly one letter A-D requires the exact
///    letter, no fuzzy matching;
/// 4. a correct answer of three or more words is accepted when its
///    matched significant words (length > 2 after normalization) reach
///    70% of its total word count;
/// 5. shorter non-letter answers require exact match.
///
/// # Examples
///
/// ```
/// use evaluar::grading::is_answer_correct;
///
/// assert!(is_answer_correct("paris", "Paris"));
/// assert!(is_answer_correct("b", "B"));
/// assert!(!is_answer_correct("A", "B"));
/// ```
pub fn is_answer_correct(student_answer: &str, correct_answer: &str) -> bool {
    let student = student_answer.trim();
    let correct = correct_answer.trim();

    if student.is_empty() || correct.is_empty() {
        return false;
    }

    if student.eq_ignore_ascii_case(correct) {
        return true;
    }

    // Single-letter multiple-choice answers: exact letter only.
    if correct.len() == 1 && matches!(correct.chars().next(), Some('a'..='d' | 'A'..='D')) {
        return student.eq_ignore_ascii_case(correct);
    }

    // Normalize both sides: lowercase, strip punctuation, split on
    // whitespace.
    let correct_words: Vec<String> = normalize(correct)
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let student_text = normalize(student);

    // Multi-word answers pass when most significant words are present.
    if correct_words.len() >= 3 {
        let matched = correct_words
            .iter()
            .filter(|word| word.len() > 2 && student_text.contains(word.as_str()))
            .count();
        return matched as f64 >= correct_words.len() as f64 * 0.7;
    }

    // Short non-letter answers require the exact match that already failed.
    false
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Grades a candidate's ordered answers against an answer key.
///
/// Position `p` in the key is graded against `answers[p - 1]`; missing
/// answers grade as empty (wrong).
pub fn grade(answers: &[String], key: &AnswerKey) -> Vec<GradedResponse> {
    let mut responses = Vec::with_capacity(key.len());

    for (&position, correct_answer) in key {
        let student_answer = answers
            .get(position - 1)
            .map(|a| a.trim().to_string())
            .unwrap_or_default();
        let is_correct = is_answer_correct(&student_answer, correct_answer);
        responses.push(GradedResponse {
            position,
            student_answer,
            correct_answer: correct_answer.clone(),
            is_correct,
        });
    }

    responses
}

/// Counts correct positions.
pub fn score(responses: &[GradedResponse]) -> usize {
    responses.iter().filter(|r| r.is_correct).count()
}

/// Score as a percentage of total positions; 0.0 when there are none.
pub fn percentage(responses: &[GradedResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    score(responses) as f64 * 100.0 / responses.len() as f64
}

/// Injected per-candidate answer-key store.
///
/// Replaces process-wide shared maps: each candidate has an isolated
/// entry, the store is owned by the caller's session layer, and the core
/// holds no global state.
///
/// # Examples
///
/// ```
/// use evaluar::grading::AnswerKeyStore;
/// use std::collections::BTreeMap;
///
/// let mut store = AnswerKeyStore::new();
/// let key = BTreeMap::from([(1, "Paris".to_string())]);
/// store.store("alice", key);
///
/// let graded = store.grade_candidate("alice", &["paris".to_string()]).unwrap();
/// assert!(graded[0].is_correct);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnswerKeyStore {
    keys: BTreeMap<String, AnswerKey>,
}

impl AnswerKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) the answer key for a candidate.
    pub fn store(&mut self, candidate: &str, key: AnswerKey) {
        self.keys.insert(candidate.to_string(), key);
    }

    /// Looks up the answer key for a candidate.
    pub fn get(&self, candidate: &str) -> Option<&AnswerKey> {
        self.keys.get(candidate)
    }

    /// Returns true if a key is stored for the candidate.
    pub fn contains(&self, candidate: &str) -> bool {
        self.keys.contains_key(candidate)
    }

    /// Removes a candidate's key once their exam is graded.
    pub fn remove(&mut self, candidate: &str) -> Option<AnswerKey> {
        self.keys.remove(candidate)
    }

    /// Grades a candidate's ordered answers against their stored key.
    ///
    /// # Errors
    ///
    /// Returns `NoAnswerKey` when no key is stored (or the stored key is
    /// empty); no partial score is computed.
    pub fn grade_candidate(
        &self,
        candidate: &str,
        answers: &[String],
    ) -> Result<Vec<GradedResponse>> {
        let key = self
            .keys
            .get(candidate)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| EvaluarError::NoAnswerKey {
                candidate: candidate.to_string(),
            })?;
        Ok(grade(answers, key))
    }
}
