//! Per-candidate exam assembly.
//!
//! Takes a read-only [`ExamTemplate`] and produces a unique
//! [`AssignedExam`] per candidate: stratified sampling by difficulty,
//! Fisher-Yates ordering, independently re-shuffled choices, and a
//! 1-based position-to-answer key that survives every permutation.

use crate::error::{EvaluarError, Result};
use crate::shuffle::fisher_yates;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Question difficulty tag.
///
/// Unrecognized tags fall back to `Medium`, matching ingestion behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses a difficulty tag case-insensitively. Anything that is not
    /// "easy" or "hard" is treated as `Medium`.
    pub fn parse(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("easy") {
            Difficulty::Easy
        } else if tag.eq_ignore_ascii_case("hard") {
            Difficulty::Hard
        } else {
            Difficulty::Medium
        }
    }
}

/// A single question in a bank. Immutable once ingested.
///
/// An empty `choices` list marks a free-text question. The correct answer
/// is always stored as the literal answer text, never a choice letter, so
/// re-shuffling choices cannot invalidate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier from the ingestion collaborator
    pub id: u32,
    /// Prompt text shown to the candidate
    pub prompt: String,
    /// Displayed choices; empty for free-text questions
    pub choices: Vec<String>,
    /// Correct answer text
    pub correct_answer: String,
    /// Difficulty tag
    pub difficulty: Difficulty,
    /// Topic tag, defaulting to "General"
    pub topic: String,
}

impl Question {
    /// Creates a free-text question with the default "General" topic.
    pub fn new(id: u32, prompt: &str, correct_answer: &str, difficulty: Difficulty) -> Self {
        Self {
            id,
            prompt: prompt.to_string(),
            choices: Vec::new(),
            correct_answer: correct_answer.to_string(),
            difficulty,
            topic: "General".to_string(),
        }
    }

    /// Sets the displayed choices, making this a multiple-choice question.
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Sets the topic tag.
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = topic.to_string();
        self
    }

    /// Returns true if the question has displayed choices.
    pub fn is_multiple_choice(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// An ordered question bank with subject metadata.
///
/// Owned by the ingestion collaborator; read-only input to assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamTemplate {
    /// Subject the bank belongs to
    pub subject: String,
    /// Activity type label (e.g. "Quiz", "Final")
    pub activity: String,
    /// Ordered questions
    pub questions: Vec<Question>,
}

impl ExamTemplate {
    /// Creates a template over an ordered question list.
    pub fn new(subject: &str, activity: &str, questions: Vec<Question>) -> Self {
        Self {
            subject: subject.to_string(),
            activity: activity.to_string(),
            questions,
        }
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true if the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Per-candidate exam instance.
///
/// Questions are content copies with independently re-shuffled choices.
/// The answer key maps 1-based final position to the correct answer text
/// of whichever original question now occupies that position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedExam {
    /// Questions in final, shuffled order
    pub questions: Vec<Question>,
    /// Difficulty sequence parallel to `questions`
    pub difficulties: Vec<Difficulty>,
    /// Topic sequence parallel to `questions`
    pub topics: Vec<String>,
    /// 1-based position to correct answer text
    pub answer_key: BTreeMap<usize, String>,
}

impl AssignedExam {
    /// Number of assigned questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true if nothing was assigned.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Stratified exam assembler.
///
/// Samples `question_count` questions from a template according to a
/// difficulty percentage mix, shuffles the result, and re-shuffles each
/// multiple-choice question's displayed choices. When a difficulty bucket
/// is under-populated the shortfall is capped at availability, not
/// redistributed, so the assigned count may fall below the request.
///
/// # Examples
///
/// ```
/// use evaluar::exam::{Difficulty, ExamAssembler, ExamTemplate, Question};
///
/// let questions = (0..10)
///     .map(|i| Question::new(i, "prompt", "answer", Difficulty::Medium))
///     .collect();
/// let template = ExamTemplate::new("Math", "Quiz", questions);
///
/// let exam = ExamAssembler::new(5)
///     .with_difficulty_mix(0, 100, 0)
///     .with_random_state(42)
///     .assemble(&template)
///     .unwrap();
/// assert_eq!(exam.len(), 5);
/// assert_eq!(exam.answer_key.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ExamAssembler {
    question_count: usize,
    easy_percent: u32,
    medium_percent: u32,
    hard_percent: u32,
    random_state: Option<u64>,
}

impl ExamAssembler {
    /// Creates an assembler targeting `question_count` questions with the
    /// default 30/50/20 easy/medium/hard mix.
    pub fn new(question_count: usize) -> Self {
        Self {
            question_count,
            easy_percent: 30,
            medium_percent: 50,
            hard_percent: 20,
            random_state: None,
        }
    }

    /// Sets the difficulty percentage mix. Must sum to 100.
    pub fn with_difficulty_mix(mut self, easy: u32, medium: u32, hard: u32) -> Self {
        self.easy_percent = easy;
        self.medium_percent = medium;
        self.hard_percent = hard;
        self
    }

    /// Sets a seed for reproducible assembly. Without a seed the assembler
    /// draws from OS entropy so exam orderings are unpredictable.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Assembles a per-candidate exam from the template.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBank` for a template with zero questions and
    /// `InvalidHyperparameter` when the mix does not sum to 100 or the
    /// question count is zero.
    pub fn assemble(&self, template: &ExamTemplate) -> Result<AssignedExam> {
        if template.is_empty() {
            return Err(EvaluarError::EmptyBank);
        }
        if self.question_count == 0 {
            return Err(EvaluarError::InvalidHyperparameter {
                param: "question_count".to_string(),
                value: "0".to_string(),
                constraint: "at least 1 question".to_string(),
            });
        }
        if self.easy_percent + self.medium_percent + self.hard_percent != 100 {
            return Err(EvaluarError::InvalidHyperparameter {
                param: "difficulty_mix".to_string(),
                value: format!(
                    "{}/{}/{}",
                    self.easy_percent, self.medium_percent, self.hard_percent
                ),
                constraint: "percentages summing to 100".to_string(),
            });
        }

        match self.random_state {
            Some(seed) => self.assemble_with_rng(template, &mut StdRng::seed_from_u64(seed)),
            None => self.assemble_with_rng(template, &mut OsRng),
        }
    }

    fn assemble_with_rng<R: Rng>(
        &self,
        template: &ExamTemplate,
        rng: &mut R,
    ) -> Result<AssignedExam> {
        // Partition question indices into difficulty buckets.
        let mut easy_indices = Vec::new();
        let mut medium_indices = Vec::new();
        let mut hard_indices = Vec::new();
        for (i, question) in template.questions.iter().enumerate() {
            match question.difficulty {
                Difficulty::Easy => easy_indices.push(i),
                Difficulty::Medium => medium_indices.push(i),
                Difficulty::Hard => hard_indices.push(i),
            }
        }

        let total = self.question_count.min(template.len());
        let (easy_count, medium_count, hard_count) =
            per_bucket_counts(total, self.easy_percent, self.medium_percent, self.hard_percent);

        // Per-bucket shuffle, then take the first requested indices. A
        // bucket shorter than its request is capped, never compensated.
        fisher_yates(&mut easy_indices, rng);
        fisher_yates(&mut medium_indices, rng);
        fisher_yates(&mut hard_indices, rng);

        let mut selected: Vec<usize> = Vec::with_capacity(total);
        selected.extend(easy_indices.iter().take(easy_count));
        selected.extend(medium_indices.iter().take(medium_count));
        selected.extend(hard_indices.iter().take(hard_count));

        // Final shuffle destroys the easy/medium/hard clustering.
        fisher_yates(&mut selected, rng);

        let mut questions = Vec::with_capacity(selected.len());
        let mut difficulties = Vec::with_capacity(selected.len());
        let mut topics = Vec::with_capacity(selected.len());
        let mut answer_key = BTreeMap::new();

        for (new_pos, &original_idx) in selected.iter().enumerate() {
            let mut question = template.questions[original_idx].clone();
            if question.is_multiple_choice() {
                // Randomize on-screen letter positions per candidate. The
                // stored answer is the literal choice text, so it survives.
                fisher_yates(&mut question.choices, rng);
            }
            difficulties.push(question.difficulty);
            topics.push(question.topic.clone());
            answer_key.insert(new_pos + 1, question.correct_answer.clone());
            questions.push(question);
        }

        Ok(AssignedExam {
            questions,
            difficulties,
            topics,
            answer_key,
        })
    }
}

/// Computes per-bucket question counts from rounded percentages.
///
/// The Medium bucket absorbs the signed rounding remainder so the three
/// counts always sum to the target (floored at zero).
fn per_bucket_counts(total: usize, easy: u32, medium: u32, hard: u32) -> (usize, usize, usize) {
    let round_share = |pct: u32| (total as f64 * f64::from(pct) / 100.0).round() as i64;

    let easy_count = round_share(easy);
    let mut medium_count = round_share(medium);
    let hard_count = round_share(hard);

    medium_count += total as i64 - (easy_count + medium_count + hard_count);
    medium_count = medium_count.max(0);

    (easy_count as usize, medium_count as usize, hard_count as usize)
}
