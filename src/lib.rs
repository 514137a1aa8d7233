//! Evaluar: exam assembly, grading, and psychometric analytics in pure Rust.
//!
//! Evaluar turns a static bank of tagged questions into unique,
//! difficulty-balanced exam instances per candidate, grades free-form and
//! multiple-choice responses, and derives two independent performance
//! models: a bootstrap-aggregated decision-tree ensemble and a
//! three-parameter-logistic IRT ability estimator.
//!
//! # Quick Start
//!
//! ```
//! use evaluar::prelude::*;
//!
//! // A small bank of tagged questions.
//! let questions = vec![
//!     Question::new(0, "Capital of France?", "Paris", Difficulty::Easy)
//!         .with_choices(&["Paris", "London", "Berlin", "Madrid"])
//!         .with_topic("Geography"),
//!     Question::new(1, "2 + 2?", "4", Difficulty::Easy).with_topic("Math"),
//!     Question::new(2, "Who discovered gravity?", "Isaac Newton", Difficulty::Medium)
//!         .with_topic("Science"),
//! ];
//! let template = ExamTemplate::new("General Studies", "Quiz", questions);
//!
//! // Assemble a unique exam for one candidate.
//! let exam = ExamAssembler::new(3)
//!     .with_difficulty_mix(70, 30, 0)
//!     .with_random_state(42)
//!     .assemble(&template)
//!     .unwrap();
//!
//! // Grade answers against the per-position key.
//! let answers: Vec<String> = exam
//!     .answer_key
//!     .values()
//!     .map(|correct| correct.to_lowercase())
//!     .collect();
//! let graded = grade(&answers, &exam.answer_key);
//! assert_eq!(score(&graded), exam.len());
//! ```
//!
//! # Modules
//!
//! - [`shuffle`]: Uniform Fisher-Yates permutation primitive
//! - [`exam`]: Stratified per-candidate exam assembly
//! - [`grading`]: Flexible answer matching and per-candidate key storage
//! - [`features`]: Graded responses to normalized feature vectors
//! - [`forest`]: Random forest classification and report synthesis
//! - [`irt`]: IRT 3PL ability estimation and adaptive item selection

pub mod error;
pub mod exam;
pub mod features;
pub mod forest;
pub mod grading;
pub mod irt;
pub mod prelude;
pub mod shuffle;

pub use error::{EvaluarError, Result};
