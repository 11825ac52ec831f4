//! Question and answer submission pipeline.
//!
//! Submissions are validated, screened by the content filter, and only then appended to the
//! owning store. Listings read straight from the stores.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Answer, AnswerId, AnswerSubmission, NewAnswer, NewQuestion, Poll, Question, QuestionId,
    QuestionSubmission, SubmissionField, ValidationError,
};
pub use filter::{default_terms, Classification, ContentFilter, FilterError, DEFAULT_DENYLIST};
pub use repository::{AnswerRepository, AnswerStore, QuestionRepository, QuestionStore};
pub use router::board_router;
pub use service::{LinkPolicy, SubmissionError, SubmissionService};
