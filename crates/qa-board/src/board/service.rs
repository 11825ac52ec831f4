use std::sync::Arc;

use tracing::{error, info, warn};

use super::domain::{
    Answer, AnswerSubmission, Question, QuestionId, QuestionSubmission, SubmissionField,
    ValidationError,
};
use super::filter::{ContentFilter, FilterError};
use super::repository::{AnswerRepository, QuestionRepository};
use crate::config::ModerationConfig;
use crate::storage::StorageError;

/// Whether an answer must reference a question that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Store `questionId` verbatim without looking it up.
    #[default]
    Unchecked,
    RequireExisting,
}

impl LinkPolicy {
    pub fn from_config(config: &ModerationConfig) -> Self {
        if config.require_existing_question {
            Self::RequireExisting
        } else {
            Self::Unchecked
        }
    }
}

/// Stateless orchestration: validate, screen, then hand off to the owning store.
pub struct SubmissionService<Q, A> {
    filter: Arc<ContentFilter>,
    questions: Arc<Q>,
    answers: Arc<A>,
    link_policy: LinkPolicy,
}

impl<Q, A> SubmissionService<Q, A>
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    pub fn new(
        questions: Arc<Q>,
        answers: Arc<A>,
        config: &ModerationConfig,
    ) -> Result<Self, FilterError> {
        let filter = ContentFilter::from_config(config)?;
        Ok(Self::with_filter(
            filter,
            questions,
            answers,
            LinkPolicy::from_config(config),
        ))
    }

    pub fn with_filter(
        filter: ContentFilter,
        questions: Arc<Q>,
        answers: Arc<A>,
        link_policy: LinkPolicy,
    ) -> Self {
        Self {
            filter: Arc::new(filter),
            questions,
            answers,
            link_policy,
        }
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Screen and store a question, returning the record with its assigned id and timestamp.
    pub async fn submit_question(
        &self,
        submission: QuestionSubmission,
    ) -> Result<Question, SubmissionError> {
        let question = submission.validate()?;
        self.screen(SubmissionField::QuestionText, &question.text)?;

        let stored = self
            .questions
            .insert(question)
            .await
            .inspect_err(|err| error!(error = %err, "question insert failed"))?;

        info!(question_id = %stored.id, username = %stored.username, "question stored");
        Ok(stored)
    }

    /// Screen and store an answer. The question link is only checked under `RequireExisting`.
    pub async fn submit_answer(
        &self,
        submission: AnswerSubmission,
    ) -> Result<Answer, SubmissionError> {
        let answer = submission.validate()?;
        self.screen(SubmissionField::AnswerText, &answer.answer_text)?;

        if self.link_policy == LinkPolicy::RequireExisting {
            let known = self
                .questions
                .list_all()
                .await?
                .iter()
                .any(|question| question.id == answer.question_id);
            if !known {
                warn!(question_id = %answer.question_id, "answer references unknown question");
                return Err(SubmissionError::UnknownQuestion(answer.question_id));
            }
        }

        let stored = self
            .answers
            .insert(answer)
            .await
            .inspect_err(|err| error!(error = %err, "answer insert failed"))?;

        info!(
            answer_id = %stored.id,
            question_id = %stored.question_id,
            username = %stored.username,
            "answer stored"
        );
        Ok(stored)
    }

    pub async fn list_questions(&self) -> Result<Vec<Question>, SubmissionError> {
        Ok(self.questions.list_all().await?)
    }

    pub async fn list_answers(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, SubmissionError> {
        Ok(self.answers.list_by_question(question_id).await?)
    }

    fn screen(&self, field: SubmissionField, text: &str) -> Result<(), SubmissionError> {
        if self.filter.is_acceptable(text) {
            return Ok(());
        }
        warn!(field = field.label(), "submission rejected by content filter");
        Err(SubmissionError::ContentRejected { field })
    }
}

/// Error raised by the submission service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("inappropriate content in {}", .field.noun())]
    ContentRejected { field: SubmissionField },
    #[error("question {0} does not exist")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
