use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::board::domain::{
    Answer, AnswerSubmission, NewAnswer, NewQuestion, Question, QuestionId, QuestionSubmission,
};
use crate::board::repository::{AnswerRepository, AnswerStore, QuestionRepository, QuestionStore};
use crate::board::service::{LinkPolicy, SubmissionService};
use crate::board::{board_router, ContentFilter};
use crate::config::ModerationConfig;
use crate::storage::StorageError;

pub(super) fn question(text: &str) -> QuestionSubmission {
    QuestionSubmission {
        text: text.to_string(),
        level: "easy".to_string(),
        poll: None,
        username: "alice".to_string(),
    }
}

pub(super) fn answer(question_id: &QuestionId, text: &str) -> AnswerSubmission {
    AnswerSubmission {
        question_id: question_id.0.clone(),
        answer_text: text.to_string(),
        username: "bob".to_string(),
    }
}

pub(super) fn default_filter() -> ContentFilter {
    ContentFilter::from_config(&ModerationConfig::default()).expect("default denylist compiles")
}

pub(super) fn build_service() -> (
    SubmissionService<QuestionStore, AnswerStore>,
    Arc<QuestionStore>,
    Arc<AnswerStore>,
) {
    build_service_with_policy(LinkPolicy::Unchecked)
}

pub(super) fn build_service_with_policy(
    policy: LinkPolicy,
) -> (
    SubmissionService<QuestionStore, AnswerStore>,
    Arc<QuestionStore>,
    Arc<AnswerStore>,
) {
    let questions = Arc::new(QuestionStore::in_memory());
    let answers = Arc::new(AnswerStore::in_memory());
    let service =
        SubmissionService::with_filter(default_filter(), questions.clone(), answers.clone(), policy);
    (service, questions, answers)
}

pub(super) fn board_router_with_service(
    service: SubmissionService<QuestionStore, AnswerStore>,
) -> axum::Router {
    board_router(Arc::new(service))
}

pub(super) struct UnavailableQuestions;

#[async_trait]
impl QuestionRepository for UnavailableQuestions {
    async fn insert(&self, _question: NewQuestion) -> Result<Question, StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }
}

pub(super) struct UnavailableAnswers;

#[async_trait]
impl AnswerRepository for UnavailableAnswers {
    async fn insert(&self, _answer: NewAnswer) -> Result<Answer, StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }

    async fn list_by_question(
        &self,
        _question_id: &QuestionId,
    ) -> Result<Vec<Answer>, StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
