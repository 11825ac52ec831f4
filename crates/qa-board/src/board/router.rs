use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AnswerSubmission, QuestionId, QuestionSubmission};
use super::repository::{AnswerRepository, QuestionRepository};
use super::service::{SubmissionError, SubmissionService};

/// Router builder exposing question and answer endpoints.
///
/// Answers are listed by path (`/api/answers/:question_id`) or by query
/// (`/api/answers?questionId=`). Only the query form can name the empty question id, which
/// answers may carry since their link is stored verbatim.
pub fn board_router<Q, A>(service: Arc<SubmissionService<Q, A>>) -> Router
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    Router::new()
        .route("/api/question", post(submit_question_handler::<Q, A>))
        .route("/api/answer", post(submit_answer_handler::<Q, A>))
        .route("/api/questions", get(list_questions_handler::<Q, A>))
        .route("/api/answers", get(list_answers_by_query_handler::<Q, A>))
        .route(
            "/api/answers/:question_id",
            get(list_answers_handler::<Q, A>),
        )
        .with_state(service)
}

pub(crate) async fn submit_question_handler<Q, A>(
    State(service): State<Arc<SubmissionService<Q, A>>>,
    Json(submission): Json<QuestionSubmission>,
) -> Response
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    match service.submit_question(submission).await {
        Ok(question) => (StatusCode::OK, Json(question)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_answer_handler<Q, A>(
    State(service): State<Arc<SubmissionService<Q, A>>>,
    Json(submission): Json<AnswerSubmission>,
) -> Response
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    match service.submit_answer(submission).await {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_questions_handler<Q, A>(
    State(service): State<Arc<SubmissionService<Q, A>>>,
) -> Response
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    match service.list_questions().await {
        Ok(questions) => (StatusCode::OK, Json(questions)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_answers_handler<Q, A>(
    State(service): State<Arc<SubmissionService<Q, A>>>,
    Path(question_id): Path<String>,
) -> Response
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    match service.list_answers(&QuestionId(question_id)).await {
        Ok(answers) => (StatusCode::OK, Json(answers)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AnswersQuery {
    question_id: String,
}

pub(crate) async fn list_answers_by_query_handler<Q, A>(
    State(service): State<Arc<SubmissionService<Q, A>>>,
    Query(query): Query<AnswersQuery>,
) -> Response
where
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
{
    match service.list_answers(&QuestionId(query.question_id)).await {
        Ok(answers) => (StatusCode::OK, Json(answers)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: SubmissionError) -> Response {
    let (status, message) = match &err {
        SubmissionError::ContentRejected { field } => (
            StatusCode::BAD_REQUEST,
            format!("Inappropriate content in {}", field.noun()),
        ),
        SubmissionError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
        SubmissionError::UnknownQuestion(_) => (StatusCode::NOT_FOUND, err.to_string()),
        SubmissionError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error".to_string(),
        ),
    };

    (status, Json(json!({ "error": message }))).into_response()
}
