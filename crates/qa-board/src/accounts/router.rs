use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::credentials::CredentialStore;
use super::service::{AccountError, AccountService, LoginRequest, RegistrationRequest};

/// Router builder exposing registration and login.
pub fn accounts_router<C>(service: Arc<AccountService<C>>) -> Router
where
    C: CredentialStore + 'static,
{
    Router::new()
        .route("/api/register", post(register_handler::<C>))
        .route("/api/login", post(login_handler::<C>))
        .with_state(service)
}

pub(crate) async fn register_handler<C>(
    State(service): State<Arc<AccountService<C>>>,
    Json(request): Json<RegistrationRequest>,
) -> Response
where
    C: CredentialStore + 'static,
{
    match service.register(request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Registered successfully" })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn login_handler<C>(
    State(service): State<Arc<AccountService<C>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    C: CredentialStore + 'static,
{
    match service.login(request).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Login successful" }))).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AccountError) -> Response {
    let status = match err {
        AccountError::MissingField(_) | AccountError::UsernameTaken => StatusCode::BAD_REQUEST,
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match err {
        AccountError::Storage(_) => "Database error".to_string(),
        other => other.to_string(),
    };

    (status, Json(json!({ "error": message }))).into_response()
}
