use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::credentials::{Credential, CredentialStore};
use crate::storage::StorageError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration and login on top of a [`CredentialStore`].
pub struct AccountService<C> {
    credentials: Arc<C>,
}

impl<C> AccountService<C>
where
    C: CredentialStore + 'static,
{
    pub fn new(credentials: Arc<C>) -> Self {
        Self { credentials }
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<(), AccountError> {
        let RegistrationRequest {
            username,
            email,
            password,
        } = request;

        if username.trim().is_empty() {
            return Err(AccountError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AccountError::MissingField("password"));
        }

        let credential = Credential::new(username, email, &password);
        let username = credential.username.clone();
        if !self.credentials.insert_if_absent(credential).await? {
            return Err(AccountError::UsernameTaken);
        }

        info!(%username, "user registered");
        Ok(())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<(), AccountError> {
        let found = self
            .credentials
            .find_by_username(&request.username)
            .await?;

        match found {
            Some(credential) if credential.verify(&request.password) => {
                info!(username = %credential.username, "login succeeded");
                Ok(())
            }
            _ => {
                warn!(username = %request.username, "login rejected");
                Err(AccountError::InvalidCredentials)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("User already exists")]
    UsernameTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
