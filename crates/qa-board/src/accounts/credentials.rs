use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::storage::{Journal, StorageError};

/// Stored login record. The password itself is never kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub salt: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(username: String, email: Option<String>, password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let password_digest = digest(&salt, password);
        Self {
            username,
            email,
            salt,
            password_digest,
            created_at: Utc::now(),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.password_digest
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Opaque user store consumed by registration and login.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StorageError>;
    /// Returns `false` without writing when the username is already taken.
    async fn insert_if_absent(&self, credential: Credential) -> Result<bool, StorageError>;
}

#[derive(Clone)]
pub struct CredentialJournal {
    journal: Journal<Credential>,
}

impl CredentialJournal {
    pub fn in_memory() -> Self {
        Self {
            journal: Journal::in_memory(),
        }
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self {
            journal: Journal::open(path).await?,
        })
    }
}

#[async_trait]
impl CredentialStore for CredentialJournal {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StorageError> {
        Ok(self
            .journal
            .find(|credential| credential.username == username)
            .await)
    }

    async fn insert_if_absent(&self, credential: Credential) -> Result<bool, StorageError> {
        let username = credential.username.clone();
        let inserted = self
            .journal
            .append_unless(credential, move |existing| existing.username == username)
            .await?;
        Ok(inserted.is_some())
    }
}
