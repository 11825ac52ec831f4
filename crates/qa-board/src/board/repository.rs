use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{Answer, AnswerId, NewAnswer, NewQuestion, Question, QuestionId};
use crate::storage::{Journal, StorageError};

/// Question persistence. Implementations assign `id` and `createdAt` on insert.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert(&self, question: NewQuestion) -> Result<Question, StorageError>;
    /// Every question, newest `createdAt` first.
    async fn list_all(&self) -> Result<Vec<Question>, StorageError>;
}

/// Answer persistence, scoped by the owning question id.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn insert(&self, answer: NewAnswer) -> Result<Answer, StorageError>;
    /// Answers carrying `question_id`, in insertion order.
    async fn list_by_question(&self, question_id: &QuestionId)
        -> Result<Vec<Answer>, StorageError>;
}

/// Journal-backed question store, in memory or on disk.
#[derive(Clone)]
pub struct QuestionStore {
    journal: Journal<Question>,
}

impl QuestionStore {
    pub fn in_memory() -> Self {
        Self::from_journal(Journal::in_memory())
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::from_journal(Journal::open(path).await?))
    }

    pub(crate) fn from_journal(journal: Journal<Question>) -> Self {
        Self { journal }
    }

    pub async fn count(&self) -> usize {
        self.journal.len().await
    }
}

#[async_trait]
impl QuestionRepository for QuestionStore {
    async fn insert(&self, question: NewQuestion) -> Result<Question, StorageError> {
        let record = question.stamp(QuestionId::generate(), Utc::now());
        self.journal.append(record).await
    }

    async fn list_all(&self) -> Result<Vec<Question>, StorageError> {
        let mut questions = self.journal.snapshot().await;
        // Reverse first so the stable sort puts later inserts ahead on equal timestamps.
        questions.reverse();
        questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(questions)
    }
}

/// Journal-backed answer store, in memory or on disk.
#[derive(Clone)]
pub struct AnswerStore {
    journal: Journal<Answer>,
}

impl AnswerStore {
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

    pub async fn count(&self) -> usize {
        self.journal.len().await
    }
}

#[async_trait]
impl AnswerRepository for AnswerStore {
    async fn insert(&self, answer: NewAnswer) -> Result<Answer, StorageError> {
        let record = answer.stamp(AnswerId::generate(), Utc::now());
        self.journal.append(record).await
    }

    async fn list_by_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, StorageError> {
        Ok(self
            .journal
            .select(|answer| &answer.question_id == question_id)
            .await)
    }
}
