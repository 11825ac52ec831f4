use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for stored questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for stored answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(pub String);

impl AnswerId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Poll attached to a question, kept exactly as the author sent it.
///
/// A plain list of strings decodes as [`Poll::Options`]. Any other present JSON value is
/// stored untouched as [`Poll::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Poll {
    Options(Vec<String>),
    Other(serde_json::Value),
}

impl Poll {
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Options(options) => Some(options),
            Self::Other(_) => None,
        }
    }
}

/// Stored question record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub level: String,
    pub poll: Option<Poll>,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Stored answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub answer_text: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Validated question content handed to a question store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub text: String,
    pub level: String,
    pub poll: Option<Poll>,
    pub username: String,
}

impl NewQuestion {
    pub(crate) fn stamp(self, id: QuestionId, created_at: DateTime<Utc>) -> Question {
        Question {
            id,
            text: self.text,
            level: self.level,
            poll: self.poll,
            username: self.username,
            created_at,
        }
    }
}

/// Validated answer content handed to an answer store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: QuestionId,
    pub answer_text: String,
    pub username: String,
}

impl NewAnswer {
    pub(crate) fn stamp(self, id: AnswerId, created_at: DateTime<Utc>) -> Answer {
        Answer {
            id,
            question_id: self.question_id,
            answer_text: self.answer_text,
            username: self.username,
            created_at,
        }
    }
}

/// Inbound question payload. Missing fields decode as empty and fail validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionSubmission {
    pub text: String,
    pub level: String,
    pub poll: Option<Poll>,
    pub username: String,
}

impl QuestionSubmission {
    pub fn validate(self) -> Result<NewQuestion, ValidationError> {
        require(SubmissionField::QuestionText, &self.text)?;
        require(SubmissionField::Level, &self.level)?;
        require(SubmissionField::Username, &self.username)?;

        Ok(NewQuestion {
            text: self.text,
            level: self.level,
            poll: self.poll,
            username: self.username,
        })
    }
}

/// Inbound answer payload. `questionId` is taken verbatim, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: String,
    pub answer_text: String,
    pub username: String,
}

impl AnswerSubmission {
    pub fn validate(self) -> Result<NewAnswer, ValidationError> {
        require(SubmissionField::AnswerText, &self.answer_text)?;
        require(SubmissionField::Username, &self.username)?;

        Ok(NewAnswer {
            question_id: QuestionId(self.question_id),
            answer_text: self.answer_text,
            username: self.username,
        })
    }
}

fn require(field: SubmissionField, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Submission fields that can fail validation or screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionField {
    QuestionText,
    Level,
    AnswerText,
    Username,
}

impl SubmissionField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::QuestionText => "text",
            Self::Level => "level",
            Self::AnswerText => "answerText",
            Self::Username => "username",
        }
    }

    /// Human wording used in rejection messages.
    pub const fn noun(self) -> &'static str {
        match self {
            Self::QuestionText => "question",
            Self::Level => "level",
            Self::AnswerText => "answer",
            Self::Username => "username",
        }
    }
}

/// Malformed submission detected before screening.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {}", .0.label())]
    MissingField(SubmissionField),
}
