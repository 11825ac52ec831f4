use metrics_exporter_prometheus::PrometheusHandle;
use qa_board::accounts::{AccountService, CredentialJournal};
use qa_board::board::{AnswerStore, QuestionStore, SubmissionService};
use qa_board::config::{ModerationConfig, StorageBackend, StorageConfig};
use qa_board::error::AppError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type BoardService = SubmissionService<QuestionStore, AnswerStore>;

/// Services shared by every request handler.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) board: Arc<BoardService>,
    pub(crate) accounts: Arc<AccountService<CredentialJournal>>,
}

impl Services {
    pub(crate) async fn build(
        storage: &StorageConfig,
        moderation: &ModerationConfig,
    ) -> Result<Self, AppError> {
        let (questions, answers, credentials) = match storage.backend {
            StorageBackend::Memory => (
                QuestionStore::in_memory(),
                AnswerStore::in_memory(),
                CredentialJournal::in_memory(),
            ),
            StorageBackend::File => (
                QuestionStore::open(storage.questions_path()).await?,
                AnswerStore::open(storage.answers_path()).await?,
                CredentialJournal::open(storage.users_path()).await?,
            ),
        };

        let (question_count, answer_count) = (questions.count().await, answers.count().await);
        info!(
            backend = ?storage.backend,
            data_dir = %storage.data_dir.display(),
            questions = question_count,
            answers = answer_count,
            "record stores ready"
        );

        let board = SubmissionService::new(Arc::new(questions), Arc::new(answers), moderation)?;
        let accounts = AccountService::new(Arc::new(credentials));

        Ok(Self {
            board: Arc::new(board),
            accounts: Arc::new(accounts),
        })
    }

    pub(crate) async fn in_memory(moderation: &ModerationConfig) -> Result<Self, AppError> {
        let storage = StorageConfig {
            backend: StorageBackend::Memory,
            data_dir: Default::default(),
        };
        Self::build(&storage, moderation).await
    }
}
