//! End-to-end scenarios through the public submission service, including reloads of the
//! file-backed stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qa_board::board::{
    AnswerStore, AnswerSubmission, QuestionId, QuestionRepository, QuestionStore,
    QuestionSubmission, SubmissionError, SubmissionField, SubmissionService,
};
use qa_board::config::ModerationConfig;

fn data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("qa-board-it-{}", uuid::Uuid::new_v4()))
}

fn capital_question() -> QuestionSubmission {
    QuestionSubmission {
        text: "What is the capital of France?".to_string(),
        level: "easy".to_string(),
        poll: None,
        username: "alice".to_string(),
    }
}

async fn open_service(
    dir: &Path,
) -> (
    SubmissionService<QuestionStore, AnswerStore>,
    Arc<QuestionStore>,
) {
    let questions = Arc::new(
        QuestionStore::open(dir.join("questions.db"))
            .await
            .expect("question store opens"),
    );
    let answers = Arc::new(
        AnswerStore::open(dir.join("answers.db"))
            .await
            .expect("answer store opens"),
    );
    let service = SubmissionService::new(questions.clone(), answers, &ModerationConfig::default())
        .expect("service builds");
    (service, questions)
}

#[tokio::test]
async fn capital_of_france_scenario() {
    let dir = data_dir();
    let (service, questions) = open_service(&dir).await;

    let stored = service
        .submit_question(capital_question())
        .await
        .expect("question accepted");
    assert!(!stored.id.0.is_empty());
    assert_eq!(
        questions.list_all().await.expect("listing").first(),
        Some(&stored)
    );

    let mut profane = capital_question();
    profane.text = "fuck question".to_string();
    match service.submit_question(profane).await {
        Err(SubmissionError::ContentRejected {
            field: SubmissionField::QuestionText,
        }) => {}
        other => panic!("expected content rejection, got {other:?}"),
    }
    assert_eq!(questions.list_all().await.expect("listing").len(), 1);

    service
        .submit_answer(AnswerSubmission {
            question_id: stored.id.0.clone(),
            answer_text: "Paris".to_string(),
            username: "bob".to_string(),
        })
        .await
        .expect("answer accepted");

    let answers = service.list_answers(&stored.id).await.expect("listing");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].answer_text, "Paris");
}

#[tokio::test]
async fn records_survive_a_restart() {
    let dir = data_dir();
    let question_id = {
        let (service, _) = open_service(&dir).await;
        let stored = service
            .submit_question(capital_question())
            .await
            .expect("question accepted");
        service
            .submit_answer(AnswerSubmission {
                question_id: stored.id.0.clone(),
                answer_text: "Paris".to_string(),
                username: "bob".to_string(),
            })
            .await
            .expect("answer accepted");
        stored.id
    };

    let (service, _) = open_service(&dir).await;
    let questions = service.list_questions().await.expect("listing");
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].id, question_id);

    let answers = service.list_answers(&question_id).await.expect("listing");
    assert_eq!(answers.len(), 1);
    assert!(service
        .list_answers(&QuestionId("someone-else".to_string()))
        .await
        .expect("listing")
        .is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_are_all_recorded() {
    let dir = data_dir();
    let (service, questions) = open_service(&dir).await;
    let service = Arc::new(service);

    let handles: Vec<_> = (0..32)
        .map(|n| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let mut submission = capital_question();
                submission.text = format!("Question number {n}?");
                service.submit_question(submission).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task joins").expect("question accepted");
    }

    assert_eq!(questions.count().await, 32);
    drop(service);

    let (reloaded, _) = open_service(&dir).await;
    assert_eq!(reloaded.list_questions().await.expect("listing").len(), 32);
}
