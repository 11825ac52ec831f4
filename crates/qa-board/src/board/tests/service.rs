use super::common::*;
use crate::board::domain::{NewQuestion, Poll, QuestionId, SubmissionField, ValidationError};
use crate::board::repository::{AnswerRepository, AnswerStore, QuestionRepository, QuestionStore};
use crate::board::service::{LinkPolicy, SubmissionError, SubmissionService};
use crate::storage::{Journal, StorageError};
use chrono::{Duration, Utc};
use std::sync::Arc;

#[tokio::test]
async fn accepted_question_is_stored_verbatim_with_id_and_timestamp() {
    let (service, questions, _) = build_service();

    let stored = service
        .submit_question(question("What is the capital of France?"))
        .await
        .expect("clean question is accepted");

    assert_eq!(stored.text, "What is the capital of France?");
    assert_eq!(stored.level, "easy");
    assert_eq!(stored.username, "alice");
    assert!(stored.poll.is_none());
    assert!(!stored.id.0.is_empty());

    let listed = questions.list_all().await.expect("listing succeeds");
    assert_eq!(listed.first(), Some(&stored));
}

#[tokio::test]
async fn rejected_question_never_reaches_the_store() {
    let (service, questions, _) = build_service();
    service
        .submit_question(question("What is the capital of France?"))
        .await
        .expect("clean question is accepted");

    match service.submit_question(question("shit question")).await {
        Err(SubmissionError::ContentRejected {
            field: SubmissionField::QuestionText,
        }) => {}
        other => panic!("expected content rejection, got {other:?}"),
    }

    assert_eq!(questions.count().await, 1);
}

#[tokio::test]
async fn poll_is_kept_as_submitted() {
    let (service, _, _) = build_service();
    let mut submission = question("Best season?");
    submission.poll = Some(Poll::Options(vec![
        "summer".to_string(),
        "winter".to_string(),
    ]));

    let stored = service
        .submit_question(submission)
        .await
        .expect("poll question stored");
    assert_eq!(
        stored.poll.as_ref().and_then(Poll::options),
        Some(&["summer".to_string(), "winter".to_string()][..])
    );
}

#[tokio::test]
async fn missing_fields_fail_validation_before_screening() {
    let (service, questions, answers) = build_service();

    let mut no_level = question("damn, no level");
    no_level.level.clear();
    match service.submit_question(no_level).await {
        Err(SubmissionError::Validation(ValidationError::MissingField(SubmissionField::Level))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }

    let mut no_author = answer(&QuestionId("q".to_string()), "Paris");
    no_author.username = " ".to_string();
    match service.submit_answer(no_author).await {
        Err(SubmissionError::Validation(ValidationError::MissingField(
            SubmissionField::Username,
        ))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(questions.count().await, 0);
    assert_eq!(answers.count().await, 0);
}

#[tokio::test]
async fn newer_questions_are_listed_first() {
    let (service, _, _) = build_service();
    let first = service
        .submit_question(question("First?"))
        .await
        .expect("first stored");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = service
        .submit_question(question("Second?"))
        .await
        .expect("second stored");

    let listed = service.list_questions().await.expect("listing succeeds");
    let ids: Vec<_> = listed.iter().map(|q| q.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(listed[0].created_at >= listed[1].created_at);
}

#[tokio::test]
async fn rapid_inserts_list_later_inserts_first() {
    let (service, _, _) = build_service();
    for n in 0..20 {
        service
            .submit_question(question(&format!("Question {n}?")))
            .await
            .expect("stored");
    }

    let listed = service.list_questions().await.expect("listing succeeds");
    let texts: Vec<&str> = listed.iter().map(|q| q.text.as_str()).collect();
    let expected: Vec<String> = (0..20).rev().map(|n| format!("Question {n}?")).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn equal_timestamps_list_later_inserts_first() {
    let created_at = Utc::now();
    let stamped = |text: &str, offset_secs: i64| {
        NewQuestion {
            text: text.to_string(),
            level: "easy".to_string(),
            poll: None,
            username: "alice".to_string(),
        }
        .stamp(
            QuestionId::generate(),
            created_at + Duration::seconds(offset_secs),
        )
    };

    let journal = Journal::in_memory();
    for question in [
        stamped("newest", 1),
        stamped("tie first", 0),
        stamped("tie second", 0),
        stamped("tie third", 0),
        stamped("oldest", -1),
    ] {
        journal.append(question).await.expect("append succeeds");
    }

    let listed = QuestionStore::from_journal(journal)
        .list_all()
        .await
        .expect("listing succeeds");
    let texts: Vec<&str> = listed.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["newest", "tie third", "tie second", "tie first", "oldest"]
    );
}

#[tokio::test]
async fn answers_are_scoped_to_their_question() {
    let (service, _, _) = build_service();
    let france = service
        .submit_question(question("What is the capital of France?"))
        .await
        .expect("stored");
    let spain = service
        .submit_question(question("What is the capital of Spain?"))
        .await
        .expect("stored");

    let paris = service
        .submit_answer(answer(&france.id, "Paris"))
        .await
        .expect("answer stored");
    service
        .submit_answer(answer(&spain.id, "Madrid"))
        .await
        .expect("answer stored");

    let listed = service.list_answers(&france.id).await.expect("listing");
    assert_eq!(listed, vec![paris]);
    assert_eq!(listed[0].answer_text, "Paris");
    assert_eq!(listed[0].username, "bob");
}

#[tokio::test]
async fn answers_keep_insertion_order() {
    let (service, _, _) = build_service();
    let id = QuestionId("q-ordering".to_string());
    for text in ["one", "two", "three"] {
        service
            .submit_answer(answer(&id, text))
            .await
            .expect("answer stored");
    }

    let texts: Vec<String> = service
        .list_answers(&id)
        .await
        .expect("listing")
        .into_iter()
        .map(|a| a.answer_text)
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn profane_answer_is_rejected_with_answer_field() {
    let (service, _, answers) = build_service();
    let id = QuestionId("q-1".to_string());

    match service.submit_answer(answer(&id, "go to hell")).await {
        Err(SubmissionError::ContentRejected {
            field: SubmissionField::AnswerText,
        }) => {}
        other => panic!("expected content rejection, got {other:?}"),
    }
    assert!(answers.list_by_question(&id).await.expect("listing").is_empty());
}

#[tokio::test]
async fn unchecked_policy_accepts_dangling_question_ids() {
    let (service, _, _) = build_service();
    let dangling = QuestionId(String::new());

    let stored = service
        .submit_answer(answer(&dangling, "orphan"))
        .await
        .expect("dangling answer accepted");
    assert_eq!(stored.question_id, dangling);
}

#[tokio::test]
async fn require_existing_policy_rejects_unknown_questions() {
    let (service, _, answers) = build_service_with_policy(LinkPolicy::RequireExisting);
    let missing = QuestionId("missing".to_string());

    match service.submit_answer(answer(&missing, "Paris")).await {
        Err(SubmissionError::UnknownQuestion(id)) => assert_eq!(id, missing),
        other => panic!("expected unknown question, got {other:?}"),
    }
    assert_eq!(answers.count().await, 0);

    let stored = service
        .submit_question(question("What is the capital of France?"))
        .await
        .expect("question stored");
    service
        .submit_answer(answer(&stored.id, "Paris"))
        .await
        .expect("linked answer accepted");
}

#[tokio::test]
async fn storage_failures_propagate_without_fabricated_records() {
    let service = SubmissionService::with_filter(
        default_filter(),
        Arc::new(UnavailableQuestions),
        Arc::new(UnavailableAnswers),
        LinkPolicy::Unchecked,
    );

    match service.submit_question(question("Is the disk up?")).await {
        Err(SubmissionError::Storage(StorageError::Unavailable(_))) => {}
        other => panic!("expected storage error, got {other:?}"),
    }
    match service
        .submit_answer(answer(&QuestionId("q".to_string()), "no"))
        .await
    {
        Err(SubmissionError::Storage(StorageError::Unavailable(_))) => {}
        other => panic!("expected storage error, got {other:?}"),
    }
    assert!(matches!(
        service.list_questions().await,
        Err(SubmissionError::Storage(_))
    ));
}

#[tokio::test]
async fn content_rejection_wins_over_storage_failure() {
    let service = SubmissionService::with_filter(
        default_filter(),
        Arc::new(UnavailableQuestions),
        Arc::new(AnswerStore::in_memory()),
        LinkPolicy::Unchecked,
    );

    assert!(matches!(
        service.submit_question(question("crap question")).await,
        Err(SubmissionError::ContentRejected { .. })
    ));
}

#[tokio::test]
async fn config_driven_constructor_applies_moderation_settings() {
    let config = crate::config::ModerationConfig {
        extra_terms: vec!["spoiler".to_string()],
        allowed_terms: Vec::new(),
        require_existing_question: true,
    };
    let service = SubmissionService::new(
        Arc::new(QuestionStore::in_memory()),
        Arc::new(AnswerStore::in_memory()),
        &config,
    )
    .expect("service builds");

    assert!(matches!(
        service.submit_question(question("a spoiler inside")).await,
        Err(SubmissionError::ContentRejected { .. })
    ));
    assert!(matches!(
        service
            .submit_answer(answer(&QuestionId("nope".to_string()), "fine"))
            .await,
        Err(SubmissionError::UnknownQuestion(_))
    ));
}
