use crate::infra::Services;
use clap::Args;
use qa_board::accounts::{LoginRequest, RegistrationRequest};
use qa_board::board::{
    AnswerSubmission, Classification, ContentFilter, Poll, QuestionSubmission,
};
use qa_board::config::{AppConfig, ModerationConfig};
use qa_board::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Text to check against the denylist
    pub(crate) text: String,
}

pub(crate) fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let filter = ContentFilter::from_config(&config.moderation)?;

    match filter.classify(&args.text) {
        Classification::Accepted => println!("accepted"),
        Classification::Rejected { term } => println!("rejected (matched \"{term}\")"),
    }

    Ok(())
}

pub(crate) async fn run_demo() -> Result<(), AppError> {
    let services = Services::in_memory(&ModerationConfig::default()).await?;
    let board = &services.board;

    println!("Q&A board demo (in-memory stores)");
    println!("Denylist: {} terms", board.filter().terms().len());

    let question = match board
        .submit_question(QuestionSubmission {
            text: "What is the capital of France?".to_string(),
            level: "easy".to_string(),
            poll: None,
            username: "alice".to_string(),
        })
        .await
    {
        Ok(question) => question,
        Err(err) => {
            println!("  Question rejected: {err}");
            return Ok(());
        }
    };
    println!("\n- Stored question {} by {}", question.id, question.username);
    println!("  \"{}\" ({})", question.text, question.level);

    let poll = board
        .submit_question(QuestionSubmission {
            text: "Which season do you prefer?".to_string(),
            level: "casual".to_string(),
            poll: Some(Poll::Options(vec![
                "spring".to_string(),
                "autumn".to_string(),
            ])),
            username: "carol".to_string(),
        })
        .await;
    match poll {
        Ok(question) => println!("- Stored poll question {}", question.id),
        Err(err) => println!("- Poll question rejected: {err}"),
    }

    match board
        .submit_question(QuestionSubmission {
            text: "what the hell is this".to_string(),
            level: "easy".to_string(),
            poll: None,
            username: "mallory".to_string(),
        })
        .await
    {
        Ok(question) => println!("- Unexpectedly stored {}", question.id),
        Err(err) => println!("- Profane question refused: {err}"),
    }

    for (text, username) in [("Paris", "bob"), ("Paris, on the Seine", "dave")] {
        let submission = AnswerSubmission {
            question_id: question.id.0.clone(),
            answer_text: text.to_string(),
            username: username.to_string(),
        };
        match board.submit_answer(submission).await {
            Ok(answer) => println!("- Stored answer {} by {}", answer.id, answer.username),
            Err(err) => println!("- Answer refused: {err}"),
        }
    }

    match board.list_questions().await {
        Ok(questions) => {
            println!("\nQuestions, newest first");
            for question in questions {
                println!("  - [{}] {}", question.created_at.to_rfc3339(), question.text);
            }
        }
        Err(err) => println!("\nQuestion listing unavailable: {err}"),
    }

    match board.list_answers(&question.id).await {
        Ok(answers) => {
            println!("Answers to \"{}\"", question.text);
            for answer in answers {
                println!("  - {}: {}", answer.username, answer.answer_text);
            }
        }
        Err(err) => println!("Answer listing unavailable: {err}"),
    }

    let accounts = &services.accounts;
    let registration = RegistrationRequest {
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        password: "correct horse".to_string(),
    };
    match accounts.register(registration.clone()).await {
        Ok(()) => println!("\n- Registered alice"),
        Err(err) => println!("\n- Registration failed: {err}"),
    }
    if let Err(err) = accounts.register(registration).await {
        println!("- Second registration refused: {err}");
    }
    for password in ["correct horse", "battery staple"] {
        let outcome = accounts
            .login(LoginRequest {
                username: "alice".to_string(),
                password: password.to_string(),
            })
            .await;
        match outcome {
            Ok(()) => println!("- Login with \"{password}\" succeeded"),
            Err(err) => println!("- Login with \"{password}\" failed: {err}"),
        }
    }

    Ok(())
}
