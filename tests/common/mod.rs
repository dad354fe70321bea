#![allow(dead_code)]

use quiz_backend::config::Config;
use quiz_backend::models::ids::{ChoiceId, QuestionId, TestId, UserId};
use quiz_backend::services::account_service::AccountService;
use quiz_backend::services::catalog_service::{CatalogService, NewQuestion, NewTest};
use quiz_backend::services::session_service::SessionState;
use quiz_backend::AppState;

pub async fn setup() -> AppState {
    AppState::initialize(Config::in_memory("test_secret_key"))
        .await
        .expect("init state")
}

pub async fn setup_seeded() -> AppState {
    let mut config = Config::in_memory("test_secret_key");
    config.seed_catalog = true;
    AppState::initialize(config).await.expect("init state")
}

/// A question id with its right and one wrong choice.
#[derive(Debug, Clone, Copy)]
pub struct SampleQuestion {
    pub id: QuestionId,
    pub correct: ChoiceId,
    pub wrong: ChoiceId,
}

pub async fn create_sample_test(state: &AppState, title: &str, questions: usize) -> TestId {
    let catalog = CatalogService::new(state.pool.clone());
    let new_test = NewTest {
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        questions: (1..=questions)
            .map(|n| {
                NewQuestion::new(
                    &format!("{} question {}", title, n),
                    &[("right", true), ("wrong", false), ("also wrong", false)],
                )
            })
            .collect(),
    };
    catalog.create_test(&new_test).await.expect("create test")
}

pub async fn sample_questions(state: &AppState, test_id: TestId) -> Vec<SampleQuestion> {
    let definition = CatalogService::new(state.pool.clone())
        .load_definition(test_id)
        .await
        .expect("definition");
    definition
        .questions
        .iter()
        .map(|q| SampleQuestion {
            id: q.question.id,
            correct: q.choices.iter().find(|c| c.is_correct).expect("correct").id,
            wrong: q.choices.iter().find(|c| !c.is_correct).expect("wrong").id,
        })
        .collect()
}

pub async fn register(state: &AppState, email: &str) -> UserId {
    AccountService::new(state.pool.clone())
        .register(email, "secret1", "Test User")
        .await
        .expect("register")
}

pub async fn signed_in(state: &AppState, user_id: UserId) -> (String, SessionState) {
    let issued = state.session_service.issue(user_id).await.expect("issue");
    let session = state.session_service.resolve(Some(&issued.token));
    (issued.token, session)
}

pub async fn subscribed_user(state: &AppState, email: &str) -> UserId {
    let user_id = register(state, email).await;
    AccountService::new(state.pool.clone())
        .activate_subscription(user_id, "mensual")
        .await
        .expect("subscribe");
    user_id
}
