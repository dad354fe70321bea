mod common;

use quiz_backend::error::Error;
use quiz_backend::models::ids::TestId;
use quiz_backend::services::attempt_service::AttemptService;
use quiz_backend::services::grading_service::Responses;
use quiz_backend::services::result_service::ResultService;

#[tokio::test]
async fn take_view_hides_correct_answers() {
    let state = common::setup().await;
    let test_id = common::create_sample_test(&state, "Hidden", 2).await;
    let attempts = AttemptService::new(state.pool.clone());

    let view = attempts.load_test_for_taking(test_id).await.unwrap();
    assert_eq!(view.test.id, test_id);
    assert_eq!(view.questions.len(), 2);
    assert!(view.questions.iter().all(|q| q.choices.len() == 3));

    let json = serde_json::to_string(&view).unwrap();
    assert!(!json.contains("is_correct"));
}

#[tokio::test]
async fn all_correct_submission_scores_full_marks() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "full@example.com").await;
    let test_id = common::create_sample_test(&state, "Full", 3).await;
    let questions = common::sample_questions(&state, test_id).await;
    let attempts = AttemptService::new(state.pool.clone());

    let responses: Responses = questions.iter().map(|q| (q.id, Some(q.correct))).collect();
    let submitted = attempts.submit(user_id, test_id, &responses).await.unwrap();
    assert_eq!(submitted.score, 3);
    assert_eq!(submitted.total_questions, 3);

    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answer WHERE result_id = ?")
        .bind(submitted.result_id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(answers, 3);
}

#[tokio::test]
async fn empty_submission_records_every_question_unanswered() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "blank@example.com").await;
    let test_id = common::create_sample_test(&state, "Blank", 4).await;
    let attempts = AttemptService::new(state.pool.clone());

    let submitted = attempts
        .submit(user_id, test_id, &Responses::new())
        .await
        .unwrap();
    assert_eq!(submitted.score, 0);
    assert_eq!(submitted.total_questions, 4);

    let blanks: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM answer WHERE result_id = ? AND selected_choice_id IS NULL",
    )
    .bind(submitted.result_id)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(blanks, 4);
}

#[tokio::test]
async fn mixed_submission_counts_only_right_choices() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "mixed@example.com").await;
    let test_id = common::create_sample_test(&state, "Mixed", 3).await;
    let q = common::sample_questions(&state, test_id).await;
    let attempts = AttemptService::new(state.pool.clone());

    let responses: Responses = [
        (q[0].id, Some(q[0].correct)),
        (q[1].id, Some(q[1].wrong)),
        (q[2].id, None),
    ]
    .into_iter()
    .collect();
    let submitted = attempts.submit(user_id, test_id, &responses).await.unwrap();
    assert_eq!(submitted.score, 1);
    assert_eq!(submitted.total_questions, 3);
}

#[tokio::test]
async fn choice_from_another_question_is_not_credited() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "foreign@example.com").await;
    let test_id = common::create_sample_test(&state, "Foreign", 2).await;
    let q = common::sample_questions(&state, test_id).await;
    let attempts = AttemptService::new(state.pool.clone());

    // Right answer of question two sent for question one.
    let responses: Responses = [(q[0].id, Some(q[1].correct))].into_iter().collect();
    let submitted = attempts.submit(user_id, test_id, &responses).await.unwrap();
    assert_eq!(submitted.score, 0);

    let stored: Option<i64> = sqlx::query_scalar(
        "SELECT selected_choice_id FROM answer WHERE result_id = ? AND question_id = ?",
    )
    .bind(submitted.result_id)
    .bind(q[0].id)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(stored, None);
}

#[tokio::test]
async fn retakes_create_separate_results() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "again@example.com").await;
    let test_id = common::create_sample_test(&state, "Again", 2).await;
    let attempts = AttemptService::new(state.pool.clone());

    let q = common::sample_questions(&state, test_id).await;
    let all_right: Responses = q.iter().map(|q| (q.id, Some(q.correct))).collect();

    let first = attempts.submit(user_id, test_id, &Responses::new()).await.unwrap();
    let second = attempts.submit(user_id, test_id, &all_right).await.unwrap();
    assert_ne!(first.result_id, second.result_id);

    let results = ResultService::new(state.pool.clone());
    let first_view = results.load_result(user_id, test_id, first.result_id).await.unwrap();
    let second_view = results.load_result(user_id, test_id, second.result_id).await.unwrap();
    assert_eq!(first_view.score, 0);
    assert_eq!(second_view.score, 2);
    assert!(first_view.questions.iter().all(|r| r.selected.is_none()));
    assert!(second_view.questions.iter().all(|r| r.selected.is_some()));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM result WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn unknown_test_is_not_found() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "lost@example.com").await;
    let attempts = AttemptService::new(state.pool.clone());

    assert!(matches!(
        attempts.load_test_for_taking(TestId(999)).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        attempts.submit(user_id, TestId(999), &Responses::new()).await,
        Err(Error::NotFound(_))
    ));

    let results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM result")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(results, 0);
}

#[tokio::test]
async fn recent_results_are_newest_first_and_limited() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "recent@example.com").await;
    let other_id = common::subscribed_user(&state, "other@example.com").await;
    let test_id = common::create_sample_test(&state, "Recent", 1).await;
    let attempts = AttemptService::new(state.pool.clone());

    let mut submitted = Vec::new();
    for _ in 0..7 {
        let s = attempts.submit(user_id, test_id, &Responses::new()).await.unwrap();
        submitted.push(s.result_id);
    }
    attempts.submit(other_id, test_id, &Responses::new()).await.unwrap();

    let recent = attempts.recent_results(user_id, 5).await.unwrap();
    let ids: Vec<_> = recent.iter().map(|r| r.id).collect();
    let expected: Vec<_> = submitted.iter().rev().take(5).copied().collect();
    assert_eq!(ids, expected);
    assert!(recent.iter().all(|r| r.title == "Recent"));
    assert!(recent.iter().all(|r| !r.formatted_date.is_empty()));

    assert!(attempts
        .recent_results(common::register(&state, "none@example.com").await, 5)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn failed_answer_insert_rolls_back_the_result() {
    let state = common::setup().await;
    let user_id = common::subscribed_user(&state, "rollback@example.com").await;
    let test_id = common::create_sample_test(&state, "Rollback", 3).await;
    let q = common::sample_questions(&state, test_id).await;
    let attempts = AttemptService::new(state.pool.clone());

    // Let the first answer through, then fail the rest of the batch.
    sqlx::query(
        r#"
        CREATE TRIGGER answer_store_full BEFORE INSERT ON answer
        WHEN (SELECT COUNT(*) FROM answer) >= 1
        BEGIN
            SELECT RAISE(ABORT, 'answer store full');
        END
        "#,
    )
    .execute(&state.pool)
    .await
    .unwrap();

    let responses: Responses = q.iter().map(|q| (q.id, Some(q.correct))).collect();
    let result = attempts.submit(user_id, test_id, &responses).await;
    assert!(matches!(result, Err(Error::Database(_))));

    let results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM result")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answer")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(results, 0);
    assert_eq!(answers, 0);
    assert!(attempts.recent_results(user_id, 5).await.unwrap().is_empty());
}
