use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ids::{ResultId, TestId, UserId};
use crate::models::question::{PublicChoice, PublicQuestion};
use crate::models::test::Test;
use crate::models::test_attempt::RecentResult;
use crate::services::catalog_service::CatalogService;
use crate::services::grading_service::{GradingService, Responses};
use crate::utils::time;

/// What a test taker sees: prompts and choice labels, never which choice is right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeTestView {
    pub test: Test,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAttempt {
    pub result_id: ResultId,
    pub test_id: TestId,
    pub score: i64,
    pub total_questions: i64,
}

#[derive(Clone)]
pub struct AttemptService {
    pool: SqlitePool,
    catalog: CatalogService,
}

impl AttemptService {
    pub fn new(pool: SqlitePool) -> Self {
        let catalog = CatalogService::new(pool.clone());
        Self { pool, catalog }
    }

    pub async fn list_tests(&self) -> Result<Vec<Test>> {
        self.catalog.list_tests().await
    }

    pub async fn load_test_for_taking(&self, test_id: TestId) -> Result<TakeTestView> {
        let definition = self.catalog.load_definition(test_id).await?;
        let questions = definition
            .questions
            .iter()
            .map(|entry| PublicQuestion {
                id: entry.question.id,
                prompt: entry.question.prompt.clone(),
                choices: entry.choices.iter().map(PublicChoice::from).collect(),
            })
            .collect();

        Ok(TakeTestView {
            test: definition.test,
            questions,
        })
    }

    /// Scores the responses and stores the result with one answer per question,
    /// all in one transaction.
    pub async fn submit(
        &self,
        user_id: UserId,
        test_id: TestId,
        responses: &Responses,
    ) -> Result<SubmittedAttempt> {
        let definition = self.catalog.load_definition(test_id).await?;
        let graded = GradingService::grade(&definition, responses);

        let mut tx = self.pool.begin().await?;
        let result_id = sqlx::query_scalar::<_, ResultId>(
            r#"
            INSERT INTO result (user_id, test_id, score, total_questions, taken_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(test_id)
        .bind(graded.score)
        .bind(graded.total_questions)
        .bind(time::now())
        .fetch_one(&mut *tx)
        .await?;

        for answer in &graded.answers {
            sqlx::query(
                r#"INSERT INTO answer (result_id, question_id, selected_choice_id) VALUES (?, ?, ?)"#,
            )
            .bind(result_id)
            .bind(answer.question_id)
            .bind(answer.selected_choice_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            test_id = %test_id,
            result_id = %result_id,
            score = graded.score,
            total = graded.total_questions,
            "test submitted"
        );

        Ok(SubmittedAttempt {
            result_id,
            test_id,
            score: graded.score,
            total_questions: graded.total_questions,
        })
    }

    pub async fn recent_results(&self, user_id: UserId, limit: i64) -> Result<Vec<RecentResult>> {
        let mut rows = sqlx::query_as::<_, RecentResult>(
            r#"
            SELECT r.id, r.test_id, t.title, r.score, r.total_questions, r.taken_at
            FROM result r
            JOIN test t ON t.id = r.test_id
            WHERE r.user_id = ?
            ORDER BY r.taken_at DESC, r.id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        for row in &mut rows {
            row.formatted_date = time::format_short(row.taken_at);
        }
        Ok(rows)
    }
}
