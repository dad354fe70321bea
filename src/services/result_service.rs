use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::answer::StoredAnswer;
use crate::models::ids::{ChoiceId, QuestionId, ResultId, TestId, UserId};
use crate::models::test::Test;
use crate::models::test_attempt::TestResult;
use crate::services::catalog_service::CatalogService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedChoice {
    pub id: ChoiceId,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewedQuestion {
    pub question_id: QuestionId,
    pub prompt: String,
    pub selected: Option<SelectedChoice>,
    pub outcome: AnswerOutcome,
    /// Whatever the catalog flags as correct, zero or several included.
    pub correct_labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultView {
    pub result_id: ResultId,
    pub test: Test,
    pub score: i64,
    pub total_questions: i64,
    pub taken_at: DateTime<Utc>,
    pub questions: Vec<ReviewedQuestion>,
}

#[derive(Clone)]
pub struct ResultService {
    pool: SqlitePool,
    catalog: CatalogService,
}

impl ResultService {
    pub fn new(pool: SqlitePool) -> Self {
        let catalog = CatalogService::new(pool.clone());
        Self { pool, catalog }
    }

    pub async fn load_result(
        &self,
        user_id: UserId,
        test_id: TestId,
        result_id: ResultId,
    ) -> Result<ResultView> {
        let result = sqlx::query_as::<_, TestResult>(
            r#"SELECT id, user_id, test_id, score, total_questions, taken_at FROM result WHERE id = ?"#,
        )
        .bind(result_id)
        .fetch_optional(&self.pool)
        .await?
        .filter(|r| r.test_id == test_id)
        .ok_or_else(|| Error::NotFound(format!("Result {}", result_id)))?;

        if result.user_id != user_id {
            tracing::warn!(
                user_id = %user_id,
                result_id = %result_id,
                "attempt to view another user's result"
            );
            return Err(Error::Ownership);
        }

        let definition = self.catalog.load_definition(test_id).await?;

        let answers = sqlx::query_as::<_, StoredAnswer>(
            r#"
            SELECT a.question_id, a.selected_choice_id,
                   c.label AS selected_label, c.is_correct AS selected_is_correct
            FROM answer a
            LEFT JOIN choice c ON c.id = a.selected_choice_id
            WHERE a.result_id = ?
            "#,
        )
        .bind(result_id)
        .fetch_all(&self.pool)
        .await?;
        let answers: HashMap<QuestionId, StoredAnswer> = answers
            .into_iter()
            .map(|a| (a.question_id, a))
            .collect();

        let questions = definition
            .questions
            .iter()
            .map(|entry| {
                let stored = answers.get(&entry.question.id);
                let selected = stored.and_then(|a| match (a.selected_choice_id, &a.selected_label) {
                    (Some(id), Some(label)) => Some(SelectedChoice {
                        id,
                        label: label.clone(),
                    }),
                    _ => None,
                });
                let outcome = match (&selected, stored.and_then(|a| a.selected_is_correct)) {
                    (None, _) => AnswerOutcome::Unanswered,
                    (Some(_), Some(true)) => AnswerOutcome::Correct,
                    (Some(_), _) => AnswerOutcome::Incorrect,
                };

                ReviewedQuestion {
                    question_id: entry.question.id,
                    prompt: entry.question.prompt.clone(),
                    selected,
                    outcome,
                    correct_labels: entry.correct_labels(),
                }
            })
            .collect();

        Ok(ResultView {
            result_id: result.id,
            test: definition.test,
            score: result.score,
            total_questions: result.total_questions,
            taken_at: result.taken_at,
            questions,
        })
    }
}
