use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::ids::{ResultId, TestId, UserId};

/// One completed, scored attempt. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: ResultId,
    pub user_id: UserId,
    pub test_id: TestId,
    pub score: i64,
    pub total_questions: i64,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentResult {
    pub id: ResultId,
    pub test_id: TestId,
    pub title: String,
    pub score: i64,
    pub total_questions: i64,
    pub taken_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub formatted_date: String,
}
