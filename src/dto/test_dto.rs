use serde::{Deserialize, Serialize};

use crate::models::ids::{ResultId, TestId};
use crate::models::subscription::SubscriptionStatus;
use crate::models::test::Test;
use crate::models::test_attempt::RecentResult;
use crate::models::user::UserProfile;
use crate::services::grading_service::Responses;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestListResponse {
    pub tests: Vec<Test>,
}

/// `{"responses": {"<question id>": <choice id> | null}}`. Keys and values must be integers;
/// questions left out count as unanswered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitTestRequest {
    #[serde(default)]
    pub responses: Responses,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestResponse {
    pub result_id: ResultId,
    pub test_id: TestId,
    pub score: i64,
    pub total_questions: i64,
    pub message: String,
    pub redirect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub user: UserProfile,
    pub subscription: SubscriptionStatus,
    pub recent_results: Vec<RecentResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub user: Option<UserProfile>,
}
