use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ids::UserId;
use crate::models::subscription::{Plan, SubscriptionStatus};
use crate::models::user::UserProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub message: String,
    pub redirect: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
    pub redirect: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub plan: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanOption {
    pub plan: Plan,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plans: Option<Vec<PlanOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl PlanOption {
    pub fn all() -> Vec<PlanOption> {
        Plan::ALL
            .iter()
            .map(|plan| PlanOption {
                plan: *plan,
                days: plan.duration().num_days(),
            })
            .collect()
    }
}
