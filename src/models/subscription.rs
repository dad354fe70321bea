use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;
use crate::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    #[serde(rename = "mensual", alias = "monthly")]
    Monthly,
    #[serde(rename = "anual", alias = "yearly")]
    Yearly,
}

impl Plan {
    pub const ALL: [Plan; 2] = [Plan::Monthly, Plan::Yearly];

    pub fn tag(self) -> &'static str {
        match self {
            Plan::Monthly => "mensual",
            Plan::Yearly => "anual",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Plan::Monthly => Duration::days(30),
            Plan::Yearly => Duration::days(365),
        }
    }
}

impl FromStr for Plan {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "mensual" | "monthly" => Ok(Plan::Monthly),
            "anual" | "yearly" => Ok(Plan::Yearly),
            other => Err(Error::InvalidPlan(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubscriptionState {
    Inactive,
    /// `ends_at` is empty for a flag set without an end date, which stays open-ended.
    Active { ends_at: Option<DateTime<Utc>> },
    Expired { ended_at: DateTime<Utc> },
}

/// Result of checking a subscription at a point in time. When `persist_downgrade` is set the
/// stored flag is stale and the caller must write `is_subscribed = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOutcome {
    pub state: SubscriptionState,
    pub persist_downgrade: bool,
}

pub fn evaluate(
    is_subscribed: bool,
    subscription_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> GateOutcome {
    match subscription_end {
        Some(end) if end < now => GateOutcome {
            state: SubscriptionState::Expired { ended_at: end },
            persist_downgrade: is_subscribed,
        },
        end if is_subscribed => GateOutcome {
            state: SubscriptionState::Active { ends_at: end },
            persist_downgrade: false,
        },
        _ => GateOutcome {
            state: SubscriptionState::Inactive,
            persist_downgrade: false,
        },
    }
}

pub fn evaluate_user(user: &User, now: DateTime<Utc>) -> GateOutcome {
    evaluate(user.is_subscribed, user.subscription_end, now)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatus {
    #[serde(flatten)]
    pub state: SubscriptionState,
    pub plan: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl SubscriptionStatus {
    pub fn of(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            state: evaluate_user(user, now).state,
            plan: user.subscription_plan.clone(),
            started_at: user.subscription_start,
        }
    }
}
