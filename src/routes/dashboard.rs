use axum::{
    extract::{OriginalUri, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
};

use crate::context::RequestContext;
use crate::dto::test_dto::{DashboardResponse, IndexResponse};
use crate::error::Result;
use crate::models::subscription::SubscriptionStatus;
use crate::models::user::UserProfile;
use crate::services::attempt_service::AttemptService;
use crate::utils::time;
use crate::AppState;

const RECENT_RESULTS: i64 = 5;

#[axum::debug_handler]
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let ctx = RequestContext::new(&state, &headers, &uri);
    let user = ctx.current_user().await?;
    Ok(Json(IndexResponse {
        user: user.as_ref().map(UserProfile::from),
    }))
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let ctx = RequestContext::new(&state, &headers, &uri);
    let user = ctx.require_user().await?;

    let attempts = AttemptService::new(ctx.pool.clone());
    let recent_results = attempts.recent_results(user.id, RECENT_RESULTS).await?;

    Ok(Json(DashboardResponse {
        user: UserProfile::from(&user),
        subscription: SubscriptionStatus::of(&user, time::now()),
        recent_results,
    }))
}
