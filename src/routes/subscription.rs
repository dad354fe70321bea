use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
};

use crate::context::RequestContext;
use crate::dto::auth_dto::{NextQuery, PlanOption, SubscribeRequest, SubscriptionResponse};
use crate::error::Result;
use crate::models::subscription::SubscriptionStatus;
use crate::utils::time;
use crate::utils::validation::local_path;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let ctx = RequestContext::new(&state, &headers, &uri);
    let user = ctx.require_user().await?;

    Ok(Json(SubscriptionResponse {
        subscription: SubscriptionStatus::of(&user, time::now()),
        plans: Some(PlanOption::all()),
        redirect: None,
    }))
}

#[axum::debug_handler]
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<NextQuery>,
    payload: std::result::Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let ctx = RequestContext::new(&state, &headers, &uri);
    let user = ctx.require_user().await?;
    let Json(req) = payload?;
    let updated = ctx.accounts().activate_subscription(user.id, &req.plan).await?;

    Ok(Json(SubscriptionResponse {
        subscription: SubscriptionStatus::of(&updated, time::now()),
        plans: None,
        redirect: Some(
            local_path(query.next.as_deref()).unwrap_or_else(|| "/api/tests".to_string()),
        ),
    }))
}
