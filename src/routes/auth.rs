use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::context::RequestContext;
use crate::dto::auth_dto::{
    LoginRequest, LoginResponse, NextQuery, RegisterRequest, RegisterResponse,
};
use crate::error::Result;
use crate::middleware::auth::LOGIN_PATH;
use crate::models::user::UserProfile;
use crate::services::account_service::AccountService;
use crate::utils::validation::local_path;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload?;
    let accounts = AccountService::new(state.pool.clone());
    let user_id = accounts
        .register(&req.email, &req.password, &req.full_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "Account created, you can sign in now".to_string(),
            redirect: LOGIN_PATH.to_string(),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<NextQuery>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload?;
    let ctx = RequestContext::new(&state, &headers, &uri);
    let accounts = ctx.accounts();
    let user_id = accounts.authenticate(&req.email, &req.password).await?;

    // A fresh login replaces whatever session the caller was holding.
    state.session_service.revoke(&ctx.session).await?;
    let issued = state.session_service.issue(user_id).await?;
    let user = accounts
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| crate::error::Error::Internal("user vanished during login".to_string()))?;

    tracing::info!(user_id = %user_id, "user signed in");
    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: UserProfile::from(&user),
        redirect: local_path(query.next.as_deref())
            .unwrap_or_else(|| "/api/dashboard".to_string()),
    }))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let ctx = RequestContext::new(&state, &headers, &uri);
    state.session_service.revoke(&ctx.session).await?;
    if !ctx.session.is_anonymous() {
        tracing::info!("user signed out");
    }
    Ok(Json(json!({ "message": "Signed out", "redirect": "/" })))
}
