use axum::http::{HeaderMap, Uri};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::middleware::auth::bearer_token;
use crate::models::user::User;
use crate::services::account_service::AccountService;
use crate::services::session_service::SessionState;
use crate::AppState;

/// Everything one request needs: the store handle, who is asking, and what they asked for.
/// Built per request by the handlers and passed down explicitly.
#[derive(Clone)]
pub struct RequestContext {
    pub pool: SqlitePool,
    pub session: SessionState,
    pub requested_path: String,
}

impl RequestContext {
    pub fn new(state: &AppState, headers: &HeaderMap, uri: &Uri) -> Self {
        let session = state.session_service.resolve(bearer_token(headers));
        let requested_path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        Self {
            pool: state.pool.clone(),
            session,
            requested_path,
        }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.pool.clone())
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.accounts().current_user(&self.session).await
    }

    /// Authentication gate; failures remember the requested path.
    pub async fn require_user(&self) -> Result<User> {
        self.accounts()
            .require_authenticated(&self.session)
            .await
            .map_err(|e| e.gated(&self.requested_path))
    }

    /// Authentication plus active subscription gate.
    pub async fn require_subscriber(&self) -> Result<User> {
        self.accounts()
            .require_active_subscription(&self.session)
            .await
            .map_err(|e| e.gated(&self.requested_path))
    }
}
