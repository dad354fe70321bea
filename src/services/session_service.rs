use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ids::UserId;
use crate::utils::time;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub sid: Uuid,
    pub exp: usize,
}

/// Opaque session state resolved from a request. Empty when no valid token was presented.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    claims: Option<Claims>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.claims.is_none()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.claims.as_ref().map(|c| c.sid)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.claims
            .as_ref()
            .and_then(|c| c.sub.parse::<i64>().ok())
            .map(UserId)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionService {
    pool: SqlitePool,
    secret: String,
    ttl: Duration,
}

impl SessionService {
    pub fn new(pool: SqlitePool, secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            pool,
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    pub async fn issue(&self, user_id: UserId) -> Result<IssuedSession> {
        let sid = Uuid::new_v4();
        let now = time::now();
        let expires_at = now + self.ttl;

        let purged = sqlx::query(r#"DELETE FROM session WHERE expires_at <= ?"#)
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "removed expired sessions");
        }

        sqlx::query(
            r#"INSERT INTO session (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(sid)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        let claims = Claims {
            sub: user_id.to_string(),
            sid,
            exp: expires_at.timestamp().max(0) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Never fails: a bad, expired or forged token resolves to the anonymous state.
    pub fn resolve(&self, token: Option<&str>) -> SessionState {
        let Some(token) = token else {
            return SessionState::anonymous();
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => SessionState {
                claims: Some(data.claims),
            },
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                SessionState::anonymous()
            }
        }
    }

    pub async fn revoke(&self, session: &SessionState) -> Result<()> {
        if let Some(sid) = session.session_id() {
            sqlx::query(r#"DELETE FROM session WHERE id = ?"#)
                .bind(sid)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}
