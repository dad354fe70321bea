use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::ids::UserId;
use crate::models::subscription::{self, Plan, SubscriptionState};
use crate::models::user::User;
use crate::services::session_service::SessionState;
use crate::utils::crypto::{hash_password, verify_against_dummy, verify_password};
use crate::utils::time;
use crate::utils::validation::{normalize_email, validate};

#[derive(Debug, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl NewAccount {
    pub fn normalized(email: &str, password: &str, full_name: &str) -> Self {
        Self {
            full_name: full_name.trim().to_string(),
            email: normalize_email(email),
            password: password.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    pool: SqlitePool,
}

impl AccountService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<UserId> {
        let account = NewAccount::normalized(email, password, full_name);
        validate(&account)?;

        if self.find_by_email(&account.email).await?.is_some() {
            return Err(Error::DuplicateAccount);
        }

        let password_hash = hash_password(&account.password)?;
        let inserted = sqlx::query_scalar::<_, UserId>(
            r#"
            INSERT INTO user (email, password_hash, full_name, is_subscribed, created_at)
            VALUES (?, ?, ?, 0, ?)
            RETURNING id
            "#,
        )
        .bind(&account.email)
        .bind(&password_hash)
        .bind(&account.full_name)
        .bind(time::now())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user_id) => {
                tracing::info!(user_id = %user_id, "account registered");
                Ok(user_id)
            }
            // Lost a race against a concurrent registration of the same email.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::DuplicateAccount)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserId> {
        let email = normalize_email(email);
        let Some(user) = self.find_by_email(&email).await? else {
            verify_against_dummy(password);
            tracing::info!("login failed");
            return Err(Error::InvalidCredentials);
        };

        let verified = match verify_password(password, &user.password_hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "stored password hash is unreadable");
                false
            }
        };
        if !verified {
            tracing::info!("login failed");
            return Err(Error::InvalidCredentials);
        }

        Ok(user.id)
    }

    pub async fn current_user(&self, session: &SessionState) -> Result<Option<User>> {
        let (Some(sid), Some(user_id)) = (session.session_id(), session.user_id()) else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM user u
            JOIN session s ON s.user_id = u.id
            WHERE s.id = ? AND u.id = ? AND s.expires_at > ?
            "#,
        )
        .bind(sid)
        .bind(user_id)
        .bind(time::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn require_authenticated(&self, session: &SessionState) -> Result<User> {
        self.current_user(session)
            .await?
            .ok_or(Error::AuthRequired)
    }

    pub async fn require_active_subscription(&self, session: &SessionState) -> Result<User> {
        let user = self.require_authenticated(session).await?;
        self.ensure_subscribed(user, time::now()).await
    }

    /// Applies the subscription gate to an already resolved user, writing the lazy
    /// downgrade when the stored flag has outlived its end date.
    pub async fn ensure_subscribed(&self, mut user: User, now: DateTime<Utc>) -> Result<User> {
        let outcome = subscription::evaluate_user(&user, now);
        if outcome.persist_downgrade {
            self.persist_downgrade(user.id).await?;
            user.is_subscribed = false;
            tracing::info!(user_id = %user.id, "subscription expired, flag cleared");
        }

        match outcome.state {
            SubscriptionState::Active { .. } => Ok(user),
            SubscriptionState::Expired { .. } => Err(Error::SubscriptionExpired),
            SubscriptionState::Inactive => Err(Error::SubscriptionRequired),
        }
    }

    pub async fn activate_subscription(&self, user_id: UserId, plan: &str) -> Result<User> {
        let plan: Plan = plan.parse()?;
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))?;

        let now = time::now();
        if let SubscriptionState::Active { .. } = subscription::evaluate_user(&user, now).state {
            return Err(Error::AlreadySubscribed);
        }

        // The guard repeats the active check so two concurrent activations cannot both win.
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE user
            SET is_subscribed = 1,
                subscription_plan = ?,
                subscription_start = ?,
                subscription_end = ?
            WHERE id = ?
              AND NOT (is_subscribed = 1 AND (subscription_end IS NULL OR subscription_end >= ?))
            RETURNING *
            "#,
        )
        .bind(plan.tag())
        .bind(now)
        .bind(now + plan.duration())
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::AlreadySubscribed)?;

        tracing::info!(user_id = %user_id, plan = plan.tag(), "subscription activated");
        Ok(updated)
    }

    pub async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM user WHERE id = ?"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM user WHERE email = ?"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn persist_downgrade(&self, user_id: UserId) -> Result<()> {
        sqlx::query(r#"UPDATE user SET is_subscribed = 0 WHERE id = ? AND is_subscribed = 1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
