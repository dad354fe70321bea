use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Sign in to continue")]
    AuthRequired,

    #[error("Activate a subscription to access the tests")]
    SubscriptionRequired,

    #[error("Your subscription has expired, renew it to access the tests")]
    SubscriptionExpired,

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("You already have an active subscription")]
    AlreadySubscribed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Result belongs to another user")]
    Ownership,

    /// A gate failure annotated with the path the caller originally asked for.
    #[error("{source}")]
    Gated {
        #[source]
        source: Box<Error>,
        next: String,
    },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Attaches the requested path so the response can send the user back to it.
    pub fn gated(self, next: impl Into<String>) -> Self {
        match self {
            Error::AuthRequired | Error::SubscriptionRequired | Error::SubscriptionExpired => {
                Error::Gated {
                    source: Box::new(self),
                    next: next.into(),
                }
            }
            other => other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Validation(_) => "validation_error",
            Error::DuplicateAccount => "duplicate_account",
            Error::InvalidCredentials => "invalid_credentials",
            Error::AuthRequired => "auth_required",
            Error::SubscriptionRequired => "subscription_required",
            Error::SubscriptionExpired => "subscription_expired",
            Error::InvalidPlan(_) => "invalid_plan",
            Error::AlreadySubscribed => "already_subscribed",
            Error::NotFound(_) | Error::Ownership => "not_found",
            Error::Gated { source, .. } => source.code(),
            _ => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::InvalidPlan(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::DuplicateAccount | Error::AlreadySubscribed => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::AuthRequired => StatusCode::UNAUTHORIZED,
            Error::SubscriptionRequired | Error::SubscriptionExpired => StatusCode::FORBIDDEN,
            Error::NotFound(_) | Error::Ownership => StatusCode::NOT_FOUND,
            Error::Gated { source, .. } => source.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            Error::Gated { source, next } => {
                let redirect = crate::middleware::auth::gate_redirect(source, next);
                json!({ "error": code, "message": source.to_string(), "redirect": redirect })
            }
            // Ownership is reported exactly like a missing result.
            Error::Ownership => json!({ "error": code, "message": "Result not found" }),
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "request failed");
                json!({ "error": code, "message": "An unexpected error occurred" })
            }
            _ => json!({ "error": code, "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Error::PasswordHash(err.to_string())
    }
}
