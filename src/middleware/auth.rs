use axum::http::HeaderMap;

use crate::error::Error;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SUBSCRIBE_PATH: &str = "/api/subscription";

/// Pulls the token out of `Authorization: Bearer <token>`. Anything else counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Where a failed gate sends the user, carrying the original destination in `next`.
pub fn gate_redirect(source: &Error, next: &str) -> String {
    let target = match source {
        Error::SubscriptionRequired | Error::SubscriptionExpired => SUBSCRIBE_PATH,
        _ => LOGIN_PATH,
    };
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{}?{}", target, query)
}
