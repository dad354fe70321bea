use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub auth_rps: u32,
    pub trust_forwarded_for: bool,
    pub seed_catalog: bool,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 24)?,
            auth_rps: get_env_parse_or("AUTH_RPS", 10)?,
            trust_forwarded_for: get_env_parse_or("TRUST_FORWARDED_FOR", false)?,
            seed_catalog: get_env_parse_or("SEED_CATALOG", true)?,
            log_format: match env::var("LOG_FORMAT").ok().as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    /// Settings for an isolated in-memory instance.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: jwt_secret.into(),
            session_ttl_hours: 24,
            auth_rps: 1000,
            trust_forwarded_for: false,
            seed_catalog: false,
            log_format: LogFormat::Text,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
