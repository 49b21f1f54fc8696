use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// The one origin allowed to make credentialed cross-site requests.
    pub cors_origin: HeaderValue,
    /// Reject mutating requests whose `X-CSRF-Token` header does not echo the CSRF cookie.
    pub csrf_protection: bool,
    pub secure_cookies: bool,
    /// Put the project and todo endpoints behind the login guard.
    pub require_login: bool,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "database.db")?,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:4000")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:8080")?,
            csrf_protection: try_load("CSRF_PROTECTION", "false")?,
            secure_cookies: try_load("SECURE_COOKIES", "false")?,
            require_login: try_load("REQUIRE_LOGIN", "false")?,
            seed_demo_data: try_load("SEED_DEMO_DATA", "false")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "database.db".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
            cors_origin: HeaderValue::from_static("http://localhost:8080"),
            csrf_protection: false,
            secure_cookies: false,
            require_login: false,
            seed_demo_data: false,
        }
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let port: u16 = try_load("TASK_TRACKER_TEST_UNSET_PORT", "4000").unwrap();
        assert_eq!(port, 4000);
    }

    #[test]
    fn malformed_values_are_reported_with_their_key() {
        env::set_var("TASK_TRACKER_TEST_BAD_FLAG", "sometimes");
        let err = try_load::<bool>("TASK_TRACKER_TEST_BAD_FLAG", "false").unwrap_err();
        assert!(err.to_string().contains("TASK_TRACKER_TEST_BAD_FLAG"));
    }

    #[test]
    fn origins_must_be_valid_header_values() {
        env::set_var("TASK_TRACKER_TEST_ORIGIN", "http://localhost:8080\n");
        let origin: HeaderValue = try_load("TASK_TRACKER_TEST_ORIGIN", "x").unwrap();
        assert_eq!(origin, "http://localhost:8080");

        env::set_var("TASK_TRACKER_TEST_BAD_ORIGIN", "http://a\u{7f}b");
        assert!(try_load::<HeaderValue>("TASK_TRACKER_TEST_BAD_ORIGIN", "x").is_err());
    }
}
