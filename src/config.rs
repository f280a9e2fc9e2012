// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Passing threshold used when a chapter has none configured.
pub const DEFAULT_PASSING_PERCENTAGE: i32 = 40;

/// Expected pace per question, in seconds, used by the speed bonus.
pub const SECONDS_PER_QUESTION: i64 = 120;

/// Origins always allowed by CORS in addition to `FRONTEND_URLS`.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub frontend_urls: Vec<String>,
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let frontend_urls = env::var("FRONTEND_URLS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            frontend_urls,
            admin_name: env::var("ADMIN_NAME").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// Every origin the CORS layer should accept.
    pub fn allowed_origins(&self) -> Vec<String> {
        DEV_ORIGINS
            .iter()
            .map(|o| o.to_string())
            .chain(self.frontend_urls.iter().cloned())
            .collect()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
