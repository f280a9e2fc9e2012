// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{config::Config, utils::jwt::JwtKeys};

/// Shared handler state. Cheap to clone: the pool and keys are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let keys = Arc::new(JwtKeys::new(&config.jwt_secret, config.jwt_expiration));
        Self { pool, config, keys }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
