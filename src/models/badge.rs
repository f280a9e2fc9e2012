// src/models/badge.rs

use serde::Serialize;
use sqlx::FromRow;

/// A badge the user holds, joined with its catalog entry.
#[derive(Debug, Serialize, FromRow)]
pub struct EarnedBadge {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub points_required: Option<i32>,
    pub earned_at: chrono::DateTime<chrono::Utc>,
}
