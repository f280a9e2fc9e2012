// src/handlers/preferences.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{error::AppError, models::preferences::Preferences, utils::jwt::Claims};

/// Returns the caller's preferences, or the defaults if none are stored.
pub async fn get_preferences(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let prefs = sqlx::query_as::<_, Preferences>(
        r#"
        SELECT theme, notifications_enabled, email_notifications, language
        FROM user_preferences
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .unwrap_or_default();

    Ok(Json(prefs))
}

pub async fn update_preferences(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<Preferences>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let prefs = sqlx::query_as::<_, Preferences>(
        r#"
        INSERT INTO user_preferences (user_id, theme, notifications_enabled, email_notifications, language)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE SET
            theme = EXCLUDED.theme,
            notifications_enabled = EXCLUDED.notifications_enabled,
            email_notifications = EXCLUDED.email_notifications,
            language = EXCLUDED.language,
            updated_at = NOW()
        RETURNING theme, notifications_enabled, email_notifications, language
        "#,
    )
    .bind(user_id)
    .bind(&payload.theme)
    .bind(payload.notifications_enabled)
    .bind(payload.email_notifications)
    .bind(&payload.language)
    .fetch_one(&pool)
    .await?;

    Ok(Json(prefs))
}
