// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::user::{
        LoginRequest, Profile, ROLE_STUDENT, RegisterRequest, UpdateProfileRequest, User,
        UserSummary,
    },
    utils::{
        hash::{hash_password, verify_password},
        html::clean_html,
        jwt::{Claims, JwtKeys},
    },
};

const PROFILE_COLUMNS: &str = "id, name, email, role, class, cet_year, phone, address";

/// Registers a new student.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, password, role, is_active, created_at
        "#,
    )
    .bind(clean_html(payload.name.trim()))
    .bind(&email)
    .bind(hashed_password)
    .bind(ROLE_STUDENT)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("User already exists".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, "student registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown e-mail and wrong password produce the same 401 message.
pub async fn login(
    State(pool): State<PgPool>,
    State(keys): State<Arc<JwtKeys>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, is_active, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    let token = keys.sign(user.id, &user.role)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": UserSummary::from(user),
    })))
}

/// Returns the current user's profile.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let profile = fetch_profile(&pool, user_id).await?;
    Ok(Json(profile))
}

/// Updates any subset of the current user's profile fields.
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    let user_id = claims.user_id()?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(clean_html(name.trim()));
    }

    if let Some(email) = payload.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email.trim().to_lowercase());
    }

    if let Some(class) = payload.class {
        separated.push("class = ");
        separated.push_bind_unseparated(class);
    }

    if let Some(cet_year) = payload.cet_year {
        separated.push("cet_year = ");
        separated.push_bind_unseparated(cet_year);
    }

    if let Some(phone) = payload.phone {
        separated.push("phone = ");
        separated.push_bind_unseparated(phone);
    }

    if let Some(address) = payload.address {
        separated.push("address = ");
        separated.push_bind_unseparated(address);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(user_id);

    builder.build().execute(&pool).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already in use".to_string())
        } else {
            tracing::error!("Failed to update profile: {:?}", e);
            AppError::from(e)
        }
    })?;

    let profile = fetch_profile(&pool, user_id).await?;
    Ok(Json(profile))
}

async fn fetch_profile(pool: &PgPool, user_id: i64) -> Result<Profile, AppError> {
    sqlx::query_as::<_, Profile>(&format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}
