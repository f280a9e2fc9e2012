// src/models/preferences.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'user_preferences' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, Validate)]
pub struct Preferences {
    #[validate(custom(function = validate_theme))]
    pub theme: String,
    pub notifications_enabled: bool,
    pub email_notifications: bool,
    #[validate(length(min = 2, max = 10))]
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            notifications_enabled: true,
            email_notifications: true,
            language: "en".to_string(),
        }
    }
}

fn validate_theme(theme: &str) -> Result<(), validator::ValidationError> {
    match theme {
        "light" | "dark" => Ok(()),
        _ => Err(validator::ValidationError::new("unknown_theme")),
    }
}
