//! Staff accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// User record from database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Login form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Path to return to after signing in
    pub next: String,
}

/// New account form on the admin users page
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 8))]
    pub password: String,
}

/// Identity carried by the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i32,
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
        }
    }
}
