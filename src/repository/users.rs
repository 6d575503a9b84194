//! User queries

use chrono::Utc;
use sqlx::PgConnection;

use crate::{error::AppResult, models::user::User};

/// Active user by login name
pub async fn find_active_by_username(conn: &mut PgConnection, username: &str) -> AppResult<Option<User>> {
    let row = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 AND is_active = TRUE",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Active users, by name
pub async fn list_active(conn: &mut PgConnection) -> AppResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_active = TRUE ORDER BY username",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Number of users, active or not
pub async fn count(conn: &mut PgConnection) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn insert(conn: &mut PgConnection, username: &str, password_hash: &str) -> AppResult<User> {
    let row = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, is_active, created_at)
        VALUES ($1, $2, TRUE, $3)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}
