//! Table definitions. Every statement is idempotent.

use sqlx::PgConnection;

use crate::error::AppResult;

pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS equipments (
        equipment_id SERIAL PRIMARY KEY,
        name         VARCHAR(255) NOT NULL,
        code         VARCHAR(100) NOT NULL,
        category     VARCHAR(100) NOT NULL DEFAULT '',
        detail       TEXT NOT NULL DEFAULT '',
        brand        VARCHAR(100) NOT NULL DEFAULT '',
        status       VARCHAR(50) NOT NULL DEFAULT 'available',
        buy_date     DATE,
        is_active    BOOLEAN NOT NULL DEFAULT TRUE,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT equipments_code_key UNIQUE (code)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS equipment_images (
        id           SERIAL PRIMARY KEY,
        equipment_id INTEGER NOT NULL REFERENCES equipments (equipment_id) ON DELETE CASCADE,
        image_path   VARCHAR(255) NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_equipment_images_equipment_id ON equipment_images (equipment_id)",
    "CREATE INDEX IF NOT EXISTS idx_equipments_active_created ON equipments (is_active, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS lendings (
        lending_id   SERIAL PRIMARY KEY,
        equipment_id INTEGER NOT NULL REFERENCES equipments (equipment_id),
        borrower     VARCHAR(255) NOT NULL,
        note         TEXT,
        lent_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        returned_at  TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_lendings_open ON lendings (equipment_id) WHERE returned_at IS NULL",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id       SERIAL PRIMARY KEY,
        username      VARCHAR(100) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        is_active     BOOLEAN NOT NULL DEFAULT TRUE,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_username_key UNIQUE (username)
    )
    "#,
];

/// Create every table and index that does not exist yet
pub async fn create_all(conn: &mut PgConnection) -> AppResult<()> {
    for statement in STATEMENTS {
        sqlx::query(*statement).execute(&mut *conn).await?;
    }
    Ok(())
}
