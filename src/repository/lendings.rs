//! Lending queries

use chrono::Utc;
use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{BORROWED_STATUS, DEFAULT_STATUS},
        lending::{InventorySummary, Lending, LendingDetails, TrackingEntry},
    },
};

/// Insert an open lending
pub async fn insert(conn: &mut PgConnection, equipment_id: i32, borrower: &str, note: Option<&str>) -> AppResult<Lending> {
    let row = sqlx::query_as::<_, Lending>(
        r#"
        INSERT INTO lendings (equipment_id, borrower, note, lent_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(equipment_id)
    .bind(borrower)
    .bind(note)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// Close an open lending
pub async fn close(conn: &mut PgConnection, lending_id: i32) -> AppResult<Lending> {
    sqlx::query_as::<_, Lending>(
        r#"
        UPDATE lendings SET returned_at = $2
        WHERE lending_id = $1 AND returned_at IS NULL
        RETURNING *
        "#,
    )
    .bind(lending_id)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Open lending {} not found", lending_id)))
}

/// Lending history, newest first
pub async fn history(conn: &mut PgConnection, limit: i64) -> AppResult<Vec<LendingDetails>> {
    let rows = sqlx::query_as::<_, LendingDetails>(
        r#"
        SELECT l.lending_id, l.equipment_id, e.name AS equipment_name, e.code AS equipment_code,
               l.borrower, l.note, l.lent_at, l.returned_at
        FROM lendings l
        JOIN equipments e ON e.equipment_id = l.equipment_id
        ORDER BY l.lent_at DESC, l.lending_id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Every active equipment row with its open lending, if any
pub async fn tracking_board(conn: &mut PgConnection) -> AppResult<Vec<TrackingEntry>> {
    let rows = sqlx::query_as::<_, TrackingEntry>(
        r#"
        SELECT e.equipment_id, e.name, e.code, e.category, e.status,
               l.lending_id, l.borrower, l.lent_at
        FROM equipments e
        LEFT JOIN lendings l
               ON l.equipment_id = e.equipment_id AND l.returned_at IS NULL
        WHERE e.is_active = TRUE
        ORDER BY e.name, e.equipment_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Counters for the admin dashboard
pub async fn summary(conn: &mut PgConnection) -> AppResult<InventorySummary> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS active_equipment,
            COUNT(*) FILTER (WHERE status = $1) AS available,
            COUNT(*) FILTER (WHERE status = $2) AS borrowed
        FROM equipments
        WHERE is_active = TRUE
        "#,
    )
    .bind(DEFAULT_STATUS)
    .bind(BORROWED_STATUS)
    .fetch_one(&mut *conn)
    .await?;

    let open_lendings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM lendings WHERE returned_at IS NULL")
            .fetch_one(&mut *conn)
            .await?;

    Ok(InventorySummary {
        active_equipment: sqlx::Row::get(&row, "active_equipment"),
        available: sqlx::Row::get(&row, "available"),
        borrowed: sqlx::Row::get(&row, "borrowed"),
        open_lendings,
    })
}
