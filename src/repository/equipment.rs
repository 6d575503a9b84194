//! Equipment queries
//!
//! Every read filters on `is_active = TRUE`; deactivated rows are invisible
//! to listing, editing and lending.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgConnection;

use super::like_pattern;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        Equipment, EquipmentDraft, EquipmentImage, EquipmentQuery, EquipmentWithImages,
        DEFAULT_STATUS,
    },
};

/// List active equipment, newest first, with images loaded in one extra query
pub async fn list(conn: &mut PgConnection, query: &EquipmentQuery) -> AppResult<Vec<EquipmentWithImages>> {
    let mut conditions = vec!["is_active = TRUE".to_string()];
    let mut idx = 1;

    let search = query.search_term().map(like_pattern);
    let category = query.category_filter();

    if search.is_some() {
        conditions.push(format!("(name ILIKE ${idx} OR code ILIKE ${idx})"));
        idx += 1;
    }
    if category.is_some() {
        conditions.push(format!("category = ${}", idx));
    }

    let select_q = format!(
        "SELECT * FROM equipments WHERE {} ORDER BY created_at DESC, equipment_id DESC",
        conditions.join(" AND ")
    );

    let mut builder = sqlx::query_as::<_, Equipment>(&select_q);
    if let Some(ref pattern) = search { builder = builder.bind(pattern); }
    if let Some(cat) = category { builder = builder.bind(cat); }

    let rows = builder.fetch_all(&mut *conn).await?;
    attach_images(conn, rows).await
}

/// Active equipment that can be lent right now, by name
pub async fn list_available(conn: &mut PgConnection) -> AppResult<Vec<EquipmentWithImages>> {
    let rows = sqlx::query_as::<_, Equipment>(
        "SELECT * FROM equipments WHERE is_active = TRUE AND status = $1 ORDER BY name, equipment_id",
    )
    .bind(DEFAULT_STATUS)
    .fetch_all(&mut *conn)
    .await?;
    attach_images(conn, rows).await
}

/// Get an active equipment row with its images
pub async fn find_active(conn: &mut PgConnection, id: i32) -> AppResult<Option<EquipmentWithImages>> {
    let row = sqlx::query_as::<_, Equipment>(
        "SELECT * FROM equipments WHERE equipment_id = $1 AND is_active = TRUE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(equipment) => Ok(attach_images(conn, vec![equipment]).await?.pop()),
        None => Ok(None),
    }
}

/// Get an active equipment row, locking it until the unit of work ends
pub async fn lock_active(conn: &mut PgConnection, id: i32) -> AppResult<Equipment> {
    sqlx::query_as::<_, Equipment>(
        "SELECT * FROM equipments WHERE equipment_id = $1 AND is_active = TRUE FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
}

/// Insert a new active equipment row
pub async fn insert(conn: &mut PgConnection, draft: &EquipmentDraft) -> AppResult<Equipment> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Equipment>(
        r#"
        INSERT INTO equipments (
            name, code, category, detail, brand, status, buy_date,
            is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
        RETURNING *
        "#,
    )
    .bind(&draft.name)
    .bind(&draft.code)
    .bind(&draft.category)
    .bind(&draft.detail)
    .bind(&draft.brand)
    .bind(draft.status.as_deref().unwrap_or(DEFAULT_STATUS))
    .bind(draft.buy_date)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// Overwrite the editable fields of an active row. A blank status keeps the current one.
pub async fn update(conn: &mut PgConnection, id: i32, draft: &EquipmentDraft) -> AppResult<Equipment> {
    sqlx::query_as::<_, Equipment>(
        r#"
        UPDATE equipments SET
            name = $2,
            code = $3,
            category = $4,
            detail = $5,
            brand = $6,
            status = COALESCE($7, status),
            buy_date = $8,
            updated_at = $9
        WHERE equipment_id = $1 AND is_active = TRUE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&draft.name)
    .bind(&draft.code)
    .bind(&draft.category)
    .bind(&draft.detail)
    .bind(&draft.brand)
    .bind(draft.status.as_deref())
    .bind(draft.buy_date)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
}

/// Set the status of an active row
pub async fn set_status(conn: &mut PgConnection, id: i32, status: &str) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE equipments SET status = $2, updated_at = $3 WHERE equipment_id = $1 AND is_active = TRUE",
    )
    .bind(id)
    .bind(status)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Equipment {} not found", id)));
    }
    Ok(())
}

/// Soft delete: clear `is_active`. Images stay attached to the inactive row.
pub async fn deactivate(conn: &mut PgConnection, id: i32) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE equipments SET is_active = FALSE, updated_at = $2 WHERE equipment_id = $1 AND is_active = TRUE",
    )
    .bind(id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Equipment {} not found", id)));
    }
    Ok(())
}

/// Record an image file for an equipment row
pub async fn insert_image(conn: &mut PgConnection, equipment_id: i32, image_path: &str) -> AppResult<EquipmentImage> {
    let row = sqlx::query_as::<_, EquipmentImage>(
        r#"
        INSERT INTO equipment_images (equipment_id, image_path, created_at)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(equipment_id)
    .bind(image_path)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// Count images of an equipment row, active or not
pub async fn count_images(conn: &mut PgConnection, equipment_id: i32) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment_images WHERE equipment_id = $1")
        .bind(equipment_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Load the images of all given rows with a single query
async fn attach_images(conn: &mut PgConnection, rows: Vec<Equipment>) -> AppResult<Vec<EquipmentWithImages>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|e| e.equipment_id).collect();
    let images = sqlx::query_as::<_, EquipmentImage>(
        "SELECT * FROM equipment_images WHERE equipment_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_equipment: HashMap<i32, Vec<EquipmentImage>> = HashMap::new();
    for image in images {
        by_equipment.entry(image.equipment_id).or_default().push(image);
    }

    Ok(rows
        .into_iter()
        .map(|equipment| {
            let images = by_equipment.remove(&equipment.equipment_id).unwrap_or_default();
            EquipmentWithImages { equipment, images }
        })
        .collect())
}
