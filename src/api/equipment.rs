//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json,
};

use super::ApiJson;
use crate::{
    blueprint::Blueprint,
    web::auth::CurrentUser,
    error::AppResult,
    models::equipment::{EquipmentForm, EquipmentQuery, EquipmentWithImages},
    AppState,
};

pub fn blueprint() -> Blueprint {
    Blueprint::new("api_equipment", "/api/equipment")
        .route("list_equipment", "/", get(list_equipment))
        .route("create_equipment", "/", post(create_equipment))
        .route("get_equipment", "/:id", get(get_equipment))
        .route("update_equipment", "/:id", put(update_equipment))
        .route("delete_equipment", "/:id", delete(delete_equipment))
}

/// List active equipment, newest first
#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "equipment",
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<EquipmentWithImages>)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<EquipmentWithImages>>> {
    let equipment = state.services.inventory.list(&query).await?;
    Ok(Json(equipment))
}

/// Get active equipment by ID
#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentWithImages),
        (status = 404, description = "Unknown or inactive equipment")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentWithImages>> {
    let equipment = state.services.inventory.get(id).await?;
    Ok(Json(equipment))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "equipment",
    request_body = EquipmentForm,
    responses(
        (status = 201, description = "Equipment created", body = EquipmentWithImages),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Code already in use"),
        (status = 422, description = "Name or code missing")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(data): ApiJson<EquipmentForm>,
) -> AppResult<(StatusCode, Json<EquipmentWithImages>)> {
    let saved = state.services.inventory.create(data, None).await?;
    Ok((StatusCode::CREATED, Json(saved.item)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = EquipmentForm,
    responses(
        (status = 200, description = "Equipment updated", body = EquipmentWithImages),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Unknown or inactive equipment"),
        (status = 409, description = "Code already in use")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
    ApiJson(data): ApiJson<EquipmentForm>,
) -> AppResult<Json<EquipmentWithImages>> {
    let saved = state.services.inventory.update(id, data, None).await?;
    Ok(Json(saved.item))
}

/// Deactivate equipment
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deactivated"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Unknown or inactive equipment")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.inventory.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
