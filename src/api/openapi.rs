//! OpenAPI documentation

use axum::Json;
use utoipa::OpenApi;

use crate::api::{equipment, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Inventory API",
        version = "0.1.0",
        description = "Equipment registration, images and soft delete"
    ),
    paths(
        // Health
        health::healthz,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentImage,
            crate::models::equipment::EquipmentWithImages,
            crate::models::equipment::EquipmentForm,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "equipment", description = "Equipment management")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
