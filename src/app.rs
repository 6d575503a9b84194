//! Application factory

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    api,
    blueprint::{Blueprint, RouterBuilder},
    error::AppResult,
    storage::ImageStore,
    web, AppState,
};

/// Endpoints tried, in order, when resolving `/`
pub const LANDING_ENDPOINTS: &[&str] = &[
    "pages.home",
    "admin.admin_home",
    "inventory.lend",
    "tracking.track_index",
];

/// Feature route groups, in registration order
pub fn blueprints() -> Vec<Blueprint> {
    vec![
        web::pages::blueprint(),
        web::auth::blueprint(),
        web::inventory::blueprint(),
        web::tracking::blueprint(),
        web::admin::blueprint(),
        web::history::blueprint(),
        api::equipment::blueprint(),
    ]
}

/// Build the full application router.
/// Fails when an endpoint name is registered twice or the upload directory cannot be created.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let images = ImageStore::new(&state.config.uploads);
    images.prepare()?;
    tracing::info!("Upload directory ready at {}", images.upload_dir().display());

    let mut builder = RouterBuilder::default();
    for blueprint in blueprints() {
        builder = builder.register(blueprint)?;
    }
    let (registry, router) = builder.finish();
    for (endpoint, path) in registry.iter() {
        tracing::debug!("  {:<40} {}", endpoint, path);
    }
    tracing::info!("Registered {} endpoints", registry.iter().count());

    let landing = registry.first_registered(LANDING_ENDPOINTS).map(str::to_string);
    match &landing {
        Some(path) => tracing::info!("Root redirects to {}", path),
        None => tracing::warn!("No landing page registered"),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.uploads.static_dir);
    let body_limit = state.config.uploads.max_bytes;

    let app = router
        .route("/healthz", get(api::health::healthz))
        .route(
            "/",
            get(move || {
                let landing = landing.clone();
                async move { landing_response(landing.as_deref()) }
            }),
        )
        .with_state(state)
        .route("/api-docs/openapi.json", get(api::openapi::openapi_json))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}

/// Redirect to the landing page, or explain that there is none
fn landing_response(landing: Option<&str>) -> Response {
    match landing {
        Some(path) => Redirect::to(path).into_response(),
        None => Json(json!({ "status": "ok", "hint": "No landing page found." })).into_response(),
    }
}
