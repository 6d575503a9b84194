//! Routes that answer without a database

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use axum_test::multipart::{MultipartForm, Part};
use inventory_server::{app, web::flash::signing_key};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{session_cookie, session_cookie_signed_with, setup_without_database};

#[tokio::test]
async fn test_healthz_without_database() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app.server.get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "ok": true }));

    Ok(())
}

#[tokio::test]
async fn test_root_redirects_to_landing_page() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app.server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/home");

    Ok(())
}

#[tokio::test]
async fn test_upload_directory_created_on_startup() -> Result<()> {
    let app = setup_without_database().await?;

    assert!(app.static_dir.path().join("uploads/equipment").is_dir());

    Ok(())
}

#[tokio::test]
async fn test_uploaded_images_are_served() -> Result<()> {
    let app = setup_without_database().await?;
    let image = app.static_dir.path().join("uploads/equipment/0123abcd.png");
    std::fs::write(&image, b"not really a png")?;

    let response = app.server.get("/static/uploads/equipment/0123abcd.png").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), b"not really a png");

    Ok(())
}

#[tokio::test]
async fn test_openapi_document() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app.server.get("/api-docs/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"]["/api/equipment"].is_object());

    Ok(())
}

#[tokio::test]
async fn test_new_equipment_form_renders() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .get("/admin/equipments/new")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(html.contains(".jpg,.jpeg,.png,.gif,.webp"));

    Ok(())
}

#[tokio::test]
async fn test_create_without_name_is_shown_again() -> Result<()> {
    let app = setup_without_database().await?;

    let form = MultipartForm::new()
        .add_text("name", "  ")
        .add_text("code", "EQ-100")
        .add_text("brand", "Epson");
    let response = app
        .server
        .post("/admin/equipments/new")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text();
    assert!(html.contains("Please enter the equipment name and code"));
    // submitted values are kept
    assert!(html.contains(r#"value="EQ-100""#));
    assert!(html.contains(r#"value="Epson""#));

    Ok(())
}

#[tokio::test]
async fn test_create_with_disallowed_extension_is_rejected() -> Result<()> {
    let app = setup_without_database().await?;

    let image = Part::bytes(b"MZ".to_vec())
        .file_name("setup.exe")
        .mime_type("application/octet-stream");
    let form = MultipartForm::new()
        .add_text("name", "Projector")
        .add_text("code", "EQ-101")
        .add_part("image", image);
    let response = app
        .server
        .post("/admin/equipments/new")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("Only image files are allowed"));

    let stored = std::fs::read_dir(app.static_dir.path().join("uploads/equipment"))?.count();
    assert_eq!(stored, 0);

    Ok(())
}

#[tokio::test]
async fn test_api_create_requires_name_and_code() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .post("/api/equipment")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .json(&json!({ "name": "Camera" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "Please enter the equipment name and code");

    Ok(())
}

#[tokio::test]
async fn test_healthz_through_tower_service() -> Result<()> {
    let app = setup_without_database().await?;
    let router = app::build_router(app.state.clone())?;

    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_api_null_fields_read_as_blank() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .post("/api/equipment")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .json(&json!({ "name": null, "code": "EQ-9", "buy_date": null }))
        .await;

    // null is accepted by the decoder; the missing name is what fails
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "Please enter the equipment name and code");

    Ok(())
}

#[tokio::test]
async fn test_api_malformed_json_uses_error_body() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .post("/api/equipment")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .json(&json!({ "name": ["not", "a", "string"], "code": "EQ-10" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_admin_pages_redirect_to_login() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app.server.get("/admin/equipments/new").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.header("location"),
        "/auth/login?next=%2Fadmin%2Fequipments%2Fnew"
    );

    for path in ["/admin", "/admin/equipments", "/admin/users", "/admin/equipments/1/edit"] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER, "{}", path);
    }

    // a form post cannot be replayed, so login returns to the dashboard
    let response = app.server.post("/admin/equipments/1/delete").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/auth/login?next=%2Fadmin");

    Ok(())
}

#[tokio::test]
async fn test_api_writes_require_session() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .post("/api/equipment")
        .json(&json!({ "name": "Camera", "code": "EQ-11" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "NotAuthenticated");

    let response = app.server.delete("/api/equipment/1").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_session_signed_with_other_secret_is_refused() -> Result<()> {
    let app = setup_without_database().await?;
    let foreign = session_cookie_signed_with(signing_key("some-other-secret"))?;

    let response = app
        .server
        .get("/admin/equipments/new")
        .add_header(header::COOKIE, foreign)
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    Ok(())
}

#[tokio::test]
async fn test_login_form_keeps_target() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app.server.get("/auth/login?next=%2Fadmin%2Fusers").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains(r#"name="next""#));
    assert!(html.contains("users"));

    Ok(())
}

#[tokio::test]
async fn test_logout_returns_to_login() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .post("/auth/logout")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/auth/login");

    Ok(())
}

#[tokio::test]
async fn test_blank_login_is_refused_without_database() -> Result<()> {
    let app = setup_without_database().await?;

    let response = app
        .server
        .post("/auth/login")
        .form(&[("username", ""), ("password", ""), ("next", "/admin")])
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("Invalid username or password"));

    Ok(())
}
