//! Scenarios against a live PostgreSQL database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use chrono::NaiveDate;
use inventory_server::{
    models::{
        equipment::{EquipmentForm, EquipmentQuery},
        user::{CreateUser, LoginForm},
    },
    repository,
    services::{
        auth::{INVALID_CREDENTIALS, USERNAME_IN_USE},
        inventory::{CODE_IN_USE, IMAGE_UPLOAD_FAILED},
    },
    storage::ImageUpload,
    AppError,
};
use serde_json::Value;

use crate::common::{session_cookie, setup_with_database, unique_code};

fn form(name: &str, code: &str) -> EquipmentForm {
    EquipmentForm {
        name: name.to_string(),
        code: code.to_string(),
        ..Default::default()
    }
}

fn png(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        bytes: axum::body::Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
    }
}

async fn rows_with_code(pool: &sqlx::PgPool, code: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipments WHERE code = $1")
        .bind(code)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[tokio::test]
#[ignore]
async fn test_schema_bootstrap_is_repeatable() -> Result<()> {
    let app = setup_with_database().await?;
    let key = app.state.config.database.schema_lock_key;

    inventory_server::bootstrap::migrate_once(&app.pool, key).await?;
    inventory_server::bootstrap::migrate_once(&app.pool, key).await?;

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_duplicate_code_is_a_conflict() -> Result<()> {
    let app = setup_with_database().await?;
    let code = unique_code("DUP");

    let first = app.state.services.inventory.create(form("Camera", &code), None).await?;
    assert_eq!(first.item.equipment.status, "available");
    assert!(first.item.equipment.is_active);
    assert!(first.item.images.is_empty());
    let mut conn = app.pool.acquire().await?;
    assert_eq!(
        repository::equipment::count_images(&mut conn, first.item.equipment.equipment_id).await?,
        0
    );

    let err = app
        .state
        .services
        .inventory
        .create(form("Other camera", &code), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(ref m) if m == CODE_IN_USE));
    assert_eq!(rows_with_code(&app.pool, &code).await?, 1);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_duplicate_code_form_is_shown_again() -> Result<()> {
    let app = setup_with_database().await?;
    let code = unique_code("DUPF");
    app.state.services.inventory.create(form("Tripod", &code), None).await?;

    let submitted = MultipartForm::new()
        .add_text("name", "Second tripod")
        .add_text("code", code.clone());
    let response = app
        .server
        .post("/admin/equipments/new")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .multipart(submitted)
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert!(response.text().contains(CODE_IN_USE));
    assert_eq!(rows_with_code(&app.pool, &code).await?, 1);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_code_of_deleted_equipment_stays_taken() -> Result<()> {
    let app = setup_with_database().await?;
    let code = unique_code("DEL");
    let inventory = &app.state.services.inventory;

    let saved = inventory.create(form("Mixer", &code), None).await?;
    inventory.deactivate(saved.item.equipment.equipment_id).await?;

    let err = inventory.get(saved.item.equipment.equipment_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = inventory.create(form("Mixer", &code), None).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_bad_extension_creates_nothing() -> Result<()> {
    let app = setup_with_database().await?;
    let code = unique_code("EXT");

    let err = app
        .state
        .services
        .inventory
        .create(form("Laptop", &code), Some(png("virus.exe")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(rows_with_code(&app.pool, &code).await?, 0);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_create_with_image_redirects_to_list() -> Result<()> {
    let app = setup_with_database().await?;
    let code = unique_code("IMG");

    let image = Part::bytes(b"\x89PNG\r\n\x1a\n".to_vec())
        .file_name("front.PNG")
        .mime_type("image/png");
    let submitted = MultipartForm::new()
        .add_text("name", "Drone")
        .add_text("code", code.clone())
        .add_part("image", image);
    let response = app
        .server
        .post("/admin/equipments/new")
        .add_header(header::COOKIE, session_cookie(&app)?)
        .multipart(submitted)
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/equipments");

    let listed: Vec<Value> = app
        .server
        .get("/api/equipment")
        .add_query_param("q", &code)
        .await
        .json();
    assert_eq!(listed.len(), 1);
    let image_path = listed[0]["images"][0]["image_path"].as_str().unwrap_or_default();
    assert!(image_path.starts_with("uploads/equipment/"));
    assert!(image_path.ends_with(".png"));
    assert!(app.static_dir.path().join(image_path).is_file());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_edit_adds_images_and_keeps_existing_ones() -> Result<()> {
    let app = setup_with_database().await?;
    let inventory = &app.state.services.inventory;
    let code = unique_code("EDIT");

    let saved = inventory.create(form("Speaker", &code), Some(png("a.png"))).await?;
    let id = saved.item.equipment.equipment_id;
    assert_eq!(saved.item.images.len(), 1);

    let mut changes = form("Speaker v2", &code);
    changes.status = "repair".to_string();
    let updated = inventory.update(id, changes, Some(png("b.jpg"))).await?;

    assert_eq!(updated.image_warning, None);
    assert_eq!(updated.item.equipment.name, "Speaker v2");
    assert_eq!(updated.item.equipment.status, "repair");
    assert_eq!(updated.item.images.len(), 2);
    // oldest first
    assert_eq!(updated.item.images[0].image_path, saved.item.images[0].image_path);

    // blank status leaves the stored one untouched
    let updated = inventory.update(id, form("Speaker v3", &code), None).await?;
    assert_eq!(updated.item.equipment.status, "repair");

    let mut conn = app.pool.acquire().await?;
    assert_eq!(repository::equipment::count_images(&mut conn, id).await?, 2);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_edit_keeps_fields_when_image_cannot_be_written() -> Result<()> {
    let app = setup_with_database().await?;
    let inventory = &app.state.services.inventory;
    let code = unique_code("RO");

    let saved = inventory.create(form("Lamp", &code), None).await?;
    let id = saved.item.equipment.equipment_id;

    // a file where the upload directory should be makes every write fail
    let upload_dir = inventory.images().upload_dir().to_path_buf();
    std::fs::remove_dir_all(&upload_dir)?;
    std::fs::write(&upload_dir, b"")?;

    let updated = inventory.update(id, form("Lamp XL", &code), Some(png("c.png"))).await?;

    assert_eq!(updated.image_warning.as_deref(), Some(IMAGE_UPLOAD_FAILED));
    assert_eq!(updated.item.equipment.name, "Lamp XL");
    assert!(updated.item.images.is_empty());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_malformed_buy_date_is_stored_as_null() -> Result<()> {
    let app = setup_with_database().await?;
    let inventory = &app.state.services.inventory;

    let mut bad = form("Monitor", &unique_code("DATE"));
    bad.buy_date = "31/12/2023".to_string();
    let saved = inventory.create(bad, None).await?;
    assert_eq!(saved.item.equipment.buy_date, None);

    let mut good = form("Monitor", &unique_code("DATE"));
    good.buy_date = "2023-12-31".to_string();
    let saved = inventory.create(good, None).await?;
    assert_eq!(saved.item.equipment.buy_date, NaiveDate::from_ymd_opt(2023, 12, 31));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_list_filters_and_orders_newest_first() -> Result<()> {
    let app = setup_with_database().await?;
    let inventory = &app.state.services.inventory;
    let marker = unique_code("LIST");

    let first = inventory.create(form("Old camera", &format!("{}-A", marker)), None).await?;
    let mut second = form("New camera", &format!("{}-B", marker));
    second.category = "Camera".to_string();
    let second = inventory.create(second, None).await?;
    inventory.create(form("Unrelated", &unique_code("OTHER")), None).await?;
    let retired = inventory.create(form("Retired camera", &format!("{}-C", marker)), None).await?;
    inventory.deactivate(retired.item.equipment.equipment_id).await?;

    let expected = vec![second.item.equipment.equipment_id, first.item.equipment.equipment_id];
    for term in [marker.to_lowercase(), marker.to_uppercase()] {
        let query = EquipmentQuery {
            q: Some(term.clone()),
            category: None,
        };
        let listed = inventory.list(&query).await?;
        let ids: Vec<i32> = listed.iter().map(|item| item.equipment.equipment_id).collect();
        assert_eq!(ids, expected, "q={}", term);
    }

    let query = EquipmentQuery {
        q: Some(marker.clone()),
        category: Some("Camera".to_string()),
    };
    let listed = inventory.list(&query).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].equipment.name, "New camera");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_lend_and_return() -> Result<()> {
    let app = setup_with_database().await?;
    let code = unique_code("LEND");
    let saved = app.state.services.inventory.create(form("Tablet", &code), None).await?;
    let id = saved.item.equipment.equipment_id;

    let response = app
        .server
        .post("/lend")
        .form(&[("equipment_id", id.to_string()), ("borrower", "Dana".to_string())])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(app.state.services.inventory.get(id).await?.equipment.status, "borrowed");

    // a second lending of the same device is refused
    let response = app
        .server
        .post("/lend")
        .form(&[("equipment_id", id.to_string()), ("borrower", "Sam".to_string())])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let board = app.state.services.lending.tracking_board().await?;
    let lending_id = board
        .iter()
        .find(|entry| entry.equipment_id == id)
        .and_then(|entry| entry.lending_id)
        .ok_or_else(|| anyhow::anyhow!("lending missing from board"))?;

    let response = app
        .server
        .post(&format!("/lendings/{}/return", lending_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(app.state.services.inventory.get(id).await?.equipment.status, "available");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_login_opens_admin_pages() -> Result<()> {
    let app = setup_with_database().await?;
    let username = unique_code("clerk");
    app.state
        .services
        .auth
        .create_user(CreateUser {
            username: username.clone(),
            password: "long enough".to_string(),
        })
        .await?;

    let response = app
        .server
        .post("/auth/login")
        .form(&[
            ("username", username.as_str()),
            ("password", "long enough"),
            ("next", "/admin/equipments"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/equipments");

    let cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("inventory_session="))
        .and_then(|value| value.split(';').next())
        .ok_or_else(|| anyhow::anyhow!("no session cookie"))?
        .to_string();

    let response = app
        .server
        .get("/admin/equipments")
        .add_header(header::COOKIE, cookie.parse::<axum::http::HeaderValue>()?)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_is_refused() -> Result<()> {
    let app = setup_with_database().await?;
    let auth = &app.state.services.auth;
    let username = unique_code("clerk");
    auth.create_user(CreateUser {
        username: username.clone(),
        password: "right password".to_string(),
    })
    .await?;

    let err = auth
        .authenticate(&LoginForm {
            username: username.clone(),
            password: "wrong password".to_string(),
            next: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication(ref m) if m == INVALID_CREDENTIALS));

    let response = app
        .server
        .post("/auth/login")
        .form(&[("username", username.as_str()), ("password", "wrong password")])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let user = auth
        .authenticate(&LoginForm {
            username: format!("  {} ", username),
            password: "right password".to_string(),
            next: String::new(),
        })
        .await?;
    assert_eq!(user.username, username);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_usernames_are_unique() -> Result<()> {
    let app = setup_with_database().await?;
    let auth = &app.state.services.auth;
    let username = unique_code("clerk");
    let account = CreateUser {
        username: username.clone(),
        password: "password one".to_string(),
    };

    let user = auth.create_user(account.clone()).await?;
    assert_ne!(user.password_hash, "password one");

    let err = auth.create_user(account).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == USERNAME_IN_USE));

    let err = auth
        .create_user(CreateUser {
            username: unique_code("clerk"),
            password: "short".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_seed_admin_only_once() -> Result<()> {
    let app = setup_with_database().await?;
    let auth = &app.state.services.auth;

    auth.seed_admin("admin", "admin").await?;
    // a second boot finds an account and leaves the table alone
    assert!(!auth.seed_admin(&unique_code("admin"), "admin").await?);
    assert!(!auth.list_users().await?.is_empty());

    Ok(())
}
