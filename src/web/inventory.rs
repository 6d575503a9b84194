//! Inventory pages: lending desk and equipment administration

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form,
};
use axum_extra::extract::{cookie::SignedCookieJar, Multipart};
use minijinja::context;
use serde::Deserialize;

use super::{
    auth::CurrentUser,
    flash::{self, Flash},
    form_status,
    forms::EquipmentSubmission,
    render,
};
use crate::{
    blueprint::Blueprint,
    error::AppResult,
    models::{
        equipment::{EquipmentForm, EquipmentQuery},
        lending::CreateLending,
    },
    AppState,
};

const EQUIPMENT_LIST_URL: &str = "/admin/equipments";
const TRACKING_URL: &str = "/track-status";

pub fn blueprint() -> Blueprint {
    Blueprint::new("inventory", "")
        .route("lend_device", "/lend_device", get(lend_device))
        .route("lend", "/lend", get(lend))
        .route("lend_submit", "/lend", post(lend_submit))
        .route("return_device", "/lendings/:id/return", post(return_device))
        .route("admin_equipment_list", "/admin/equipments", get(admin_equipment_list))
        .route("admin_equipment_new", "/admin/equipments/new", get(admin_equipment_new))
        .route("admin_equipment_create", "/admin/equipments/new", post(admin_equipment_create))
        .route("admin_equipment_edit", "/admin/equipments/:id/edit", get(admin_equipment_edit))
        .route("admin_equipment_update", "/admin/equipments/:id/edit", post(admin_equipment_update))
        .route("admin_equipment_delete", "/admin/equipments/:id/delete", post(admin_equipment_delete))
}

/// Devices that can be lent right now
pub async fn lend_device(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let equipments = state.services.inventory.list_for_lending().await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(&state, "lend_device.html", context! { equipments, flashes })?;
    Ok((jar, page).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct LendQuery {
    pub equipment_id: Option<i32>,
}

/// Lending form
pub async fn lend(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<LendQuery>,
) -> AppResult<Response> {
    let equipments = state.services.inventory.list_for_lending().await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(
        &state,
        "lend.html",
        context! {
            equipments,
            flashes,
            selected => query.equipment_id,
            form => CreateLending::default(),
        },
    )?;
    Ok((jar, page).into_response())
}

/// Record a lending
pub async fn lend_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(request): Form<CreateLending>,
) -> AppResult<Response> {
    match state.services.lending.lend(request.clone()).await {
        Ok(lending) => {
            let jar = flash::push(jar, [Flash::success(format!("Lent to {}", lending.borrower))]);
            Ok((jar, Redirect::to(TRACKING_URL)).into_response())
        }
        Err(e) => {
            let Some(message) = e.form_message().map(str::to_string) else {
                return Err(e);
            };
            let equipments = state.services.inventory.list_for_lending().await?;
            let page = render(
                &state,
                "lend.html",
                context! {
                    equipments,
                    error => message,
                    selected => request.equipment_id,
                    form => request,
                },
            )?;
            Ok((form_status(&e), page).into_response())
        }
    }
}

/// Close a lending
pub async fn return_device(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    state.services.lending.return_lending(id).await?;
    let jar = flash::push(jar, [Flash::success("Device returned")]);
    Ok((jar, Redirect::to(TRACKING_URL)).into_response())
}

/// Active equipment with search and category filters
pub async fn admin_equipment_list(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: SignedCookieJar,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Response> {
    let items = state.services.inventory.list(&query).await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(
        &state,
        "admin_equipment_list.html",
        context! {
            items,
            flashes,
            q => query.search_term().unwrap_or_default(),
            category => query.category_filter().unwrap_or_default(),
        },
    )?;
    Ok((jar, page).into_response())
}

/// Empty creation form
pub async fn admin_equipment_new(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let (jar, flashes) = flash::take(jar);
    let page = render(
        &state,
        "admin_equipment_new.html",
        context! { flashes, form => EquipmentForm::default(), accept => accept_list(&state) },
    )?;
    Ok((jar, page).into_response())
}

/// Create equipment from the submitted form
pub async fn admin_equipment_create(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = EquipmentSubmission::from_multipart(multipart).await?;
    tracing::info!(
        "Equipment create: upload dir {}, image {:?}",
        state.services.inventory.images().upload_dir().display(),
        submission.image_name()
    );

    let form = submission.form.clone();
    match state.services.inventory.create(submission.form, submission.image).await {
        Ok(saved) => {
            let mut messages = vec![Flash::success(format!("Equipment {} added", saved.item.equipment.code))];
            messages.extend(saved.image_warning.map(Flash::warning));
            let jar = flash::push(jar, messages);
            Ok((jar, Redirect::to(EQUIPMENT_LIST_URL)).into_response())
        }
        Err(e) => {
            let Some(message) = e.form_message().map(str::to_string) else {
                return Err(e);
            };
            let page = render(
                &state,
                "admin_equipment_new.html",
                context! { form, error => message, accept => accept_list(&state) },
            )?;
            Ok((form_status(&e), page).into_response())
        }
    }
}

/// Edit form for active equipment
pub async fn admin_equipment_edit(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let item = state.services.inventory.get(id).await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(
        &state,
        "admin_equipment_edit.html",
        context! { item, flashes, accept => accept_list(&state) },
    )?;
    Ok((jar, page).into_response())
}

/// Apply an edit; a rejected edit is shown again with the submitted values
pub async fn admin_equipment_update(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Response> {
    let current = state.services.inventory.get(id).await?;
    let submission = EquipmentSubmission::from_multipart(multipart).await?;
    tracing::info!(
        "Equipment {} edit: upload dir {}, image {:?}",
        id,
        state.services.inventory.images().upload_dir().display(),
        submission.image_name()
    );

    let form = submission.form.clone();
    match state.services.inventory.update(id, submission.form, submission.image).await {
        Ok(saved) => {
            let mut messages = vec![Flash::success(format!("Equipment {} updated", saved.item.equipment.code))];
            messages.extend(saved.image_warning.map(Flash::warning));
            let jar = flash::push(jar, messages);
            Ok((jar, Redirect::to(&format!("/admin/equipments/{}/edit", id))).into_response())
        }
        Err(e) => {
            let Some(message) = e.form_message().map(str::to_string) else {
                return Err(e);
            };
            let item = current.with_submitted(&form);
            let page = render(
                &state,
                "admin_equipment_edit.html",
                context! { item, error => message, accept => accept_list(&state) },
            )?;
            Ok((form_status(&e), page).into_response())
        }
    }
}

/// Soft delete
pub async fn admin_equipment_delete(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    state.services.inventory.deactivate(id).await?;
    let jar = flash::push(jar, [Flash::success("Equipment removed")]);
    Ok((jar, Redirect::to(EQUIPMENT_LIST_URL)).into_response())
}

/// `accept` attribute for the file input
fn accept_list(state: &AppState) -> String {
    state
        .config
        .uploads
        .allowed_extensions
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}
