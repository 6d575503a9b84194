//! Admin dashboard and staff accounts

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use minijinja::context;

use super::{
    auth::CurrentUser,
    flash::{self, Flash},
    form_status, render,
};
use crate::{blueprint::Blueprint, error::AppResult, models::user::CreateUser, AppState};

pub fn blueprint() -> Blueprint {
    Blueprint::new("admin", "/admin")
        .route("admin_home", "/", get(admin_home))
        .route("users", "/users", get(users))
        .route("users_create", "/users", post(users_create))
}

/// Inventory counters
pub async fn admin_home(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let summary = state.services.lending.summary().await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(&state, "admin_home.html", context! { summary, flashes, current })?;
    Ok((jar, page).into_response())
}

pub async fn users(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let users = state.services.auth.list_users().await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(
        &state,
        "admin_users.html",
        context! { users, flashes, current, form => CreateUser::default() },
    )?;
    Ok((jar, page).into_response())
}

pub async fn users_create(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    jar: SignedCookieJar,
    Form(form): Form<CreateUser>,
) -> AppResult<Response> {
    match state.services.auth.create_user(form.clone()).await {
        Ok(user) => {
            tracing::info!("{} added user {}", current.username, user.username);
            let jar = flash::push(jar, [Flash::success(format!("User {} created", user.username))]);
            Ok((jar, Redirect::to("/admin/users")).into_response())
        }
        Err(e) => {
            let Some(message) = e.form_message().map(str::to_string) else {
                return Err(e);
            };
            let users = state.services.auth.list_users().await?;
            let page = render(
                &state,
                "admin_users.html",
                context! { users, current, form, error => message },
            )?;
            Ok((form_status(&e), page).into_response())
        }
    }
}
