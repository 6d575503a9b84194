//! Server-rendered admin and lending pages

pub mod admin;
pub mod auth;
pub mod flash;
pub mod forms;
pub mod history;
pub mod inventory;
pub mod pages;
pub mod templates;
pub mod tracking;

use axum::{http::StatusCode, response::Html};
use minijinja::Value;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Render a template from the shared environment
pub fn render(state: &AppState, name: &str, ctx: Value) -> AppResult<Html<String>> {
    let template = state.templates.get_template(name)?;
    Ok(Html(template.render(ctx)?))
}

/// Status used when a form is shown again with an inline error
pub fn form_status(error: &AppError) -> StatusCode {
    match error {
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
