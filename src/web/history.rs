//! Lending history

use axum::{extract::State, response::Html, routing::get};
use minijinja::context;

use super::render;
use crate::{blueprint::Blueprint, error::AppResult, AppState};

pub fn blueprint() -> Blueprint {
    Blueprint::new("history", "/history").route("index", "/", get(index))
}

pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let lendings = state.services.lending.history().await?;
    render(&state, "history.html", context! { lendings })
}
