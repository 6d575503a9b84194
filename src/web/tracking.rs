//! Status board: where every device is

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use minijinja::context;

use super::{flash, render};
use crate::{blueprint::Blueprint, error::AppResult, AppState};

pub fn blueprint() -> Blueprint {
    Blueprint::new("tracking", "/track-status").route("track_index", "/", get(track_index))
}

pub async fn track_index(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let entries = state.services.lending.tracking_board().await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(&state, "track_index.html", context! { entries, flashes })?;
    Ok((jar, page).into_response())
}
