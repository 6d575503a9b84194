//! Public landing page

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
    Blueprint::new("pages", "").route("home", "/home", get(home))
}

pub async fn home(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let (jar, flashes) = flash::take(jar);
    let page = render(&state, "home.html", context! { flashes })?;
    Ok((jar, page).into_response())
}
