//! Staff sign-in and the session guard
//!
//! The signed-in user lives in a signed cookie. Handlers that need a user
//! take a [`CurrentUser`]; without a session, pages redirect to the login
//! form and API calls answer 401.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, Method},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use minijinja::context;

use super::{
    flash::{self, Flash},
    form_status, render,
};
use crate::{
    blueprint::Blueprint,
    error::{AppError, AppResult},
    models::user::{LoginForm, SessionUser},
    AppState,
};

const SESSION_COOKIE: &str = "inventory_session";
const LOGIN_URL: &str = "/auth/login";
const AFTER_LOGIN_URL: &str = "/admin";

pub fn blueprint() -> Blueprint {
    Blueprint::new("auth", "/auth")
        .route("login", "/login", get(login))
        .route("login_submit", "/login", post(login_submit))
        .route("logout", "/logout", post(logout))
}

/// Signed-in user, required by every admin handler
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        if let Some(user) = session_user(&jar) {
            return Ok(CurrentUser(user));
        }

        if parts.uri.path().starts_with("/api/") {
            return Err(AppError::Authentication("Login required".to_string()).into_response());
        }

        // Only a GET can be replayed after signing in
        let next = match parts.method {
            Method::GET => parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(AFTER_LOGIN_URL),
            _ => AFTER_LOGIN_URL,
        };
        Err(Redirect::to(&login_url(next)).into_response())
    }
}

/// Store the user in the session cookie
pub fn sign_in(jar: SignedCookieJar, user: &SessionUser) -> AppResult<SignedCookieJar> {
    let json = serde_json::to_string(user)
        .map_err(|e| AppError::Internal(format!("Could not encode session: {}", e)))?;

    Ok(jar.add(
        Cookie::build((SESSION_COOKIE, urlencoding::encode(&json).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    ))
}

pub fn sign_out(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn session_user(jar: &SignedCookieJar) -> Option<SessionUser> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let json = urlencoding::decode(cookie.value()).ok()?;
    serde_json::from_str(&json).ok()
}

fn login_url(next: &str) -> String {
    format!("{}?next={}", LOGIN_URL, urlencoding::encode(next))
}

/// Local path to continue to after login; anything else falls back to the dashboard
fn safe_next(next: &str) -> &str {
    let next = next.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        AFTER_LOGIN_URL
    }
}

/// Login form
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(form): Query<LoginForm>,
) -> AppResult<Response> {
    let (jar, flashes) = flash::take(jar);
    let page = render(&state, "login.html", context! { flashes, form })?;
    Ok((jar, page).into_response())
}

/// Check credentials and open a session
pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.services.auth.authenticate(&form).await {
        Ok(user) => {
            let jar = sign_in(jar, &SessionUser::from(&user))?;
            let jar = flash::push(jar, [Flash::success(format!("Signed in as {}", user.username))]);
            Ok((jar, Redirect::to(safe_next(&form.next))).into_response())
        }
        Err(e) => {
            let Some(message) = e.form_message().map(str::to_string) else {
                return Err(e);
            };
            let page = render(&state, "login.html", context! { form, error => message })?;
            Ok((form_status(&e), page).into_response())
        }
    }
}

/// End the session
pub async fn logout(jar: SignedCookieJar) -> Response {
    let jar = flash::push(sign_out(jar), [Flash::success("Signed out")]);
    (jar, Redirect::to(LOGIN_URL)).into_response()
}
