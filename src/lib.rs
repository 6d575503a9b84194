//! Equipment Inventory Server
//!
//! Registers equipment with photos, lends devices out and tracks their
//! return. Admin and lending pages are rendered on the server; a small
//! JSON API exposes the same equipment operations.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

pub mod api;
pub mod app;
pub mod blueprint;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub templates: Arc<minijinja::Environment<'static>>,
    pub cookie_key: Key,
}

impl AppState {
    /// Wire services, templates and the cookie key around a connection pool
    pub fn new(config: AppConfig, pool: PgPool) -> AppResult<Self> {
        let templates = web::templates::environment()?;
        let cookie_key = web::flash::signing_key(&config.security.secret_key);
        let services = services::Services::new(repository::Repository::new(pool), &config.uploads);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            templates: Arc::new(templates),
            cookie_key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
