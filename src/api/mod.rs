//! JSON endpoints

pub mod equipment;
pub mod health;
pub mod openapi;

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections use the JSON error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
