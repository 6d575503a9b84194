//! Lending model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lending record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lending {
    pub lending_id: i32,
    pub equipment_id: i32,
    pub borrower: String,
    pub note: Option<String>,
    pub lent_at: DateTime<Utc>,
    /// NULL while the device is still out
    pub returned_at: Option<DateTime<Utc>>,
}

/// Lending joined with the equipment it refers to, for history pages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LendingDetails {
    pub lending_id: i32,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub equipment_code: String,
    pub borrower: String,
    pub note: Option<String>,
    pub lent_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// One line of the tracking board
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TrackingEntry {
    pub equipment_id: i32,
    pub name: String,
    pub code: String,
    pub category: String,
    pub status: String,
    /// Open lending, if the device is out
    pub lending_id: Option<i32>,
    pub borrower: Option<String>,
    pub lent_at: Option<DateTime<Utc>>,
}

/// Lend form / request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateLending {
    pub equipment_id: Option<i32>,
    pub borrower: String,
    pub note: String,
}

/// Counters for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InventorySummary {
    pub active_equipment: i64,
    pub available: i64,
    pub borrowed: i64,
    pub open_lendings: i64,
}
