//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Status given to equipment created without an explicit one
pub const DEFAULT_STATUS: &str = "available";

/// Status of equipment currently lent out
pub const BORROWED_STATUS: &str = "borrowed";

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please enter the equipment name and code";

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub equipment_id: i32,
    pub name: String,
    /// Inventory code, unique across active and inactive rows
    pub code: String,
    pub category: String,
    pub detail: String,
    pub brand: String,
    /// Free-form status ("available", "borrowed", "repair", ...)
    pub status: String,
    pub buy_date: Option<NaiveDate>,
    /// Soft-delete flag
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image attached to an equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentImage {
    pub id: i32,
    pub equipment_id: i32,
    /// Path relative to the static root (uploads/equipment/<name>.<ext>)
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

/// Equipment with its images, oldest image first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentWithImages {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub images: Vec<EquipmentImage>,
}

impl EquipmentWithImages {
    /// Copy of this record with the submitted form values applied in memory.
    /// Used to re-render a rejected edit; nothing is persisted.
    pub fn with_submitted(&self, form: &EquipmentForm) -> Self {
        let form = form.clone().normalized();
        let mut preview = self.clone();
        let equipment = &mut preview.equipment;
        equipment.name = form.name;
        equipment.code = form.code;
        equipment.category = form.category;
        equipment.detail = form.detail;
        equipment.brand = form.brand;
        equipment.buy_date = parse_buy_date(&form.buy_date);
        if !form.status.is_empty() {
            equipment.status = form.status;
        }
        preview
    }
}

/// Equipment listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EquipmentQuery {
    /// Case-insensitive substring of name or code
    pub q: Option<String>,
    /// Exact category
    pub category: Option<String>,
}

impl EquipmentQuery {
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.q.as_deref())
    }

    pub fn category_filter(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Raw equipment fields as submitted by the admin form or the JSON API.
/// Every field is optional on the wire and `null` reads as blank; checks
/// happen in [`EquipmentForm::into_draft`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct EquipmentForm {
    #[serde(deserialize_with = "null_as_blank")]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(deserialize_with = "null_as_blank")]
    #[validate(length(min = 1))]
    pub code: String,
    #[serde(deserialize_with = "null_as_blank")]
    pub category: String,
    #[serde(deserialize_with = "null_as_blank")]
    pub detail: String,
    #[serde(deserialize_with = "null_as_blank")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_blank")]
    pub status: String,
    /// Purchase date as YYYY-MM-DD; anything else is ignored
    #[serde(deserialize_with = "null_as_blank")]
    pub buy_date: String,
}

fn null_as_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl EquipmentForm {
    /// Trim surrounding whitespace from every field
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            category: self.category.trim().to_string(),
            detail: self.detail.trim().to_string(),
            brand: self.brand.trim().to_string(),
            status: self.status.trim().to_string(),
            buy_date: self.buy_date.trim().to_string(),
        }
    }

    /// Validate and convert into the values written to the database
    pub fn into_draft(self) -> AppResult<EquipmentDraft> {
        let form = self.normalized();
        form.validate()
            .map_err(|_| AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()))?;

        let buy_date = parse_buy_date(&form.buy_date);
        Ok(EquipmentDraft {
            name: form.name,
            code: form.code,
            category: form.category,
            detail: form.detail,
            brand: form.brand,
            status: Some(form.status).filter(|s| !s.is_empty()),
            buy_date,
        })
    }
}

/// Validated equipment fields
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentDraft {
    pub name: String,
    pub code: String,
    pub category: String,
    pub detail: String,
    pub brand: String,
    /// `None` when the form left it blank
    pub status: Option<String>,
    pub buy_date: Option<NaiveDate>,
}

/// Lenient purchase-date parsing: blank or malformed input yields `None`
pub fn parse_buy_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
