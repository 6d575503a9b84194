//! Multipart parsing for the equipment forms

use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::equipment::EquipmentForm,
    storage::ImageUpload,
};

/// Equipment form fields plus the optional image file
#[derive(Debug, Default)]
pub struct EquipmentSubmission {
    pub form: EquipmentForm,
    pub image: Option<ImageUpload>,
}

impl EquipmentSubmission {
    /// Read every part of a `multipart/form-data` body.
    /// A file input left empty arrives with an empty filename and is ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read form data: {}", e))
        })? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    continue;
                }
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read image data: {}", e))
                })?;
                submission.image = Some(ImageUpload { file_name, bytes });
                continue;
            }

            let slot = match name.as_str() {
                "name" => &mut submission.form.name,
                "code" => &mut submission.form.code,
                "category" => &mut submission.form.category,
                "detail" => &mut submission.form.detail,
                "brand" => &mut submission.form.brand,
                "status" => &mut submission.form.status,
                "buy_date" => &mut submission.form.buy_date,
                _ => {
                    tracing::debug!("Ignoring unknown field: {}", name);
                    continue;
                }
            };
            *slot = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read field {}: {}", name, e))
            })?;
        }

        Ok(submission)
    }

    /// Client file name of the image, for logging
    pub fn image_name(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.file_name.as_str())
    }
}
