//! Equipment image storage on the local filesystem

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

use crate::{
    config::{UploadsConfig, EQUIPMENT_UPLOAD_PREFIX},
    error::{AppError, AppResult},
};

/// File received from a form, before any check
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied name; only its extension is ever used
    pub file_name: String,
    pub bytes: Bytes,
}

/// Upload whose extension passed the policy
#[derive(Debug, Clone)]
pub struct CheckedImage {
    pub extension: String,
    pub bytes: Bytes,
}

/// Writes images under `<static_dir>/uploads/equipment` with random names
#[derive(Debug, Clone)]
pub struct ImageStore {
    upload_dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl ImageStore {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            upload_dir: config.upload_dir(),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Create the upload directory if missing. Safe to call on every boot.
    pub fn prepare(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        Ok(())
    }

    /// Message shown when an extension is refused
    pub fn rejection_message(&self) -> String {
        format!(
            "Only image files are allowed: {}",
            self.allowed_extensions.join(", ")
        )
    }

    /// Accept the upload if its extension (case-insensitive) is allowed
    pub fn check(&self, upload: ImageUpload) -> AppResult<CheckedImage> {
        let extension = upload
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| self.allowed_extensions.iter().any(|allowed| allowed == ext))
            .ok_or_else(|| AppError::Validation(self.rejection_message()))?;

        Ok(CheckedImage {
            extension,
            bytes: upload.bytes,
        })
    }

    /// Write the image under a fresh name and return its path relative to the static root
    pub async fn save(&self, image: &CheckedImage) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4().simple(), image.extension);
        let destination = self.upload_dir.join(&file_name);
        tokio::fs::write(&destination, &image.bytes).await?;

        let exists = tokio::fs::try_exists(&destination).await?;
        tracing::info!("Saved image to {} (exists: {})", destination.display(), exists);
        if !exists {
            return Err(AppError::Internal(format!(
                "Image written but not found at {}",
                destination.display()
            )));
        }

        Ok(format!("{}/{}", EQUIPMENT_UPLOAD_PREFIX, file_name))
    }

    /// Delete a file previously returned by [`ImageStore::save`]. Missing files are ignored.
    pub async fn remove(&self, image_path: &str) -> AppResult<()> {
        let Some(file_name) = image_path
            .strip_prefix(EQUIPMENT_UPLOAD_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
        else {
            return Err(AppError::BadRequest(format!("Not an upload path: {}", image_path)));
        };

        match tokio::fs::remove_file(self.upload_dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
