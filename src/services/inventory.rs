//! Equipment inventory service
//!
//! Create and edit couple form validation, database writes and image files.
//! Validation happens before any unit of work is opened, so a rejected form
//! never touches the database.

use crate::{
    error::{AppError, AppResult},
    models::equipment::{EquipmentForm, EquipmentImage, EquipmentQuery, EquipmentWithImages},
    repository::{self, Repository},
    storage::{CheckedImage, ImageStore, ImageUpload},
};

pub const CODE_IN_USE: &str = "This code is already in use";
pub const IMAGE_UPLOAD_FAILED: &str = "Image upload failed";

/// Equipment after a successful create or edit
#[derive(Debug)]
pub struct SavedEquipment {
    pub item: EquipmentWithImages,
    /// Set when the fields were saved but the image was not
    pub image_warning: Option<String>,
}

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
    images: ImageStore,
}

impl InventoryService {
    pub fn new(repository: Repository, images: ImageStore) -> Self {
        Self { repository, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Active equipment matching the filters, newest first
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<EquipmentWithImages>> {
        let mut conn = self.repository.acquire().await?;
        repository::equipment::list(&mut conn, query).await
    }

    /// Equipment that can be lent right now
    pub async fn list_for_lending(&self) -> AppResult<Vec<EquipmentWithImages>> {
        let mut conn = self.repository.acquire().await?;
        repository::equipment::list_available(&mut conn).await
    }

    /// Active equipment by id
    pub async fn get(&self, id: i32) -> AppResult<EquipmentWithImages> {
        let mut conn = self.repository.acquire().await?;
        repository::equipment::find_active(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment, then attach the optional image.
    ///
    /// The equipment row and the image row are committed separately: if the
    /// image cannot be stored the equipment still exists, without an image,
    /// and `image_warning` says so.
    pub async fn create(&self, form: EquipmentForm, image: Option<ImageUpload>) -> AppResult<SavedEquipment> {
        let draft = form.into_draft()?;
        let image = image.map(|upload| self.images.check(upload)).transpose()?;

        let mut uow = self.repository.begin().await?;
        let equipment = match repository::equipment::insert(&mut uow, &draft).await {
            Ok(row) => row,
            Err(e) if e.is_unique_violation() => {
                uow.rollback().await?;
                tracing::info!("Equipment code {} already in use", draft.code);
                return Err(AppError::Conflict(CODE_IN_USE.to_string()));
            }
            Err(e) => return Err(e),
        };
        uow.commit().await?;
        tracing::info!("Created equipment {} ({})", equipment.equipment_id, equipment.code);

        let mut saved = SavedEquipment {
            item: EquipmentWithImages { equipment, images: Vec::new() },
            image_warning: None,
        };

        if let Some(image) = image {
            let equipment_id = saved.item.equipment.equipment_id;
            match self.attach_image(equipment_id, &image).await {
                Ok(row) => saved.item.images.push(row),
                Err(e) => {
                    tracing::error!("Image save failed for equipment {}: {}", equipment_id, e);
                    saved.image_warning = Some(IMAGE_UPLOAD_FAILED.to_string());
                }
            }
        }

        Ok(saved)
    }

    /// Update the fields of active equipment and add the optional image.
    ///
    /// Field changes are committed even when the image file cannot be
    /// written; the failure is reported through `image_warning`. Existing
    /// images are never removed.
    pub async fn update(&self, id: i32, form: EquipmentForm, image: Option<ImageUpload>) -> AppResult<SavedEquipment> {
        let draft = form.into_draft()?;
        let image = image.map(|upload| self.images.check(upload)).transpose()?;

        let mut uow = self.repository.begin().await?;
        repository::equipment::lock_active(&mut uow, id).await?;

        match repository::equipment::update(&mut uow, id, &draft).await {
            Ok(_) => {}
            Err(e) if e.is_unique_violation() => {
                uow.rollback().await?;
                tracing::info!("Equipment code {} already in use", draft.code);
                return Err(AppError::Conflict(CODE_IN_USE.to_string()));
            }
            Err(e) => return Err(e),
        }

        let mut image_warning = None;
        let mut written = None;
        if let Some(image) = image {
            match self.images.save(&image).await {
                Ok(path) => {
                    if let Err(e) = repository::equipment::insert_image(&mut uow, id, &path).await {
                        self.discard(&path).await;
                        return Err(e);
                    }
                    written = Some(path);
                }
                Err(e) => {
                    tracing::error!("Image save failed for equipment {}: {}", id, e);
                    image_warning = Some(IMAGE_UPLOAD_FAILED.to_string());
                }
            }
        }

        if let Err(e) = uow.commit().await {
            if let Some(path) = written {
                self.discard(&path).await;
            }
            return Err(e.into());
        }
        tracing::info!("Updated equipment {}", id);

        Ok(SavedEquipment {
            item: self.get(id).await?,
            image_warning,
        })
    }

    /// Soft delete
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        let mut uow = self.repository.begin().await?;
        repository::equipment::deactivate(&mut uow, id).await?;
        uow.commit().await?;
        tracing::info!("Deactivated equipment {}", id);
        Ok(())
    }

    /// Write the file, then record it in its own unit of work
    async fn attach_image(&self, equipment_id: i32, image: &CheckedImage) -> AppResult<EquipmentImage> {
        let path = self.images.save(image).await?;

        let recorded = async {
            let mut uow = self.repository.begin().await?;
            let row = repository::equipment::insert_image(&mut uow, equipment_id, &path).await?;
            uow.commit().await?;
            Ok::<_, AppError>(row)
        }
        .await;

        if recorded.is_err() {
            self.discard(&path).await;
        }
        recorded
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.images.remove(path).await {
            tracing::warn!("Could not remove orphaned image {}: {}", path, e);
        }
    }
}
