//! Lending service

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{BORROWED_STATUS, DEFAULT_STATUS},
        lending::{CreateLending, InventorySummary, Lending, LendingDetails, TrackingEntry},
    },
    repository::{self, Repository},
};

const HISTORY_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Lend an available device
    pub async fn lend(&self, request: CreateLending) -> AppResult<Lending> {
        let equipment_id = request
            .equipment_id
            .ok_or_else(|| AppError::Validation("Please choose a device".to_string()))?;
        let borrower = request.borrower.trim();
        if borrower.is_empty() {
            return Err(AppError::Validation("Please enter the borrower's name".to_string()));
        }
        let note = Some(request.note.trim()).filter(|n| !n.is_empty());

        let mut uow = self.repository.begin().await?;
        let equipment = match repository::equipment::lock_active(&mut uow, equipment_id).await {
            Ok(equipment) => equipment,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::BusinessRule("This device is no longer available".to_string()));
            }
            Err(e) => return Err(e),
        };
        if equipment.status != DEFAULT_STATUS {
            return Err(AppError::BusinessRule(format!(
                "{} is not available (status: {})",
                equipment.code, equipment.status
            )));
        }

        let lending = repository::lendings::insert(&mut uow, equipment_id, borrower, note).await?;
        repository::equipment::set_status(&mut uow, equipment_id, BORROWED_STATUS).await?;
        uow.commit().await?;

        tracing::info!("Lent {} to {}", equipment.code, lending.borrower);
        Ok(lending)
    }

    /// Close a lending and make the device available again
    pub async fn return_lending(&self, lending_id: i32) -> AppResult<Lending> {
        let mut uow = self.repository.begin().await?;
        let lending = repository::lendings::close(&mut uow, lending_id).await?;

        match repository::equipment::set_status(&mut uow, lending.equipment_id, DEFAULT_STATUS).await {
            Ok(()) => {}
            // Deactivated meanwhile: the lending still closes
            Err(AppError::NotFound(_)) => {
                tracing::warn!("Returned lending {} for inactive equipment {}", lending_id, lending.equipment_id);
            }
            Err(e) => return Err(e),
        }
        uow.commit().await?;

        tracing::info!("Lending {} returned", lending_id);
        Ok(lending)
    }

    pub async fn history(&self) -> AppResult<Vec<LendingDetails>> {
        let mut conn = self.repository.acquire().await?;
        repository::lendings::history(&mut conn, HISTORY_LIMIT).await
    }

    pub async fn tracking_board(&self) -> AppResult<Vec<TrackingEntry>> {
        let mut conn = self.repository.acquire().await?;
        repository::lendings::tracking_board(&mut conn).await
    }

    pub async fn summary(&self) -> AppResult<InventorySummary> {
        let mut conn = self.repository.acquire().await?;
        repository::lendings::summary(&mut conn).await
    }
}
