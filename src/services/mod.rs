//! Business logic services

pub mod auth;
pub mod inventory;
pub mod lending;

use crate::{config::UploadsConfig, repository::Repository, storage::ImageStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub inventory: inventory::InventoryService,
    pub lending: lending::LendingService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, uploads: &UploadsConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone(), ImageStore::new(uploads)),
            lending: lending::LendingService::new(repository),
        }
    }
}
