//! Data models for the inventory server

pub mod equipment;
pub mod lending;
pub mod user;

// Re-export commonly used types
pub use equipment::{Equipment, EquipmentForm, EquipmentImage, EquipmentQuery, EquipmentWithImages};
pub use lending::{CreateLending, InventorySummary, Lending, LendingDetails, TrackingEntry};
pub use user::{CreateUser, LoginForm, SessionUser, User};
