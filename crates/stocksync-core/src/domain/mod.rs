//! Domain entities and business logic
//!
//! This module contains the core domain types for StockSync:
//! - Newtypes for identifiers, sync status and the record envelope
//! - The [`Entity`] trait shared by all record kinds
//! - Branch, User, Product and Sale records with their drafts and patches
//! - Domain-specific error types

pub mod branch;
pub mod entity;
pub mod errors;
pub mod newtypes;
pub mod product;
pub mod sale;
pub mod user;

// Re-export commonly used types
pub use branch::{Branch, BranchDraft, BranchPatch};
pub use entity::Entity;
pub use errors::DomainError;
pub use newtypes::*;
pub use product::{Product, ProductDraft, ProductPatch};
pub use sale::{Sale, SaleDraft, SalePatch};
pub use user::{User, UserDraft, UserPatch, UserRole};
