//! Rollcall Core — domain models, the permission catalog, error types
//! and repository traits shared by every Rollcall crate.

pub mod catalog;
pub mod error;
pub mod models;
pub mod repository;

pub use catalog::PermissionCatalog;
pub use error::{RollcallError, RollcallResult};
pub use models::permission::{PermissionSet, WILDCARD};
