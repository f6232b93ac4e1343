//! Domain models for Rollcall.
//!
//! These are the core types shared across all crates.

pub mod permission;
pub mod role;
pub mod tenant_permission;
pub mod user;
