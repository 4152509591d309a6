//! # vocabs-core
//!
//! Core types, traits, and abstractions for the vocabs SKOS vocabulary
//! editor.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the database and API crates depend on.

pub mod defaults;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod perms;
pub mod uuid_utils;
pub mod vocab;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use hierarchy::{join_label_path, ConceptPath, PATH_SEPARATOR};
pub use perms::{Permission, PermissionGrant, PermissionTarget, ALL_PERMISSIONS};
pub use uuid_utils::{is_v7, new_v7};
pub use vocab::*;
