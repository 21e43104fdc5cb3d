//! Resolver models
//!
//! This module contains the core data types for resolution:
//! - `types` - Type aliases (Timestamp)
//! - `reference` - Entity references and the classification of raw asset paths
//! - `location` - Resolved locations, resolved paths and asset info

mod location;
mod reference;
mod types;

pub use location::{AssetInfo, ResolvedLocation, ResolvedPath};
pub use reference::{AssetPath, EntityReference};
pub use types::Timestamp;
