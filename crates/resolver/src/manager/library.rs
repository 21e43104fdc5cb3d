//! JSON library-backed manager.
//!
//! Serves entity references of the form `<prefix><entity-name>` from a JSON
//! document listing every entity and its location. Loaded once at
//! construction; the library is not re-read during a session.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{BackendError, BackendErrorCode, ResolverError, Result};
use crate::models::{AssetInfo, EntityReference};

use super::capabilities::{Capability, ManagerCapabilities};
use super::traits::{EntityLocation, ManagerInterface};

/// Variable expanded in entity locations to the directory holding the library file.
pub const LIBRARY_DIR_VAR: &str = "${library_dir}";

const DEFAULT_PREFIX: &str = "bal:///";

// ── JSON schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_capabilities")]
    pub capabilities: ManagerCapabilities,
    #[serde(default)]
    pub entities: HashMap<String, LibraryEntity>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntity {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_capabilities() -> ManagerCapabilities {
    ManagerCapabilities::new([
        Capability::Resolution,
        Capability::EntityReferenceIdentification,
        Capability::EntityTraitIntrospection,
        Capability::ExistenceQueries,
    ])
}

// ── Manager ──────────────────────────────────────────────────────────────────

/// Manager serving entities from a [`Library`].
pub struct LibraryManager {
    identifier: String,
    display_name: String,
    prefix: String,
    capabilities: ManagerCapabilities,
    entities: HashMap<String, LibraryEntity>,
    library_dir: PathBuf,
}

impl LibraryManager {
    /// Identifier used when the library does not name itself.
    pub const IDENTIFIER: &'static str = "org.assetio.manager.library";

    /// Build a manager from an in-memory library.
    ///
    /// `library_dir` replaces [`LIBRARY_DIR_VAR`] in entity locations.
    pub fn from_library(library: Library, library_dir: impl Into<PathBuf>) -> Self {
        let identifier = library
            .identifier
            .unwrap_or_else(|| Self::IDENTIFIER.to_string());
        let display_name = library
            .display_name
            .unwrap_or_else(|| "Library Manager".to_string());

        Self {
            identifier,
            display_name,
            prefix: library.prefix,
            capabilities: library.capabilities,
            entities: library.entities,
            library_dir: library_dir.into(),
        }
    }

    /// Parse a library from JSON text.
    pub fn from_json_str(json: &str, library_dir: impl Into<PathBuf>) -> Result<Self> {
        let library: Library = serde_json::from_str(json)
            .map_err(|e| ResolverError::Config(format!("Invalid library JSON: {}", e)))?;
        Ok(Self::from_library(library, library_dir))
    }

    /// Read and parse a library file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ResolverError::io(path, e))?;
        let library_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let manager = Self::from_json_str(&json, library_dir)?;
        debug!(
            "Loaded library '{}' with {} entities from {}",
            manager.identifier,
            manager.entities.len(),
            path.display()
        );
        Ok(manager)
    }

    fn expand(&self, location: &str) -> String {
        location.replace(LIBRARY_DIR_VAR, &self.library_dir.to_string_lossy())
    }

    fn entity(&self, reference: &EntityReference) -> std::result::Result<&LibraryEntity, BackendError> {
        if reference.prefix() != self.prefix {
            return Err(BackendError::new(
                BackendErrorCode::InvalidEntityReference,
                format!("'{}' is not a reference for {}", reference, self.identifier),
            ));
        }

        let name = reference.body();
        if name.is_empty() {
            return Err(BackendError::malformed(format!(
                "Entity reference '{}' has no entity name",
                reference
            )));
        }

        self.entities
            .get(name)
            .ok_or_else(|| BackendError::not_found(format!("Entity '{}' not found", reference)))
    }
}

impl ManagerInterface for LibraryManager {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn entity_reference_prefix(&self) -> &str {
        &self.prefix
    }

    fn capabilities(&self) -> ManagerCapabilities {
        self.capabilities.clone()
    }

    fn resolve(&self, reference: &EntityReference) -> std::result::Result<EntityLocation, BackendError> {
        let entity = self.entity(reference)?;
        let location = entity.location.as_deref().ok_or_else(|| {
            BackendError::not_found(format!("Entity '{}' has no location", reference))
        })?;

        Ok(EntityLocation {
            location: self.expand(location),
            extension: entity.extension.clone(),
            modified: entity.modified,
            name: entity.name.clone(),
            version: entity.version.clone(),
        })
    }

    fn entity_info(
        &self,
        reference: &EntityReference,
    ) -> std::result::Result<Option<AssetInfo>, BackendError> {
        let entity = self.entity(reference)?;
        let mut resolver_info = BTreeMap::new();
        resolver_info.insert("libraryEntity".to_string(), reference.body().to_string());

        Ok(Some(AssetInfo {
            asset_name: entity
                .name
                .clone()
                .or_else(|| Some(reference.body().to_string())),
            version: entity.version.clone(),
            resolver_info,
        }))
    }
}
