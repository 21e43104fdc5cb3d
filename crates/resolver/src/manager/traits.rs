//! Manager backend trait definitions.
//!
//! This module defines the `ManagerInterface` trait that every asset
//! management backend bound to the resolver implements.

use chrono::{DateTime, Utc};

use crate::errors::BackendError;
use crate::models::{AssetInfo, EntityReference};

use super::capabilities::ManagerCapabilities;

/// What a manager reports for a successfully resolved entity.
///
/// `location` is native to the manager: an absolute path, a path relative to
/// the resolution context's search roots, or a `file://` URL. The engine
/// normalizes it before caching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityLocation {
    pub location: String,
    pub extension: Option<String>,
    pub modified: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub version: Option<String>,
}

impl EntityLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }
}

/// Trait for asset management backends.
///
/// Implement this trait to bind a new backend to the resolver. The resolver
/// asks for [`capabilities`](Self::capabilities) once per session and never
/// calls [`resolve`](Self::resolve) on a manager that does not advertise
/// [`Capability::Resolution`](super::Capability::Resolution).
///
/// # Example
///
/// ```ignore
/// use assetio_resolver::manager::{Capability, EntityLocation, ManagerCapabilities, ManagerInterface};
///
/// struct MyManager;
///
/// impl ManagerInterface for MyManager {
///     fn identifier(&self) -> &str {
///         "com.example.manager"
///     }
///
///     fn entity_reference_prefix(&self) -> &str {
///         "example:///"
///     }
///
///     fn capabilities(&self) -> ManagerCapabilities {
///         ManagerCapabilities::new([Capability::Resolution])
///     }
///
///     fn resolve(&self, reference: &EntityReference) -> Result<EntityLocation, BackendError> {
///         Ok(EntityLocation::new(format!("/assets/{}.usda", reference.body())))
///     }
/// }
/// ```
pub trait ManagerInterface: Send + Sync {
    /// Unique identifier for this manager, e.g. `org.assetio.manager.library`.
    ///
    /// Used in diagnostics and capability errors.
    fn identifier(&self) -> &str;

    /// Human readable name. Defaults to the identifier.
    fn display_name(&self) -> &str {
        self.identifier()
    }

    /// Scheme prefix that marks a string as one of this manager's entity
    /// references, e.g. `bal:///`.
    fn entity_reference_prefix(&self) -> &str;

    /// Operation kinds this manager supports.
    fn capabilities(&self) -> ManagerCapabilities;

    /// Resolve an entity reference to a native location plus metadata.
    ///
    /// Blocking. Either returns a location or fails immediately.
    fn resolve(&self, reference: &EntityReference) -> Result<EntityLocation, BackendError>;

    /// Fetch descriptive information about an entity.
    ///
    /// Only called when the manager advertises
    /// [`Capability::EntityTraitIntrospection`](super::Capability::EntityTraitIntrospection).
    /// Default implementation reports nothing.
    fn entity_info(&self, reference: &EntityReference) -> Result<Option<AssetInfo>, BackendError> {
        let _ = reference;
        Ok(None)
    }
}
