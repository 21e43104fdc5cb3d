use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Concrete location an entity reference resolved to.
///
/// Produced by the resolution engine, immutable, and cached per
/// [`ResolutionContext`](crate::context::ResolutionContext) under the literal
/// reference string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Absolute, lexically normalized file-system path.
    pub path: PathBuf,

    /// File extension without the leading dot (e.g. `usda`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Modification time reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    /// Display name reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Version reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ResolvedLocation {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            extension: None,
            modified: None,
            name: None,
            version: None,
        }
    }
}

/// The resolver's answer for an identifier.
///
/// Empty when a plain path cannot be found, mirroring how asset-resolution
/// hosts treat "not resolvable" as a value rather than a failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for ResolvedPath {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Descriptive information about an asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Free-form resolver details (e.g. `entityReference`, `managerIdentifier`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resolver_info: BTreeMap<String, String>,
}
