//! Manager selection from a backend configuration file.
//!
//! The configuration file is TOML and owned by the backend:
//!
//! ```toml
//! [manager]
//! identifier = "org.assetio.manager.library"
//!
//! [manager.settings]
//! library_path = "library.json"
//! ```
//!
//! Relative paths inside `settings` resolve against the directory holding the
//! configuration file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use crate::errors::{ResolverError, Result};

use super::library::LibraryManager;
use super::traits::ManagerInterface;

/// Builds a manager from its settings.
pub type ManagerConstructor =
    Box<dyn Fn(&ManagerSettings) -> Result<Arc<dyn ManagerInterface>> + Send + Sync>;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    manager: ManagerSection,
}

#[derive(Debug, Deserialize)]
struct ManagerSection {
    identifier: String,
    #[serde(default)]
    settings: toml::Table,
}

/// Manager selection read from a configuration file.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    pub identifier: String,
    pub settings: ManagerSettings,
}

impl ManagerConfig {
    /// Parse configuration text. `base_dir` anchors relative settings paths.
    pub fn from_toml_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| ResolverError::Config(format!("Invalid manager config: {}", e)))?;

        Ok(Self {
            identifier: file.manager.identifier,
            settings: ManagerSettings {
                values: file.manager.settings,
                base_dir: base_dir.into(),
            },
        })
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ResolverError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(&text, base_dir)
    }
}

/// Backend-owned settings table plus the directory it was read from.
#[derive(Clone, Debug, Default)]
pub struct ManagerSettings {
    pub values: toml::Table,
    pub base_dir: PathBuf,
}

impl ManagerSettings {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// A settings value interpreted as a path, anchored at `base_dir` when relative.
    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key).map(|raw| {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base_dir.join(path)
            }
        })
    }

    pub fn require_path(&self, key: &str) -> Result<PathBuf> {
        self.path(key)
            .ok_or_else(|| ResolverError::Config(format!("Missing manager setting '{}'", key)))
    }
}

/// Registry of manager implementations keyed by identifier.
pub struct ManagerFactory {
    constructors: HashMap<String, ManagerConstructor>,
}

impl ManagerFactory {
    /// Create a factory knowing the built-in [`LibraryManager`].
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register(LibraryManager::IDENTIFIER, |settings| {
            let library_path = settings.require_path("library_path")?;
            let manager: Arc<dyn ManagerInterface> =
                Arc::new(LibraryManager::from_path(&library_path)?);
            Ok(manager)
        });
        factory
    }

    /// Create a factory with no registered implementations.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor for `identifier`.
    pub fn register<F>(&mut self, identifier: impl Into<String>, constructor: F)
    where
        F: Fn(&ManagerSettings) -> Result<Arc<dyn ManagerInterface>> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        debug!("Registering manager implementation '{}'", identifier);
        self.constructors.insert(identifier, Box::new(constructor));
    }

    /// Identifiers this factory can build, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Build the manager named by `config`.
    pub fn create(&self, config: &ManagerConfig) -> Result<Arc<dyn ManagerInterface>> {
        let constructor = self
            .constructors
            .get(&config.identifier)
            .ok_or_else(|| ResolverError::UnknownManager(config.identifier.clone()))?;

        let manager = constructor(&config.settings)?;
        info!(
            "Bound manager '{}' ({})",
            manager.display_name(),
            manager.identifier()
        );
        Ok(manager)
    }

    /// Read `path` and build the manager it selects.
    pub fn create_from_file(&self, path: &Path) -> Result<Arc<dyn ManagerInterface>> {
        let config = ManagerConfig::load(path)?;
        self.create(&config)
    }
}

impl Default for ManagerFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = ManagerConfig::from_toml_str(
            r#"
            [manager]
            identifier = "org.assetio.manager.library"

            [manager.settings]
            library_path = "library.json"
            "#,
            "/configs",
        )
        .unwrap();

        assert_eq!(config.identifier, "org.assetio.manager.library");
        assert_eq!(
            config.settings.path("library_path"),
            Some(PathBuf::from("/configs/library.json"))
        );
    }

    #[test]
    fn test_absolute_setting_path_is_kept() {
        let config = ManagerConfig::from_toml_str(
            r#"
            [manager]
            identifier = "x"
            [manager.settings]
            library_path = "/abs/library.json"
            "#,
            "/configs",
        )
        .unwrap();
        assert_eq!(
            config.settings.path("library_path"),
            Some(PathBuf::from("/abs/library.json"))
        );
    }

    #[test]
    fn test_missing_manager_section() {
        let result = ManagerConfig::from_toml_str("[other]\nvalue = 1\n", "/");
        assert!(matches!(result, Err(ResolverError::Config(_))));
    }

    #[test]
    fn test_unknown_manager() {
        let factory = ManagerFactory::new();
        let config = ManagerConfig::from_toml_str("[manager]\nidentifier = \"nope\"\n", "/").unwrap();
        match factory.create(&config) {
            Err(ResolverError::UnknownManager(id)) => assert_eq!(id, "nope"),
            _ => panic!("Expected UnknownManager error"),
        }
    }

    #[test]
    fn test_library_requires_path_setting() {
        let factory = ManagerFactory::new();
        let config = ManagerConfig::from_toml_str(
            "[manager]\nidentifier = \"org.assetio.manager.library\"\n",
            "/",
        )
        .unwrap();
        assert!(matches!(factory.create(&config), Err(ResolverError::Config(_))));
    }

    #[test]
    fn test_identifiers() {
        let factory = ManagerFactory::new();
        assert_eq!(factory.identifiers(), vec![LibraryManager::IDENTIFIER]);
    }
}
