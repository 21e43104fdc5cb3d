//! Resolver configuration passed at construction time.

use std::path::PathBuf;

use log::warn;

use crate::diagnostics::Severity;

/// Environment variable selecting the diagnostic severity (`info` or `debug`).
pub const LOG_ENV: &str = "ASSETIO_RESOLVER_LOG";

/// Environment variable naming the backend configuration file.
pub const CONFIG_ENV: &str = "ASSETIO_DEFAULT_CONFIG";

/// Environment variable listing default search roots (platform path-list syntax).
pub const SEARCH_PATH_ENV: &str = "ASSETIO_SEARCH_PATH";

/// Options recognized by [`AssetResolver`](crate::AssetResolver).
#[derive(Clone, Debug, Default)]
pub struct ResolverConfig {
    /// Diagnostic severity; `Debug` traces every host-boundary call.
    pub severity: Severity,
    /// Backend configuration file. Without one, no manager is bound and every
    /// path is handled as a plain file path.
    pub config_path: Option<PathBuf>,
    /// Default search roots for new resolution contexts.
    pub search_paths: Vec<PathBuf>,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths = paths.into_iter().collect();
        self
    }

    /// Read the configuration once from the process environment.
    ///
    /// Unknown severities fall back to informational with a warning.
    pub fn from_env() -> Self {
        let severity = match std::env::var(LOG_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|e: String| {
                warn!("{}; using informational diagnostics", e);
                Severity::Informational
            }),
            Err(_) => Severity::Informational,
        };

        let config_path = std::env::var_os(CONFIG_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let search_paths = std::env::var_os(SEARCH_PATH_ENV)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            severity,
            config_path,
            search_paths,
        }
    }
}
