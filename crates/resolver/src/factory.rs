//! Resolver construction from a [`ResolverConfig`].

use std::sync::Arc;

use log::{info, warn};

use crate::config::ResolverConfig;
use crate::diagnostics::{DiagnosticSink, Diagnostics, LogSink};
use crate::errors::Result;
use crate::manager::{ManagerFactory, ManagerInterface};
use crate::resolver::AssetResolver;

/// Builds [`AssetResolver`]s, binding the manager the configuration selects.
pub struct ResolverFactory {
    managers: ManagerFactory,
}

impl ResolverFactory {
    pub fn new() -> Self {
        Self::with_managers(ManagerFactory::new())
    }

    /// Factory using a caller-populated manager registry.
    pub fn with_managers(managers: ManagerFactory) -> Self {
        Self { managers }
    }

    pub fn managers(&self) -> &ManagerFactory {
        &self.managers
    }

    pub fn managers_mut(&mut self) -> &mut ManagerFactory {
        &mut self.managers
    }

    /// Create a resolver reporting through the `log` facade.
    pub fn create(&self, config: &ResolverConfig) -> Result<AssetResolver> {
        let sinks: Vec<Arc<dyn DiagnosticSink>> = vec![Arc::new(LogSink)];
        self.create_with_sinks(config, sinks)
    }

    /// Create a resolver reporting to `sinks` at the configured severity.
    pub fn create_with_sinks(
        &self,
        config: &ResolverConfig,
        sinks: Vec<Arc<dyn DiagnosticSink>>,
    ) -> Result<AssetResolver> {
        let diagnostics = Diagnostics::with_sinks(config.severity, sinks);
        self.create_with_diagnostics(config, diagnostics)
    }

    /// Create a resolver, failing when the configured manager cannot be built.
    ///
    /// The failure is reported to `diagnostics` before it is returned.
    pub fn create_with_diagnostics(
        &self,
        config: &ResolverConfig,
        diagnostics: Diagnostics,
    ) -> Result<AssetResolver> {
        let manager = match self.bind_manager(config) {
            Ok(manager) => manager,
            Err(e) => {
                let subject = config
                    .config_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                diagnostics.report("AssetResolver::new", &subject, &e);
                return Err(e);
            }
        };

        if let Some(manager) = &manager {
            diagnostics.info(
                "AssetResolver::new",
                format!(
                    "Using manager '{}' ({})",
                    manager.display_name(),
                    manager.identifier()
                ),
            );
        }

        Ok(AssetResolver::new(config, manager, diagnostics))
    }

    fn bind_manager(&self, config: &ResolverConfig) -> Result<Option<Arc<dyn ManagerInterface>>> {
        match &config.config_path {
            Some(path) => {
                info!("Loading manager configuration from {}", path.display());
                self.managers.create_from_file(path).map(Some)
            }
            None => {
                warn!("No manager configured; entity references will not be recognized");
                Ok(None)
            }
        }
    }
}

impl Default for ResolverFactory {
    fn default() -> Self {
        Self::new()
    }
}
