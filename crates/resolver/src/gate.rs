//! Capability gate for the bound manager.
//!
//! The manager's advertised capabilities are queried exactly once per
//! session. Concurrent first callers block on the same initialization and
//! every later caller reads the cached set without re-querying.

use std::sync::{Arc, OnceLock};

use log::debug;

use crate::errors::{ResolverError, Result};
use crate::manager::{Capability, ManagerCapabilities, ManagerInterface};

/// Checks manager capabilities before any backend operation.
pub struct CapabilityGate {
    manager: Arc<dyn ManagerInterface>,
    advertised: OnceLock<ManagerCapabilities>,
}

impl CapabilityGate {
    pub fn new(manager: Arc<dyn ManagerInterface>) -> Self {
        Self {
            manager,
            advertised: OnceLock::new(),
        }
    }

    pub fn manager(&self) -> &Arc<dyn ManagerInterface> {
        &self.manager
    }

    /// The advertised capability set, queried on first use.
    pub fn capabilities(&self) -> &ManagerCapabilities {
        self.advertised.get_or_init(|| {
            let capabilities = self.manager.capabilities();
            debug!(
                "Manager '{}' advertises capabilities: [{}]",
                self.manager.identifier(),
                capabilities
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            capabilities
        })
    }

    /// Whether the manager advertises `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().supports(capability)
    }

    /// Fail with [`ResolverError::Capability`] unless `capability` is advertised.
    pub fn ensure_capable(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            return Ok(());
        }

        debug!(
            "Manager '{}' lacks the '{}' capability",
            self.manager.identifier(),
            capability
        );
        Err(ResolverError::Capability {
            manager: self.manager.identifier().to_string(),
            capability,
        })
    }
}
