//! Resolution engine - entity reference to resolved location.
//!
//! Resolution order for one reference within one context:
//!
//! 1. Identifier cache hit -> return the cached location
//! 2. Capability gate for `resolution`
//! 3. Delegate to the manager for a native location plus metadata
//! 4. Normalize into an absolute path (search roots, `file://`, `.`/`..`)
//! 5. Cache under the literal reference string
//!
//! Backend failures are wrapped into [`ResolverError::Resolution`] and
//! propagated. There is never a fallback path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::context::ResolutionContext;
use crate::errors::{BackendError, ResolverError, Result};
use crate::gate::CapabilityGate;
use crate::manager::{Capability, EntityLocation, ManagerInterface};
use crate::models::{EntityReference, ResolvedLocation};
use crate::paths;

/// Stack of identifiers whose documents are currently being resolved.
///
/// Nested references re-enter the resolver one at a time. Entering an
/// identifier that is already in progress closes a cycle and fails with
/// [`ResolverError::Cycle`]. Siblings that share a descendant (a diamond) are
/// not cycles because each branch leaves the chain when it finishes.
#[derive(Clone, Debug, Default)]
pub struct ResolutionChain {
    in_progress: Vec<String>,
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `identifier`, failing if it is already in progress.
    pub fn enter(&mut self, identifier: &str) -> Result<()> {
        if self.contains(identifier) {
            let mut chain = self.in_progress.clone();
            chain.push(identifier.to_string());
            return Err(ResolverError::Cycle {
                reference: identifier.to_string(),
                chain,
            });
        }
        self.in_progress.push(identifier.to_string());
        Ok(())
    }

    /// Pop `identifier` once its document is done.
    pub fn leave(&mut self, identifier: &str) {
        if let Some(index) = self.in_progress.iter().rposition(|i| i == identifier) {
            self.in_progress.remove(index);
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.in_progress.iter().any(|i| i == identifier)
    }

    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    pub fn identifiers(&self) -> &[String] {
        &self.in_progress
    }
}

/// Resolves entity references through the bound manager.
pub struct ResolutionEngine {
    gate: CapabilityGate,
}

impl ResolutionEngine {
    pub fn new(manager: Arc<dyn ManagerInterface>) -> Self {
        Self {
            gate: CapabilityGate::new(manager),
        }
    }

    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    pub fn manager(&self) -> &Arc<dyn ManagerInterface> {
        self.gate.manager()
    }

    /// Resolve `reference` within `context`.
    pub fn resolve(
        &self,
        reference: &EntityReference,
        context: &ResolutionContext,
    ) -> Result<ResolvedLocation> {
        if let Some(cached) = context.cache().get(reference.as_str()) {
            debug!("Identifier cache hit for '{}'", reference);
            return Ok(cached);
        }

        self.gate.ensure_capable(Capability::Resolution)?;

        let entity = self
            .manager()
            .resolve(reference)
            .map_err(|e| ResolverError::from_backend(reference.as_str(), e))?;

        let location = self.to_resolved_location(reference, entity, context)?;
        debug!(
            "Resolved '{}' to {} via '{}'",
            reference,
            location.path.display(),
            self.manager().identifier()
        );

        context.cache().put(reference.as_str(), location.clone());
        Ok(location)
    }

    /// Resolve `reference` as part of a nested chain.
    ///
    /// Enters the reference into `chain` first; the caller leaves it once the
    /// resolved document has been fully processed.
    pub fn resolve_in_chain(
        &self,
        reference: &EntityReference,
        context: &ResolutionContext,
        chain: &mut ResolutionChain,
    ) -> Result<ResolvedLocation> {
        chain.enter(reference.as_str())?;
        self.resolve(reference, context).inspect_err(|_| {
            chain.leave(reference.as_str());
        })
    }

    /// Entity references are never write destinations.
    pub fn resolve_for_write(&self, reference: &EntityReference) -> Result<ResolvedLocation> {
        Err(ResolverError::WriteUnsupported {
            reference: reference.as_str().to_string(),
        })
    }

    fn to_resolved_location(
        &self,
        reference: &EntityReference,
        entity: EntityLocation,
        context: &ResolutionContext,
    ) -> Result<ResolvedLocation> {
        let path = normalize_location(reference, &entity.location, context)?;
        let extension = entity.extension.or_else(|| paths::extension_of(&path));

        Ok(ResolvedLocation {
            path,
            extension,
            modified: entity.modified,
            name: entity.name,
            version: entity.version,
        })
    }
}

/// Absolute path for a manager-native location.
///
/// Relative locations are looked up under the context's search roots in
/// order; when no root holds the file, the first root (or the working
/// directory when there are none) anchors it.
fn normalize_location(
    reference: &EntityReference,
    location: &str,
    context: &ResolutionContext,
) -> Result<PathBuf> {
    let raw = paths::strip_file_url(location);
    if raw.is_empty() {
        return Err(ResolverError::from_backend(
            reference.as_str(),
            BackendError::not_found("Manager returned an empty location"),
        ));
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        return Ok(paths::normalize(path));
    }

    if let Some(found) = context.find_in_search_paths(path) {
        return paths::absolutize(&found);
    }

    match context.search_paths().first() {
        Some(root) => paths::absolutize(&root.join(path)),
        None => paths::absolutize(path),
    }
}
