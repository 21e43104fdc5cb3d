//! Host boundary.
//!
//! [`AssetResolver`] is what an asset-resolution host calls, once per
//! reference and per operation: create-identifier, resolve, get-extension,
//! get-asset-info, open-asset, get-modification-timestamp and the write-side
//! counterparts. Entity references are routed through the
//! [`ResolutionEngine`]; every other path goes to the default file resolver.
//!
//! Every call emits an entry trace (debug severity) and every failure is
//! reported to the diagnostics channel before it propagates.

mod asset;
mod file;

pub use asset::{Asset, WritableAsset, WriteMode};

use std::path::PathBuf;
use std::sync::Arc;

use crate::classifier::ReferenceClassifier;
use crate::config::ResolverConfig;
use crate::context::ResolutionContext;
use crate::diagnostics::Diagnostics;
use crate::engine::{ResolutionChain, ResolutionEngine};
use crate::errors::{ResolverError, Result};
use crate::manager::{Capability, ManagerInterface};
use crate::models::{AssetInfo, AssetPath, EntityReference, ResolvedPath, Timestamp};

const LIFECYCLE_NEW: &str = "AssetResolver::new";
const LIFECYCLE_DROP: &str = "AssetResolver::drop";

enum Route<'a> {
    Entity(&'a ResolutionEngine, EntityReference),
    Plain(&'a str),
}

/// Resolver exposed to the host framework.
pub struct AssetResolver {
    classifier: ReferenceClassifier,
    engine: Option<ResolutionEngine>,
    diagnostics: Diagnostics,
    search_paths: Vec<PathBuf>,
}

impl AssetResolver {
    /// Create a resolver bound to `manager`, or a plain-path-only resolver
    /// when there is none.
    pub fn new(
        config: &ResolverConfig,
        manager: Option<Arc<dyn ManagerInterface>>,
        diagnostics: Diagnostics,
    ) -> Self {
        let classifier = manager
            .as_deref()
            .map(|m| ReferenceClassifier::for_manager(m))
            .unwrap_or_else(ReferenceClassifier::disabled);

        let resolver = Self {
            classifier,
            engine: manager.map(ResolutionEngine::new),
            diagnostics,
            search_paths: config.search_paths.clone(),
        };
        resolver.diagnostics.trace(LIFECYCLE_NEW, None);
        resolver
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The bound manager, if any.
    pub fn manager(&self) -> Option<&Arc<dyn ManagerInterface>> {
        self.engine.as_ref().map(ResolutionEngine::manager)
    }

    pub fn classifier(&self) -> &ReferenceClassifier {
        &self.classifier
    }

    /// A fresh context over the configured search roots.
    pub fn create_context(&self) -> ResolutionContext {
        ResolutionContext::new(self.search_paths.clone())
    }

    /// A fresh context over explicit search roots.
    pub fn create_context_with(&self, search_paths: Vec<PathBuf>) -> ResolutionContext {
        ResolutionContext::new(search_paths)
    }

    pub fn is_entity_reference(&self, asset_path: &str) -> bool {
        self.engine.is_some() && self.classifier.is_entity_reference(asset_path)
    }

    fn route<'a>(&'a self, asset_path: &'a str) -> Route<'a> {
        match (&self.engine, self.classifier.classify(asset_path)) {
            (Some(engine), AssetPath::Entity(reference)) => Route::Entity(engine, reference),
            _ => Route::Plain(asset_path),
        }
    }

    fn fail<T>(&self, operation: &'static str, subject: &str, error: ResolverError) -> Result<T> {
        self.diagnostics.report(operation, subject, &error);
        Err(error)
    }

    /// Identifier for `asset_path`, anchored to `anchor` when relative.
    ///
    /// Entity references are returned verbatim.
    pub fn create_identifier(&self, asset_path: &str, anchor: Option<&ResolvedPath>) -> String {
        self.diagnostics.trace("create_identifier", Some(asset_path));
        match self.route(asset_path) {
            Route::Entity(_, reference) => reference.as_str().to_string(),
            Route::Plain(path) => file::create_identifier(path, anchor),
        }
    }

    /// Identifier for an asset about to be created.
    pub fn create_identifier_for_new_asset(
        &self,
        asset_path: &str,
        anchor: Option<&ResolvedPath>,
    ) -> Result<String> {
        const OP: &str = "create_identifier_for_new_asset";
        self.diagnostics.trace(OP, Some(asset_path));
        let result = match self.route(asset_path) {
            Route::Entity(_, reference) => Err(ResolverError::WriteUnsupported {
                reference: reference.as_str().to_string(),
            }),
            Route::Plain(path) => file::create_identifier_for_new_asset(path, anchor),
        };
        result.or_else(|e| self.fail(OP, asset_path, e))
    }

    /// Resolve an identifier to a path. Plain paths that cannot be found
    /// resolve to an empty path; entity failures are errors.
    pub fn resolve(&self, asset_path: &str, context: &ResolutionContext) -> Result<ResolvedPath> {
        const OP: &str = "resolve";
        self.diagnostics.trace(OP, Some(asset_path));
        let result = match self.route(asset_path) {
            Route::Entity(engine, reference) => engine
                .resolve(&reference, context)
                .map(|location| ResolvedPath::new(location.path)),
            Route::Plain(path) => file::resolve(path, context),
        };
        result.or_else(|e| self.fail(OP, asset_path, e))
    }

    /// Resolve as part of a nested document chain.
    ///
    /// `asset_path` enters `chain` on success; the caller leaves it once the
    /// resolved document has been processed. Revisiting an identifier still
    /// in the chain fails with [`ResolverError::Cycle`].
    pub fn resolve_in_chain(
        &self,
        asset_path: &str,
        context: &ResolutionContext,
        chain: &mut ResolutionChain,
    ) -> Result<ResolvedPath> {
        const OP: &str = "resolve";
        self.diagnostics.trace(OP, Some(asset_path));
        let result = match self.route(asset_path) {
            Route::Entity(engine, reference) => engine
                .resolve_in_chain(&reference, context, chain)
                .map(|location| ResolvedPath::new(location.path)),
            Route::Plain(path) => chain.enter(path).and_then(|_| {
                file::resolve(path, context).inspect_err(|_| chain.leave(path))
            }),
        };
        result.or_else(|e| self.fail(OP, asset_path, e))
    }

    /// Resolve a destination for a new asset. Entity references always fail
    /// with [`ResolverError::WriteUnsupported`].
    pub fn resolve_for_new_asset(&self, asset_path: &str) -> Result<ResolvedPath> {
        const OP: &str = "resolve_for_new_asset";
        self.diagnostics.trace(OP, Some(asset_path));
        let result = match self.route(asset_path) {
            Route::Entity(engine, reference) => engine
                .resolve_for_write(&reference)
                .map(|location| ResolvedPath::new(location.path)),
            Route::Plain(path) => file::resolve_for_new_asset(path),
        };
        result.or_else(|e| self.fail(OP, asset_path, e))
    }

    /// File extension of the asset, without the dot.
    pub fn get_extension(&self, asset_path: &str, context: &ResolutionContext) -> Result<String> {
        const OP: &str = "get_extension";
        self.diagnostics.trace(OP, Some(asset_path));
        match self.route(asset_path) {
            Route::Entity(engine, reference) => engine
                .resolve(&reference, context)
                .map(|location| location.extension.unwrap_or_default())
                .or_else(|e| self.fail(OP, asset_path, e)),
            Route::Plain(path) => Ok(file::extension(path)),
        }
    }

    /// Descriptive information about the asset.
    pub fn get_asset_info(
        &self,
        asset_path: &str,
        resolved: &ResolvedPath,
        context: &ResolutionContext,
    ) -> Result<AssetInfo> {
        const OP: &str = "get_asset_info";
        self.diagnostics.trace(OP, Some(asset_path));
        match self.route(asset_path) {
            Route::Entity(engine, reference) => self
                .entity_asset_info(engine, &reference, context)
                .or_else(|e| self.fail(OP, asset_path, e)),
            Route::Plain(_) => {
                let mut info = AssetInfo::default();
                if !resolved.is_empty() {
                    info.resolver_info
                        .insert("resolvedPath".to_string(), resolved.to_string());
                }
                Ok(info)
            }
        }
    }

    fn entity_asset_info(
        &self,
        engine: &ResolutionEngine,
        reference: &EntityReference,
        context: &ResolutionContext,
    ) -> Result<AssetInfo> {
        let location = engine.resolve(reference, context)?;
        let manager = engine.manager();

        let mut info = AssetInfo {
            asset_name: location.name,
            version: location.version,
            ..Default::default()
        };
        info.resolver_info
            .insert("entityReference".to_string(), reference.as_str().to_string());
        info.resolver_info
            .insert("managerIdentifier".to_string(), manager.identifier().to_string());

        if engine.gate().supports(Capability::EntityTraitIntrospection) {
            let extra = manager
                .entity_info(reference)
                .map_err(|e| ResolverError::from_backend(reference.as_str(), e))?;
            if let Some(extra) = extra {
                info.asset_name = info.asset_name.or(extra.asset_name);
                info.version = info.version.or(extra.version);
                info.resolver_info.extend(extra.resolver_info);
            }
        }
        Ok(info)
    }

    /// Modification time of the asset; `None` when unknown.
    pub fn get_modification_timestamp(
        &self,
        asset_path: &str,
        resolved: &ResolvedPath,
        context: &ResolutionContext,
    ) -> Result<Timestamp> {
        const OP: &str = "get_modification_timestamp";
        self.diagnostics.trace(OP, Some(asset_path));
        let result = match self.route(asset_path) {
            Route::Entity(engine, reference) => {
                engine
                    .resolve(&reference, context)
                    .and_then(|location| match location.modified {
                        Some(modified) => Ok(Some(modified)),
                        None => file::modification_timestamp(&location.path),
                    })
            }
            Route::Plain(_) => file::modification_timestamp(resolved.as_path()),
        };
        result.or_else(|e| self.fail(OP, asset_path, e))
    }

    /// Open a resolved asset for reading.
    pub fn open_asset(&self, resolved: &ResolvedPath) -> Result<Asset> {
        const OP: &str = "open_asset";
        let subject = resolved.to_string();
        self.diagnostics.trace(OP, Some(&subject));

        if resolved.is_empty() {
            let error = ResolverError::io(
                resolved.as_path(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "empty resolved path"),
            );
            return self.fail(OP, &subject, error);
        }
        Asset::read_from(resolved.as_path()).or_else(|e| self.fail(OP, &subject, e))
    }

    /// Whether `resolved` may be written. Entity references never may.
    pub fn can_write_asset_to_path(&self, resolved: &ResolvedPath) -> Result<()> {
        const OP: &str = "can_write_asset_to_path";
        let subject = resolved.to_string();
        self.diagnostics.trace(OP, Some(&subject));
        self.check_writable(&subject, resolved)
            .or_else(|e| self.fail(OP, &subject, e))
    }

    /// Open `resolved` for writing.
    pub fn open_asset_for_write(
        &self,
        resolved: &ResolvedPath,
        mode: WriteMode,
    ) -> Result<WritableAsset> {
        const OP: &str = "open_asset_for_write";
        let subject = resolved.to_string();
        self.diagnostics.trace(OP, Some(&subject));
        self.check_writable(&subject, resolved)
            .and_then(|_| WritableAsset::open(resolved.as_path(), mode))
            .or_else(|e| self.fail(OP, &subject, e))
    }

    fn check_writable(&self, subject: &str, resolved: &ResolvedPath) -> Result<()> {
        if self.is_entity_reference(subject) {
            return Err(ResolverError::WriteUnsupported {
                reference: subject.to_string(),
            });
        }
        file::check_writable(resolved.as_path())
    }
}

impl Drop for AssetResolver {
    fn drop(&mut self) {
        self.diagnostics.trace(LIFECYCLE_DROP, None);
    }
}
