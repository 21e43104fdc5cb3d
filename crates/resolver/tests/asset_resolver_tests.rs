//! Integration tests for the host boundary.
//!
//! These drive `AssetResolver` the way a host would, against a counting
//! mock manager and against the JSON library manager.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assetio_resolver::{
    AssetPath, AssetResolver, BackendError, Capability, DiagnosticSink, Diagnostics,
    EntityLocation, EntityReference, ManagerCapabilities, ManagerFactory, ManagerInterface,
    MemorySink,
    RecordLevel, ResolvedPath, ResolverConfig, ResolverError, ResolverFactory, Severity,
    WriteMode,
};
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

struct CountingManager {
    capabilities: ManagerCapabilities,
    root: PathBuf,
    resolve_calls: AtomicUsize,
    capability_queries: AtomicUsize,
}

impl CountingManager {
    fn new(capabilities: ManagerCapabilities, root: &Path) -> Self {
        Self {
            capabilities,
            root: root.to_path_buf(),
            resolve_calls: AtomicUsize::new(0),
            capability_queries: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    fn capability_queries(&self) -> usize {
        self.capability_queries.load(Ordering::SeqCst)
    }
}

impl ManagerInterface for CountingManager {
    fn identifier(&self) -> &str {
        "org.assetio.test.counting"
    }

    fn entity_reference_prefix(&self) -> &str {
        "bal:///"
    }

    fn capabilities(&self) -> ManagerCapabilities {
        self.capability_queries.fetch_add(1, Ordering::SeqCst);
        self.capabilities.clone()
    }

    fn resolve(&self, reference: &EntityReference) -> Result<EntityLocation, BackendError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        match reference.body() {
            "doesntexist" => Err(BackendError::not_found(format!(
                "Entity '{}' not found",
                reference
            ))),
            name => Ok(EntityLocation::new(
                self.root.join(format!("{}.usda", name)).to_string_lossy(),
            )),
        }
    }
}

fn resolver_with(
    manager: Arc<CountingManager>,
    severity: Severity,
) -> (AssetResolver, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn DiagnosticSink>> = vec![sink.clone()];
    let diagnostics = Diagnostics::with_sinks(severity, sinks);
    let manager: Arc<dyn ManagerInterface> = manager;
    let resolver = AssetResolver::new(&ResolverConfig::default(), Some(manager), diagnostics);
    (resolver, sink)
}

fn resolving() -> ManagerCapabilities {
    ManagerCapabilities::new([Capability::Resolution, Capability::Publishing])
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Plain paths are never handed to the backend.
    #[test]
    fn prop_plain_paths_never_contact_backend(path in "[a-z_./]{1,24}") {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
        let (resolver, _) = resolver_with(manager.clone(), Severity::Informational);

        prop_assert!(matches!(resolver.classifier().classify(&path), AssetPath::Plain(_)));

        let context = resolver.create_context();
        let _ = resolver.resolve(&path, &context);
        let _ = resolver.get_extension(&path, &context);
        prop_assert_eq!(manager.calls(), 0);
    }
}

#[test]
fn test_second_resolution_is_cache_hit() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
    let (resolver, _) = resolver_with(manager.clone(), Severity::Informational);
    let context = resolver.create_context();

    let first = resolver.resolve("bal:///cat", &context).unwrap();
    let second = resolver.resolve("bal:///cat", &context).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.as_path(), dir.path().join("cat.usda"));
    assert_eq!(manager.calls(), 1);

    // A new context starts with an empty cache.
    let other = resolver.create_context();
    resolver.resolve("bal:///cat", &other).unwrap();
    assert_eq!(manager.calls(), 2);
}

#[test]
fn test_factory_built_resolver_queries_capabilities_once() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));

    let mut managers = ManagerFactory::empty();
    let registered = manager.clone();
    managers.register("org.assetio.test.counting", move |_| {
        let manager: Arc<dyn ManagerInterface> = registered.clone();
        Ok(manager)
    });

    let config_path = dir.path().join("assetio.toml");
    std::fs::write(
        &config_path,
        "[manager]\nidentifier = \"org.assetio.test.counting\"\n",
    )
    .unwrap();

    let sink = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn DiagnosticSink>> = vec![sink.clone()];
    let config = ResolverConfig::new()
        .with_severity(Severity::Debug)
        .with_config_path(config_path);
    let resolver = ResolverFactory::with_managers(managers)
        .create_with_sinks(&config, sinks)
        .unwrap();
    assert_eq!(manager.capability_queries(), 0);

    let context = resolver.create_context();
    resolver.resolve("bal:///cat", &context).unwrap();
    resolver.resolve("bal:///dog", &context).unwrap();
    resolver
        .get_asset_info("bal:///cat", &ResolvedPath::default(), &context)
        .unwrap();

    assert_eq!(manager.calls(), 2);
    assert_eq!(manager.capability_queries(), 1);
}

#[test]
fn test_missing_resolution_capability_fails_before_backend() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(
        ManagerCapabilities::new([Capability::EntityReferenceIdentification]),
        dir.path(),
    ));
    let (resolver, sink) = resolver_with(manager.clone(), Severity::Informational);
    let context = resolver.create_context();

    let result = resolver.resolve("bal:///cat", &context);

    assert!(matches!(
        result,
        Err(ResolverError::Capability {
            capability: Capability::Resolution,
            ..
        })
    ));
    assert_eq!(manager.calls(), 0);
    assert!(sink.has_marker("capabilityError"));
}

#[test]
fn test_doesntexist_is_logged_with_entity_resolution_marker() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
    let (resolver, sink) = resolver_with(manager, Severity::Informational);
    let context = resolver.create_context();

    let err = resolver.resolve("bal:///doesntexist", &context).unwrap_err();

    assert!(matches!(err, ResolverError::Resolution { .. }));
    assert!(err.to_string().contains("bal:///doesntexist"));
    assert!(sink.has_marker("entityResolutionError"));

    let records = sink.records();
    let record = records
        .iter()
        .find(|r| r.marker == Some("entityResolutionError"))
        .unwrap();
    assert_eq!(record.operation, "resolve");
    assert_eq!(record.subject.as_deref(), Some("bal:///doesntexist"));
    assert!(record.message.contains("not found"));
    assert_ne!(record.level, RecordLevel::Trace);
}

#[test]
fn test_failures_are_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
    let (resolver, _) = resolver_with(manager.clone(), Severity::Informational);
    let context = resolver.create_context();

    assert!(resolver.resolve("bal:///doesntexist", &context).is_err());
    assert!(resolver.resolve("bal:///doesntexist", &context).is_err());
    assert_eq!(manager.calls(), 2);
    assert!(context.cache().is_empty());
}

#[test]
fn test_entity_write_unsupported_regardless_of_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    for capabilities in [
        ManagerCapabilities::none(),
        resolving(),
        ManagerCapabilities::new([
            Capability::Resolution,
            Capability::Publishing,
            Capability::EntityReferenceIdentification,
            Capability::EntityTraitIntrospection,
            Capability::ExistenceQueries,
        ]),
    ] {
        let manager = Arc::new(CountingManager::new(capabilities, dir.path()));
        let (resolver, sink) = resolver_with(manager.clone(), Severity::Informational);
        let entity = ResolvedPath::new("bal:///cat");

        assert!(matches!(
            resolver.resolve_for_new_asset("bal:///cat"),
            Err(ResolverError::WriteUnsupported { .. })
        ));
        assert!(matches!(
            resolver.create_identifier_for_new_asset("bal:///cat", None),
            Err(ResolverError::WriteUnsupported { .. })
        ));
        assert!(matches!(
            resolver.can_write_asset_to_path(&entity),
            Err(ResolverError::WriteUnsupported { .. })
        ));
        assert!(matches!(
            resolver.open_asset_for_write(&entity, WriteMode::Replace),
            Err(ResolverError::WriteUnsupported { .. })
        ));
        assert_eq!(manager.calls(), 0);
        assert!(sink.has_marker("writeUnsupportedError"));
    }
}

#[test]
fn test_entity_identifier_is_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
    let (resolver, _) = resolver_with(manager, Severity::Informational);
    let anchor = ResolvedPath::new("/shots/shot.usda");

    assert_eq!(
        resolver.create_identifier("bal:///cat", Some(&anchor)),
        "bal:///cat"
    );
    assert_eq!(
        resolver.create_identifier("./cat.usda", Some(&anchor)),
        "/shots/cat.usda"
    );
}

#[test]
fn test_debug_severity_traces_each_call_and_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
    let (resolver, sink) = resolver_with(manager, Severity::Debug);
    let context = resolver.create_context();

    let identifier = resolver.create_identifier("bal:///cat", None);
    let resolved = resolver.resolve(&identifier, &context).unwrap();
    resolver.get_extension(&identifier, &context).unwrap();
    resolver.get_asset_info(&identifier, &resolved, &context).unwrap();
    drop(resolver);

    assert_eq!(
        sink.traced_operations(),
        vec![
            "AssetResolver::new",
            "create_identifier",
            "resolve",
            "get_extension",
            "get_asset_info",
            "AssetResolver::drop",
        ]
    );
}

#[test]
fn test_informational_severity_has_no_traces() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(CountingManager::new(resolving(), dir.path()));
    let (resolver, sink) = resolver_with(manager, Severity::Informational);
    let context = resolver.create_context();

    resolver.resolve("bal:///cat", &context).unwrap();
    assert!(sink.traced_operations().is_empty());
}

// =============================================================================
// Library manager, configured from a file
// =============================================================================

fn write_library(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir.join("assets")).unwrap();
    std::fs::write(dir.join("assets/cat.usda"), "#usda 1.0\n").unwrap();
    std::fs::write(
        dir.join("library.json"),
        r#"{
            "prefix": "bal:///",
            "entities": {
                "cat": {
                    "location": "${library_dir}/assets/cat.usda",
                    "name": "Cat",
                    "version": "3"
                }
            }
        }"#,
    )
    .unwrap();

    let config = dir.join("assetio.toml");
    std::fs::write(
        &config,
        "[manager]\nidentifier = \"org.assetio.manager.library\"\n\n[manager.settings]\nlibrary_path = \"library.json\"\n",
    )
    .unwrap();
    config
}

#[test]
fn test_library_manager_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_library(dir.path());
    let resolver = ResolverFactory::new()
        .create(&ResolverConfig::new().with_config_path(config_path))
        .unwrap();
    let context = resolver.create_context();

    assert!(resolver.is_entity_reference("bal:///cat"));
    let resolved = resolver.resolve("bal:///cat", &context).unwrap();
    assert_eq!(resolved.as_path(), dir.path().join("assets/cat.usda"));
    assert_eq!(resolver.get_extension("bal:///cat", &context).unwrap(), "usda");

    let info = resolver
        .get_asset_info("bal:///cat", &resolved, &context)
        .unwrap();
    assert_eq!(info.asset_name.as_deref(), Some("Cat"));
    assert_eq!(info.version.as_deref(), Some("3"));
    assert_eq!(
        info.resolver_info.get("managerIdentifier").map(String::as_str),
        Some("org.assetio.manager.library")
    );

    let asset = resolver.open_asset(&resolved).unwrap();
    assert_eq!(asset.text().unwrap(), "#usda 1.0\n");
    assert!(resolver
        .get_modification_timestamp("bal:///cat", &resolved, &context)
        .unwrap()
        .is_some());
}

#[test]
fn test_plain_write_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = ResolverFactory::new()
        .create(&ResolverConfig::default())
        .unwrap();
    let target = dir.path().join("out/new.usda");

    let resolved = resolver
        .resolve_for_new_asset(&target.to_string_lossy())
        .unwrap();
    resolver.can_write_asset_to_path(&resolved).unwrap();

    let mut writable = resolver
        .open_asset_for_write(&resolved, WriteMode::Replace)
        .unwrap();
    writable.write(b"#usda 1.0\n", 0).unwrap();
    writable.close().unwrap();

    let context = resolver.create_context();
    let found = resolver.resolve(&target.to_string_lossy(), &context).unwrap();
    assert_eq!(found, resolved);
}
