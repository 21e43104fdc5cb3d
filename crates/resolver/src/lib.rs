//! AssetIO Resolver Crate
//!
//! This crate lets an asset-resolution host treat entity references
//! (`bal:///cat`) exactly like ordinary file paths. Entity references are
//! resolved through a pluggable asset-management backend; everything else
//! goes to the default file resolver.
//!
//! # Overview
//!
//! The resolver crate supports:
//! - Lexical classification of asset paths by the manager's scheme prefix
//! - Capability gating, queried once per bound manager
//! - Per-context identifier caching of resolved locations
//! - Cycle detection for nested reference chains
//! - Structured diagnostics with a configurable severity
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +----------------------+
//! |  Host framework  | --> |    AssetResolver     |  (host boundary)
//! +------------------+     +----------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Classifier    |  (entity or plain path)
//!                          +------------------+
//!                            |             |
//!                  entity    v             v   plain
//!              +------------------+   +------------------+
//!              | ResolutionEngine |   |  File resolver   |
//!              +------------------+   +------------------+
//!                      |
//!                      v
//!              +------------------+     +------------------+
//!              |  IdentifierCache | --> |  CapabilityGate  |
//!              +------------------+     +------------------+
//!                                               |
//!                                               v
//!                                       +------------------+
//!                                       | ManagerInterface |  (backend)
//!                                       +------------------+
//! ```
//!
//! Every host-boundary call emits an entry trace at debug severity; every
//! failure is reported through [`Diagnostics`] before it propagates.
//!
//! # Core Types
//!
//! - [`AssetResolver`] - Operations exposed to the host
//! - [`ResolverFactory`] - Builds a resolver from a [`ResolverConfig`]
//! - [`EntityReference`] - A string recognized by the bound manager
//! - [`ResolvedLocation`] - Cached result of resolving one reference
//! - [`ResolutionContext`] - Search roots plus the identifier cache
//! - [`ManagerInterface`] - Contract every backend implements

pub mod cache;
pub mod classifier;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod factory;
pub mod gate;
pub mod manager;
pub mod models;
pub mod paths;
pub mod resolver;

// Re-export the host boundary
pub use factory::ResolverFactory;
pub use resolver::{Asset, AssetResolver, WritableAsset, WriteMode};

pub use cache::IdentifierCache;
pub use classifier::ReferenceClassifier;
pub use config::ResolverConfig;
pub use context::ResolutionContext;
pub use engine::{ResolutionChain, ResolutionEngine};
pub use gate::CapabilityGate;

pub use diagnostics::{
    DiagnosticRecord, DiagnosticSink, Diagnostics, LogSink, MemorySink, RecordLevel, Severity,
};
pub use errors::{BackendError, BackendErrorCode, FailureScope, ResolverError, Result};

pub use manager::{
    Capability, EntityLocation, Library, LibraryEntity, LibraryManager, ManagerCapabilities,
    ManagerConfig, ManagerFactory, ManagerInterface, ManagerSettings,
};
pub use models::{
    AssetInfo, AssetPath, EntityReference, ResolvedLocation, ResolvedPath, Timestamp,
};
