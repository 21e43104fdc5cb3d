//! Manager backend abstractions and implementations.
//!
//! This module contains:
//! - The `ManagerInterface` trait that every backend implements
//! - Manager capabilities checked by the capability gate
//! - `LibraryManager`, a JSON library-backed manager
//! - `ManagerFactory`, which builds the manager a configuration file selects
//!
//! # Architecture
//!
//! The resolver never talks to a concrete backend. It holds an
//! `Arc<dyn ManagerInterface>` chosen at construction time, queries its
//! capabilities once, and only then delegates entity resolution to it.
//! Normalizing what the manager returns into an absolute path happens in the
//! engine, not in the managers themselves.

mod capabilities;
mod factory;
mod library;
mod traits;

pub use capabilities::{Capability, ManagerCapabilities};
pub use factory::{ManagerConfig, ManagerConstructor, ManagerFactory, ManagerSettings};
pub use library::{Library, LibraryEntity, LibraryManager, LIBRARY_DIR_VAR};
pub use traits::{EntityLocation, ManagerInterface};
