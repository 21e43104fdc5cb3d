//! AssetIO Stage Crate
//!
//! A minimal layered-document reader that opens every layer through an
//! [`assetio_resolver::AssetResolver`]. It reads the text (`#usda 1.0`)
//! subset of layered scene description: layer metadata, `def`/`over`/`class`
//! prims, typed properties and `references` to other layers. Referenced
//! layers are resolved relative to the layer that references them and grafted
//! into the referencing prim.
//!
//! # Core Types
//!
//! - [`Stage`] - Composed scene opened from a root layer
//! - [`Prim`] / [`Property`] - Composed scene objects
//! - [`Layer`] - One parsed, uncomposed layer
//! - [`StageError`] - Resolver, parse and composition failures

pub mod error;
pub mod layer;
pub mod stage;

pub use error::{Result, StageError};
pub use layer::{
    Layer, LayerReference, ListOp, MetadataEntry, PrimSpec, PropertySpec, Specifier, Value,
};
pub use stage::{LayerInfo, Prim, Property, Stage};
