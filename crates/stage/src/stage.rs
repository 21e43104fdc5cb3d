//! Stage composition.
//!
//! Opening a stage loads the root layer and, recursively, every layer its
//! prims reference. Each layer goes through the resolver in a fixed order:
//!
//! 1. create identifier (anchored to the referencing layer)
//! 2. resolve (within the stage's resolution chain)
//! 3. get extension
//! 4. get asset info
//! 5. open asset
//! 6. get modification timestamp
//!
//! followed by a format check on the resolved path. The referenced layer's
//! target prim (explicit target, `defaultPrim`, or the first root prim) is
//! grafted into the referencing prim; local opinions win.

use std::sync::Arc;

use assetio_resolver::{
    AssetInfo, AssetResolver, ResolutionChain, ResolutionContext, ResolvedPath, Timestamp,
};
use log::{debug, warn};

use crate::error::{Result, StageError};
use crate::layer::{Layer, PrimSpec, PropertySpec, Specifier, Value};

/// Extensions parsed as text layers.
const TEXT_FORMATS: &[&str] = &["usda", "usd"];

/// A layer that took part in composing the stage.
#[derive(Clone, Debug)]
pub struct LayerInfo {
    pub identifier: String,
    pub resolved_path: ResolvedPath,
    pub asset_info: AssetInfo,
    pub modified: Timestamp,
}

/// A composed attribute or relationship.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    name: String,
    type_name: String,
    value: Option<Value>,
}

impl Property {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

impl From<&PropertySpec> for Property {
    fn from(spec: &PropertySpec) -> Self {
        Self {
            name: spec.name.clone(),
            type_name: spec.type_name.clone(),
            value: spec.default.clone(),
        }
    }
}

/// A composed prim.
#[derive(Clone, Debug, PartialEq)]
pub struct Prim {
    path: String,
    name: String,
    type_name: Option<String>,
    specifier: Specifier,
    properties: Vec<Property>,
    children: Vec<Prim>,
}

impl Prim {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn specifier(&self) -> Specifier {
        self.specifier
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn children(&self) -> &[Prim] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Prim> {
        self.children.iter().find(|c| c.name == name)
    }

    fn from_spec(spec: &PrimSpec) -> Self {
        Self {
            path: String::new(),
            name: spec.name.clone(),
            type_name: spec.type_name.clone(),
            specifier: spec.specifier,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add opinions from a weaker prim: missing properties and children are
    /// taken over, existing ones keep their local values.
    fn merge_weaker(&mut self, weaker: Prim) {
        if self.type_name.is_none() {
            self.type_name = weaker.type_name;
        }
        for property in weaker.properties {
            if self.property(&property.name).is_none() {
                self.properties.push(property);
            }
        }
        for child in weaker.children {
            match self.children.iter_mut().find(|c| c.name == child.name) {
                Some(local) => local.merge_weaker(child),
                None => self.children.push(child),
            }
        }
    }

    fn assign_paths(&mut self, parent: &str) {
        self.path = if parent == "/" {
            format!("/{}", self.name)
        } else {
            format!("{}/{}", parent, self.name)
        };
        let path = self.path.clone();
        for child in &mut self.children {
            child.assign_paths(&path);
        }
    }
}

/// A composed scene opened through an [`AssetResolver`].
#[derive(Debug)]
pub struct Stage {
    root_layer: Arc<Layer>,
    prims: Vec<Prim>,
    layers: Vec<LayerInfo>,
}

impl Stage {
    /// Open and compose the layer at `asset_path`.
    pub fn open(resolver: &AssetResolver, asset_path: &str) -> Result<Self> {
        let context = resolver.create_context();
        Self::open_with_context(resolver, asset_path, &context)
    }

    /// Open within an existing context, sharing its identifier cache.
    pub fn open_with_context(
        resolver: &AssetResolver,
        asset_path: &str,
        context: &ResolutionContext,
    ) -> Result<Self> {
        let mut composer = Composer {
            resolver,
            context,
            chain: ResolutionChain::new(),
            layers: Vec::new(),
        };

        let (root_layer, prims) = composer.compose_root(asset_path)?;
        debug!(
            "Opened stage '{}' from {} layer(s)",
            asset_path,
            composer.layers.len()
        );

        Ok(Self {
            root_layer,
            prims,
            layers: composer.layers,
        })
    }

    pub fn root_layer(&self) -> &Layer {
        &self.root_layer
    }

    /// Layers in the order they were opened, root first.
    pub fn layers(&self) -> &[LayerInfo] {
        &self.layers
    }

    pub fn root_prims(&self) -> &[Prim] {
        &self.prims
    }

    pub fn default_prim(&self) -> Option<&Prim> {
        let name = self.root_layer.default_prim()?;
        self.prims.iter().find(|p| p.name == name)
    }

    /// Prim at an absolute path such as `/ParkingLot/ParkingLot_Floor_1`.
    pub fn get_prim_at_path(&self, path: &str) -> Option<&Prim> {
        let mut names = path.split('/').filter(|s| !s.is_empty());
        let first = names.next()?;
        let mut prim = self.prims.iter().find(|p| p.name == first)?;
        for name in names {
            prim = prim.child(name)?;
        }
        Some(prim)
    }

    /// Every composed prim, depth first.
    pub fn traverse(&self) -> Vec<&Prim> {
        fn walk<'a>(prim: &'a Prim, out: &mut Vec<&'a Prim>) {
            out.push(prim);
            for child in &prim.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for prim in &self.prims {
            walk(prim, &mut out);
        }
        out
    }
}

struct LoadedLayer {
    identifier: String,
    resolved: ResolvedPath,
    layer: Arc<Layer>,
}

struct Composer<'a> {
    resolver: &'a AssetResolver,
    context: &'a ResolutionContext,
    chain: ResolutionChain,
    layers: Vec<LayerInfo>,
}

impl Composer<'_> {
    fn compose_root(&mut self, asset_path: &str) -> Result<(Arc<Layer>, Vec<Prim>)> {
        let loaded = self.load(asset_path, None)?;
        let prims = self.with_layer(&loaded, |composer| {
            loaded
                .layer
                .prims
                .iter()
                .map(|spec| composer.compose_prim(&loaded, spec))
                .collect::<Result<Vec<_>>>()
        });
        let mut prims = prims?;
        for prim in &mut prims {
            prim.assign_paths("/");
        }
        Ok((loaded.layer, prims))
    }

    /// Run `f` while `loaded` is on the resolution chain.
    fn with_layer<T>(
        &mut self,
        loaded: &LoadedLayer,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let result = f(self);
        self.chain.leave(&loaded.identifier);
        result
    }

    fn load(&mut self, asset_path: &str, anchor: Option<&ResolvedPath>) -> Result<LoadedLayer> {
        let resolver = self.resolver;
        let context = self.context;

        let identifier = resolver.create_identifier(asset_path, anchor);
        let resolved = resolver.resolve_in_chain(&identifier, context, &mut self.chain)?;
        if resolved.is_empty() {
            self.chain.leave(&identifier);
            warn!("Layer '{}' could not be resolved", identifier);
            return Err(StageError::LayerNotFound(identifier));
        }

        match self.read_layer(&identifier, &resolved) {
            Ok(layer) => Ok(LoadedLayer {
                identifier,
                resolved,
                layer: Arc::new(layer),
            }),
            Err(e) => {
                self.chain.leave(&identifier);
                Err(e)
            }
        }
    }

    fn read_layer(&mut self, identifier: &str, resolved: &ResolvedPath) -> Result<Layer> {
        let resolver = self.resolver;
        let context = self.context;

        resolver.get_extension(identifier, context)?;
        let asset_info = resolver.get_asset_info(identifier, resolved, context)?;
        let asset = resolver.open_asset(resolved)?;
        let modified = resolver.get_modification_timestamp(identifier, resolved, context)?;

        let extension = resolver.get_extension(&resolved.to_string(), context)?;
        if !TEXT_FORMATS.contains(&extension.as_str()) {
            return Err(StageError::UnsupportedFormat {
                identifier: identifier.to_string(),
                extension,
            });
        }

        let text = asset.text().map_err(|source| StageError::Utf8 {
            identifier: identifier.to_string(),
            source,
        })?;
        let layer = Layer::parse(identifier, text)?;

        self.layers.push(LayerInfo {
            identifier: identifier.to_string(),
            resolved_path: resolved.clone(),
            asset_info,
            modified,
        });
        Ok(layer)
    }

    fn compose_prim(&mut self, loaded: &LoadedLayer, spec: &PrimSpec) -> Result<Prim> {
        let mut prim = Prim::from_spec(spec);
        prim.properties = spec.properties.iter().map(Property::from).collect();
        for child in &spec.children {
            let composed = self.compose_prim(loaded, child)?;
            prim.children.push(composed);
        }

        for reference in spec.references() {
            if reference.asset_path.is_empty() {
                warn!(
                    "Skipping internal reference on '{}' in '{}'",
                    spec.name, loaded.identifier
                );
                continue;
            }
            let weaker = self.compose_reference(
                &reference.asset_path,
                reference.target.as_deref(),
                &loaded.resolved,
            )?;
            prim.merge_weaker(weaker);
        }
        Ok(prim)
    }

    fn compose_reference(
        &mut self,
        asset_path: &str,
        target: Option<&str>,
        anchor: &ResolvedPath,
    ) -> Result<Prim> {
        let referenced = self.load(asset_path, Some(anchor))?;
        self.with_layer(&referenced, |composer| {
            let layer = Arc::clone(&referenced.layer);
            let spec = match target {
                Some(path) => layer.prim_at_path(path),
                None => layer.default_or_first_prim(),
            }
            .ok_or_else(|| StageError::MissingTarget {
                identifier: referenced.identifier.clone(),
                target: target.unwrap_or("<default>").to_string(),
            })?;
            composer.compose_prim(&referenced, spec)
        })
    }
}
