//! The geometry builder: turns named element definitions into a scene graph.
//!
//! Every constructor normalises the incoming names, resolves the names it
//! references, builds the object in the [`GeometryStore`], and only then
//! registers the new name. A failing call leaves the registries untouched.

mod config;
mod materials;
mod solids;
mod volumes;

pub use config::BuilderConfig;
pub use solids::{Primitive, TrapDims};
pub use volumes::Axis;

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::{OperationError, Result, StoreError};
use crate::reflection::ReflectionRegistry;
use crate::registry::{normalize, Category, NameRegistry};
use crate::scene::Geometry;
use crate::store::{ElementId, GeometryStore, MaterialId, MediumId, SolidId, VolumeId};

/// Handle stored in the name registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Element(ElementId),
    Material(MaterialId),
    Medium(MediumId),
    Solid(SolidId),
    Volume(VolumeId),
}

impl Handle {
    #[must_use]
    pub fn as_element(self) -> Option<ElementId> {
        match self {
            Self::Element(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_material(self) -> Option<MaterialId> {
        match self {
            Self::Material(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_medium(self) -> Option<MediumId> {
        match self {
            Self::Medium(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_solid(self) -> Option<SolidId> {
        match self {
            Self::Solid(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_volume(self) -> Option<VolumeId> {
        match self {
            Self::Volume(id) => Some(id),
            _ => None,
        }
    }
}

/// Builds one geometry from a sequence of element definitions.
///
/// Medium and placement ids are counters owned by the builder: they start
/// at 1 and are never reused, so separate builders never interfere.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    config: BuilderConfig,
    store: GeometryStore,
    names: NameRegistry<Handle>,
    reflections: ReflectionRegistry,
    media_created: u32,
    placements_created: u32,
    /// Registered ring cell → every ring of the same radial division.
    cell_families: HashMap<VolumeId, Vec<VolumeId>>,
    top: Option<VolumeId>,
}

impl GeometryBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the given configuration.
    #[must_use]
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The objects built so far.
    #[must_use]
    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    #[must_use]
    pub fn reflections(&self) -> &ReflectionRegistry {
        &self.reflections
    }

    /// Number of media created; also the id of the last one.
    #[must_use]
    pub fn medium_count(&self) -> u32 {
        self.media_created
    }

    /// Number of placement ids handed out; also the last id.
    #[must_use]
    pub fn placement_count(&self) -> u32 {
        self.placements_created
    }

    // --- Lookups by name ---

    /// # Errors
    ///
    /// Returns an error if no element is registered under `name`.
    pub fn element_id(&self, name: &str) -> Result<ElementId> {
        self.resolve(Category::Element, name, Handle::as_element)
    }

    /// # Errors
    ///
    /// Returns an error if no material is registered under `name`.
    pub fn material_id(&self, name: &str) -> Result<MaterialId> {
        self.resolve(Category::Material, name, Handle::as_material)
    }

    /// # Errors
    ///
    /// Returns an error if no medium is registered under `name`.
    pub fn medium_id(&self, name: &str) -> Result<MediumId> {
        self.resolve(Category::Medium, name, Handle::as_medium)
    }

    /// # Errors
    ///
    /// Returns an error if no solid is registered under `name`.
    pub fn solid_id(&self, name: &str) -> Result<SolidId> {
        self.resolve(Category::Solid, name, Handle::as_solid)
    }

    /// # Errors
    ///
    /// Returns an error if no volume is registered under `name`.
    pub fn volume_id(&self, name: &str) -> Result<VolumeId> {
        self.resolve(Category::Volume, name, Handle::as_volume)
    }

    fn resolve<T>(
        &self,
        category: Category,
        name: &str,
        pick: fn(Handle) -> Option<T>,
    ) -> Result<T> {
        let key = normalize(name);
        let handle = self.names.lookup(category, &key)?;
        pick(handle).ok_or_else(|| StoreError::EntityNotFound(format!("{category} `{key}`")).into())
    }

    /// Fails early if `name` cannot be registered, before anything is built.
    fn claim(&self, category: Category, name: &str) -> Result<()> {
        if self.config.strict_names && self.names.contains(category, name) {
            return Err(crate::error::RegistryError::DuplicateName {
                category,
                name: name.to_owned(),
            }
            .into());
        }
        Ok(())
    }

    fn register(&mut self, category: Category, name: &str, handle: Handle) -> Result<()> {
        if self.config.strict_names {
            self.names.register(category, name, handle)?;
        } else if self.names.replace(category, name, handle).is_some() {
            warn!(%category, name, "redefinition replaces earlier definition");
        }
        Ok(())
    }

    /// The id following `counter`.
    fn next_id(counter: u32, what: &str) -> Result<u32> {
        counter
            .checked_add(1)
            .ok_or_else(|| OperationError::InvalidInput(format!("{what} ids exhausted")).into())
    }

    // --- Session ---

    /// Marks the volume every placement path starts from.
    ///
    /// # Errors
    ///
    /// Returns an error if no volume is registered under `name`.
    pub fn set_top_volume(&mut self, name: &str) -> Result<()> {
        let id = self.volume_id(name)?;
        debug!(name = %normalize(name), "top volume set");
        self.top = Some(id);
        Ok(())
    }

    /// Closes the session and hands over the finished geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if no top volume was set.
    pub fn finish(self) -> Result<Geometry> {
        let top = self
            .top
            .ok_or_else(|| OperationError::InvalidInput("no top volume was set".into()))?;
        info!(
            solids = self.store.solid_count(),
            volumes = self.store.volume_count(),
            media = self.media_created,
            placements = self.placements_created,
            "geometry closed"
        );
        Ok(Geometry::new(
            self.store,
            self.names,
            self.reflections,
            top,
            self.media_created,
            self.placements_created,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, RegistryError};

    #[test]
    fn lookups_normalise_names() {
        let mut b = GeometryBuilder::new();
        b.assembly("World0x12345678").unwrap();
        assert!(b.volume_id("World").is_ok());
        assert!(b.volume_id("World0xabcdef01").is_ok());
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let b = GeometryBuilder::new();
        assert!(matches!(
            b.solid_id("nothing"),
            Err(GeometryError::Registry(RegistryError::UnresolvedReference { .. }))
        ));
    }

    #[test]
    fn finish_requires_top_volume() {
        let mut b = GeometryBuilder::new();
        b.assembly("world").unwrap();
        assert!(GeometryBuilder::new().finish().is_err());
        b.set_top_volume("world").unwrap();
        let geometry = b.finish().unwrap();
        assert_eq!(geometry.store().volume_count(), 1);
    }

    #[test]
    fn lenient_names_replace_earlier_definitions() {
        let mut b = GeometryBuilder::with_config(BuilderConfig {
            strict_names: false,
            ..BuilderConfig::default()
        });
        let first = b.assembly("group").unwrap();
        let second = b.assembly("group").unwrap();
        assert_ne!(first, second);
        assert_eq!(b.volume_id("group").unwrap(), second);
    }
}
