//! The finished geometry handed out when a builder session closes.

use crate::builder::Handle;
use crate::error::{Result, StoreError};
use crate::operations::{FlattenPlacements, PlacedNode};
use crate::reflection::{ReflectionEntry, ReflectionRegistry};
use crate::registry::{normalize, Category, NameRegistry};
use crate::store::{GeometryStore, MaterialData, MediumData, SolidData, VolumeData, VolumeId};

/// A closed geometry: the store, its names, and the top volume.
#[derive(Debug)]
pub struct Geometry {
    store: GeometryStore,
    names: NameRegistry<Handle>,
    reflections: ReflectionRegistry,
    top: VolumeId,
    media: u32,
    placements: u32,
}

impl Geometry {
    pub(crate) fn new(
        store: GeometryStore,
        names: NameRegistry<Handle>,
        reflections: ReflectionRegistry,
        top: VolumeId,
        media: u32,
        placements: u32,
    ) -> Self {
        Self {
            store,
            names,
            reflections,
            top,
            media,
            placements,
        }
    }

    #[must_use]
    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    /// The volume every placement path starts from.
    #[must_use]
    pub fn top(&self) -> VolumeId {
        self.top
    }

    /// Number of media created during the build.
    #[must_use]
    pub fn medium_count(&self) -> u32 {
        self.media
    }

    /// Number of placement ids handed out during the build.
    #[must_use]
    pub fn placement_count(&self) -> u32 {
        self.placements
    }

    /// Looks up a volume by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no volume is registered under `name`.
    pub fn volume(&self, name: &str) -> Result<&VolumeData> {
        let id = self.handle(Category::Volume, name, Handle::as_volume)?;
        Ok(self.store.volume(id)?)
    }

    /// Looks up a solid by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no solid is registered under `name`.
    pub fn solid(&self, name: &str) -> Result<&SolidData> {
        let id = self.handle(Category::Solid, name, Handle::as_solid)?;
        Ok(self.store.solid(id)?)
    }

    /// Looks up a medium by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no medium is registered under `name`.
    pub fn medium(&self, name: &str) -> Result<&MediumData> {
        let id = self.handle(Category::Medium, name, Handle::as_medium)?;
        Ok(self.store.medium(id)?)
    }

    /// Looks up a material or mixture by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no material is registered under `name`.
    pub fn material(&self, name: &str) -> Result<&MaterialData> {
        let id = self.handle(Category::Material, name, Handle::as_material)?;
        Ok(self.store.material(id)?)
    }

    /// The reflection recorded under `name`, if any.
    #[must_use]
    pub fn reflection(&self, name: &str) -> Option<&ReflectionEntry> {
        self.reflections.lookup(&normalize(name))
    }

    /// Every physical node below the top volume, depth first, with paths
    /// and top-relative transforms.
    ///
    /// # Errors
    ///
    /// Returns an error if the store holds a dangling volume reference.
    pub fn placements(&self) -> Result<Vec<PlacedNode>> {
        FlattenPlacements::new(self.top).execute(&self.store)
    }

    fn handle<T>(
        &self,
        category: Category,
        name: &str,
        pick: fn(Handle) -> Option<T>,
    ) -> Result<T> {
        let key = normalize(name);
        let handle = self.names.lookup(category, &key)?;
        pick(handle)
            .ok_or_else(|| StoreError::EntityNotFound(format!("{category} `{key}`")).into())
    }
}
