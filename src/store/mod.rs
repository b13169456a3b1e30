pub mod material;
pub mod solid;
pub mod volume;

pub use material::{
    Component, ElementData, ElementId, MaterialData, MaterialId, MaterialKind, MediumData,
    MediumId, MixtureComponent,
};
pub use solid::{BooleanOp, Shape, SolidData, SolidId, TrapParams, XtruSection, ZSection};
pub use volume::{AxisCode, DivisionData, Node, VolumeData, VolumeId};

use crate::error::StoreError;
use slotmap::SlotMap;

/// Central arena that owns every object of one geometry.
///
/// Objects reference each other via typed IDs (generational indices), so
/// composites and placements never own their children. The whole arena is
/// dropped at once when the geometry goes away.
#[derive(Debug, Default)]
pub struct GeometryStore {
    elements: SlotMap<ElementId, ElementData>,
    materials: SlotMap<MaterialId, MaterialData>,
    media: SlotMap<MediumId, MediumData>,
    solids: SlotMap<SolidId, SolidData>,
    volumes: SlotMap<VolumeId, VolumeData>,
}

impl GeometryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Element operations ---

    /// Inserts an element and returns its ID.
    pub fn add_element(&mut self, data: ElementData) -> ElementId {
        self.elements.insert(data)
    }

    /// Returns a reference to the element data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn element(&self, id: ElementId) -> Result<&ElementData, StoreError> {
        self.elements
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("element".into()))
    }

    // --- Material operations ---

    /// Inserts a material and returns its ID.
    pub fn add_material(&mut self, data: MaterialData) -> MaterialId {
        self.materials.insert(data)
    }

    /// Returns a reference to the material data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn material(&self, id: MaterialId) -> Result<&MaterialData, StoreError> {
        self.materials
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("material".into()))
    }

    /// Returns a mutable reference to the material data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn material_mut(&mut self, id: MaterialId) -> Result<&mut MaterialData, StoreError> {
        self.materials
            .get_mut(id)
            .ok_or_else(|| StoreError::EntityNotFound("material".into()))
    }

    // --- Medium operations ---

    /// Inserts a medium and returns its ID.
    pub fn add_medium(&mut self, data: MediumData) -> MediumId {
        self.media.insert(data)
    }

    /// Returns a reference to the medium data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn medium(&self, id: MediumId) -> Result<&MediumData, StoreError> {
        self.media
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("medium".into()))
    }

    // --- Solid operations ---

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, StoreError> {
        self.solids
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("solid".into()))
    }

    // --- Volume operations ---

    /// Inserts a volume and returns its ID.
    pub fn add_volume(&mut self, data: VolumeData) -> VolumeId {
        self.volumes.insert(data)
    }

    /// Returns a reference to the volume data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn volume(&self, id: VolumeId) -> Result<&VolumeData, StoreError> {
        self.volumes
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound("volume".into()))
    }

    /// Returns a mutable reference to the volume data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn volume_mut(&mut self, id: VolumeId) -> Result<&mut VolumeData, StoreError> {
        self.volumes
            .get_mut(id)
            .ok_or_else(|| StoreError::EntityNotFound("volume".into()))
    }

    // --- Counts ---

    /// Number of solids, including composites and division cells.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Number of logical volumes.
    #[must_use]
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Number of media.
    #[must_use]
    pub fn medium_count(&self) -> usize {
        self.media.len()
    }
}
