slotmap::new_key_type! {
    /// Unique identifier for a chemical element in the geometry store.
    pub struct ElementId;

    /// Unique identifier for a material or mixture in the geometry store.
    pub struct MaterialId;

    /// Unique identifier for a tracking medium in the geometry store.
    pub struct MediumId;
}

/// A chemical element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub name: String,
    pub formula: String,
    /// Atomic number.
    pub z: u32,
    /// Molar mass.
    pub a: f64,
}

/// What a mixture slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Element(ElementId),
    Material(MaterialId),
}

/// One filled slot of a mixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureComponent {
    pub component: Component,
    /// Mass fraction.
    pub fraction: f64,
}

/// Composition of a material.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    /// Single-component material described by effective A and Z.
    Simple { a: f64, z: f64 },
    /// Material made of a fixed number of component slots filled in later.
    Mixture { slots: Vec<Option<MixtureComponent>> },
}

/// A material or mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub density: f64,
    pub kind: MaterialKind,
}

impl MaterialData {
    /// Returns `true` if this is a mixture.
    #[must_use]
    pub fn is_mixture(&self) -> bool {
        matches!(self.kind, MaterialKind::Mixture { .. })
    }

    /// Filled mixture components in slot order. Empty for simple materials.
    pub fn components(&self) -> impl Iterator<Item = &MixtureComponent> {
        let slots: &[Option<MixtureComponent>] = match &self.kind {
            MaterialKind::Simple { .. } => &[],
            MaterialKind::Mixture { slots } => slots,
        };
        slots.iter().flatten()
    }

    /// Returns `true` if every declared mixture slot has been filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match &self.kind {
            MaterialKind::Simple { .. } => true,
            MaterialKind::Mixture { slots } => slots.iter().all(Option::is_some),
        }
    }
}

/// A tracking medium: a material with a session-unique numeric id.
#[derive(Debug, Clone, PartialEq)]
pub struct MediumData {
    pub name: String,
    pub id: u32,
    pub material: MaterialId,
}
