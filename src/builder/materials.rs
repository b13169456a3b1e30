use tracing::{debug, warn};

use crate::error::{OperationError, Result};
use crate::registry::{normalize, Category};
use crate::store::{
    Component, ElementData, ElementId, MaterialData, MaterialId, MaterialKind, MediumData,
    MediumId, MixtureComponent,
};

use super::{GeometryBuilder, Handle};

/// Heaviest atomic number accepted for an element.
const MAX_Z: f64 = 200.0;

impl GeometryBuilder {
    /// Defines a chemical element. `z` may arrive as a float and is truncated.
    ///
    /// Only finite `1 <= z < 200` is accepted; anything else would truncate
    /// to a meaningless atomic number.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or `z` is not a usable atomic number.
    pub fn element(&mut self, name: &str, formula: &str, z: f64, a: f64) -> Result<ElementId> {
        let name = normalize(name);
        self.claim(Category::Element, &name)?;
        if !(z.is_finite() && (1.0..MAX_Z).contains(&z)) {
            return Err(OperationError::InvalidInput(format!(
                "element `{name}` has invalid atomic number {z}"
            ))
            .into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let z = z.trunc() as u32;

        let id = self.store.add_element(ElementData {
            name: name.clone(),
            formula: formula.to_owned(),
            z,
            a,
        });
        self.register(Category::Element, &name, Handle::Element(id))?;
        debug!(name = %name, z, "element defined");
        Ok(id)
    }

    /// Isotopes have no counterpart in the store; always declined.
    ///
    /// # Errors
    ///
    /// Always returns [`OperationError::UnsupportedFeature`].
    pub fn isotope(&mut self, name: &str, z: f64, n: f64, a: f64) -> Result<()> {
        let name = normalize(name);
        warn!(name = %name, z, n, a, "isotopes are not supported, definition skipped");
        Err(OperationError::UnsupportedFeature(format!("isotope `{name}`")).into())
    }

    /// Defines a single-component material.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken.
    pub fn material(&mut self, name: &str, a: f64, z: f64, density: f64) -> Result<MaterialId> {
        let name = normalize(name);
        self.claim(Category::Material, &name)?;
        let id = self.store.add_material(MaterialData {
            name: name.clone(),
            density,
            kind: MaterialKind::Simple { a, z },
        });
        self.register(Category::Material, &name, Handle::Material(id))?;
        debug!(name = %name, density, "material defined");
        Ok(id)
    }

    /// Defines a mixture with `components` slots to be filled by
    /// [`add_mixture_element`](Self::add_mixture_element) and
    /// [`add_mixture_material`](Self::add_mixture_material).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or `components` is zero.
    pub fn mixture(&mut self, name: &str, components: usize, density: f64) -> Result<MaterialId> {
        let name = normalize(name);
        self.claim(Category::Material, &name)?;
        if components == 0 {
            return Err(
                OperationError::InvalidInput(format!("mixture `{name}` has no components")).into(),
            );
        }
        let id = self.store.add_material(MaterialData {
            name: name.clone(),
            density,
            kind: MaterialKind::Mixture {
                slots: vec![None; components],
            },
        });
        self.register(Category::Material, &name, Handle::Material(id))?;
        debug!(name = %name, components, density, "mixture defined");
        Ok(id)
    }

    /// Fills slot `index` of a mixture with an element by mass fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is unresolved, the target is not a
    /// mixture, or `index` is out of range.
    pub fn add_mixture_element(
        &mut self,
        mixture: &str,
        index: usize,
        element: &str,
        fraction: f64,
    ) -> Result<()> {
        let element = self.element_id(element)?;
        self.fill_slot(mixture, index, Component::Element(element), fraction)
    }

    /// Fills slot `index` of a mixture with another material by mass fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is unresolved, the target is not a
    /// mixture, or `index` is out of range.
    pub fn add_mixture_material(
        &mut self,
        mixture: &str,
        index: usize,
        material: &str,
        fraction: f64,
    ) -> Result<()> {
        let material = self.material_id(material)?;
        self.fill_slot(mixture, index, Component::Material(material), fraction)
    }

    /// Isotope fractions are declined like isotopes themselves.
    ///
    /// # Errors
    ///
    /// Always returns [`OperationError::UnsupportedFeature`].
    pub fn add_mixture_isotope(
        &mut self,
        mixture: &str,
        isotope: &str,
        fraction: f64,
    ) -> Result<()> {
        let (mixture, isotope) = (normalize(mixture), normalize(isotope));
        warn!(
            %mixture,
            %isotope,
            fraction,
            "isotope fractions are not supported, component skipped"
        );
        Err(OperationError::UnsupportedFeature(format!(
            "isotope fraction `{isotope}` in `{mixture}`"
        ))
        .into())
    }

    fn fill_slot(
        &mut self,
        mixture: &str,
        index: usize,
        component: Component,
        fraction: f64,
    ) -> Result<()> {
        if !(fraction.is_finite() && fraction >= 0.0) {
            return Err(
                OperationError::InvalidInput(format!("invalid mass fraction {fraction}")).into(),
            );
        }
        let id = self.material_id(mixture)?;
        let data = self.store.material_mut(id)?;
        let MaterialKind::Mixture { slots } = &mut data.kind else {
            return Err(
                OperationError::InvalidInput(format!("`{}` is not a mixture", data.name)).into(),
            );
        };
        let declared = slots.len();
        let slot = slots.get_mut(index).ok_or_else(|| {
            OperationError::InvalidInput(format!(
                "component index {index} out of range for `{}` ({declared} components)",
                data.name
            ))
        })?;
        if slot.is_some() {
            debug!(mixture = %data.name, index, "mixture slot redefined");
        }
        *slot = Some(MixtureComponent { component, fraction });
        Ok(())
    }

    /// Wraps a material into a tracking medium with the next medium id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the material is unresolved.
    pub fn medium(&mut self, name: &str, material: &str) -> Result<MediumId> {
        let name = normalize(name);
        self.claim(Category::Medium, &name)?;
        let material = self.material_id(material)?;
        let next = Self::next_id(self.media_created, "medium")?;
        let id = self.store.add_medium(MediumData {
            name: name.clone(),
            id: next,
            material,
        });
        self.register(Category::Medium, &name, Handle::Medium(id))?;
        self.media_created = next;
        debug!(name = %name, id = next, "medium defined");
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{GeometryError, RegistryError};

    #[test]
    fn element_truncates_float_z() {
        let mut b = GeometryBuilder::new();
        let id = b.element("Oxygen0x0badf00d", "O", 8.9, 16.0).unwrap();
        let el = b.store().element(id).unwrap();
        assert_eq!(el.z, 8);
        assert_eq!(el.name, "Oxygen");
    }

    #[test]
    fn element_rejects_nonsense_z() {
        let mut b = GeometryBuilder::new();
        assert!(b.element("X", "X", f64::NAN, 1.0).is_err());
        assert!(b.element("X", "X", -3.0, 1.0).is_err());
        assert!(b.element_id("X").is_err());
    }

    #[test]
    fn isotope_is_declined() {
        let mut b = GeometryBuilder::new();
        let err = b.isotope("U235", 92.0, 235.0, 235.04).unwrap_err();
        assert!(err.is_declined_feature());
        assert_eq!(b.store().medium_count(), 0);
    }

    #[test]
    fn medium_ids_start_at_one_without_gaps() {
        let mut b = GeometryBuilder::new();
        b.material("Al", 26.98, 13.0, 2.7).unwrap();
        b.material("Fe", 55.85, 26.0, 7.87).unwrap();

        let ids: Vec<u32> = ["Al", "Fe", "Al2"]
            .iter()
            .zip(["Al", "Fe", "Al"])
            .map(|(medium, material)| {
                let id = b.medium(medium, material).unwrap();
                b.store().medium(id).unwrap().id
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn element_accepts_the_whole_table() {
        let mut b = GeometryBuilder::new();
        let h = b.element("H", "H", 1.0, 1.008).unwrap();
        let og = b.element("Og", "Og", 118.0, 294.0).unwrap();
        assert_eq!(b.store().element(h).unwrap().z, 1);
        assert_eq!(b.store().element(og).unwrap().z, 118);
        assert!(b.element("Zero", "X", 0.5, 1.0).is_err());
        assert!(b.element("Huge", "X", 200.0, 1.0).is_err());
    }

    #[test]
    fn exhausted_medium_ids_are_an_error() {
        let mut b = GeometryBuilder::new();
        b.material("Al", 26.98, 13.0, 2.7).unwrap();
        b.media_created = u32::MAX;
        assert!(b.medium("Al", "Al").is_err());
        assert!(b.medium_id("Al").is_err());
    }

    #[test]
    fn failed_medium_does_not_consume_an_id() {
        let mut b = GeometryBuilder::new();
        b.material("Al", 26.98, 13.0, 2.7).unwrap();
        assert!(b.medium("Ghost", "Unobtainium").is_err());
        let id = b.medium("Al", "Al").unwrap();
        assert_eq!(b.store().medium(id).unwrap().id, 1);
        assert_eq!(b.medium_count(), 1);
    }

    #[test]
    fn mixture_slots_fill_in_order() {
        let mut b = GeometryBuilder::new();
        b.element("H", "H", 1.0, 1.008).unwrap();
        b.element("O", "O", 8.0, 16.0).unwrap();
        let water = b.mixture("Water", 2, 1.0).unwrap();
        b.add_mixture_element("Water", 0, "H", 0.112).unwrap();
        assert!(!b.store().material(water).unwrap().is_complete());
        b.add_mixture_element("Water", 1, "O", 0.888).unwrap();

        let m = b.store().material(water).unwrap();
        assert!(m.is_complete());
        let total: f64 = m.components().map(|c| c.fraction).sum();
        assert_relative_eq!(total, 1.0);
    }

    #[test]
    fn mixture_of_materials() {
        let mut b = GeometryBuilder::new();
        b.material("Lead", 207.2, 82.0, 11.35).unwrap();
        b.material("Scint", 12.0, 6.0, 1.03).unwrap();
        let mix = b.mixture("Sandwich", 2, 4.0).unwrap();
        b.add_mixture_material("Sandwich", 0, "Lead", 0.8).unwrap();
        b.add_mixture_material("Sandwich", 1, "Scint", 0.2).unwrap();
        assert_eq!(b.store().material(mix).unwrap().components().count(), 2);
    }

    #[test]
    fn mixture_index_out_of_range_fails() {
        let mut b = GeometryBuilder::new();
        b.element("H", "H", 1.0, 1.008).unwrap();
        b.mixture("Gas", 1, 0.001).unwrap();
        assert!(b.add_mixture_element("Gas", 1, "H", 1.0).is_err());
        assert!(b.add_mixture_element("Gas", 0, "He", 1.0).is_err());
    }

    #[test]
    fn simple_material_takes_no_components() {
        let mut b = GeometryBuilder::new();
        b.element("H", "H", 1.0, 1.008).unwrap();
        b.material("Al", 26.98, 13.0, 2.7).unwrap();
        assert!(b.add_mixture_element("Al", 0, "H", 1.0).is_err());
    }

    #[test]
    fn duplicate_material_fails() {
        let mut b = GeometryBuilder::new();
        b.material("Al0x11111111", 26.98, 13.0, 2.7).unwrap();
        assert!(matches!(
            b.material("Al0x22222222", 26.98, 13.0, 2.7),
            Err(GeometryError::Registry(RegistryError::DuplicateName { .. }))
        ));
    }
}
