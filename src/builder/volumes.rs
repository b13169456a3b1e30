use std::ops::RangeInclusive;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::error::{GeometryError, OperationError, RegistryError, Result};
use crate::math::Vector3;
use crate::operations::{contains_volume, AddNode, Divide};
use crate::registry::{normalize, Category};
use crate::store::{AxisCode, VolumeData, VolumeId};
use crate::transform::{make_combined, make_rotation, make_translation};

use super::{GeometryBuilder, Handle};

/// Division axis as written in a geometry description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
    Radial,
    Azimuthal,
}

impl Axis {
    /// Axis code handed to the division primitive. Radial and azimuthal
    /// share codes with X and Y; the mother's shape decides the reading.
    #[must_use]
    pub fn code(self) -> AxisCode {
        match self {
            Self::X | Self::Radial => AxisCode::X,
            Self::Y | Self::Azimuthal => AxisCode::Y,
            Self::Z => AxisCode::Z,
        }
    }
}

impl FromStr for Axis {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kXAxis" | "X" => Ok(Self::X),
            "kYAxis" | "Y" => Ok(Self::Y),
            "kZAxis" | "Z" => Ok(Self::Z),
            "kRho" | "Radial" => Ok(Self::Radial),
            "kPhi" | "Azimuthal" => Ok(Self::Azimuthal),
            other => Err(OperationError::UnsupportedAxis(other.to_owned()).into()),
        }
    }
}

impl GeometryBuilder {
    /// Defines a logical volume filling `solid` with `medium`.
    ///
    /// With `reflected` set, `solid` names an entry of the reflection
    /// registry and the volume takes the mirrored solid recorded there.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or a reference is unresolved.
    pub fn logical_volume(
        &mut self,
        name: &str,
        solid: &str,
        medium: &str,
        reflected: bool,
    ) -> Result<VolumeId> {
        let name = normalize(name);
        self.claim(Category::Volume, &name)?;
        let solid = if reflected {
            let key = normalize(solid);
            self.reflections
                .lookup(&key)
                .map(|entry| entry.reflected)
                .ok_or(RegistryError::UnresolvedReference {
                    category: Category::Solid,
                    name: key,
                })?
        } else {
            self.solid_id(solid)?
        };
        let medium = self.medium_id(medium)?;

        let id = self.store.add_volume(VolumeData::new(name.clone(), solid, medium));
        self.register(Category::Volume, &name, Handle::Volume(id))?;
        debug!(name = %name, reflected, "logical volume defined");
        Ok(id)
    }

    /// Defines an assembly: a volume with daughters but no solid or medium.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken.
    pub fn assembly(&mut self, name: &str) -> Result<VolumeId> {
        let name = normalize(name);
        self.claim(Category::Volume, &name)?;
        let id = self.store.add_volume(VolumeData::assembly(name.clone()));
        self.register(Category::Volume, &name, Handle::Volume(id))?;
        debug!(name = %name, "assembly defined");
        Ok(id)
    }

    /// Places `volume` inside `mother` and returns the placement id.
    ///
    /// The transform is `translate(position) ∘ rotate(rotation)` with Euler
    /// angles in degrees. A `reflected_variant` names a reflection registry
    /// entry; its transform is prepended only when
    /// [`BuilderConfig::compose_reflected_placements`](super::BuilderConfig)
    /// is set. A `mother` naming the rings of a radial division receives the
    /// daughter in every ring, under the one placement id.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference is unresolved or the placement would
    /// make the volume graph cyclic. No id is consumed on failure.
    #[instrument(level = "debug", skip(self))]
    pub fn place_volume(
        &mut self,
        name: &str,
        volume: &str,
        mother: &str,
        rotation: Vector3,
        position: Vector3,
        reflected_variant: Option<&str>,
    ) -> Result<u32> {
        let daughter = self.volume_id(volume)?;
        let mother = self.volume_id(mother)?;

        let mut transform = make_combined(
            &make_translation(position.x, position.y, position.z),
            &make_rotation(rotation.x, rotation.y, rotation.z),
        );
        if let Some(variant) = reflected_variant.map(normalize).filter(|v| !v.is_empty()) {
            if self.config.compose_reflected_placements {
                let entry =
                    self.reflections
                        .lookup(&variant)
                        .ok_or(RegistryError::UnresolvedReference {
                            category: Category::Solid,
                            name: variant.clone(),
                        })?;
                transform = entry.reflection.transform().compose(&transform);
            } else {
                debug!(%variant, "reflected variant ignored, placement transform used alone");
            }
        }

        let mothers = self
            .cell_families
            .get(&mother)
            .cloned()
            .unwrap_or_else(|| vec![mother]);
        for &target in &mothers {
            if contains_volume(&self.store, daughter, target)? {
                return Err(OperationError::InvalidInput(format!(
                    "placing `{}` inside `{}` would create a cycle",
                    normalize(volume),
                    self.store.volume(target)?.name
                ))
                .into());
            }
        }

        let copy_number = Self::next_id(self.placements_created, "placement")?;
        let name = normalize(name);
        for target in mothers {
            AddNode::new(target, daughter, name.clone(), copy_number, transform)
                .execute(&mut self.store)?;
        }
        self.placements_created = copy_number;
        debug!(copy_number, "volume placed");
        Ok(copy_number)
    }

    /// Divides `mother` into `count` equal cells along `axis`.
    ///
    /// The cell volume is registered under `name` so daughters can be placed
    /// into it; for a radial division the name stands for all rings. Cells
    /// take consecutive placement ids, which are returned. A `width <= 0` is
    /// derived from the mother's extent.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis token is unknown, the name is taken, the
    /// mother is unresolved, the ids would overflow, or the division
    /// primitive rejects the request.
    #[instrument(level = "debug", skip(self))]
    pub fn divide_volume(
        &mut self,
        name: &str,
        mother: &str,
        axis: &str,
        count: u32,
        width: f64,
        offset: f64,
    ) -> Result<RangeInclusive<u32>> {
        let axis: Axis = axis.parse()?;
        let name = normalize(name);
        self.claim(Category::Volume, &name)?;
        let mother = self.volume_id(mother)?;

        let first_copy = Self::next_id(self.placements_created, "placement")?;
        let division =
            Divide::new(mother, name.clone(), axis.code(), count, offset, width, first_copy)
                .execute(&mut self.store)?;
        let Some(&cell) = division.cells.first() else {
            return Err(
                OperationError::InvalidInput(format!("division `{name}` made no cells")).into(),
            );
        };
        self.register(Category::Volume, &name, Handle::Volume(cell))?;
        if division.cells.len() > 1 {
            self.cell_families.insert(cell, division.cells.clone());
        }
        self.placements_created = *division.copy_numbers.end();
        debug!(
            ?axis,
            count,
            width = division.width,
            first = first_copy,
            "volume divided"
        );
        Ok(division.copy_numbers)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::builder::{BuilderConfig, Primitive};
    use crate::math::Point3;
    use crate::store::Shape;

    fn with_air() -> GeometryBuilder {
        let mut b = GeometryBuilder::new();
        b.material("Air", 14.0, 7.0, 0.0012).unwrap();
        b.medium("M", "Air").unwrap();
        b
    }

    fn with_config(config: BuilderConfig) -> GeometryBuilder {
        let mut b = GeometryBuilder::with_config(config);
        b.material("Air", 14.0, 7.0, 0.0012).unwrap();
        b.medium("M", "Air").unwrap();
        b
    }

    #[test]
    fn axis_tokens() {
        assert_eq!("kXAxis".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("Z".parse::<Axis>().unwrap(), Axis::Z);
        assert_eq!("kRho".parse::<Axis>().unwrap().code(), AxisCode::X);
        assert_eq!("Azimuthal".parse::<Axis>().unwrap().code(), AxisCode::Y);
        assert!(matches!(
            "kW".parse::<Axis>(),
            Err(GeometryError::Operation(OperationError::UnsupportedAxis(token))) if token == "kW"
        ));
    }

    #[test]
    fn single_box_placement() {
        let mut b = with_air();
        b.primitive("B", Primitive::Box { x: 1.0, y: 2.0, z: 3.0 }).unwrap();
        let lv = b.logical_volume("LV", "B", "M", false).unwrap();
        let root = b.assembly("root").unwrap();

        let id = b
            .place_volume("pv", "LV", "root", Vector3::zeros(), Vector3::zeros(), None)
            .unwrap();
        assert_eq!(id, 1);

        let nodes = &b.store().volume(root).unwrap().nodes;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].volume, lv);
        assert_eq!(nodes[0].copy_number, 1);
        assert!(nodes[0].transform.is_identity());
    }

    #[test]
    fn placement_ids_are_sequential() {
        let mut b = with_air();
        b.primitive("B", Primitive::Box { x: 1.0, y: 1.0, z: 1.0 }).unwrap();
        b.logical_volume("LV", "B", "M", false).unwrap();
        b.assembly("root").unwrap();
        let ids: Vec<u32> = (0..3)
            .map(|i| {
                let position = Vector3::new(f64::from(i) * 3.0, 0.0, 0.0);
                b.place_volume("pv", "LV", "root", Vector3::zeros(), position, None)
                    .unwrap()
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(b.placement_count(), 3);
    }

    #[test]
    fn placement_transform_is_translate_after_rotate() {
        let mut b = with_air();
        b.primitive("B", Primitive::Box { x: 1.0, y: 1.0, z: 1.0 }).unwrap();
        b.logical_volume("LV", "B", "M", false).unwrap();
        let root = b.assembly("root").unwrap();
        b.place_volume(
            "pv",
            "LV",
            "root",
            Vector3::new(90.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 5.0),
            None,
        )
        .unwrap();

        let transform = b.store().volume(root).unwrap().nodes[0].transform;
        let local = transform.master_to_local(&Point3::new(0.0, 1.0, 5.0));
        assert_relative_eq!(local, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn failed_placement_consumes_no_id() {
        let mut b = with_air();
        b.assembly("root").unwrap();
        assert!(b
            .place_volume("pv", "ghost", "root", Vector3::zeros(), Vector3::zeros(), None)
            .is_err());
        b.assembly("child").unwrap();
        let id = b
            .place_volume("pv", "child", "root", Vector3::zeros(), Vector3::zeros(), None)
            .unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn cyclic_placement_is_rejected() {
        let mut b = with_air();
        b.assembly("outer").unwrap();
        b.assembly("inner").unwrap();
        b.place_volume("p", "inner", "outer", Vector3::zeros(), Vector3::zeros(), None)
            .unwrap();
        assert!(b
            .place_volume("q", "outer", "inner", Vector3::zeros(), Vector3::zeros(), None)
            .is_err());
        assert!(b
            .place_volume("r", "outer", "outer", Vector3::zeros(), Vector3::zeros(), None)
            .is_err());
        assert_eq!(b.placement_count(), 1);
    }

    #[test]
    fn radial_division_takes_contiguous_ids() {
        let mut b = with_air();
        b.primitive(
            "T",
            Primitive::Tube { rmin: 0.0, rmax: 8.0, z: 10.0, start_phi: 0.0, delta_phi: 360.0 },
        )
        .unwrap();
        let tube = b.logical_volume("tube", "T", "M", false).unwrap();
        b.assembly("root").unwrap();
        b.place_volume("pv", "tube", "root", Vector3::zeros(), Vector3::zeros(), None)
            .unwrap();

        let ids = b.divide_volume("ring", "tube", "kRho", 4, 2.0, 0.0).unwrap();
        assert_eq!(ids, 2..=5);
        assert_eq!(b.placement_count(), 5);

        let nodes = &b.store().volume(tube).unwrap().nodes;
        let copies: Vec<u32> = nodes.iter().map(|n| n.copy_number).collect();
        assert_eq!(copies, vec![2, 3, 4, 5]);
        assert!(nodes.iter().all(|n| n.transform.is_identity()));
        assert_eq!(nodes[0].volume, b.volume_id("ring").unwrap());
    }

    #[test]
    fn daughters_of_rings_go_into_every_ring() {
        let mut b = with_air();
        b.primitive(
            "T",
            Primitive::Tube { rmin: 0.0, rmax: 8.0, z: 10.0, start_phi: 0.0, delta_phi: 360.0 },
        )
        .unwrap();
        let tube = b.logical_volume("tube", "T", "M", false).unwrap();
        b.divide_volume("ring", "tube", "kRho", 4, 0.0, 0.0).unwrap();
        b.assembly("wire").unwrap();

        let id = b
            .place_volume("w", "wire", "ring", Vector3::zeros(), Vector3::zeros(), None)
            .unwrap();
        assert_eq!(id, 5);

        let rings: Vec<VolumeId> = b
            .store()
            .volume(tube)
            .unwrap()
            .nodes
            .iter()
            .map(|n| n.volume)
            .collect();
        assert_eq!(rings.len(), 4);
        for ring in rings {
            let nodes = &b.store().volume(ring).unwrap().nodes;
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].copy_number, 5);
        }
    }

    #[test]
    fn exhausted_placement_ids_are_an_error() {
        let mut b = with_air();
        b.assembly("root").unwrap();
        b.assembly("child").unwrap();
        b.placements_created = u32::MAX;
        assert!(b
            .place_volume("pv", "child", "root", Vector3::zeros(), Vector3::zeros(), None)
            .is_err());
        assert!(b.store().volume(b.volume_id("root").unwrap()).unwrap().nodes.is_empty());

        b.primitive("B", Primitive::Box { x: 1.0, y: 1.0, z: 1.0 }).unwrap();
        b.logical_volume("LV", "B", "M", false).unwrap();
        b.placements_created = u32::MAX - 1;
        assert!(b.divide_volume("cells", "LV", "Z", 2, 0.0, 0.0).is_err());
        assert_eq!(b.placement_count(), u32::MAX - 1);
    }

    #[test]
    fn cartesian_division_derives_width() {
        let mut b = with_air();
        b.primitive("slab", Primitive::Box { x: 4.0, y: 1.0, z: 1.0 }).unwrap();
        let slab = b.logical_volume("slab", "slab", "M", false).unwrap();
        b.divide_volume("strip", "slab", "kXAxis", 4, 0.0, 0.0).unwrap();

        let volume = b.store().volume(slab).unwrap();
        let division = volume.division.as_ref().unwrap();
        assert_relative_eq!(division.width, 2.0);
        let first = volume.nodes[0].transform.translation();
        assert_relative_eq!(first.x, -3.0);
    }

    #[test]
    fn unknown_axis_is_unsupported() {
        let mut b = with_air();
        b.primitive("B", Primitive::Box { x: 1.0, y: 1.0, z: 1.0 }).unwrap();
        b.logical_volume("LV", "B", "M", false).unwrap();
        let err = b.divide_volume("cells", "LV", "kW", 2, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, GeometryError::Operation(OperationError::UnsupportedAxis(_))));
        assert!(b.volume_id("cells").is_err());
        assert_eq!(b.placement_count(), 0);
    }

    #[test]
    fn assembly_cannot_be_divided() {
        let mut b = with_air();
        b.assembly("group").unwrap();
        assert!(b.divide_volume("cells", "group", "Z", 2, 1.0, 0.0).is_err());
        assert_eq!(b.placement_count(), 0);
    }

    #[test]
    fn reflected_logical_volume_uses_mirrored_solid() {
        let mut b = with_air();
        b.primitive("plate", Primitive::Box { x: 1.0, y: 2.0, z: 0.5 }).unwrap();
        let zero = Vector3::zeros();
        let mirrored = b
            .reflected_solid("plate_refl", "plate", Vector3::new(1.0, 1.0, -1.0), zero, zero)
            .unwrap();
        let lv = b.logical_volume("plate_refl_lv", "plate_refl", "M", true).unwrap();
        let volume = b.store().volume(lv).unwrap();
        assert_eq!(volume.solid, Some(mirrored));
        assert!(matches!(
            b.store().solid(mirrored).unwrap().shape,
            Shape::Reflected { inverted: true, .. }
        ));
        // Without the flag the name is looked up among ordinary solids.
        assert!(b.logical_volume("other", "plate_refl", "M", false).is_err());
    }

    fn reflected_scene(config: BuilderConfig) -> GeometryBuilder {
        let mut b = with_config(config);
        b.primitive("B", Primitive::Box { x: 1.0, y: 1.0, z: 1.0 }).unwrap();
        let offset = Vector3::new(0.0, 0.0, 10.0);
        b.reflected_solid("V", "B", Vector3::new(-1.0, 1.0, 1.0), Vector3::zeros(), offset)
            .unwrap();
        b.logical_volume("LV", "V", "M", true).unwrap();
        b.assembly("root").unwrap();
        b.place_volume("pv", "LV", "root", Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0), Some("V"))
            .unwrap();
        b
    }

    #[test]
    fn reflected_variant_ignored_by_default() {
        let b = reflected_scene(BuilderConfig::default());
        let root = b.volume_id("root").unwrap();
        let transform = b.store().volume(root).unwrap().nodes[0].transform;
        assert_eq!(*transform.translation(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn reflected_variant_composed_when_enabled() {
        let b = reflected_scene(BuilderConfig {
            compose_reflected_placements: true,
            ..BuilderConfig::default()
        });
        let root = b.volume_id("root").unwrap();
        let transform = b.store().volume(root).unwrap().nodes[0].transform;
        let origin = transform.local_to_master(&Point3::origin());
        assert_relative_eq!(origin, Point3::new(1.0, 0.0, 10.0), epsilon = 1e-12);
    }

    #[test]
    fn composing_an_unknown_variant_fails() {
        let mut b = with_config(BuilderConfig {
            compose_reflected_placements: true,
            ..BuilderConfig::default()
        });
        b.assembly("root").unwrap();
        b.assembly("child").unwrap();
        let err = b
            .place_volume("pv", "child", "root", Vector3::zeros(), Vector3::zeros(), Some("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::Registry(RegistryError::UnresolvedReference { .. })
        ));
    }
}
