//! Typed element definitions and the loop that feeds them to a builder.
//!
//! A parsed geometry description arrives as a sequence of [`Definition`]s.
//! [`GeometryBuilder::build`] applies them in order; when references may
//! point forward, [`dependency_order`] first sorts them so that every name is
//! defined before it is used.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::{info, warn};

use crate::builder::{GeometryBuilder, Primitive};
use crate::error::{OperationError, Result};
use crate::math::Vector3;
use crate::registry::{normalize, Category};
use crate::store::BooleanOp;

/// One element of a geometry description.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Element {
        name: String,
        formula: String,
        z: f64,
        a: f64,
    },
    Isotope {
        name: String,
        z: f64,
        n: f64,
        a: f64,
    },
    Material {
        name: String,
        a: f64,
        z: f64,
        density: f64,
    },
    Mixture {
        name: String,
        components: usize,
        density: f64,
    },
    MixtureElement {
        mixture: String,
        index: usize,
        element: String,
        fraction: f64,
    },
    MixtureMaterial {
        mixture: String,
        index: usize,
        material: String,
        fraction: f64,
    },
    MixtureIsotope {
        mixture: String,
        isotope: String,
        fraction: f64,
    },
    Medium {
        name: String,
        material: String,
    },
    Solid {
        name: String,
        primitive: Primitive,
    },
    Boolean {
        name: String,
        op: BooleanOp,
        left: String,
        right: String,
        position: Vector3,
        rotation: Vector3,
    },
    Reflection {
        name: String,
        solid: String,
        scale: Vector3,
        rotation: Vector3,
        translation: Vector3,
    },
    LogicalVolume {
        name: String,
        solid: String,
        medium: String,
        reflected: bool,
    },
    Assembly {
        name: String,
    },
    Placement {
        name: String,
        volume: String,
        mother: String,
        rotation: Vector3,
        position: Vector3,
        reflected_variant: Option<String>,
    },
    Division {
        name: String,
        mother: String,
        axis: String,
        count: u32,
        width: f64,
        offset: f64,
    },
    /// Marks the top volume.
    World {
        name: String,
    },
}

/// Namespace used for ordering; reflections are keyed apart from solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Named(Category),
    Reflection,
}

type Key = (Slot, String);

fn key(category: Category, name: &str) -> Key {
    (Slot::Named(category), normalize(name))
}

impl Definition {
    /// Element tag, for diagnostics.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Element { .. } => "element",
            Self::Isotope { .. } => "isotope",
            Self::Material { .. } => "material",
            Self::Mixture { .. } => "mixture",
            Self::MixtureElement { .. }
            | Self::MixtureMaterial { .. }
            | Self::MixtureIsotope { .. } => "fraction",
            Self::Medium { .. } => "medium",
            Self::Solid { .. } => "solid",
            Self::Boolean { .. } => "boolean",
            Self::Reflection { .. } => "reflection",
            Self::LogicalVolume { .. } => "volume",
            Self::Assembly { .. } => "assembly",
            Self::Placement { .. } => "physvol",
            Self::Division { .. } => "division",
            Self::World { .. } => "world",
        }
    }

    fn defines(&self) -> Option<Key> {
        match self {
            Self::Element { name, .. } => Some(key(Category::Element, name)),
            Self::Material { name, .. } | Self::Mixture { name, .. } => {
                Some(key(Category::Material, name))
            }
            Self::Medium { name, .. } => Some(key(Category::Medium, name)),
            Self::Solid { name, .. } | Self::Boolean { name, .. } => {
                Some(key(Category::Solid, name))
            }
            Self::Reflection { name, .. } => Some((Slot::Reflection, normalize(name))),
            Self::LogicalVolume { name, .. }
            | Self::Assembly { name }
            | Self::Division { name, .. } => Some(key(Category::Volume, name)),
            Self::Isotope { .. }
            | Self::MixtureElement { .. }
            | Self::MixtureMaterial { .. }
            | Self::MixtureIsotope { .. }
            | Self::Placement { .. }
            | Self::World { .. } => None,
        }
    }

    fn references(&self) -> Vec<Key> {
        match self {
            Self::MixtureElement { mixture, element, .. } => {
                vec![key(Category::Material, mixture), key(Category::Element, element)]
            }
            Self::MixtureMaterial { mixture, material, .. } => {
                vec![key(Category::Material, mixture), key(Category::Material, material)]
            }
            Self::MixtureIsotope { mixture, .. } => vec![key(Category::Material, mixture)],
            Self::Medium { material, .. } => vec![key(Category::Material, material)],
            Self::Boolean { left, right, .. } => {
                vec![key(Category::Solid, left), key(Category::Solid, right)]
            }
            Self::Reflection { solid, .. } => vec![key(Category::Solid, solid)],
            Self::LogicalVolume {
                solid,
                medium,
                reflected,
                ..
            } => {
                let solid = if *reflected {
                    (Slot::Reflection, normalize(solid))
                } else {
                    key(Category::Solid, solid)
                };
                vec![solid, key(Category::Medium, medium)]
            }
            Self::Placement {
                volume,
                mother,
                reflected_variant,
                ..
            } => {
                let mut refs = vec![key(Category::Volume, volume), key(Category::Volume, mother)];
                if let Some(variant) = reflected_variant {
                    refs.push((Slot::Reflection, normalize(variant)));
                }
                refs
            }
            Self::Division { mother, .. } => vec![key(Category::Volume, mother)],
            Self::World { name } => vec![key(Category::Volume, name)],
            Self::Element { .. }
            | Self::Isotope { .. }
            | Self::Material { .. }
            | Self::Mixture { .. }
            | Self::Solid { .. }
            | Self::Assembly { .. } => Vec::new(),
        }
    }
}

/// Orders `definitions` so that every definition comes after the ones
/// defining the names it references.
///
/// The sort is stable: definitions that are already in a valid order keep
/// their relative position. References to names defined nowhere in the
/// slice impose no constraint and are left for the builder to report.
///
/// # Errors
///
/// Returns an error if the references form a cycle.
pub fn dependency_order(definitions: &[Definition]) -> Result<Vec<usize>> {
    let mut definers: HashMap<Key, usize> = HashMap::new();
    for (index, definition) in definitions.iter().enumerate() {
        if let Some(k) = definition.defines() {
            definers.entry(k).or_insert(index);
        }
    }

    let mut dependents = vec![Vec::new(); definitions.len()];
    let mut pending = vec![0_usize; definitions.len()];
    for (index, definition) in definitions.iter().enumerate() {
        for reference in definition.references() {
            if let Some(&definer) = definers.get(&reference) {
                dependents[definer].push(index);
                pending[index] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count == 0)
        .map(|(index, _)| Reverse(index))
        .collect();
    let mut order = Vec::with_capacity(definitions.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for &next in &dependents[index] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() < definitions.len() {
        let stuck: Vec<String> = pending
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(index, _)| {
                let definition = &definitions[index];
                let name = definition.defines().map_or_else(String::new, |(_, name)| name);
                format!("{} `{name}`", definition.tag())
            })
            .collect();
        return Err(OperationError::InvalidInput(format!(
            "circular references between {}",
            stuck.join(", ")
        ))
        .into());
    }
    Ok(order)
}

impl GeometryBuilder {
    /// Applies one definition.
    ///
    /// # Errors
    ///
    /// Returns whatever error the corresponding builder method returns.
    pub fn apply(&mut self, definition: &Definition) -> Result<()> {
        match definition {
            Definition::Element { name, formula, z, a } => {
                self.element(name, formula, *z, *a).map(drop)
            }
            Definition::Isotope { name, z, n, a } => self.isotope(name, *z, *n, *a),
            Definition::Material { name, a, z, density } => {
                self.material(name, *a, *z, *density).map(drop)
            }
            Definition::Mixture {
                name,
                components,
                density,
            } => self.mixture(name, *components, *density).map(drop),
            Definition::MixtureElement {
                mixture,
                index,
                element,
                fraction,
            } => self.add_mixture_element(mixture, *index, element, *fraction),
            Definition::MixtureMaterial {
                mixture,
                index,
                material,
                fraction,
            } => self.add_mixture_material(mixture, *index, material, *fraction),
            Definition::MixtureIsotope {
                mixture,
                isotope,
                fraction,
            } => self.add_mixture_isotope(mixture, isotope, *fraction),
            Definition::Medium { name, material } => self.medium(name, material).map(drop),
            Definition::Solid { name, primitive } => {
                self.primitive(name, primitive.clone()).map(drop)
            }
            Definition::Boolean {
                name,
                op,
                left,
                right,
                position,
                rotation,
            } => self.boolean(name, *op, left, right, *position, *rotation).map(drop),
            Definition::Reflection {
                name,
                solid,
                scale,
                rotation,
                translation,
            } => self.reflected_solid(name, solid, *scale, *rotation, *translation).map(drop),
            Definition::LogicalVolume {
                name,
                solid,
                medium,
                reflected,
            } => self.logical_volume(name, solid, medium, *reflected).map(drop),
            Definition::Assembly { name } => self.assembly(name).map(drop),
            Definition::Placement {
                name,
                volume,
                mother,
                rotation,
                position,
                reflected_variant,
            } => {
                let variant = reflected_variant.as_deref();
                self.place_volume(name, volume, mother, *rotation, *position, variant)
                    .map(drop)
            }
            Definition::Division {
                name,
                mother,
                axis,
                count,
                width,
                offset,
            } => self.divide_volume(name, mother, axis, *count, *width, *offset).map(drop),
            Definition::World { name } => self.set_top_volume(name),
        }
    }

    /// Applies definitions in the given order and returns how many were
    /// skipped as unsupported.
    ///
    /// Unsupported features are logged and skipped; any other error stops
    /// the build at the failing definition.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not an unsupported feature.
    pub fn build<'a>(
        &mut self,
        definitions: impl IntoIterator<Item = &'a Definition>,
    ) -> Result<usize> {
        let mut applied = 0_usize;
        let mut skipped = 0_usize;
        for definition in definitions {
            match self.apply(definition) {
                Ok(()) => applied += 1,
                Err(err) if err.is_declined_feature() => {
                    warn!(tag = definition.tag(), %err, "definition skipped");
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        info!(applied, skipped, "definitions applied");
        Ok(skipped)
    }

    /// Sorts `definitions` with [`dependency_order`], then builds them.
    ///
    /// # Errors
    ///
    /// Returns an error on circular references or on the first failing
    /// definition.
    pub fn build_resolved(&mut self, definitions: &[Definition]) -> Result<usize> {
        let order = dependency_order(definitions)?;
        self.build(order.into_iter().map(|index| &definitions[index]))
    }
}
