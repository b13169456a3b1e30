use crate::error::{OperationError, Result};
use crate::math::{rotation_z, Vector3, TOLERANCE};
use crate::store::{
    AxisCode, DivisionData, GeometryStore, MediumId, Shape, SolidData, SolidId, VolumeData,
    VolumeId,
};
use crate::transform::{make_translation, Transform};

use super::AddNode;

/// Slices a mother volume into `count` equal cells along one axis code.
///
/// How the code is read depends on the mother's shape: cylindrical shapes
/// take [`AxisCode::X`] as radius and [`AxisCode::Y`] as azimuth; anything
/// else is cut along the cartesian axis. Slices and sectors share a single
/// cell volume placed `count` times. Rings differ in size, so a radial
/// division creates one cell volume per ring, each placed at the identity.
/// Every cell volume carries the division's name.
pub struct Divide {
    mother: VolumeId,
    name: String,
    axis: AxisCode,
    count: u32,
    start: f64,
    width: f64,
    first_copy: u32,
}

impl Divide {
    /// Creates a new `Divide` operation.
    ///
    /// * `width` - Cell width; a value `<= 0` derives it from the mother's
    ///   extent along the axis, starting at the low edge.
    /// * `first_copy` - Copy number of the first cell; the others follow
    ///   contiguously.
    #[must_use]
    pub fn new(
        mother: VolumeId,
        name: impl Into<String>,
        axis: AxisCode,
        count: u32,
        start: f64,
        width: f64,
        first_copy: u32,
    ) -> Self {
        Self {
            mother,
            name: name.into(),
            axis,
            count,
            start,
            width,
            first_copy,
        }
    }

    /// Executes the division, adding the cell volumes and their nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero or the copy numbers would
    /// overflow, the mother is an assembly or is already divided, the cells
    /// would leave the mother's extent, or the width must be derived from an
    /// extent the mother's shape does not define.
    pub fn execute(self, store: &mut GeometryStore) -> Result<DivisionData> {
        if self.count == 0 {
            return Err(invalid(format!("division `{}` needs at least one cell", self.name)));
        }
        if !(self.start.is_finite() && self.width.is_finite()) {
            return Err(invalid(format!(
                "division `{}` has non-finite offset or width",
                self.name
            )));
        }
        let last_copy = self.first_copy.checked_add(self.count - 1).ok_or_else(|| {
            invalid(format!("copy numbers of division `{}` overflow", self.name))
        })?;
        let mother = store.volume(self.mother)?;
        let (Some(mother_solid), Some(medium)) = (mother.solid, mother.medium) else {
            return Err(invalid(format!("assembly `{}` cannot be divided", mother.name)));
        };
        if mother.division.is_some() {
            return Err(invalid(format!("volume `{}` is already divided", mother.name)));
        }
        let mother_name = mother.name.clone();
        let shape = store.solid(mother_solid)?.shape.clone();
        let range = shape
            .axis_range(self.axis)
            .map(|(a, b)| (a.min(b), a.max(b)));

        let (start, width) = if self.width > 0.0 {
            if let Some((lo, hi)) = range {
                self.check_fits(&shape, &mother_name, lo, hi)?;
            }
            (self.start, self.width)
        } else {
            let (lo, hi) = range.ok_or_else(|| {
                invalid(format!(
                    "cannot derive cell width of `{mother_name}` ({}) along axis code {}",
                    shape.kind(),
                    self.axis.code()
                ))
            })?;
            (lo, (hi - lo) / f64::from(self.count))
        };

        let radial = shape.is_cylindrical() && self.axis == AxisCode::X;
        let cells: Vec<VolumeId> = if radial {
            (0..self.count)
                .map(|i| {
                    let low = start + width * f64::from(i);
                    self.add_cell(store, mother_solid, medium, low, low + width)
                })
                .collect()
        } else {
            vec![self.add_cell(store, mother_solid, medium, -width / 2.0, width / 2.0)]
        };

        for (i, copy_number) in (self.first_copy..=last_copy).enumerate() {
            let cell = if radial { cells[i] } else { cells[0] };
            let center = start + width * (f64::from(copy_number - self.first_copy) + 0.5);
            AddNode::new(
                self.mother,
                cell,
                format!("{}_{}", self.name, i + 1),
                copy_number,
                cell_transform(&shape, self.axis, center),
            )
            .execute(store)?;
        }

        let division = DivisionData {
            axis: self.axis,
            count: self.count,
            start,
            width,
            cells,
            copy_numbers: self.first_copy..=last_copy,
        };
        store.volume_mut(self.mother)?.division = Some(division.clone());
        Ok(division)
    }

    /// Rejects explicit cells that run past the mother's extent. Azimuthal
    /// sectors may wrap, so only their total span is checked.
    fn check_fits(&self, shape: &Shape, mother: &str, lo: f64, hi: f64) -> Result<()> {
        let span = self.width * f64::from(self.count);
        let end = self.start + span;
        let fits = if shape.is_cylindrical() && self.axis == AxisCode::Y {
            span <= hi - lo + TOLERANCE
        } else {
            self.start >= lo - TOLERANCE && end <= hi + TOLERANCE
        };
        if fits {
            Ok(())
        } else {
            Err(invalid(format!(
                "division `{}` spans {}..{end}, outside `{mother}` ({lo}..{hi})",
                self.name, self.start
            )))
        }
    }

    fn add_cell(
        &self,
        store: &mut GeometryStore,
        mother: SolidId,
        medium: MediumId,
        low: f64,
        high: f64,
    ) -> VolumeId {
        let solid = store.add_solid(SolidData {
            name: self.name.clone(),
            shape: Shape::DivisionCell {
                mother,
                axis: self.axis,
                low,
                high,
            },
        });
        store.add_volume(VolumeData::new(self.name.clone(), solid, medium))
    }
}

fn cell_transform(shape: &Shape, axis: AxisCode, center: f64) -> Transform {
    match (shape.is_cylindrical(), axis) {
        (true, AxisCode::X) => Transform::identity(),
        (true, AxisCode::Y) => Transform::from_parts(rotation_z(center), Vector3::zeros()),
        (_, AxisCode::X) => make_translation(center, 0.0, 0.0),
        (_, AxisCode::Y) => make_translation(0.0, center, 0.0),
        (_, AxisCode::Z) => make_translation(0.0, 0.0, center),
    }
}

fn invalid(message: String) -> crate::error::GeometryError {
    OperationError::InvalidInput(message).into()
}
