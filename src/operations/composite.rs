use crate::error::Result;
use crate::store::{BooleanOp, GeometryStore, Shape, SolidData, SolidId};
use crate::transform::Transform;

/// Creates a boolean composite of two existing solids.
///
/// The left operand sits at the identity; the right operand is positioned
/// by `right_transform`.
pub struct MakeComposite {
    name: String,
    op: BooleanOp,
    left: SolidId,
    right: SolidId,
    right_transform: Transform,
}

impl MakeComposite {
    /// Creates a new `MakeComposite` operation.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        op: BooleanOp,
        left: SolidId,
        right: SolidId,
        right_transform: Transform,
    ) -> Self {
        Self {
            name: name.into(),
            op,
            left,
            right,
            right_transform,
        }
    }

    /// Executes the operation, creating the composite in the geometry store.
    ///
    /// # Errors
    ///
    /// Returns an error if either operand is missing from the store.
    pub fn execute(self, store: &mut GeometryStore) -> Result<SolidId> {
        store.solid(self.left)?;
        store.solid(self.right)?;
        Ok(store.add_solid(SolidData {
            name: self.name,
            shape: Shape::Composite {
                op: self.op,
                left: self.left,
                right: self.right,
                right_transform: self.right_transform,
            },
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transform::make_translation;

    fn cube(store: &mut GeometryStore, name: &str) -> SolidId {
        store.add_solid(SolidData {
            name: name.into(),
            shape: Shape::Box {
                dx: 1.0,
                dy: 1.0,
                dz: 1.0,
            },
        })
    }

    #[test]
    fn composite_references_children() {
        let mut store = GeometryStore::new();
        let a = cube(&mut store, "a");
        let b = cube(&mut store, "b");
        let offset = make_translation(0.5, 0.0, 0.0);
        let c = MakeComposite::new("ab", BooleanOp::Subtraction, a, b, offset)
            .execute(&mut store)
            .unwrap();

        let data = store.solid(c).unwrap();
        assert_eq!(data.name, "ab");
        assert_eq!(data.shape.children(), vec![a, b]);
        let Shape::Composite { op, right_transform, .. } = &data.shape else {
            panic!("expected composite, got {}", data.shape.kind());
        };
        assert_eq!(*op, BooleanOp::Subtraction);
        assert!(right_transform.is_translation());
    }

    #[test]
    fn missing_operand_leaves_store_unchanged() {
        let mut store = GeometryStore::new();
        let a = cube(&mut store, "a");
        // Third key of another arena: no such slot exists in `store`.
        let mut other = GeometryStore::new();
        let _ = cube(&mut other, "x");
        let _ = cube(&mut other, "y");
        let foreign = cube(&mut other, "z");

        let result = MakeComposite::new("bad", BooleanOp::Union, a, foreign, Transform::identity())
            .execute(&mut store);
        assert!(result.is_err());
        assert_eq!(store.solid_count(), 1);
    }
}
