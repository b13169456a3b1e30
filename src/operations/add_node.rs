use crate::error::{OperationError, Result};
use crate::store::{GeometryStore, Node, VolumeId};
use crate::transform::Transform;

/// Places a daughter volume inside a mother volume.
pub struct AddNode {
    mother: VolumeId,
    daughter: VolumeId,
    name: String,
    copy_number: u32,
    transform: Transform,
}

impl AddNode {
    /// Creates a new `AddNode` operation.
    #[must_use]
    pub fn new(
        mother: VolumeId,
        daughter: VolumeId,
        name: impl Into<String>,
        copy_number: u32,
        transform: Transform,
    ) -> Self {
        Self {
            mother,
            daughter,
            name: name.into(),
            copy_number,
            transform,
        }
    }

    /// Executes the placement, appending a node to the mother volume.
    ///
    /// # Errors
    ///
    /// Returns an error if either volume is missing, or if the placement
    /// would make the volume graph cyclic.
    pub fn execute(self, store: &mut GeometryStore) -> Result<()> {
        store.volume(self.daughter)?;
        if contains_volume(store, self.daughter, self.mother)? {
            let mother = &store.volume(self.mother)?.name;
            let daughter = &store.volume(self.daughter)?.name;
            return Err(OperationError::InvalidInput(format!(
                "placing `{daughter}` inside `{mother}` would create a cycle"
            ))
            .into());
        }
        store.volume_mut(self.mother)?.nodes.push(Node {
            name: self.name,
            volume: self.daughter,
            copy_number: self.copy_number,
            transform: self.transform,
        });
        Ok(())
    }
}

/// Returns `true` if `target` is `root` or is placed anywhere below it.
///
/// # Errors
///
/// Returns an error if a node refers to a volume missing from the store.
pub fn contains_volume(store: &GeometryStore, root: VolumeId, target: VolumeId) -> Result<bool> {
    let mut stack = vec![root];
    let mut seen = std::collections::HashSet::new();
    while let Some(id) = stack.pop() {
        if id == target {
            return Ok(true);
        }
        if !seen.insert(id) {
            continue;
        }
        stack.extend(store.volume(id)?.nodes.iter().map(|n| n.volume));
    }
    Ok(false)
}
