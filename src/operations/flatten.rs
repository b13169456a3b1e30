use crate::error::Result;
use crate::store::{GeometryStore, VolumeId};
use crate::transform::Transform;

/// One physical node reached from the top volume, with its global transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    /// Slash-separated node names from the top volume, e.g. `world/det_1/layer_3`.
    pub path: String,
    pub volume: VolumeId,
    pub copy_number: u32,
    /// Nesting depth; direct daughters of the top volume have depth 1.
    pub depth: usize,
    /// Daughter-to-top transform.
    pub global: Transform,
}

/// Walks the placement graph depth-first from a top volume.
pub struct FlattenPlacements {
    top: VolumeId,
}

impl FlattenPlacements {
    /// Creates a new `FlattenPlacements` query.
    #[must_use]
    pub fn new(top: VolumeId) -> Self {
        Self { top }
    }

    /// Executes the walk, returning nodes in pre-order.
    ///
    /// # Errors
    ///
    /// Returns an error if a node refers to a volume missing from the store.
    pub fn execute(&self, store: &GeometryStore) -> Result<Vec<PlacedNode>> {
        let top_name = store.volume(self.top)?.name.clone();
        let mut out = Vec::new();
        visit(store, self.top, &top_name, 1, &Transform::identity(), &mut out)?;
        Ok(out)
    }
}

fn visit(
    store: &GeometryStore,
    volume: VolumeId,
    prefix: &str,
    depth: usize,
    parent: &Transform,
    out: &mut Vec<PlacedNode>,
) -> Result<()> {
    for node in &store.volume(volume)?.nodes {
        let path = format!("{prefix}/{}", node.name);
        let global = parent.compose(&node.transform);
        out.push(PlacedNode {
            path: path.clone(),
            volume: node.volume,
            copy_number: node.copy_number,
            depth,
            global,
        });
        visit(store, node.volume, &path, depth + 1, &global, out)?;
    }
    Ok(())
}
