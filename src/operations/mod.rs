mod add_node;
mod composite;
mod divide;
mod flatten;

pub use add_node::{contains_volume, AddNode};
pub use composite::MakeComposite;
pub use divide::Divide;
pub use flatten::{FlattenPlacements, PlacedNode};
