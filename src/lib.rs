pub mod builder;
pub mod document;
pub mod error;
pub mod math;
pub mod operations;
pub mod reflection;
pub mod registry;
pub mod scene;
pub mod store;
pub mod transform;

pub use builder::{Axis, BuilderConfig, GeometryBuilder, Primitive, TrapDims};
pub use document::{dependency_order, Definition};
pub use error::{GeometryError, Result};
pub use scene::Geometry;
