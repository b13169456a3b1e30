/// Configuration for a [`GeometryBuilder`](super::GeometryBuilder) session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// When a placement names a reflected variant, prepend the registered
    /// reflection transform to the placement transform. Off by default: the
    /// placement transform is used alone.
    pub compose_reflected_placements: bool,
    /// Reject a second definition of a name within a category. When off, the
    /// later definition replaces the earlier one and a warning is logged.
    pub strict_names: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            compose_reflected_placements: false,
            strict_names: true,
        }
    }
}
