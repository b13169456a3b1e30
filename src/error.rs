use thiserror::Error;

use crate::registry::Category;

/// Top-level error type for the detgeo geometry builder.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GeometryError {
    /// Returns `true` for errors the document loop may skip over.
    #[must_use]
    pub fn is_declined_feature(&self) -> bool {
        matches!(self, Self::Operation(OperationError::UnsupportedFeature(_)))
    }
}

/// Errors related to name registration and lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{category} `{name}` is already defined")]
    DuplicateName { category: Category, name: String },

    #[error("{category} `{name}` is not defined")]
    UnresolvedReference { category: Category, name: String },
}

/// Errors related to geometry construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("unsupported division axis `{0}`")]
    UnsupportedAxis(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to the geometry store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Convenience type alias for results using [`GeometryError`].
pub type Result<T> = std::result::Result<T, GeometryError>;
