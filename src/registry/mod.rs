//! Name normalisation and per-category name → handle maps.

mod normalize;

pub use normalize::normalize;

use std::collections::HashMap;
use std::fmt;

use crate::error::RegistryError;

/// Namespace an identifier lives in. Each category has its own map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Element,
    Material,
    Medium,
    Solid,
    Volume,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Element => "element",
            Self::Material => "material",
            Self::Medium => "medium",
            Self::Solid => "solid",
            Self::Volume => "volume",
        })
    }
}

/// Maps logical identifiers to handles of type `H`, one namespace per [`Category`].
///
/// Keys are expected to be normalised already; see [`normalize`].
#[derive(Debug, Clone)]
pub struct NameRegistry<H> {
    maps: HashMap<Category, HashMap<String, H>>,
}

impl<H> Default for NameRegistry<H> {
    fn default() -> Self {
        Self {
            maps: HashMap::new(),
        }
    }
}

impl<H: Copy> NameRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under `name` in `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if `name` is already taken in
    /// that category. The existing entry is left untouched.
    pub fn register(
        &mut self,
        category: Category,
        name: &str,
        handle: H,
    ) -> Result<(), RegistryError> {
        let map = self.maps.entry(category).or_default();
        if map.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                category,
                name: name.to_owned(),
            });
        }
        map.insert(name.to_owned(), handle);
        Ok(())
    }

    /// Registers `handle` under `name`, replacing any previous entry.
    ///
    /// Returns the replaced handle, if any.
    pub fn replace(&mut self, category: Category, name: &str, handle: H) -> Option<H> {
        self.maps
            .entry(category)
            .or_default()
            .insert(name.to_owned(), handle)
    }

    /// Looks up the handle registered under `name` in `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnresolvedReference`] if nothing is registered.
    pub fn lookup(&self, category: Category, name: &str) -> Result<H, RegistryError> {
        self.get(category, name)
            .ok_or_else(|| RegistryError::UnresolvedReference {
                category,
                name: name.to_owned(),
            })
    }

    /// Like [`lookup`](Self::lookup) but without building an error.
    #[must_use]
    pub fn get(&self, category: Category, name: &str) -> Option<H> {
        self.maps.get(&category).and_then(|m| m.get(name)).copied()
    }

    /// Returns `true` if `name` is registered in `category`.
    #[must_use]
    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.get(category, name).is_some()
    }

    /// Number of names registered in `category`.
    #[must_use]
    pub fn len(&self, category: Category) -> usize {
        self.maps.get(&category).map_or(0, HashMap::len)
    }

    /// Returns `true` if no category holds any name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.values().all(HashMap::is_empty)
    }
}
