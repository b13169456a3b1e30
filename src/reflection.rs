//! Records which solids were produced by a reflection, keyed by declared name.

use std::collections::HashMap;

use crate::store::SolidId;
use crate::transform::Reflection;

/// One reflected solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionEntry {
    /// The solid that was mirrored.
    pub source: SolidId,
    /// The solid created for the mirrored copy.
    pub reflected: SolidId,
    pub reflection: Reflection,
}

/// Name → reflection map. Re-registering a name replaces the entry.
#[derive(Debug, Clone, Default)]
pub struct ReflectionRegistry {
    entries: HashMap<String, ReflectionEntry>,
}

impl ReflectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `entry` under `name`, returning the entry it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        entry: ReflectionEntry,
    ) -> Option<ReflectionEntry> {
        self.entries.insert(name.into(), entry)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ReflectionEntry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
