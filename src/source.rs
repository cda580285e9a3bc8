use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::{
    foundation::error::{TraitforgeError, TraitforgeResult},
    outline::model::OutlineDescriptor,
};

/// Blocking lookup of outline descriptors by key.
pub trait OutlineSource: Send + Sync {
    /// Descriptor stored under `key`. Missing or malformed records are outline errors.
    fn fetch(&self, key: &str) -> TraitforgeResult<OutlineDescriptor>;
}

impl<T: OutlineSource + ?Sized> OutlineSource for Arc<T> {
    fn fetch(&self, key: &str) -> TraitforgeResult<OutlineDescriptor> {
        (**self).fetch(key)
    }
}

/// Descriptors held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    entries: BTreeMap<String, OutlineDescriptor>,
}

impl InMemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace `key`.
    pub fn insert(&mut self, key: impl Into<String>, descriptor: OutlineDescriptor) {
        self.entries.insert(key.into(), descriptor);
    }

    /// Builder form of [`InMemorySource::insert`].
    pub fn with(mut self, key: impl Into<String>, descriptor: OutlineDescriptor) -> Self {
        self.insert(key, descriptor);
        self
    }

    /// Stored keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl OutlineSource for InMemorySource {
    fn fetch(&self, key: &str) -> TraitforgeResult<OutlineDescriptor> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| TraitforgeError::outline(format!("no outline descriptor '{key}'")))
    }
}

/// Descriptors stored as `<root>/<key>.json`.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> TraitforgeResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(TraitforgeError::outline(format!(
                "invalid outline key '{key}'"
            )));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl OutlineSource for DirSource {
    fn fetch(&self, key: &str) -> TraitforgeResult<OutlineDescriptor> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(TraitforgeError::outline(format!(
                "no outline descriptor '{key}' at {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read outline descriptor {}", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            TraitforgeError::outline(format!(
                "malformed outline descriptor {}: {e}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/source.rs"]
mod tests;
