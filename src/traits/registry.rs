use std::{collections::BTreeMap, sync::Arc};

use rand::rngs::StdRng;

use crate::{
    compose::artifact::LayerArtifact,
    foundation::{
        core::Canvas,
        error::{TraitforgeError, TraitforgeResult},
    },
    outline::{
        model::{Outline, OutlineDescriptor},
        oracle::{BoundaryOracle, OracleKind},
    },
    source::OutlineSource,
};

/// Everything one layer generation may touch. Owned by that layer alone.
pub struct LayerContext<'a> {
    /// Layer name; artifacts must carry it.
    pub name: &'a str,
    /// Output canvas.
    pub canvas: Canvas,
    /// Outline lookup.
    pub source: &'a dyn OutlineSource,
    /// Oracle technique for this invocation.
    pub oracle: OracleKind,
    /// This layer's private random stream.
    pub rng: StdRng,
}

impl std::fmt::Debug for LayerContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerContext")
            .field("name", &self.name)
            .field("canvas", &self.canvas)
            .field("oracle", &self.oracle)
            .finish_non_exhaustive()
    }
}

impl LayerContext<'_> {
    /// Fetch `key` and build its main outline.
    pub fn outline(&self, key: &str) -> TraitforgeResult<(OutlineDescriptor, Outline)> {
        let descriptor = self.source.fetch(key)?;
        let outline = descriptor.outline()?;
        Ok((descriptor, outline))
    }

    /// Oracle for `outline` using the configured technique.
    pub fn oracle_for(&self, outline: &Outline) -> TraitforgeResult<Box<dyn BoundaryOracle>> {
        self.oracle.build(outline)
    }
}

/// Produces one layer's artifact.
pub trait TraitGenerator: Send + Sync {
    /// Generate the artifact for `ctx.name`. Randomness comes only from `ctx.rng`.
    fn generate(&self, ctx: &mut LayerContext<'_>) -> TraitforgeResult<LayerArtifact>;
}

impl<F> TraitGenerator for F
where
    F: Fn(&mut LayerContext<'_>) -> TraitforgeResult<LayerArtifact> + Send + Sync,
{
    fn generate(&self, ctx: &mut LayerContext<'_>) -> TraitforgeResult<LayerArtifact> {
        self(ctx)
    }
}

/// Generators keyed by layer name.
#[derive(Clone, Default)]
pub struct TraitRegistry {
    generators: BTreeMap<String, Arc<dyn TraitGenerator>>,
}

impl std::fmt::Debug for TraitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraitRegistry")
            .field("layers", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TraitRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `generator` for `name`; a second registration for the same name is an error.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: impl TraitGenerator + 'static,
    ) -> TraitforgeResult<()> {
        let name = name.into();
        if self.generators.contains_key(&name) {
            return Err(TraitforgeError::validation(format!(
                "layer '{name}' is already registered"
            )));
        }
        self.generators.insert(name, Arc::new(generator));
        Ok(())
    }

    /// Builder form of [`TraitRegistry::register`].
    pub fn with(
        mut self,
        name: impl Into<String>,
        generator: impl TraitGenerator + 'static,
    ) -> TraitforgeResult<Self> {
        self.register(name, generator)?;
        Ok(self)
    }

    /// Generator for `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TraitGenerator>> {
        self.generators.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/traits/registry.rs"]
mod tests;
