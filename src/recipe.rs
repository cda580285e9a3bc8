use std::{collections::BTreeMap, sync::Arc};

use crate::{
    compose::{
        orchestrator::{ComposeOpts, Orchestrator},
        order::CanonicalOrder,
    },
    foundation::{
        core::Canvas,
        error::{TraitforgeError, TraitforgeResult},
    },
    optimize::OptimizeSettings,
    outline::oracle::OracleKind,
    source::OutlineSource,
    traits::{
        mosaic::MosaicTrait, registry::TraitRegistry, solid::SolidTrait, spiral::SpiralTrait,
    },
};

fn default_canvas() -> u32 {
    Canvas::DEFAULT_SIZE
}

/// One layer's generator configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Spiral strokes clipped to an outline.
    Spiral(SpiralTrait),
    /// Voronoi mosaic cut to an outline.
    Mosaic(MosaicTrait),
    /// Flat fill.
    Solid(SolidTrait),
}

impl LayerSpec {
    fn validate(&self, name: &str) -> TraitforgeResult<()> {
        let bad = |msg: &str| TraitforgeError::validation(format!("layer '{name}': {msg}"));
        match self {
            LayerSpec::Spiral(s) => {
                if s.outline.trim().is_empty() {
                    return Err(bad("outline key must be non-empty"));
                }
                if s.count == 0 {
                    return Err(bad("count must be >= 1"));
                }
                if s.steps < 2 {
                    return Err(bad("steps must be >= 2"));
                }
                if !s.turns.is_finite() || s.turns <= 0.0 {
                    return Err(bad("turns must be > 0"));
                }
                if !s.radius.is_finite() || s.radius <= 0.0 {
                    return Err(bad("radius must be > 0"));
                }
                if !s.stroke_width.is_finite() || s.stroke_width <= 0.0 {
                    return Err(bad("stroke_width must be > 0"));
                }
                if !s.clip.tolerance.is_finite() || s.clip.tolerance <= 0.0 {
                    return Err(bad("clip.tolerance must be > 0"));
                }
            }
            LayerSpec::Mosaic(m) => {
                if m.outline.trim().is_empty() {
                    return Err(bad("outline key must be non-empty"));
                }
                if m.sites == 0 {
                    return Err(bad("sites must be >= 1"));
                }
                let t = &m.tessellate;
                if !t.polygon_spacing.is_finite() || t.polygon_spacing <= 0.0 {
                    return Err(bad("tessellate.polygon_spacing must be > 0"));
                }
                if !(0.0..=1.0).contains(&t.sites.boundary_fraction) {
                    return Err(bad("tessellate.sites.boundary_fraction must be in [0, 1]"));
                }
            }
            LayerSpec::Solid(s) => {
                if s.outline.as_deref().is_some_and(|k| k.trim().is_empty()) {
                    return Err(bad("outline key must be non-empty when set"));
                }
            }
        }
        Ok(())
    }
}

/// Whole-invocation configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recipe {
    /// Square canvas edge.
    #[serde(default = "default_canvas")]
    pub canvas: u32,
    /// Invocation seed; every layer derives its own stream from it.
    #[serde(default)]
    pub seed: u64,
    /// Stacking order; the built-in table when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
    /// Oracle technique.
    #[serde(default)]
    pub oracle: OracleKind,
    /// Execution settings.
    #[serde(default)]
    pub compose: ComposeOpts,
    /// Optimizer settings.
    #[serde(default)]
    pub optimize: OptimizeSettings,
    /// Generators keyed by layer name.
    #[serde(default)]
    pub layers: BTreeMap<String, LayerSpec>,
}

impl Recipe {
    /// Parse and validate JSON.
    pub fn from_json_str(text: &str) -> TraitforgeResult<Self> {
        let recipe: Recipe = serde_json::from_str(text)?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// Pretty JSON.
    pub fn to_json_string(&self) -> TraitforgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check canvas, order, execution settings and every layer.
    pub fn validate(&self) -> TraitforgeResult<()> {
        Canvas::new(self.canvas)?;
        let order = self.canonical_order()?;
        if self.compose.threads == Some(0) {
            return Err(TraitforgeError::validation(
                "compose.threads must be >= 1 when set",
            ));
        }
        if self.optimize.enabled && self.optimize.timeout_ms == 0 {
            return Err(TraitforgeError::validation(
                "optimize.timeout_ms must be > 0 when enabled",
            ));
        }
        for (name, spec) in &self.layers {
            if order.rank(name).is_none() {
                return Err(TraitforgeError::validation(format!(
                    "layer '{name}' is not in the canonical order"
                )));
            }
            spec.validate(name)?;
        }
        Ok(())
    }

    /// Stacking order this recipe uses.
    pub fn canonical_order(&self) -> TraitforgeResult<CanonicalOrder> {
        match &self.order {
            Some(names) => CanonicalOrder::new(names.iter().cloned()),
            None => Ok(CanonicalOrder::default()),
        }
    }

    /// Generators for every configured layer.
    pub fn registry(&self) -> TraitforgeResult<TraitRegistry> {
        let mut registry = TraitRegistry::new();
        for (name, spec) in &self.layers {
            match spec {
                LayerSpec::Spiral(s) => registry.register(name.clone(), s.clone())?,
                LayerSpec::Mosaic(m) => registry.register(name.clone(), m.clone())?,
                LayerSpec::Solid(s) => registry.register(name.clone(), s.clone())?,
            }
        }
        Ok(registry)
    }

    /// Validated orchestrator reading outlines from `source`.
    pub fn orchestrator(&self, source: Arc<dyn OutlineSource>) -> TraitforgeResult<Orchestrator> {
        self.validate()?;
        Ok(
            Orchestrator::new(self.canonical_order()?, self.registry()?, source)
                .with_canvas(Canvas::new(self.canvas)?)
                .with_seed(self.seed)
                .with_oracle(self.oracle)
                .with_opts(self.compose),
        )
    }
}

/// Fluent construction of a [`Recipe`]; `build` validates.
#[derive(Debug)]
pub struct RecipeBuilder {
    recipe: Recipe,
}

impl Default for RecipeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeBuilder {
    /// Empty recipe with the default canvas, seed 0 and the built-in order.
    pub fn new() -> Self {
        Self {
            recipe: Recipe {
                canvas: default_canvas(),
                seed: 0,
                order: None,
                oracle: OracleKind::default(),
                compose: ComposeOpts::default(),
                optimize: OptimizeSettings::default(),
                layers: BTreeMap::new(),
            },
        }
    }

    /// Square canvas edge.
    pub fn canvas(mut self, size: u32) -> Self {
        self.recipe.canvas = size;
        self
    }

    /// Invocation seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.recipe.seed = seed;
        self
    }

    /// Custom stacking order, bottom first.
    pub fn order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipe.order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Oracle technique.
    pub fn oracle(mut self, oracle: OracleKind) -> Self {
        self.recipe.oracle = oracle;
        self
    }

    /// Execution settings.
    pub fn compose(mut self, opts: ComposeOpts) -> Self {
        self.recipe.compose = opts;
        self
    }

    /// Optimizer settings.
    pub fn optimize(mut self, settings: OptimizeSettings) -> Self {
        self.recipe.optimize = settings;
        self
    }

    /// Add a named layer; a name already present is rejected.
    pub fn layer(mut self, name: impl Into<String>, spec: LayerSpec) -> TraitforgeResult<Self> {
        let name = name.into();
        if self.recipe.layers.contains_key(&name) {
            return Err(TraitforgeError::validation(format!(
                "duplicate layer '{name}'"
            )));
        }
        self.recipe.layers.insert(name, spec);
        Ok(self)
    }

    /// Validate and return the recipe.
    pub fn build(self) -> TraitforgeResult<Recipe> {
        self.recipe.validate()?;
        Ok(self.recipe)
    }
}

#[cfg(test)]
#[path = "../tests/unit/recipe.rs"]
mod tests;
