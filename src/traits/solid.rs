use crate::{
    compose::artifact::{LayerArtifact, SvgDocument},
    foundation::{color::Rgb8, error::TraitforgeResult},
    traits::registry::{LayerContext, TraitGenerator},
};

/// Hue/lightness offsets applied to named sub-paths.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Shading {
    /// Hue rotation in degrees for every variant.
    pub hue_shift: f64,
    /// Lightness offset for the `shadow` sub-path.
    pub shadow: f64,
    /// Lightness offset for the `highlight` sub-path.
    pub highlight: f64,
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            shadow: -0.12,
            highlight: 0.12,
        }
    }
}

impl Shading {
    /// Color for sub-path `name` derived from `base`.
    pub fn variant(&self, base: Rgb8, name: &str) -> Rgb8 {
        let lightness = match name {
            "shadow" => self.shadow,
            "highlight" => self.highlight,
            _ => 0.0,
        };
        base.shift(self.hue_shift, lightness)
    }
}

/// Flat fill: the whole canvas, or an outline plus its shaded sub-paths.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SolidTrait {
    /// Outline key; `None` fills the canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    /// Base color.
    pub color: Rgb8,
    /// Sub-path shading.
    #[serde(default)]
    pub shading: Shading,
}

impl TraitGenerator for SolidTrait {
    fn generate(&self, ctx: &mut LayerContext<'_>) -> TraitforgeResult<LayerArtifact> {
        let mut doc = SvgDocument::new(ctx.name, ctx.canvas.size);
        let Some(key) = &self.outline else {
            doc.background(self.color);
            return Ok(doc.finish());
        };

        let (descriptor, outline) = ctx.outline(key)?;
        doc.fill_path(outline.path(), self.color, outline.fill_rule());
        for name in descriptor.sub_paths.keys() {
            if let Some(sub) = descriptor.sub_outline(name)? {
                doc.fill_path(
                    sub.path(),
                    self.shading.variant(self.color, name),
                    sub.fill_rule(),
                );
            }
        }
        Ok(doc.finish())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/traits/solid.rs"]
mod tests;
