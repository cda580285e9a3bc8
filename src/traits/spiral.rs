use rand::{Rng, seq::SliceRandom};

use crate::{
    compose::artifact::{LayerArtifact, SvgDocument},
    curve::{
        clip::{ClipOptions, clip},
        generator::{CurveKind, generate},
    },
    foundation::{
        color::Rgb8,
        error::{TraitforgeError, TraitforgeResult},
    },
    outline::oracle::find_interior_point,
    traits::registry::{LayerContext, TraitGenerator},
};

fn default_count() -> usize {
    3
}

fn default_turns() -> f64 {
    3.0
}

fn default_steps() -> usize {
    360
}

fn default_radius() -> f64 {
    0.6
}

fn default_stroke_width() -> f64 {
    3.0
}

fn default_hue_jitter() -> f64 {
    25.0
}

fn default_attempts() -> usize {
    64
}

/// Spiral strokes clipped to an outline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpiralTrait {
    /// Outline key.
    pub outline: String,
    /// Allowed curve kinds; empty means every kind.
    #[serde(default)]
    pub kinds: Vec<CurveKind>,
    /// Number of spirals.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Revolutions per spiral.
    #[serde(default = "default_turns")]
    pub turns: f64,
    /// Samples per spiral.
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Maximum radius as a fraction of the outline's half-diagonal.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Stroke width.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Base stroke color.
    pub color: Rgb8,
    /// Per-spiral hue jitter in degrees (symmetric).
    #[serde(default = "default_hue_jitter")]
    pub hue_jitter: f64,
    /// Optional fill drawn under the strokes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb8>,
    /// Attempts when looking for an interior center.
    #[serde(default = "default_attempts")]
    pub center_attempts: usize,
    /// Clipper settings.
    #[serde(default)]
    pub clip: ClipOptions,
}

impl SpiralTrait {
    /// Spiral trait with defaults for everything but the outline and color.
    pub fn new(outline: impl Into<String>, color: Rgb8) -> Self {
        Self {
            outline: outline.into(),
            kinds: Vec::new(),
            count: default_count(),
            turns: default_turns(),
            steps: default_steps(),
            radius: default_radius(),
            stroke_width: default_stroke_width(),
            color,
            hue_jitter: default_hue_jitter(),
            fill: None,
            center_attempts: default_attempts(),
            clip: ClipOptions::default(),
        }
    }
}

impl TraitGenerator for SpiralTrait {
    fn generate(&self, ctx: &mut LayerContext<'_>) -> TraitforgeResult<LayerArtifact> {
        let (_, outline) = ctx.outline(&self.outline)?;
        let oracle = ctx.oracle_for(&outline)?;
        let bounds = outline.bounds();
        let max_radius = self.radius * 0.5 * bounds.width().hypot(bounds.height());
        let bias = bounds.inset(-0.2 * bounds.width().min(bounds.height()));

        let mut doc = SvgDocument::new(ctx.name, ctx.canvas.size);
        let clip_id = doc.clip_path("outline", outline.path(), outline.fill_rule());
        if let Some(fill) = self.fill {
            doc.fill_path(outline.path(), fill, outline.fill_rule());
        }
        // Strokes are clipped geometrically; the clip group trims their round caps.
        doc.begin_clip_group(&clip_id);

        let mut drawn = 0usize;
        for _ in 0..self.count {
            let kind = self
                .kinds
                .choose(&mut ctx.rng)
                .copied()
                .unwrap_or_else(|| CurveKind::ALL[ctx.rng.gen_range(0..CurveKind::ALL.len())]);
            let center =
                find_interior_point(oracle.as_ref(), &outline, bias, self.center_attempts, &mut ctx.rng);
            let curve = generate(kind, center, max_radius, self.turns, self.steps, &mut ctx.rng);
            let jitter = if self.hue_jitter > 0.0 {
                ctx.rng.gen_range(-self.hue_jitter..=self.hue_jitter)
            } else {
                0.0
            };
            let stroke = self.color.shift(jitter, 0.0);
            for segment in clip(oracle.as_ref(), &outline, &curve, &self.clip) {
                doc.stroke_path(&segment.to_path(), stroke, self.stroke_width);
                drawn += 1;
            }
        }
        doc.end_group();

        if drawn == 0 {
            return Err(TraitforgeError::geometry(format!(
                "layer '{}' produced no interior spiral segments",
                ctx.name
            )));
        }
        Ok(doc.finish())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/traits/spiral.rs"]
mod tests;
