use rand::Rng;

use crate::{
    compose::artifact::{LayerArtifact, SvgDocument},
    foundation::{color::Rgb8, core::FillRule, error::TraitforgeResult},
    tessellate::{
        intersect::IntersectMode,
        pipeline::{TessellateOptions, tessellate},
    },
    traits::registry::{LayerContext, TraitGenerator},
};

fn default_sites() -> usize {
    36
}

fn default_hue_jitter() -> f64 {
    18.0
}

fn default_lightness_jitter() -> f64 {
    0.08
}

/// Voronoi mosaic cut to an outline, one shaded tile per piece.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MosaicTrait {
    /// Outline key.
    pub outline: String,
    /// Requested site count.
    #[serde(default = "default_sites")]
    pub sites: usize,
    /// Base tile color.
    pub color: Rgb8,
    /// Per-site hue jitter in degrees (symmetric).
    #[serde(default = "default_hue_jitter")]
    pub hue_jitter: f64,
    /// Per-site lightness jitter (symmetric).
    #[serde(default = "default_lightness_jitter")]
    pub lightness_jitter: f64,
    /// Optional grout stroke between tiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grout: Option<Rgb8>,
    /// Tessellation settings.
    #[serde(default)]
    pub tessellate: TessellateOptions,
}

impl MosaicTrait {
    /// Mosaic with defaults for everything but the outline and color.
    pub fn new(outline: impl Into<String>, color: Rgb8) -> Self {
        Self {
            outline: outline.into(),
            sites: default_sites(),
            color,
            hue_jitter: default_hue_jitter(),
            lightness_jitter: default_lightness_jitter(),
            grout: None,
            tessellate: TessellateOptions::default(),
        }
    }
}

fn symmetric<R: Rng>(rng: &mut R, span: f64) -> f64 {
    if span > 0.0 {
        rng.gen_range(-span..=span)
    } else {
        0.0
    }
}

impl TraitGenerator for MosaicTrait {
    fn generate(&self, ctx: &mut LayerContext<'_>) -> TraitforgeResult<LayerArtifact> {
        let (_, outline) = ctx.outline(&self.outline)?;
        let oracle = ctx.oracle_for(&outline)?;
        let tess = tessellate(
            oracle.as_ref(),
            &outline,
            self.sites,
            &self.tessellate,
            &mut ctx.rng,
        )?;

        let colors: Vec<Rgb8> = (0..tess.sites.len())
            .map(|_| {
                let h = symmetric(&mut ctx.rng, self.hue_jitter);
                let l = symmetric(&mut ctx.rng, self.lightness_jitter);
                self.color.shift(h, l)
            })
            .collect();

        let mut doc = SvgDocument::new(ctx.name, ctx.canvas.size);
        let masked = tess.mode == IntersectMode::MaskedApproximate;
        if masked {
            let clip_id = doc.clip_path("outline", outline.path(), outline.fill_rule());
            doc.begin_clip_group(&clip_id);
        }
        for piece in &tess.clipped {
            let color = colors.get(piece.site).copied().unwrap_or(self.color);
            let path = piece.to_path();
            doc.fill_path(&path, color, FillRule::NonZero);
            if let Some(grout) = self.grout {
                doc.stroke_path(&path, grout, 1.0);
            }
        }
        if masked {
            doc.end_group();
        }
        Ok(doc.finish())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/traits/mosaic.rs"]
mod tests;
