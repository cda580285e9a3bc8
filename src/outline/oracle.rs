use std::sync::Arc;

use kurbo::{PathEl, Shape as _};
use rand::Rng;
use resvg::tiny_skia;

use crate::{
    foundation::{
        core::{FillRule, Point, Rect},
        error::{TraitforgeError, TraitforgeResult},
    },
    outline::model::Outline,
};

/// Point-in-region membership test against an [`Outline`].
///
/// Implementations are pure: identical arguments always give identical answers, and points exactly
/// on the boundary resolve the same way every time.
pub trait BoundaryOracle: Send + Sync {
    /// Whether `point` is interior to `outline` under its declared fill rule.
    fn inside(&self, outline: &Outline, point: Point) -> bool;
}

/// Analytic winding-number oracle over the outline's curves.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindingOracle;

impl BoundaryOracle for WindingOracle {
    fn inside(&self, outline: &Outline, point: Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        outline
            .fill_rule()
            .is_inside(outline.path().winding(point))
    }
}

/// Coverage-mask oracle: the outline is rasterized once, anti-aliased, at the resolution of its
/// bounding rectangle (times `scale`).
///
/// A query is answered from the mask when its pixel and the eight around it are all fully
/// covered or all empty. Anywhere near the boundary some of them are partial, and the query falls
/// through to the winding test, so both oracles agree on every point.
///
/// The mask belongs to one outline. Queries against any other outline use [`WindingOracle`].
#[derive(Clone)]
pub struct RasterOracle {
    outline: Outline,
    mask: Arc<tiny_skia::Mask>,
    scale: f64,
}

impl std::fmt::Debug for RasterOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterOracle")
            .field("bounds", &self.outline.bounds())
            .field("mask_width", &self.mask.width())
            .field("mask_height", &self.mask.height())
            .field("scale", &self.scale)
            .finish()
    }
}

impl RasterOracle {
    /// Largest mask edge in pixels.
    pub const MAX_DIM: u32 = 8192;

    /// Rasterize `outline` at one pixel per unit.
    pub fn new(outline: &Outline) -> TraitforgeResult<Self> {
        Self::with_scale(outline, 1.0)
    }

    /// Rasterize `outline` at `scale` pixels per unit.
    pub fn with_scale(outline: &Outline, scale: f64) -> TraitforgeResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TraitforgeError::validation("raster oracle scale must be > 0"));
        }
        let bounds = outline.bounds();
        let w = (bounds.width() * scale).ceil().max(1.0);
        let h = (bounds.height() * scale).ceil().max(1.0);
        if w > f64::from(Self::MAX_DIM) || h > f64::from(Self::MAX_DIM) {
            return Err(TraitforgeError::validation(format!(
                "raster oracle mask too large: {w}x{h} (max {0}x{0})",
                Self::MAX_DIM
            )));
        }

        let mut mask = tiny_skia::Mask::new(w as u32, h as u32)
            .ok_or_else(|| TraitforgeError::geometry("failed to allocate oracle mask"))?;
        let path = to_skia_path(outline)?;
        let rule = match outline.fill_rule() {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        };
        let xform = tiny_skia::Transform::from_row(
            scale as f32,
            0.0,
            0.0,
            scale as f32,
            (-bounds.x0 * scale) as f32,
            (-bounds.y0 * scale) as f32,
        );
        mask.fill_path(&path, rule, true, xform);

        Ok(Self {
            outline: outline.clone(),
            mask: Arc::new(mask),
            scale,
        })
    }

    fn alpha(&self, x: i64, y: i64) -> u8 {
        let (w, h) = (i64::from(self.mask.width()), i64::from(self.mask.height()));
        if x < 0 || y < 0 || x >= w || y >= h {
            return 0;
        }
        let idx = (y * w + x) as usize;
        self.mask.data().get(idx).copied().unwrap_or(0)
    }

    /// `Some` when the neighbourhood of `point` is uniformly covered or empty.
    fn covered(&self, point: Point) -> Option<bool> {
        let b = self.outline.bounds();
        let px = ((point.x - b.x0) * self.scale).floor();
        let py = ((point.y - b.y0) * self.scale).floor();
        let (w, h) = (f64::from(self.mask.width()), f64::from(self.mask.height()));
        if !(px >= -1.0 && py >= -1.0 && px <= w && py <= h) {
            return Some(false);
        }
        let (px, py) = (px as i64, py as i64);
        let (mut full, mut empty) = (0, 0);
        for dy in -1..=1 {
            for dx in -1..=1 {
                match self.alpha(px + dx, py + dy) {
                    u8::MAX => full += 1,
                    0 => empty += 1,
                    _ => return None,
                }
            }
        }
        match (full, empty) {
            (9, _) => Some(true),
            (_, 9) => Some(false),
            _ => None,
        }
    }
}

impl BoundaryOracle for RasterOracle {
    fn inside(&self, outline: &Outline, point: Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        if outline.same_geometry(&self.outline)
            && let Some(covered) = self.covered(point)
        {
            return covered;
        }
        WindingOracle.inside(outline, point)
    }
}

/// Oracle technique selected by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// [`WindingOracle`].
    #[default]
    Winding,
    /// [`RasterOracle`] at one pixel per unit; boundary queries resolve by winding.
    Raster,
}

impl OracleKind {
    /// Oracle for queries against `outline`.
    pub fn build(self, outline: &Outline) -> TraitforgeResult<Box<dyn BoundaryOracle>> {
        Ok(match self {
            OracleKind::Winding => Box::new(WindingOracle),
            OracleKind::Raster => Box::new(RasterOracle::new(outline)?),
        })
    }
}

fn to_skia_path(outline: &Outline) -> TraitforgeResult<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for el in outline.path().elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
        .ok_or_else(|| TraitforgeError::outline("outline path cannot be rasterized"))
}

/// Draw candidates uniformly from `bias` (clamped to the outline bounds) and return the first
/// interior one.
///
/// Falls back to the bounding-rectangle center when no candidate lands inside within
/// `max_attempts`; that fallback is not an error.
pub fn find_interior_point<R: Rng>(
    oracle: &dyn BoundaryOracle,
    outline: &Outline,
    bias: Rect,
    max_attempts: usize,
    rng: &mut R,
) -> Point {
    let region = bias.intersect(outline.bounds());
    if region.width() > 0.0 && region.height() > 0.0 {
        for _ in 0..max_attempts {
            let p = Point::new(
                rng.gen_range(region.x0..region.x1),
                rng.gen_range(region.y0..region.y1),
            );
            if oracle.inside(outline, p) {
                return p;
            }
        }
    }
    tracing::debug!(
        max_attempts,
        "no interior candidate found; falling back to bounds center"
    );
    outline.center()
}

#[cfg(test)]
#[path = "../../tests/unit/outline/oracle.rs"]
mod tests;
