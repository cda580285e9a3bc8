use rand::{Rng, seq::SliceRandom};

use crate::{
    foundation::core::{Point, Rect},
    outline::{model::Outline, oracle::BoundaryOracle, polygon::OutlinePolygon},
};

/// Site placement knobs.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SiteOptions {
    /// Share of sites placed along the boundary.
    pub boundary_fraction: f64,
    /// Inward offset of boundary sites.
    pub inset: f64,
    /// Grid jitter as a fraction of the grid pitch.
    pub jitter: f64,
    /// Candidates closer than this to an accepted site are rejected.
    pub min_distance: f64,
    /// Random top-up attempts per missing site.
    pub attempts_per_site: usize,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            boundary_fraction: 0.42,
            inset: 1.5,
            jitter: 0.8,
            min_distance: 0.5,
            attempts_per_site: 64,
        }
    }
}

struct Accepted<'a> {
    oracle: &'a dyn BoundaryOracle,
    outline: &'a Outline,
    min_d2: f64,
    sites: Vec<Point>,
}

impl Accepted<'_> {
    fn try_push(&mut self, p: Point) -> bool {
        if !self.oracle.inside(self.outline, p) {
            return false;
        }
        if self.sites.iter().any(|s| (*s - p).hypot2() < self.min_d2) {
            return false;
        }
        self.sites.push(p);
        true
    }
}

/// Place up to `count` interior sites: boundary-hugging first, then a jittered grid, then a
/// uniform random top-up bounded by the attempt budget.
///
/// May return fewer than `count` sites when the outline is too thin for the budget.
pub fn sample_sites<R: Rng>(
    oracle: &dyn BoundaryOracle,
    outline: &Outline,
    polygon: &OutlinePolygon,
    count: usize,
    opts: &SiteOptions,
    rng: &mut R,
) -> Vec<Point> {
    let mut acc = Accepted {
        oracle,
        outline,
        min_d2: opts.min_distance.max(0.0).powi(2),
        sites: Vec::with_capacity(count),
    };
    if count == 0 {
        return acc.sites;
    }

    let boundary_n = ((count as f64) * opts.boundary_fraction.clamp(0.0, 1.0)).round() as usize;
    for s in polygon.sample_boundary(boundary_n) {
        let ahead = s.point + s.inward * opts.inset;
        if !acc.try_push(ahead) {
            // Normal may face out where the ring winds the other way.
            acc.try_push(s.point - s.inward * opts.inset);
        }
    }

    let bounds = outline.bounds();
    let remaining = count.saturating_sub(acc.sites.len());
    if remaining > 0 {
        for p in jittered_grid(bounds, remaining, fill_ratio(polygon, bounds), opts.jitter, rng) {
            if acc.sites.len() >= count {
                break;
            }
            acc.try_push(p);
        }
    }

    let budget = count.saturating_sub(acc.sites.len()) * opts.attempts_per_site;
    let mut attempts = 0;
    while acc.sites.len() < count && attempts < budget {
        attempts += 1;
        acc.try_push(Point::new(
            rng.gen_range(bounds.x0..bounds.x1),
            rng.gen_range(bounds.y0..bounds.y1),
        ));
    }
    if acc.sites.len() < count {
        tracing::debug!(
            placed = acc.sites.len(),
            requested = count,
            "site budget exhausted"
        );
    }
    acc.sites
}

fn fill_ratio(polygon: &OutlinePolygon, bounds: Rect) -> f64 {
    (polygon.area() / bounds.area()).clamp(0.05, 1.0)
}

/// Shuffled jittered grid sized so roughly `target` cells land inside a region filling `fill`
/// of `bounds`.
fn jittered_grid<R: Rng>(bounds: Rect, target: usize, fill: f64, jitter: f64, rng: &mut R) -> Vec<Point> {
    let cells = (target as f64 / fill).max(1.0);
    let pitch = (bounds.area() / cells).sqrt();
    let cols = (bounds.width() / pitch).ceil().max(1.0) as usize;
    let rows = (bounds.height() / pitch).ceil().max(1.0) as usize;
    let cw = bounds.width() / cols as f64;
    let ch = bounds.height() / rows as f64;
    let j = jitter.clamp(0.0, 1.0) * 0.5;

    let mut out = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let cx = bounds.x0 + (c as f64 + 0.5) * cw;
            let cy = bounds.y0 + (r as f64 + 0.5) * ch;
            let dx = if j > 0.0 { rng.gen_range(-j..j) * cw } else { 0.0 };
            let dy = if j > 0.0 { rng.gen_range(-j..j) * ch } else { 0.0 };
            out.push(Point::new(cx + dx, cy + dy));
        }
    }
    out.shuffle(rng);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/tessellate/sites.rs"]
mod tests;
