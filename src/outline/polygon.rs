use kurbo::{PathEl, Shape as _};

use crate::{
    foundation::{
        core::{Point, Rect, Vec2},
        math::{ring_winding, signed_area},
    },
    outline::model::Outline,
};

/// Polygon approximation of an [`Outline`].
///
/// Rings are oriented so the filled side of every edge is on its left: outer rings have positive
/// signed area and holes negative. Edge length never exceeds the sampling spacing.
#[derive(Clone, Debug)]
pub struct OutlinePolygon {
    rings: Vec<Vec<Point>>,
    bounds: Rect,
}

/// One point on the polygon boundary with the unit normal pointing into the filled side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundarySample {
    /// Point on the boundary.
    pub point: Point,
    /// Unit normal pointing into the interior.
    pub inward: Vec2,
}

impl OutlinePolygon {
    /// Flatten `outline` with `flatten_tolerance`, then subdivide so no edge is longer than
    /// `spacing`.
    pub fn from_outline(outline: &Outline, spacing: f64, flatten_tolerance: f64) -> Self {
        let spacing = if spacing.is_finite() && spacing > 0.0 {
            spacing
        } else {
            f64::INFINITY
        };
        let tol = flatten_tolerance.max(1e-6);

        let mut raw: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        kurbo::flatten(outline.path().iter(), tol, |el| match el {
            PathEl::MoveTo(p) => {
                if !current.is_empty() {
                    raw.push(std::mem::take(&mut current));
                }
                current.push(p);
            }
            PathEl::LineTo(p) => current.push(p),
            PathEl::ClosePath => {
                if !current.is_empty() {
                    raw.push(std::mem::take(&mut current));
                }
            }
            // flatten only emits lines
            _ => {}
        });
        if !current.is_empty() {
            raw.push(current);
        }

        let diag = outline.bounds().width().hypot(outline.bounds().height());
        let min_len = (diag * 1e-6).max(1e-9);

        let rings = raw
            .into_iter()
            .map(|r| dedup_ring(r, min_len))
            .filter(|r| r.len() >= 3 && signed_area(r).abs() > min_len * min_len)
            .filter_map(|r| orient_filled_left(outline, r, tol * 2.0 + min_len))
            .map(|r| subdivide_ring(&r, spacing))
            .collect();

        Self {
            rings,
            bounds: outline.bounds(),
        }
    }

    /// Build directly from rings already oriented with the interior on the left.
    pub fn from_rings(rings: Vec<Vec<Point>>) -> Self {
        let bounds = rings
            .iter()
            .flatten()
            .fold(None::<Rect>, |acc, p| match acc {
                None => Some(Rect::from_points(*p, *p)),
                Some(r) => Some(r.union_pt(*p)),
            })
            .unwrap_or(Rect::ZERO);
        Self { rings, bounds }
    }

    /// Oriented rings.
    pub fn rings(&self) -> &[Vec<Point>] {
        &self.rings
    }

    /// Bounding rectangle of the source outline.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Filled area (holes subtract).
    pub fn area(&self) -> f64 {
        self.rings.iter().map(|r| signed_area(r)).sum()
    }

    /// Total boundary length.
    pub fn perimeter(&self) -> f64 {
        self.rings.iter().map(|r| ring_length(r)).sum()
    }

    /// Polygon membership (non-zero over the oriented rings).
    pub fn contains(&self, p: Point) -> bool {
        self.rings.iter().map(|r| ring_winding(r, p)).sum::<i32>() != 0
    }

    /// `count` samples at even arc-length spacing over all rings.
    pub fn sample_boundary(&self, count: usize) -> Vec<BoundarySample> {
        let total = self.perimeter();
        if count == 0 || total <= 0.0 {
            return Vec::new();
        }
        let step = total / count as f64;
        let mut out = Vec::with_capacity(count);
        let mut next = step * 0.5;
        let mut walked = 0.0;

        for ring in &self.rings {
            let n = ring.len();
            for i in 0..n {
                let a = ring[i];
                let b = ring[(i + 1) % n];
                let d = b - a;
                let len = d.hypot();
                if len <= 0.0 {
                    continue;
                }
                let inward = Vec2::new(-d.y, d.x) / len;
                while next <= walked + len && out.len() < count {
                    let t = (next - walked) / len;
                    out.push(BoundarySample {
                        point: a.lerp(b, t),
                        inward,
                    });
                    next += step;
                }
                walked += len;
            }
        }
        out
    }
}

fn ring_length(ring: &[Point]) -> f64 {
    let n = ring.len();
    (0..n).map(|i| (ring[(i + 1) % n] - ring[i]).hypot()).sum()
}

fn dedup_ring(mut ring: Vec<Point>, eps: f64) -> Vec<Point> {
    ring.dedup_by(|b, a| (*b - *a).hypot() <= eps);
    while ring.len() > 1 {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if (last - first).hypot() <= eps {
            ring.pop();
        } else {
            break;
        }
    }
    ring
}

/// Orient `ring` so the side the outline fills is on the left; rings with the same fill on both
/// sides do not bound the region and are dropped.
///
/// `offset` must exceed the flattening tolerance: a chord midpoint sits up to that far from the
/// true curve.
fn orient_filled_left(outline: &Outline, mut ring: Vec<Point>, offset: f64) -> Option<Vec<Point>> {
    let n = ring.len();
    let (i, _) = (0..n)
        .map(|i| (i, (ring[(i + 1) % n] - ring[i]).hypot2()))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    let a = ring[i];
    let b = ring[(i + 1) % n];
    let d = b - a;
    let left = Vec2::new(-d.y, d.x) / d.hypot();
    let mid = a.midpoint(b);

    let rule = outline.fill_rule();
    let filled = |p: Point| rule.is_inside(outline.path().winding(p));
    let left_filled = filled(mid + left * offset);
    let right_filled = filled(mid - left * offset);

    match (left_filled, right_filled) {
        (true, false) => Some(ring),
        (false, true) => {
            ring.reverse();
            Some(ring)
        }
        _ => None,
    }
}

fn subdivide_ring(ring: &[Point], spacing: f64) -> Vec<Point> {
    if !spacing.is_finite() {
        return ring.to_vec();
    }
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        out.push(a);
        let len = (b - a).hypot();
        let pieces = (len / spacing).ceil() as usize;
        for k in 1..pieces {
            out.push(a.lerp(b, k as f64 / pieces as f64));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/outline/polygon.rs"]
mod tests;
