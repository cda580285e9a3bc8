use geo::{BooleanOps as _, Coord, LineString, MultiPolygon, Polygon};

use crate::{
    foundation::{
        core::{BezPath, Point, Vec2},
        math::{ring_winding, signed_area},
    },
    outline::polygon::OutlinePolygon,
    tessellate::voronoi::Cell,
};

/// How cells are cut against the outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntersectMode {
    /// Polygon intersection; pieces follow the outline exactly.
    #[default]
    Exact,
    /// Whole cells flagged `approximate`; the renderer must clip them with the outline.
    MaskedApproximate,
}

/// One connected piece of a cell inside the outline.
#[derive(Clone, Debug, PartialEq)]
pub struct ClippedCell {
    /// Index of the owning site.
    pub site: usize,
    /// Outer ring, interior on the left (positive signed area).
    pub exterior: Vec<Point>,
    /// Hole rings, interior on the left (negative signed area).
    pub holes: Vec<Vec<Point>>,
    /// Set when the piece is a whole cell that still needs masking.
    pub approximate: bool,
}

impl ClippedCell {
    /// Area with holes subtracted.
    pub fn area(&self) -> f64 {
        signed_area(&self.exterior) + self.holes.iter().map(|h| signed_area(h)).sum::<f64>()
    }

    /// Point membership over the exterior and holes.
    pub fn contains(&self, p: Point) -> bool {
        let w = ring_winding(&self.exterior, p)
            + self.holes.iter().map(|h| ring_winding(h, p)).sum::<i32>();
        w != 0
    }

    /// Closed path with one subpath per ring.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for ring in std::iter::once(&self.exterior).chain(&self.holes) {
            let mut it = ring.iter();
            if let Some(first) = it.next() {
                path.move_to(*first);
                for p in it {
                    path.line_to(*p);
                }
                path.close_path();
            }
        }
        path
    }
}

/// The outline polygon as `geo` geometry, built once per tessellation.
///
/// Every negative ring becomes a hole of the smallest positive ring around it; positive rings
/// nested inside a hole stay separate polygons.
#[derive(Clone, Debug)]
pub(crate) struct OutlineRegion {
    shape: MultiPolygon<f64>,
}

impl OutlineRegion {
    pub(crate) fn new(polygon: &OutlinePolygon) -> Self {
        let (outer, inner): (Vec<&Vec<Point>>, Vec<&Vec<Point>>) = polygon
            .rings()
            .iter()
            .filter(|r| r.len() >= 3)
            .partition(|r| signed_area(r) > 0.0);

        let mut holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); outer.len()];
        for hole in inner {
            let beside = point_beside_hole(hole);
            let owner = outer
                .iter()
                .enumerate()
                .filter(|(_, ext)| ring_winding(ext, beside) != 0)
                .min_by(|a, b| signed_area(a.1).total_cmp(&signed_area(b.1)));
            match owner {
                Some((i, _)) => holes[i].push(to_line_string(hole)),
                None => tracing::debug!("orphan outline hole dropped"),
            }
        }

        let shape = outer
            .into_iter()
            .zip(holes)
            .map(|(ext, interiors)| Polygon::new(to_line_string(ext), interiors))
            .collect::<Vec<_>>();
        Self {
            shape: MultiPolygon::new(shape),
        }
    }
}

/// Intersect one convex cell with the outline region.
///
/// Each polygon of the intersection becomes its own piece; slivers whose area is below `eps²`
/// are dropped.
pub(crate) fn intersect_cell(cell: &Cell, region: &OutlineRegion, eps: f64) -> Vec<ClippedCell> {
    if cell.is_empty() {
        return Vec::new();
    }
    let subject = MultiPolygon::new(vec![Polygon::new(to_line_string(&cell.polygon), Vec::new())]);
    subject
        .intersection(&region.shape)
        .into_iter()
        .filter_map(|poly| {
            let exterior = tidy(from_line_string(poly.exterior()), eps, true)?;
            let holes = poly
                .interiors()
                .iter()
                .filter_map(|h| tidy(from_line_string(h), eps, false))
                .collect();
            Some(ClippedCell {
                site: cell.site,
                exterior,
                holes,
                approximate: false,
            })
        })
        .collect()
}

fn to_line_string(ring: &[Point]) -> LineString<f64> {
    LineString::new(ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect())
}

fn from_line_string(ring: &LineString<f64>) -> Vec<Point> {
    ring.coords().map(|c| Point::new(c.x, c.y)).collect()
}

/// Drop repeated points and the closing duplicate, then orient: exteriors positive, holes
/// negative.
fn tidy(ring: Vec<Point>, eps: f64, exterior: bool) -> Option<Vec<Point>> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last().is_none_or(|l| (*l - p).hypot() > eps) {
            out.push(p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).hypot() <= eps {
        out.pop();
    }
    let area = signed_area(&out);
    if out.len() < 3 || area.abs() <= eps * eps {
        return None;
    }
    if (area > 0.0) != exterior {
        out.reverse();
    }
    Some(out)
}

/// A point just inside the hole's own boundary on its filled side, used to find the owner.
fn point_beside_hole(hole: &[Point]) -> Point {
    let a = hole[0];
    let b = hole[1];
    let d = b - a;
    let left = Vec2::new(-d.y, d.x) / d.hypot().max(f64::MIN_POSITIVE);
    a.midpoint(b) + left * (d.hypot() * 1e-3)
}

#[cfg(test)]
#[path = "../../tests/unit/tessellate/intersect.rs"]
mod tests;
