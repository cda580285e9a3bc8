use crate::foundation::{
    core::{Point, Rect, Vec2},
    math::signed_area,
};

/// Convex polygon owned by one site.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Index of the owning site.
    pub site: usize,
    /// Vertices, interior on the left (positive signed area). Empty when the site owns nothing.
    pub polygon: Vec<Point>,
}

impl Cell {
    /// Cell area.
    pub fn area(&self) -> f64 {
        signed_area(&self.polygon)
    }

    /// Whether the cell has no area.
    pub fn is_empty(&self) -> bool {
        self.polygon.len() < 3
    }
}

/// Voronoi cells of `sites`, each cut from `bounds` by the perpendicular bisectors against every
/// other site.
///
/// Coincident sites are resolved in favour of the lower index; the later copies get empty cells.
pub fn voronoi_cells(sites: &[Point], bounds: Rect) -> Vec<Cell> {
    let frame = vec![
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x1, bounds.y1),
        Point::new(bounds.x0, bounds.y1),
    ];

    sites
        .iter()
        .enumerate()
        .map(|(i, &si)| Cell {
            site: i,
            polygon: cell_for(i, si, sites, &frame),
        })
        .collect()
}

fn cell_for(i: usize, si: Point, sites: &[Point], frame: &[Point]) -> Vec<Point> {
    let mut others: Vec<(f64, usize)> = sites
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(j, &sj)| ((sj - si).hypot2(), j))
        .collect();
    others.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut poly = frame.to_vec();
    for (d2, j) in others {
        if d2 <= 1e-18 {
            if j < i {
                return Vec::new();
            }
            continue;
        }
        // A bisector further than the farthest vertex cannot cut; later sites are further still.
        let reach = poly
            .iter()
            .map(|v| (*v - si).hypot2())
            .fold(0.0, f64::max);
        if d2 * 0.25 > reach {
            break;
        }
        let n = sites[j] - si;
        let c = n.dot(si.midpoint(sites[j]).to_vec2());
        poly = clip_half_plane(&poly, n, c);
        if poly.len() < 3 {
            return Vec::new();
        }
    }
    poly
}

/// Keep the part of convex `poly` where `n . p <= c`. Orientation is preserved.
pub(crate) fn clip_half_plane(poly: &[Point], n: Vec2, c: f64) -> Vec<Point> {
    let len = poly.len();
    let mut out = Vec::with_capacity(len + 1);
    for k in 0..len {
        let a = poly[k];
        let b = poly[(k + 1) % len];
        let da = n.dot(a.to_vec2()) - c;
        let db = n.dot(b.to_vec2()) - c;
        if da <= 0.0 {
            out.push(a);
        }
        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            out.push(a.lerp(b, da / (da - db)));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/tessellate/voronoi.rs"]
mod tests;
