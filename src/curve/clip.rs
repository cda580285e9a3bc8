use crate::{
    curve::generator::{Curve, CurvePoint},
    foundation::core::BezPath,
    outline::{model::Outline, oracle::BoundaryOracle},
};

/// Knobs for [`clip`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClipOptions {
    /// Bisection stops once the bracketing chord is shorter than this.
    pub tolerance: f64,
    /// Upper bound on bisection steps per crossing.
    pub max_bisect_steps: u32,
    /// Segments with fewer points are dropped.
    pub min_segment_points: usize,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.25,
            max_bisect_steps: 24,
            min_segment_points: 2,
        }
    }
}

/// Maximal interior run of a curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    points: Vec<CurvePoint>,
    starts_on_boundary: bool,
    ends_on_boundary: bool,
}

impl Segment {
    /// Points in parameter order.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Point count.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for segments returned by [`clip`].
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the first point was refined from an exterior-to-interior crossing.
    pub fn starts_on_boundary(&self) -> bool {
        self.starts_on_boundary
    }

    /// Whether the last point was refined from an interior-to-exterior crossing.
    pub fn ends_on_boundary(&self) -> bool {
        self.ends_on_boundary
    }

    /// Parameter span `(first.t, last.t)`.
    pub fn t_range(&self) -> (f64, f64) {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => (a.t, b.t),
            _ => (0.0, 0.0),
        }
    }

    /// Open polyline through the segment's points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(first.point);
            for p in iter {
                path.line_to(p.point);
            }
        }
        path
    }
}

#[derive(Default)]
struct OpenSegment {
    points: Vec<CurvePoint>,
    starts_on_boundary: bool,
}

impl OpenSegment {
    fn push(&mut self, cp: CurvePoint) {
        if self.points.last().is_some_and(|last| last.t >= cp.t) {
            return;
        }
        self.points.push(cp);
    }

    fn close(self, ends_on_boundary: bool, min_points: usize, out: &mut Vec<Segment>) {
        if self.points.len() < min_points.max(1) {
            tracing::debug!(points = self.points.len(), "dropping short segment");
            return;
        }
        out.push(Segment {
            points: self.points,
            starts_on_boundary: self.starts_on_boundary,
            ends_on_boundary,
        });
    }
}

#[tracing::instrument(skip(oracle, outline, curve), fields(samples = curve.len()))]
/// Split `curve` into its maximal interior runs.
///
/// Crossings are refined by bisection on the curve parameter and the interior-side bracket point
/// becomes the segment endpoint, so every returned point is classified interior.
pub fn clip(
    oracle: &dyn BoundaryOracle,
    outline: &Outline,
    curve: &Curve,
    opts: &ClipOptions,
) -> Vec<Segment> {
    let samples = curve.points();
    let inside: Vec<bool> = samples
        .iter()
        .map(|cp| oracle.inside(outline, cp.point))
        .collect();

    let mut out = Vec::new();
    let mut current: Option<OpenSegment> = None;

    for (i, (&cp, &is_in)) in samples.iter().zip(&inside).enumerate() {
        if is_in {
            let seg = current.get_or_insert_with(|| {
                let mut seg = OpenSegment::default();
                if i > 0 {
                    seg.starts_on_boundary = true;
                    seg.push(refine_crossing(oracle, outline, curve, cp, samples[i - 1], opts));
                }
                seg
            });
            seg.push(cp);
        } else if let Some(mut seg) = current.take() {
            seg.push(refine_crossing(oracle, outline, curve, samples[i - 1], cp, opts));
            seg.close(true, opts.min_segment_points, &mut out);
        }
    }
    if let Some(seg) = current {
        seg.close(false, opts.min_segment_points, &mut out);
    }
    out
}

/// Bisect between an interior and an exterior sample and return the interior-side bracket.
fn refine_crossing(
    oracle: &dyn BoundaryOracle,
    outline: &Outline,
    curve: &Curve,
    interior: CurvePoint,
    exterior: CurvePoint,
    opts: &ClipOptions,
) -> CurvePoint {
    let tol = if opts.tolerance.is_finite() && opts.tolerance > 0.0 {
        opts.tolerance
    } else {
        0.0
    };
    let mut inn = interior;
    let mut out = exterior;
    for _ in 0..opts.max_bisect_steps {
        if (inn.point - out.point).hypot() < tol {
            break;
        }
        let t = 0.5 * (inn.t + out.t);
        let Some(point) = curve.eval(t) else {
            break;
        };
        let mid = CurvePoint { point, t };
        if oracle.inside(outline, point) {
            inn = mid;
        } else {
            out = mid;
        }
    }
    inn
}

#[cfg(test)]
#[path = "../../tests/unit/curve/clip.rs"]
mod tests;
