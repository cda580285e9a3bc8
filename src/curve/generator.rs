use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::foundation::core::{Point, Vec2};

/// Growth per radian for [`CurveKind::Logarithmic`].
const LOG_GROWTH: f64 = 0.18;
/// Starting angle for [`CurveKind::Lituus`]; the radius reaches `max_radius` there.
const LITUUS_THETA0: f64 = PI / 4.0;
/// Radial modulation depth for [`CurveKind::Rose`].
const ROSE_DEPTH: f64 = 0.6;
/// Radial modulation amplitude for [`CurveKind::Noisy`].
const NOISE_AMPLITUDE: f64 = 0.35;
/// Value-noise knots per revolution for [`CurveKind::Noisy`].
const NOISE_KNOTS_PER_TURN: f64 = 4.0;

/// Family of polar generating functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// `r = R*t`.
    Archimedean,
    /// Exponential growth normalized to reach `R` at the end of the sweep.
    Logarithmic,
    /// `r = R*sqrt(t)`.
    Fermat,
    /// `r = R*sqrt(theta0/theta)`, swept inward-to-outward so `r -> R` at `t = 1`.
    Lituus,
    /// Archimedean envelope modulated by `cos(k*theta + phase)`; lobes and phase are random.
    Rose,
    /// Golden-angle placement, one point per step.
    Phyllotaxis,
    /// Archimedean envelope perturbed by low-frequency value noise over the angle.
    Noisy,
}

impl CurveKind {
    /// Every kind, in declaration order.
    pub const ALL: [CurveKind; 7] = [
        CurveKind::Archimedean,
        CurveKind::Logarithmic,
        CurveKind::Fermat,
        CurveKind::Lituus,
        CurveKind::Rose,
        CurveKind::Phyllotaxis,
        CurveKind::Noisy,
    ];

    /// Whether the kind is a continuous function of `t` (phyllotaxis is a point set).
    pub fn is_continuous(self) -> bool {
        !matches!(self, CurveKind::Phyllotaxis)
    }
}

/// One curve sample: a point and its normalized parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    /// Position.
    pub point: Point,
    /// Parameter in `[0, 1]`.
    pub t: f64,
}

#[derive(Clone, Debug, PartialEq)]
enum Radius {
    Archimedean,
    Logarithmic { b: f64, denom: f64 },
    Fermat,
    Lituus,
    Rose { lobes: f64, phase: f64 },
    Noisy { knots: Vec<f64> },
}

/// Resolved polar function behind a continuous curve.
#[derive(Clone, Debug, PartialEq)]
struct Polar {
    radius: Radius,
    center: Point,
    max_radius: f64,
    sweep: f64,
}

impl Polar {
    fn eval(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let theta = t * self.sweep;
        let r_max = self.max_radius;
        let (r, angle) = match &self.radius {
            Radius::Archimedean => (r_max * t, theta),
            Radius::Logarithmic { b, denom } => (r_max * (b * theta).exp_m1() / denom, theta),
            Radius::Fermat => (r_max * t.sqrt(), theta),
            Radius::Lituus => {
                // Angle magnitude runs from theta0 + |sweep| down to theta0; the sweep's sign
                // only picks the direction.
                let a = LITUUS_THETA0 + (1.0 - t) * self.sweep.abs();
                (r_max * (LITUUS_THETA0 / a).sqrt(), a.copysign(self.sweep))
            }
            Radius::Rose { lobes, phase } => {
                let m = 1.0 - ROSE_DEPTH / 2.0 + ROSE_DEPTH / 2.0 * (lobes * theta + phase).cos();
                (r_max * t * m, theta)
            }
            Radius::Noisy { knots } => {
                let n = value_noise(knots, t);
                (r_max * t * (1.0 - NOISE_AMPLITUDE + NOISE_AMPLITUDE * n), theta)
            }
        };
        self.center + Vec2::from_angle(angle) * r
    }
}

/// Cosine-interpolated value noise over `u` in `[0, 1]`; knots are in `[0, 1]`.
fn value_noise(knots: &[f64], u: f64) -> f64 {
    match knots.len() {
        0 => 0.5,
        1 => knots[0],
        n => {
            let x = u.clamp(0.0, 1.0) * (n - 1) as f64;
            let i = (x.floor() as usize).min(n - 2);
            let f = x - i as f64;
            let w = (1.0 - (f * PI).cos()) * 0.5;
            knots[i] * (1.0 - w) + knots[i + 1] * w
        }
    }
}

/// Ordered open curve with a parameter per sample.
///
/// Continuous kinds keep their resolved function so the clipper can evaluate intermediate
/// parameters; point sets interpolate along chords.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    points: Vec<CurvePoint>,
    polar: Option<Polar>,
}

impl Curve {
    /// Curve with no samples.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Polyline curve with parameters spaced evenly by index.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let pts: Vec<Point> = points.into_iter().collect();
        let last = pts.len().saturating_sub(1).max(1) as f64;
        Self {
            points: pts
                .into_iter()
                .enumerate()
                .map(|(i, point)| CurvePoint {
                    point,
                    t: i as f64 / last,
                })
                .collect(),
            polar: None,
        }
    }

    /// Samples in parameter order.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Sample count.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether [`Curve::eval`] uses the generating function rather than chords.
    pub fn is_continuous(&self) -> bool {
        self.polar.is_some()
    }

    /// Point at parameter `t` (clamped to `[0, 1]`). `None` for an empty curve.
    pub fn eval(&self, t: f64) -> Option<Point> {
        if let Some(polar) = &self.polar {
            return Some(polar.eval(t));
        }
        let first = self.points.first()?;
        let t = t.clamp(0.0, 1.0);
        let idx = self.points.partition_point(|p| p.t < t);
        if idx == 0 {
            return Some(first.point);
        }
        let Some(b) = self.points.get(idx) else {
            return self.points.last().map(|p| p.point);
        };
        let a = self.points[idx - 1];
        let span = b.t - a.t;
        if span <= 0.0 {
            return Some(b.point);
        }
        Some(a.point.lerp(b.point, (t - a.t) / span))
    }
}

/// Generate `step_count` samples of `kind` around `center`, reaching `max_radius` at `t = 1`
/// after `turns` revolutions.
///
/// Randomness comes only from `rng`. Degenerate inputs give an empty curve.
pub fn generate<R: Rng>(
    kind: CurveKind,
    center: Point,
    max_radius: f64,
    turns: f64,
    step_count: usize,
    rng: &mut R,
) -> Curve {
    if step_count < 2
        || !max_radius.is_finite()
        || max_radius <= 0.0
        || !center.is_finite()
        || !turns.is_finite()
    {
        return Curve::empty();
    }
    let sweep = turns * TAU;
    let last = (step_count - 1) as f64;

    if kind == CurveKind::Phyllotaxis {
        let golden = PI * (3.0 - 5f64.sqrt());
        return Curve::from_points((0..step_count).map(|i| {
            let t = i as f64 / last;
            center + Vec2::from_angle(i as f64 * golden) * (max_radius * t.sqrt())
        }));
    }

    let radius = match kind {
        CurveKind::Archimedean => Radius::Archimedean,
        CurveKind::Logarithmic => {
            let denom = (LOG_GROWTH * sweep).exp_m1();
            if denom.abs() < 1e-9 {
                Radius::Archimedean
            } else {
                Radius::Logarithmic {
                    b: LOG_GROWTH,
                    denom,
                }
            }
        }
        CurveKind::Fermat => Radius::Fermat,
        CurveKind::Lituus => Radius::Lituus,
        CurveKind::Rose => Radius::Rose {
            lobes: f64::from(rng.gen_range(3u32..=8)),
            phase: rng.gen_range(0.0..TAU),
        },
        CurveKind::Noisy => {
            let count = ((turns.abs() * NOISE_KNOTS_PER_TURN).ceil() as usize).clamp(2, 256) + 1;
            Radius::Noisy {
                knots: (0..count).map(|_| rng.gen_range(0.0..=1.0)).collect(),
            }
        }
        CurveKind::Phyllotaxis => Radius::Archimedean,
    };

    let polar = Polar {
        radius,
        center,
        max_radius,
        sweep,
    };
    let points = (0..step_count)
        .map(|i| {
            let t = i as f64 / last;
            CurvePoint {
                point: polar.eval(t),
                t,
            }
        })
        .collect();
    Curve {
        points,
        polar: Some(polar),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/curve/generator.rs"]
mod tests;
