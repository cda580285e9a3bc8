use super::*;
use rand::{SeedableRng, rngs::StdRng};

fn center() -> Point {
    Point::new(210.0, 210.0)
}

fn gen_kind(kind: CurveKind, seed: u64) -> Curve {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(kind, center(), 150.0, 3.0, 360, &mut rng)
}

#[test]
fn archimedean_radius_is_linear_in_t() {
    let curve = gen_kind(CurveKind::Archimedean, 0);
    assert_eq!(curve.len(), 360);
    for cp in curve.points() {
        let r = (cp.point - center()).hypot();
        assert!((r - 150.0 * cp.t).abs() < 1e-9, "t={} r={r}", cp.t);
    }
    assert_eq!(curve.points()[0].t, 0.0);
    assert_eq!(curve.points()[359].t, 1.0);
}

#[test]
fn every_kind_reaches_max_radius_at_end_and_stays_within() {
    for kind in CurveKind::ALL {
        let curve = gen_kind(kind, 11);
        assert_eq!(curve.len(), 360, "{kind:?}");
        let max = curve
            .points()
            .iter()
            .map(|p| (p.point - center()).hypot())
            .fold(0.0, f64::max);
        assert!(max <= 150.0 + 1e-6, "{kind:?} exceeded radius: {max}");
        let end = (curve.points()[359].point - center()).hypot();
        match kind {
            // Modulated envelopes only bound the radius from above.
            CurveKind::Rose | CurveKind::Noisy => assert!(end > 0.0),
            _ => assert!((end - 150.0).abs() < 1e-6, "{kind:?} end radius {end}"),
        }
    }
}

#[test]
fn parameters_are_monotonic() {
    for kind in CurveKind::ALL {
        let curve = gen_kind(kind, 5);
        assert!(curve.points().windows(2).all(|w| w[0].t < w[1].t), "{kind:?}");
    }
}

#[test]
fn same_stream_reproduces_curve() {
    for kind in CurveKind::ALL {
        assert_eq!(gen_kind(kind, 42), gen_kind(kind, 42), "{kind:?}");
    }
}

#[test]
fn random_kinds_vary_with_stream() {
    assert_ne!(gen_kind(CurveKind::Noisy, 1), gen_kind(CurveKind::Noisy, 2));
    // Deterministic kinds ignore the stream.
    assert_eq!(
        gen_kind(CurveKind::Fermat, 1).points(),
        gen_kind(CurveKind::Fermat, 2).points()
    );
}

#[test]
fn degenerate_inputs_give_empty_curve() {
    let mut rng = StdRng::seed_from_u64(0);
    let kind = CurveKind::Archimedean;
    assert!(generate(kind, center(), 150.0, 3.0, 1, &mut rng).is_empty());
    assert!(generate(kind, center(), 0.0, 3.0, 100, &mut rng).is_empty());
    assert!(generate(kind, center(), -5.0, 3.0, 100, &mut rng).is_empty());
    assert!(generate(kind, center(), f64::NAN, 3.0, 100, &mut rng).is_empty());
    assert!(generate(kind, center(), 10.0, f64::INFINITY, 100, &mut rng).is_empty());
    let nan_center = Point::new(f64::NAN, 0.0);
    assert!(generate(kind, nan_center, 10.0, 1.0, 100, &mut rng).is_empty());
}

#[test]
fn negative_and_zero_turns_stay_finite() {
    for kind in CurveKind::ALL {
        for turns in [-3.0, -1.0, -0.25, 0.0] {
            let mut rng = StdRng::seed_from_u64(4);
            let curve = generate(kind, center(), 150.0, turns, 120, &mut rng);
            assert_eq!(curve.len(), 120, "{kind:?} turns={turns}");
            for cp in curve.points() {
                assert!(cp.point.is_finite(), "{kind:?} turns={turns} t={}", cp.t);
                let r = (cp.point - center()).hypot();
                assert!(r <= 150.0 + 1e-6, "{kind:?} turns={turns} r={r}");
            }
            for t in [0.0, 0.37, 1.0] {
                assert!(curve.eval(t).is_some_and(|p| p.is_finite()), "{kind:?} t={t}");
            }
        }
    }
}

#[test]
fn reversed_lituus_mirrors_forward_sweep() {
    let mut rng = StdRng::seed_from_u64(0);
    let fwd = generate(CurveKind::Lituus, center(), 150.0, 2.0, 50, &mut rng);
    let rev = generate(CurveKind::Lituus, center(), 150.0, -2.0, 50, &mut rng);
    for (a, b) in fwd.points().iter().zip(rev.points()) {
        let (da, db) = (a.point - center(), b.point - center());
        assert!((da.x - db.x).abs() < 1e-9 && (da.y + db.y).abs() < 1e-9);
    }
}

#[test]
fn eval_matches_samples_and_interpolates_chords() {
    let curve = gen_kind(CurveKind::Archimedean, 0);
    assert!(curve.is_continuous());
    let cp = curve.points()[100];
    let p = curve.eval(cp.t).unwrap();
    assert!((p - cp.point).hypot() < 1e-9);

    let phyllo = gen_kind(CurveKind::Phyllotaxis, 0);
    assert!(!phyllo.is_continuous());
    let a = phyllo.points()[10];
    let b = phyllo.points()[11];
    let mid = phyllo.eval((a.t + b.t) / 2.0).unwrap();
    assert!((mid - a.point.midpoint(b.point)).hypot() < 1e-9);
}

#[test]
fn polyline_eval_clamps() {
    let curve = Curve::from_points([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    assert_eq!(curve.eval(-1.0), Some(Point::new(0.0, 0.0)));
    assert_eq!(curve.eval(2.0), Some(Point::new(10.0, 0.0)));
    assert_eq!(curve.eval(0.25), Some(Point::new(2.5, 0.0)));
    assert_eq!(Curve::empty().eval(0.5), None);
}

#[test]
fn kind_serde_uses_snake_case() {
    let json = serde_json::to_string(&CurveKind::Phyllotaxis).unwrap();
    assert_eq!(json, "\"phyllotaxis\"");
    let k: CurveKind = serde_json::from_str("\"logarithmic\"").unwrap();
    assert_eq!(k, CurveKind::Logarithmic);
}
