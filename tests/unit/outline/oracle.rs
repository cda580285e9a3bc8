use super::*;
use crate::foundation::core::Vec2;
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn square() -> Outline {
    Outline::rect(Rect::new(0.0, 0.0, 420.0, 420.0)).unwrap()
}

fn ring_with_hole(rule: FillRule) -> Outline {
    Outline::from_svg_path(
        "M0,0 L100,0 L100,100 L0,100 Z M25,25 L25,75 L75,75 L75,25 Z",
        rule,
    )
    .unwrap()
}

#[test]
fn winding_oracle_respects_fill_rule() {
    // Inner ring runs opposite to the outer one, so both rules see a hole.
    let nz = ring_with_hole(FillRule::NonZero);
    let eo = ring_with_hole(FillRule::EvenOdd);
    assert!(!WindingOracle.inside(&nz, Point::new(50.0, 50.0)));
    assert!(!WindingOracle.inside(&eo, Point::new(50.0, 50.0)));
    assert!(WindingOracle.inside(&nz, Point::new(10.0, 50.0)));

    let same_dir = Outline::from_svg_path(
        "M0,0 L100,0 L100,100 L0,100 Z M25,25 L75,25 L75,75 L25,75 Z",
        FillRule::NonZero,
    )
    .unwrap();
    assert!(WindingOracle.inside(&same_dir, Point::new(50.0, 50.0)));
}

#[test]
fn raster_oracle_agrees_away_from_boundary() {
    let outline = Outline::circle(Point::new(210.0, 210.0), 50.0).unwrap();
    let raster = RasterOracle::new(&outline).unwrap();
    for (x, y) in [(210.0, 210.0), (240.0, 220.0), (170.0, 200.0)] {
        assert!(raster.inside(&outline, Point::new(x, y)));
    }
    for (x, y) in [(161.0, 161.0), (258.0, 258.0), (0.0, 0.0), (500.0, 210.0)] {
        assert!(!raster.inside(&outline, Point::new(x, y)));
    }
}

#[test]
fn raster_oracle_matches_winding_across_the_boundary() {
    let center = Point::new(210.0, 210.0);
    let outline = Outline::circle(center, 50.0).unwrap();
    let raster = RasterOracle::new(&outline).unwrap();
    for k in 0..180 {
        let dir = Vec2::from_angle(f64::from(k) * std::f64::consts::TAU / 180.0);
        let mut flips = 0;
        let mut prev = true;
        for i in 0..=400 {
            let p = center + dir * (45.0 + f64::from(i) * 0.025);
            let inside = raster.inside(&outline, p);
            assert_eq!(inside, WindingOracle.inside(&outline, p), "{p:?}");
            flips += usize::from(inside != prev);
            prev = inside;
        }
        // A radial ray leaves the disc exactly once.
        assert_eq!(flips, 1, "ray {k}");
    }
}

#[test]
fn raster_oracle_defers_for_foreign_outline() {
    let a = Outline::circle(Point::new(50.0, 50.0), 10.0).unwrap();
    let b = square();
    let raster = RasterOracle::new(&a).unwrap();
    assert!(raster.inside(&b, Point::new(300.0, 300.0)));
}

#[test]
fn raster_oracle_rejects_bad_scale() {
    assert!(RasterOracle::with_scale(&square(), 0.0).is_err());
    assert!(RasterOracle::with_scale(&square(), 1000.0).is_err());
}

#[test]
fn oracles_reject_non_finite_points() {
    let outline = square();
    assert!(!WindingOracle.inside(&outline, Point::new(f64::NAN, 10.0)));
    let raster = RasterOracle::new(&outline).unwrap();
    assert!(!raster.inside(&outline, Point::new(10.0, f64::INFINITY)));
}

#[test]
fn repeated_queries_are_stable_on_boundary() {
    let outline = square();
    let p = Point::new(0.0, 210.0);
    let first = WindingOracle.inside(&outline, p);
    for _ in 0..8 {
        assert_eq!(WindingOracle.inside(&outline, p), first);
    }
}

#[test]
fn find_interior_point_returns_interior_candidate() {
    let outline = Outline::circle(Point::new(210.0, 210.0), 50.0).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let p = find_interior_point(
        &WindingOracle,
        &outline,
        Rect::new(200.0, 160.0, 260.0, 210.0),
        64,
        &mut rng,
    );
    assert!(WindingOracle.inside(&outline, p));
    assert!(p.x >= 200.0 && p.y <= 210.0);
}

#[test]
fn find_interior_point_falls_back_to_center() {
    // Bias region lies entirely outside the ring's filled band.
    let outline = ring_with_hole(FillRule::EvenOdd);
    let mut rng = StdRng::seed_from_u64(9);
    let p = find_interior_point(
        &WindingOracle,
        &outline,
        Rect::new(40.0, 40.0, 60.0, 60.0),
        32,
        &mut rng,
    );
    assert_eq!(p, Point::new(50.0, 50.0));

    let p = find_interior_point(
        &WindingOracle,
        &outline,
        Rect::new(500.0, 500.0, 600.0, 600.0),
        32,
        &mut rng,
    );
    assert_eq!(p, outline.center());
}

proptest! {
    #[test]
    fn points_outside_bounds_are_exterior(
        x in -2000.0f64..2000.0,
        y in -2000.0f64..2000.0,
    ) {
        let outline = Outline::circle(Point::new(210.0, 210.0), 50.0).unwrap();
        let b = outline.bounds();
        prop_assume!(x < b.x0 - 1e-6 || x > b.x1 + 1e-6 || y < b.y0 - 1e-6 || y > b.y1 + 1e-6);
        let p = Point::new(x, y);
        prop_assert!(!WindingOracle.inside(&outline, p));
        let raster = RasterOracle::new(&outline).unwrap();
        prop_assert!(!raster.inside(&outline, p));
    }

    #[test]
    fn raster_and_winding_agree_inside_bounds(x in 150.0f64..270.0, y in 150.0f64..270.0) {
        let outline = ring_with_hole(FillRule::EvenOdd);
        let raster = RasterOracle::new(&outline).unwrap();
        let p = Point::new(x - 160.0, y - 160.0);
        prop_assert_eq!(raster.inside(&outline, p), WindingOracle.inside(&outline, p));
    }
}

#[test]
fn oracle_kind_builds_matching_oracle() {
    let outline = square();
    for kind in [OracleKind::Winding, OracleKind::Raster] {
        let oracle = kind.build(&outline).unwrap();
        assert!(oracle.inside(&outline, Point::new(210.0, 210.0)));
        assert!(!oracle.inside(&outline, Point::new(-1.0, 210.0)));
    }
    let kind: OracleKind = serde_json::from_str("\"raster\"").unwrap();
    assert_eq!(kind, OracleKind::Raster);
}
