use super::*;
use crate::{
    foundation::core::{FillRule, Rect},
    outline::oracle::WindingOracle,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn run(outline: &Outline, count: usize, mode: IntersectMode, seed: u64) -> Tessellation {
    let mut rng = StdRng::seed_from_u64(seed);
    let opts = TessellateOptions {
        mode,
        ..TessellateOptions::default()
    };
    tessellate(&WindingOracle, outline, count, &opts, &mut rng).unwrap()
}

fn assert_partition(outline: &Outline, t: &Tessellation, seed: u64) {
    let covered = t.covered_area();
    let rel = (covered - t.outline_area).abs() / t.outline_area;
    assert!(rel < 0.01, "covered {covered} vs outline {}", t.outline_area);

    let b = outline.bounds();
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..2000 {
        let p = Point::new(rng.gen_range(b.x0..b.x1), rng.gen_range(b.y0..b.y1));
        let owners = t.clipped.iter().filter(|c| c.contains(p)).count();
        assert!(owners <= 1, "{owners} pieces overlap at {p:?}");
    }
}

#[test]
fn circle_is_partitioned() {
    let outline = Outline::circle(Point::new(210.0, 210.0), 150.0).unwrap();
    let t = run(&outline, 48, IntersectMode::Exact, 1);
    assert_eq!(t.sites.len(), 48);
    assert_eq!(t.cells.len(), 48);
    assert!(t.clipped.iter().all(|c| !c.approximate));
    let true_area = std::f64::consts::PI * 150.0 * 150.0;
    assert!((t.outline_area - true_area).abs() / true_area < 0.01);
    assert_partition(&outline, &t, 100);
}

#[test]
fn square_matching_its_bounds_is_partitioned() {
    let outline = Outline::rect(Rect::new(0.0, 0.0, 420.0, 420.0)).unwrap();
    let t = run(&outline, 30, IntersectMode::Exact, 2);
    assert_partition(&outline, &t, 200);
}

#[test]
fn ring_outline_with_hole_is_partitioned() {
    let outline = Outline::from_svg_path(
        "M10,10 L410,10 L410,410 L10,410 Z M110,110 L310,110 L310,310 L110,310 Z",
        FillRule::EvenOdd,
    )
    .unwrap();
    let t = run(&outline, 40, IntersectMode::Exact, 3);
    assert_partition(&outline, &t, 300);
    for piece in &t.clipped {
        assert!(!piece.contains(Point::new(210.0, 210.0)));
    }
}

#[test]
fn masked_mode_flags_whole_cells() {
    let outline = Outline::circle(Point::new(210.0, 210.0), 150.0).unwrap();
    let t = run(&outline, 20, IntersectMode::MaskedApproximate, 4);
    assert_eq!(t.mode, IntersectMode::MaskedApproximate);
    assert!(t.clipped.iter().all(|c| c.approximate));
    // Unclipped cells tile the bounding square, not the circle.
    let bounds_area = outline.bounds().area();
    assert!((t.covered_area() - bounds_area).abs() < 1e-6 * bounds_area);
}

#[test]
fn same_seed_same_tessellation() {
    let outline = Outline::circle(Point::new(100.0, 100.0), 80.0).unwrap();
    let a = run(&outline, 16, IntersectMode::Exact, 7);
    let b = run(&outline, 16, IntersectMode::Exact, 7);
    assert_eq!(a.sites, b.sites);
    assert_eq!(a.clipped, b.clipped);
}

#[test]
fn invalid_requests_are_rejected() {
    let outline = Outline::circle(Point::new(100.0, 100.0), 80.0).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let err = tessellate(
        &WindingOracle,
        &outline,
        0,
        &TessellateOptions::default(),
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, TraitforgeError::Validation(_)));

    let bad = TessellateOptions {
        polygon_spacing: 0.0,
        ..TessellateOptions::default()
    };
    assert!(tessellate(&WindingOracle, &outline, 5, &bad, &mut rng).is_err());
}
