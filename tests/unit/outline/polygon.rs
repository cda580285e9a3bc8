use super::*;
use crate::foundation::core::FillRule;

#[test]
fn square_polygon_area_and_orientation() {
    let outline = Outline::rect(Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
    let poly = OutlinePolygon::from_outline(&outline, 10.0, 0.01);
    assert_eq!(poly.rings().len(), 1);
    assert!((poly.area() - 5000.0).abs() < 1e-6);
    assert!(signed_area(&poly.rings()[0]) > 0.0);
    assert!((poly.perimeter() - 300.0).abs() < 1e-6);
}

#[test]
fn edges_never_exceed_spacing() {
    let outline = Outline::rect(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let poly = OutlinePolygon::from_outline(&outline, 7.0, 0.01);
    let ring = &poly.rings()[0];
    for i in 0..ring.len() {
        let len = (ring[(i + 1) % ring.len()] - ring[i]).hypot();
        assert!(len <= 7.0 + 1e-9, "edge {i} has length {len}");
    }
}

#[test]
fn circle_area_is_close_to_analytic() {
    let outline = Outline::circle(Point::new(210.0, 210.0), 50.0).unwrap();
    let poly = OutlinePolygon::from_outline(&outline, 2.0, 0.01);
    let exact = std::f64::consts::PI * 50.0 * 50.0;
    assert!(((poly.area() - exact) / exact).abs() < 1e-3);
}

#[test]
fn evenodd_inner_ring_becomes_hole() {
    let d = "M0,0 L100,0 L100,100 L0,100 Z M25,25 L75,25 L75,75 L25,75 Z";
    let outline = Outline::from_svg_path(d, FillRule::EvenOdd).unwrap();
    let poly = OutlinePolygon::from_outline(&outline, 5.0, 0.01);
    assert_eq!(poly.rings().len(), 2);
    assert!((poly.area() - 7500.0).abs() < 1e-6);
    assert!(!poly.contains(Point::new(50.0, 50.0)));
    assert!(poly.contains(Point::new(10.0, 10.0)));
}

#[test]
fn nonzero_nested_same_direction_ring_is_dropped() {
    let d = "M0,0 L100,0 L100,100 L0,100 Z M25,25 L75,25 L75,75 L25,75 Z";
    let outline = Outline::from_svg_path(d, FillRule::NonZero).unwrap();
    let poly = OutlinePolygon::from_outline(&outline, 5.0, 0.01);
    assert_eq!(poly.rings().len(), 1);
    assert!((poly.area() - 10000.0).abs() < 1e-6);
    assert!(poly.contains(Point::new(50.0, 50.0)));
}

#[test]
fn boundary_samples_point_inward() {
    let outline = Outline::rect(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let poly = OutlinePolygon::from_outline(&outline, 5.0, 0.01);
    let samples = poly.sample_boundary(40);
    assert_eq!(samples.len(), 40);
    for s in samples {
        assert!((s.inward.hypot() - 1.0).abs() < 1e-9);
        assert!(poly.contains(s.point + s.inward * 1.0));
        assert!(!poly.contains(s.point - s.inward * 1.0));
    }
}

#[test]
fn from_rings_computes_bounds() {
    let poly = OutlinePolygon::from_rings(vec![vec![
        Point::new(1.0, 2.0),
        Point::new(5.0, 2.0),
        Point::new(5.0, 9.0),
    ]]);
    assert_eq!(poly.bounds(), Rect::new(1.0, 2.0, 5.0, 9.0));
    assert!((poly.area() - 14.0).abs() < 1e-12);
}
