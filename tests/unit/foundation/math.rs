use super::*;

fn unit_square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ]
}

#[test]
fn fnv_hash_ignores_write_chunking() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"traitforge");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b't');
    b.write_bytes(b"raitforge");
    assert_eq!(a.finish(), b.finish());

    assert_eq!(Fnv1a64::new_default().finish(), 0xcbf2_9ce4_8422_2325);
    let mut one = Fnv1a64::new_default();
    one.write_u8(b'a');
    assert_eq!(one.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn derived_seeds_differ_per_label_and_repeat_per_input() {
    assert_eq!(derive_seed(7, "eyes"), derive_seed(7, "eyes"));
    assert_ne!(derive_seed(7, "eyes"), derive_seed(7, "teeth"));
    assert_ne!(derive_seed(7, "eyes"), derive_seed(8, "eyes"));
}

#[test]
fn signed_area_tracks_orientation() {
    let sq = unit_square();
    assert!((signed_area(&sq) - 1.0).abs() < 1e-12);
    let rev: Vec<Point> = sq.iter().rev().copied().collect();
    assert!((signed_area(&rev) + 1.0).abs() < 1e-12);
}

#[test]
fn ring_winding_inside_and_outside() {
    let sq = unit_square();
    assert_eq!(ring_winding(&sq, Point::new(0.5, 0.5)), 1);
    assert_eq!(ring_winding(&sq, Point::new(1.5, 0.5)), 0);
    let rev: Vec<Point> = sq.iter().rev().copied().collect();
    assert_eq!(ring_winding(&rev, Point::new(0.5, 0.5)), -1);
}
