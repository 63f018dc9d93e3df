use super::*;

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn sanitize_pulls_overflowing_center_inside() {
    let b = BBox::new(1.05, 0.5, 0.2, 0.2).sanitize();
    approx(b.cx, 0.9);
    approx(b.cy, 0.5);
    approx(b.w, 0.2);
    approx(b.h, 0.2);
}

#[test]
fn sanitize_keeps_edges_in_unit_square() {
    for raw in [
        BBox::new(-0.3, 0.5, 0.4, 0.4),
        BBox::new(0.5, 1.2, 0.1, 0.6),
        BBox::new(0.0, 0.0, 2.0, 2.0),
        BBox::new(0.99, 0.99, 0.5, 0.5),
    ] {
        let b = raw.sanitize();
        let (x0, y0, x1, y1) = b.corners();
        assert!(x0 >= -1e-12 && y0 >= -1e-12, "{b:?}");
        assert!(x1 <= 1.0 + 1e-12 && y1 <= 1.0 + 1e-12, "{b:?}");
    }
}

#[test]
fn sanitize_enforces_minimum_size() {
    let b = BBox::new(0.5, 0.5, 0.0, -0.1).sanitize();
    approx(b.w, MIN_BOX_DIM);
    approx(b.h, MIN_BOX_DIM);
}

#[test]
fn sanitize_is_idempotent() {
    for raw in [
        BBox::new(1.05, 0.5, 0.2, 0.2),
        BBox::new(0.5, 0.5, 0.0, 0.0),
        BBox::new(0.2, 0.8, 0.3, 0.3),
    ] {
        let once = raw.sanitize();
        assert_eq!(once, once.sanitize());
    }
}

#[test]
fn corners_round_trip() {
    let b = BBox::new(0.4, 0.6, 0.2, 0.3);
    let (x0, y0, x1, y1) = b.corners();
    let back = BBox::from_corners(x0, y0, x1, y1).unwrap();
    approx(back.cx, b.cx);
    approx(back.cy, b.cy);
    approx(back.w, b.w);
    approx(back.h, b.h);
}

#[test]
fn from_corners_rejects_empty_spans() {
    assert!(BBox::from_corners(0.5, 0.2, 0.5, 0.4).is_none());
    assert!(BBox::from_corners(0.6, 0.2, 0.5, 0.4).is_none());
}

#[test]
fn sanitize_boxes_drops_non_finite_entries() {
    let boxes = vec![
        LabeledBox::new(0, BBox::new(0.5, 0.5, 0.2, 0.2)),
        LabeledBox::new(1, BBox::new(f64::NAN, 0.5, 0.2, 0.2)),
        LabeledBox::new(2, BBox::new(0.5, f64::INFINITY, 0.2, 0.2)),
    ];
    let out = sanitize_boxes(&boxes);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].class_id, 0);
}
