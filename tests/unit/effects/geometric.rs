use super::*;
use image::RgbImage;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::transform::Frame;

fn frame_with_box(cx: f64, cy: f64, w: f64, h: f64) -> Frame {
    let mut image = RgbImage::new(40, 20);
    image.put_pixel(5, 5, Rgb([255, 0, 0]));
    Frame::new(image, vec![LabeledBox::new(3, BBox::new(cx, cy, w, h))])
}

fn apply(effect: &dyn Effect, frame: Frame) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut ctx = ApplyCtx {
        rng: &mut rng,
        min_visibility: 0.3,
    };
    effect.build_transform().apply(&mut ctx, frame).unwrap()
}

#[test]
fn horizontal_flip_mirrors_cx() {
    let out = apply(
        &HorizontalFlipEffect::default(),
        frame_with_box(0.2, 0.6, 0.1, 0.2),
    );
    let b = out.boxes[0].bbox;
    assert!((b.cx - 0.8).abs() < 1e-9);
    assert!((b.cy - 0.6).abs() < 1e-9);
    assert!((b.w - 0.1).abs() < 1e-9);
    assert!((b.h - 0.2).abs() < 1e-9);
    assert_eq!(out.boxes[0].class_id, 3);
    assert_eq!(out.image.get_pixel(34, 5), &Rgb([255, 0, 0]));
}

#[test]
fn vertical_flip_mirrors_cy() {
    let out = apply(
        &VerticalFlipEffect::default(),
        frame_with_box(0.3, 0.25, 0.1, 0.1),
    );
    let b = out.boxes[0].bbox;
    assert!((b.cx - 0.3).abs() < 1e-9);
    assert!((b.cy - 0.75).abs() < 1e-9);
}

#[test]
fn double_horizontal_flip_is_identity() {
    let original = frame_with_box(0.2, 0.6, 0.1, 0.2);
    let effect = HorizontalFlipEffect::default();
    let out = apply(&effect, apply(&effect, original.clone()));
    let (a, b) = (original.boxes[0].bbox, out.boxes[0].bbox);
    assert!((a.cx - b.cx).abs() < 1e-9);
    assert!((a.cy - b.cy).abs() < 1e-9);
}

#[test]
fn rotate_with_zero_limit_is_a_no_op() {
    let mut effect = RotateEffect::default();
    let mut params = Map::new();
    params.insert("limit".to_owned(), Value::from(0));
    effect.set_params(&params);
    let original = frame_with_box(0.4, 0.4, 0.2, 0.2);
    let out = apply(&effect, original.clone());
    assert_eq!(out.boxes[0].bbox, original.boxes[0].bbox);
    assert_eq!(out.image.dimensions(), (40, 20));
}

#[test]
fn rotate_keeps_dimensions_and_sane_boxes() {
    let out = apply(&RotateEffect::default(), frame_with_box(0.5, 0.5, 0.4, 0.4));
    assert_eq!(out.image.dimensions(), (40, 20));
    for b in &out.boxes {
        let (x0, y0, x1, y1) = b.bbox.corners();
        assert!(x0 >= -1e-9 && y0 >= -1e-9 && x1 <= 1.0 + 1e-9 && y1 <= 1.0 + 1e-9);
    }
}

#[test]
fn rotate_set_params_clamps_limit() {
    let mut effect = RotateEffect::default();
    let mut params = Map::new();
    params.insert("limit".to_owned(), Value::from(999));
    params.insert("border_value".to_owned(), Value::from(-5));
    effect.set_params(&params);
    let specs = effect.param_specs();
    assert_eq!(specs["limit"].value.as_i64(), Some(180));
    assert_eq!(specs["border_value"].value.as_i64(), Some(0));
}

#[test]
fn safe_rotate_swaps_dimensions_on_quarter_turns() {
    // Seed 7 draws some quarter turn count; geometry must stay consistent
    // with the image either way.
    let out = apply(&SafeRotateEffect::default(), frame_with_box(0.2, 0.3, 0.1, 0.2));
    let (w, h) = out.image.dimensions();
    assert!((w, h) == (40, 20) || (w, h) == (20, 40));
    let b = out.boxes[0].bbox;
    let (x0, y0, x1, y1) = b.corners();
    assert!(x0 >= -1e-9 && y0 >= -1e-9 && x1 <= 1.0 + 1e-9 && y1 <= 1.0 + 1e-9);
}

#[test]
fn safe_rotate_half_turn_maps_box_to_opposite_corner() {
    // Drive the primitive until a 180 rotation occurs and verify the map.
    for seed in 0..32 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ctx = ApplyCtx {
            rng: &mut rng,
            min_visibility: 0.3,
        };
        let out = SafeRotateEffect::default()
            .build_transform()
            .apply(&mut ctx, frame_with_box(0.2, 0.3, 0.1, 0.2))
            .unwrap();
        if out.image.dimensions() == (40, 20) {
            let b = out.boxes[0].bbox;
            assert!((b.cx - 0.8).abs() < 1e-9);
            assert!((b.cy - 0.7).abs() < 1e-9);
            return;
        }
    }
    panic!("no 180-degree draw in 32 seeds");
}
