use super::*;
use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn checker_frame() -> Frame {
    let image = RgbImage::from_fn(32, 32, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([255; 3])
        } else {
            Rgb([0; 3])
        }
    });
    Frame::new(image, Vec::new())
}

fn apply_seeded(effect: &dyn Effect, frame: Frame, seed: u64) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ctx = ApplyCtx {
        rng: &mut rng,
        min_visibility: 0.3,
    };
    effect.build_transform().apply(&mut ctx, frame).unwrap()
}

fn contrast(image: &RgbImage) -> f64 {
    let mean = image.pixels().map(|p| f64::from(p.0[0])).sum::<f64>()
        / f64::from(image.width() * image.height());
    image
        .pixels()
        .map(|p| (f64::from(p.0[0]) - mean).abs())
        .sum::<f64>()
        / f64::from(image.width() * image.height())
}

#[test]
fn blur_reduces_local_contrast() {
    let frame = checker_frame();
    let before = contrast(&frame.image);
    let out = apply_seeded(&BlurEffect::default(), frame, 1);
    assert!(contrast(&out.image) < before);
}

#[test]
fn blur_limit_is_forced_odd_on_set() {
    let mut effect = BlurEffect::default();
    let mut params = Map::new();
    params.insert("blur_limit".to_owned(), Value::from(8));
    effect.set_params(&params);
    let specs = effect.param_specs();
    assert_eq!(specs["blur_limit"].value.as_i64(), Some(9));
}

#[test]
fn blur_limit_already_odd_is_kept() {
    let mut effect = BlurEffect::default();
    let mut params = Map::new();
    params.insert("blur_limit".to_owned(), Value::from(9));
    effect.set_params(&params);
    assert_eq!(effect.param_specs()["blur_limit"].value.as_i64(), Some(9));
}

#[test]
fn gaussian_blur_reduces_local_contrast() {
    let frame = checker_frame();
    let before = contrast(&frame.image);
    let out = apply_seeded(&GaussianBlurEffect::default(), frame, 2);
    assert!(contrast(&out.image) < before);
}

#[test]
fn gaussian_blur_sigma_bounds_swap() {
    let mut effect = GaussianBlurEffect::default();
    let mut params = Map::new();
    params.insert("sigma_limit_min".to_owned(), Value::from(3.0));
    params.insert("sigma_limit_max".to_owned(), Value::from(1.0));
    effect.set_params(&params);
    let specs = effect.param_specs();
    assert_eq!(specs["sigma_limit_min"].value.as_f64(), Some(1.0));
    assert_eq!(specs["sigma_limit_max"].value.as_f64(), Some(3.0));
}

#[test]
fn motion_blur_smears_along_a_direction() {
    let frame = checker_frame();
    let before = contrast(&frame.image);
    let out = apply_seeded(&MotionBlurEffect::default(), frame, 3);
    assert!(contrast(&out.image) <= before);
    assert_eq!(out.image.dimensions(), (32, 32));
}

#[test]
fn sharpen_bounds_swap_on_set() {
    let mut effect = SharpenEffect::default();
    let mut params = Map::new();
    params.insert("alpha_min".to_owned(), Value::from(0.9));
    params.insert("alpha_max".to_owned(), Value::from(0.1));
    effect.set_params(&params);
    let specs = effect.param_specs();
    assert_eq!(specs["alpha_min"].value.as_f64(), Some(0.1));
    assert_eq!(specs["alpha_max"].value.as_f64(), Some(0.9));
}

#[test]
fn sharpen_keeps_flat_regions_flat() {
    let flat = Frame::new(RgbImage::from_pixel(16, 16, Rgb([90; 3])), Vec::new());
    let out = apply_seeded(&SharpenEffect::default(), flat, 4);
    let p = out.image.get_pixel(8, 8);
    assert!((i32::from(p.0[0]) - 90).abs() <= 1);
}

#[test]
fn unsharp_mask_increases_soft_checker_contrast() {
    let image = RgbImage::from_fn(32, 32, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([180; 3])
        } else {
            Rgb([80; 3])
        }
    });
    let frame = Frame::new(image, Vec::new());
    let before = contrast(&frame.image);
    let out = apply_seeded(&UnsharpMaskEffect::default(), frame, 5);
    assert!(contrast(&out.image) > before);
}

#[test]
fn unsharp_mask_leaves_flat_regions_untouched() {
    // Residuals below the threshold are never sharpened.
    let flat = Frame::new(RgbImage::from_pixel(16, 16, Rgb([90; 3])), Vec::new());
    let out = apply_seeded(&UnsharpMaskEffect::default(), flat, 6);
    assert_eq!(out.image.get_pixel(8, 8), &Rgb([90; 3]));
}

#[test]
fn unsharp_mask_blur_limit_is_forced_odd_on_set() {
    let mut effect = UnsharpMaskEffect::default();
    let mut params = Map::new();
    params.insert("blur_limit".to_owned(), Value::from(10));
    effect.set_params(&params);
    assert_eq!(effect.param_specs()["blur_limit"].value.as_i64(), Some(11));
}

#[test]
fn sample_odd_kernel_stays_odd_and_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut ctx = ApplyCtx {
        rng: &mut rng,
        min_visibility: 0.3,
    };
    for _ in 0..64 {
        let k = sample_odd_kernel(&mut ctx, 21);
        assert!(k % 2 == 1);
        assert!((3..=21).contains(&k));
    }
}
