//! Per-pixel helpers shared by the photometric kernels.
//!
//! `imageproc`'s separable filters operate on single-channel images, so
//! color filtering splits into R/G/B planes, filters each, and
//! reassembles (the same channel-split pattern as any linear per-channel
//! filter).

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Clamp a float sample into the `u8` range.
pub fn clamp_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Map every pixel of `image` through `f`.
pub fn map_pixels(image: &RgbImage, f: impl Fn([u8; 3]) -> [u8; 3]) -> RgbImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        px.0 = f(px.0);
    }
    out
}

/// Apply a per-channel lookup table.
pub fn apply_lut(image: &RgbImage, lut: &[u8; 256]) -> RgbImage {
    map_pixels(image, |p| {
        [
            lut[usize::from(p[0])],
            lut[usize::from(p[1])],
            lut[usize::from(p[2])],
        ]
    })
}

/// Extract one channel of an RGB image as a grayscale plane.
pub fn channel_plane(image: &RgbImage, c: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[c]])
    })
}

/// Reassemble three grayscale planes into an RGB image.
pub fn planes_to_rgb(planes: &[GrayImage; 3]) -> RgbImage {
    RgbImage::from_fn(planes[0].width(), planes[0].height(), |x, y| {
        Rgb([
            planes[0].get_pixel(x, y).0[0],
            planes[1].get_pixel(x, y).0[0],
            planes[2].get_pixel(x, y).0[0],
        ])
    })
}

/// Gaussian-blur an RGB image by blurring each channel plane.
///
/// Non-positive sigma returns the image unchanged, since the underlying
/// filter panics on `sigma <= 0`.
pub fn gaussian_blur_rgb(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    let planes: [GrayImage; 3] = std::array::from_fn(|c| {
        imageproc::filter::gaussian_blur_f32(&channel_plane(image, c), sigma)
    });
    planes_to_rgb(&planes)
}

/// Box-blur an RGB image with the given odd kernel size.
pub fn box_blur_rgb(image: &RgbImage, kernel: u32) -> RgbImage {
    if kernel <= 1 {
        return image.clone();
    }
    let radius = kernel / 2;
    let planes: [GrayImage; 3] = std::array::from_fn(|c| {
        imageproc::filter::box_filter(&channel_plane(image, c), radius, radius)
    });
    planes_to_rgb(&planes)
}

/// Convert an RGB pixel to HSV (`h` in degrees, `s`/`v` in `[0, 1]`).
pub fn rgb_to_hsv(p: [u8; 3]) -> (f64, f64, f64) {
    let r = f64::from(p[0]) / 255.0;
    let g = f64::from(p[1]) / 255.0;
    let b = f64::from(p[2]) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s, max)
}

/// Convert an HSV triple back to an RGB pixel.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h {
        _ if h < 60.0 => (c, x, 0.0),
        _ if h < 120.0 => (x, c, 0.0),
        _ if h < 180.0 => (0.0, c, x),
        _ if h < 240.0 => (0.0, x, c),
        _ if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [
        clamp_u8((r + m) * 255.0),
        clamp_u8((g + m) * 255.0),
        clamp_u8((b + m) * 255.0),
    ]
}
