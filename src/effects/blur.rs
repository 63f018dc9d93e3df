//! Blurring and sharpening effects.
//!
//! Every kernel-size parameter in this family must be odd; even values
//! are bumped by one both when set and when the transform is built.

use std::collections::BTreeMap;

use image::RgbImage;
use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, force_odd, impl_effect_core, ordered, param_f64,
    param_i64,
};
use crate::foundation::error::AugResult;
use crate::foundation::param::ParamSpec;
use crate::transform::pixel::{box_blur_rgb, clamp_u8, gaussian_blur_rgb};
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

/// Sample a random odd kernel size in `3..=limit`.
fn sample_odd_kernel(ctx: &mut ApplyCtx<'_>, limit: i64) -> u32 {
    let limit = force_odd(limit.max(3));
    let steps = (limit - 3) / 2;
    (3 + 2 * ctx.rng.gen_range(0..=steps)) as u32
}

/// Applies box blur to reduce image sharpness and detail.
#[derive(Clone, Debug)]
pub struct BlurEffect {
    core: EffectCore,
    blur_limit: i64,
}

impl Default for BlurEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            blur_limit: 7,
        }
    }
}

impl BlurEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "BlurEffect";
}

impl Effect for BlurEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Blur,
            bbox_safe: true,
            description: "Applies blur to reduce image sharpness and detail.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "blur_limit",
            ParamSpec::int(
                self.blur_limit,
                3,
                21,
                2.0,
                "Maximum kernel size for blur (must be odd)",
            ),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "blur_limit") {
            self.blur_limit = force_odd(v.clamp(3, 21));
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(BoxBlur {
            limit: force_odd(self.blur_limit),
        })
    }
}

struct BoxBlur {
    limit: i64,
}

impl TransformPrimitive for BoxBlur {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let kernel = sample_odd_kernel(ctx, self.limit);
        Ok(Frame::new(box_blur_rgb(&frame.image, kernel), frame.boxes))
    }
}

/// Applies Gaussian blur for a more natural blur effect.
#[derive(Clone, Debug)]
pub struct GaussianBlurEffect {
    core: EffectCore,
    blur_limit: i64,
    sigma_limit_min: f64,
    sigma_limit_max: f64,
}

impl Default for GaussianBlurEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            blur_limit: 7,
            sigma_limit_min: 0.0,
            sigma_limit_max: 0.0,
        }
    }
}

impl GaussianBlurEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "GaussianBlurEffect";
}

impl Effect for GaussianBlurEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Blur,
            bbox_safe: true,
            description: "Applies Gaussian blur for a more natural blur effect.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "blur_limit",
                ParamSpec::int(
                    self.blur_limit,
                    3,
                    21,
                    2.0,
                    "Maximum kernel size for Gaussian blur",
                ),
            ),
            (
                "sigma_limit_min",
                ParamSpec::float(
                    self.sigma_limit_min,
                    0.0,
                    10.0,
                    0.1,
                    "Minimum sigma for Gaussian kernel (0=auto)",
                ),
            ),
            (
                "sigma_limit_max",
                ParamSpec::float(
                    self.sigma_limit_max,
                    0.0,
                    10.0,
                    0.1,
                    "Maximum sigma for Gaussian kernel (0=auto)",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "blur_limit") {
            self.blur_limit = force_odd(v.clamp(3, 21));
        }
        if let Some(v) = param_f64(params, "sigma_limit_min") {
            self.sigma_limit_min = v.clamp(0.0, 10.0);
        }
        if let Some(v) = param_f64(params, "sigma_limit_max") {
            self.sigma_limit_max = v.clamp(0.0, 10.0);
        }
        (self.sigma_limit_min, self.sigma_limit_max) =
            ordered(self.sigma_limit_min, self.sigma_limit_max);
    }

    fn build_transform(&self) -> BoxedTransform {
        let (sigma_min, sigma_max) = if self.sigma_limit_max > 0.0 {
            ordered(self.sigma_limit_min, self.sigma_limit_max)
        } else {
            (0.1, 2.0)
        };
        Box::new(GaussianBlur {
            sigma_min,
            sigma_max,
        })
    }
}

struct GaussianBlur {
    sigma_min: f64,
    sigma_max: f64,
}

impl TransformPrimitive for GaussianBlur {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let sigma = ctx.rng.gen_range(self.sigma_min..=self.sigma_max);
        Ok(Frame::new(
            gaussian_blur_rgb(&frame.image, sigma as f32),
            frame.boxes,
        ))
    }
}

/// Applies motion blur to simulate camera movement.
#[derive(Clone, Debug)]
pub struct MotionBlurEffect {
    core: EffectCore,
    blur_limit: i64,
}

impl Default for MotionBlurEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            blur_limit: 7,
        }
    }
}

impl MotionBlurEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "MotionBlurEffect";
}

impl Effect for MotionBlurEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Blur,
            bbox_safe: true,
            description: "Applies motion blur to simulate camera movement.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "blur_limit",
            ParamSpec::int(
                self.blur_limit,
                3,
                21,
                2.0,
                "Maximum kernel size for motion blur",
            ),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "blur_limit") {
            self.blur_limit = force_odd(v.clamp(3, 21));
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(MotionBlur {
            limit: force_odd(self.blur_limit),
        })
    }
}

struct MotionBlur {
    limit: i64,
}

impl TransformPrimitive for MotionBlur {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let kernel = sample_odd_kernel(ctx, self.limit);
        let (dx, dy): (i64, i64) = match ctx.rng.gen_range(0..4u8) {
            0 => (1, 0),
            1 => (0, 1),
            2 => (1, 1),
            _ => (1, -1),
        };
        Ok(Frame::new(
            directional_blur(&frame.image, kernel, dx, dy),
            frame.boxes,
        ))
    }
}

/// Average along a line of `kernel` samples in direction `(dx, dy)`.
fn directional_blur(image: &RgbImage, kernel: u32, dx: i64, dy: i64) -> RgbImage {
    let (w, h) = image.dimensions();
    let half = i64::from(kernel) / 2;
    RgbImage::from_fn(w, h, |x, y| {
        let mut sums = [0u32; 3];
        let mut count = 0u32;
        for t in -half..=half {
            let sx = i64::from(x) + t * dx;
            let sy = i64::from(y) + t * dy;
            if sx < 0 || sy < 0 || sx >= i64::from(w) || sy >= i64::from(h) {
                continue;
            }
            let p = image.get_pixel(sx as u32, sy as u32);
            for c in 0..3 {
                sums[c] += u32::from(p.0[c]);
            }
            count += 1;
        }
        image::Rgb(std::array::from_fn(|c| (sums[c] / count.max(1)) as u8))
    })
}

/// Sharpens the image to enhance edges and details.
#[derive(Clone, Debug)]
pub struct SharpenEffect {
    core: EffectCore,
    alpha_min: f64,
    alpha_max: f64,
    lightness_min: f64,
    lightness_max: f64,
}

impl Default for SharpenEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            alpha_min: 0.2,
            alpha_max: 0.5,
            lightness_min: 0.5,
            lightness_max: 1.0,
        }
    }
}

impl SharpenEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "SharpenEffect";
}

impl Effect for SharpenEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Blur,
            bbox_safe: true,
            description: "Sharpens image to enhance edges and details.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "alpha_min",
                ParamSpec::float(
                    self.alpha_min,
                    0.0,
                    1.0,
                    0.05,
                    "Minimum blend factor (0=original, 1=sharp)",
                ),
            ),
            (
                "alpha_max",
                ParamSpec::float(self.alpha_max, 0.0, 1.0, 0.05, "Maximum blend factor"),
            ),
            (
                "lightness_min",
                ParamSpec::float(
                    self.lightness_min,
                    0.0,
                    2.0,
                    0.1,
                    "Minimum lightness adjustment",
                ),
            ),
            (
                "lightness_max",
                ParamSpec::float(
                    self.lightness_max,
                    0.0,
                    2.0,
                    0.1,
                    "Maximum lightness adjustment",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "alpha_min") {
            self.alpha_min = v.clamp(0.0, 1.0);
        }
        if let Some(v) = param_f64(params, "alpha_max") {
            self.alpha_max = v.clamp(0.0, 1.0);
        }
        if let Some(v) = param_f64(params, "lightness_min") {
            self.lightness_min = v.clamp(0.0, 2.0);
        }
        if let Some(v) = param_f64(params, "lightness_max") {
            self.lightness_max = v.clamp(0.0, 2.0);
        }
        (self.alpha_min, self.alpha_max) = ordered(self.alpha_min, self.alpha_max);
        (self.lightness_min, self.lightness_max) = ordered(self.lightness_min, self.lightness_max);
    }

    fn build_transform(&self) -> BoxedTransform {
        let (alpha_min, alpha_max) = ordered(self.alpha_min, self.alpha_max);
        let (lightness_min, lightness_max) = ordered(self.lightness_min, self.lightness_max);
        Box::new(Sharpen {
            alpha_min,
            alpha_max,
            lightness_min,
            lightness_max,
        })
    }
}

struct Sharpen {
    alpha_min: f64,
    alpha_max: f64,
    lightness_min: f64,
    lightness_max: f64,
}

impl TransformPrimitive for Sharpen {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let alpha = ctx.rng.gen_range(self.alpha_min..=self.alpha_max);
        let lightness = ctx.rng.gen_range(self.lightness_min..=self.lightness_max);
        let blurred = gaussian_blur_rgb(&frame.image, 1.0);
        let mut out = frame.image.clone();
        for (src, (blur, dst)) in frame
            .image
            .pixels()
            .zip(blurred.pixels().zip(out.pixels_mut()))
        {
            for c in 0..3 {
                let orig = f64::from(src.0[c]);
                let sharp = orig + lightness * (orig - f64::from(blur.0[c]));
                dst.0[c] = clamp_u8(orig * (1.0 - alpha) + sharp * alpha);
            }
        }
        Ok(Frame::new(out, frame.boxes))
    }
}

/// Applies unsharp masking for edge-selective sharpening.
#[derive(Clone, Debug)]
pub struct UnsharpMaskEffect {
    core: EffectCore,
    blur_limit: i64,
    sigma_limit: f64,
    alpha: f64,
    threshold: i64,
}

impl Default for UnsharpMaskEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            blur_limit: 7,
            sigma_limit: 0.0,
            alpha: 0.2,
            threshold: 10,
        }
    }
}

impl UnsharpMaskEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "UnsharpMaskEffect";
}

impl Effect for UnsharpMaskEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Blur,
            bbox_safe: true,
            description: "Applies unsharp masking for professional sharpening.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "blur_limit",
                ParamSpec::int(
                    self.blur_limit,
                    3,
                    21,
                    2.0,
                    "Kernel size for Gaussian blur",
                ),
            ),
            (
                "sigma_limit",
                ParamSpec::float(
                    self.sigma_limit,
                    0.0,
                    10.0,
                    0.1,
                    "Maximum sigma for Gaussian kernel (0=auto)",
                ),
            ),
            (
                "alpha",
                ParamSpec::float(self.alpha, 0.0, 1.0, 0.05, "Sharpening strength"),
            ),
            (
                "threshold",
                ParamSpec::int(self.threshold, 0, 255, 5.0, "Threshold for edge detection"),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "blur_limit") {
            self.blur_limit = force_odd(v.clamp(3, 21));
        }
        if let Some(v) = param_f64(params, "sigma_limit") {
            self.sigma_limit = v.clamp(0.0, 10.0);
        }
        if let Some(v) = param_f64(params, "alpha") {
            self.alpha = v.clamp(0.0, 1.0);
        }
        if let Some(v) = param_i64(params, "threshold") {
            self.threshold = v.clamp(0, 255);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(UnsharpMask {
            limit: force_odd(self.blur_limit),
            sigma_limit: self.sigma_limit,
            alpha: self.alpha,
            threshold: self.threshold as f64,
        })
    }
}

struct UnsharpMask {
    limit: i64,
    sigma_limit: f64,
    alpha: f64,
    threshold: f64,
}

impl TransformPrimitive for UnsharpMask {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let kernel = sample_odd_kernel(ctx, self.limit);
        let sigma = if self.sigma_limit > 0.0 {
            ctx.rng.gen_range(0.1..=self.sigma_limit)
        } else {
            // OpenCV sigma-from-kernel rule.
            0.3 * ((f64::from(kernel) - 1.0) * 0.5 - 1.0) + 0.8
        };
        let blurred = gaussian_blur_rgb(&frame.image, sigma as f32);
        let mut out = frame.image.clone();
        for (src, (blur, dst)) in frame
            .image
            .pixels()
            .zip(blurred.pixels().zip(out.pixels_mut()))
        {
            for c in 0..3 {
                let orig = f64::from(src.0[c]);
                let residual = orig - f64::from(blur.0[c]);
                // Only differences above the threshold are sharpened.
                if residual.abs() >= self.threshold {
                    dst.0[c] = clamp_u8(orig + self.alpha * residual);
                }
            }
        }
        Ok(Frame::new(out, frame.boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
