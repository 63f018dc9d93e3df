//! Noise and compression-artifact effects.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use image::codecs::jpeg::JpegEncoder;
use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, impl_effect_core, ordered, param_f64, param_i64,
};
use crate::foundation::error::{AugError, AugResult};
use crate::foundation::param::ParamSpec;
use crate::transform::pixel::clamp_u8;
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

/// Adds Gaussian noise to simulate sensor noise.
#[derive(Clone, Debug)]
pub struct GaussianNoiseEffect {
    core: EffectCore,
    var_limit_min: f64,
    var_limit_max: f64,
}

impl Default for GaussianNoiseEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            var_limit_min: 10.0,
            var_limit_max: 50.0,
        }
    }
}

impl GaussianNoiseEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "GaussianNoiseEffect";
}

impl Effect for GaussianNoiseEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Noise,
            bbox_safe: true,
            description: "Adds Gaussian noise to simulate sensor noise.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "var_limit_min",
                ParamSpec::float(
                    self.var_limit_min,
                    0.0,
                    500.0,
                    5.0,
                    "Minimum noise variance",
                ),
            ),
            (
                "var_limit_max",
                ParamSpec::float(
                    self.var_limit_max,
                    0.0,
                    500.0,
                    5.0,
                    "Maximum noise variance",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "var_limit_min") {
            self.var_limit_min = v.clamp(0.0, 500.0);
        }
        if let Some(v) = param_f64(params, "var_limit_max") {
            self.var_limit_max = v.clamp(0.0, 500.0);
        }
        (self.var_limit_min, self.var_limit_max) = ordered(self.var_limit_min, self.var_limit_max);
    }

    fn build_transform(&self) -> BoxedTransform {
        let (var_min, var_max) = ordered(self.var_limit_min, self.var_limit_max);
        Box::new(GaussianNoise { var_min, var_max })
    }
}

struct GaussianNoise {
    var_min: f64,
    var_max: f64,
}

impl TransformPrimitive for GaussianNoise {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let variance = ctx.rng.gen_range(self.var_min..=self.var_max);
        let sigma = variance.sqrt();
        let mut image = frame.image;
        for pixel in image.pixels_mut() {
            for c in 0..3 {
                let noise = sigma * gaussian_sample(ctx);
                pixel.0[c] = clamp_u8(f64::from(pixel.0[c]) + noise);
            }
        }
        Ok(Frame::new(image, frame.boxes))
    }
}

/// Standard normal sample via Box-Muller.
fn gaussian_sample(ctx: &mut ApplyCtx<'_>) -> f64 {
    let u1: f64 = ctx.rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = ctx.rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Flips random pixels to pure black or white.
#[derive(Clone, Debug)]
pub struct SaltAndPepperNoiseEffect {
    core: EffectCore,
    amount: f64,
    salt_ratio: f64,
}

impl Default for SaltAndPepperNoiseEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            amount: 0.01,
            salt_ratio: 0.5,
        }
    }
}

impl SaltAndPepperNoiseEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "SaltAndPepperNoiseEffect";
}

impl Effect for SaltAndPepperNoiseEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Noise,
            bbox_safe: true,
            description: "Flips random pixels to black or white (impulse noise).",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "amount",
                ParamSpec::float(
                    self.amount,
                    0.0,
                    0.2,
                    0.005,
                    "Fraction of pixels to corrupt",
                ),
            ),
            (
                "salt_ratio",
                ParamSpec::float(
                    self.salt_ratio,
                    0.0,
                    1.0,
                    0.05,
                    "Fraction of corrupted pixels set to white",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "amount") {
            self.amount = v.clamp(0.0, 0.2);
        }
        if let Some(v) = param_f64(params, "salt_ratio") {
            self.salt_ratio = v.clamp(0.0, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(SaltAndPepper {
            amount: self.amount,
            salt_ratio: self.salt_ratio,
        })
    }
}

struct SaltAndPepper {
    amount: f64,
    salt_ratio: f64,
}

impl TransformPrimitive for SaltAndPepper {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let mut image = frame.image;
        for pixel in image.pixels_mut() {
            if ctx.rng.r#gen::<f64>() < self.amount {
                let value = if ctx.rng.r#gen::<f64>() < self.salt_ratio {
                    255
                } else {
                    0
                };
                pixel.0 = [value; 3];
            }
        }
        Ok(Frame::new(image, frame.boxes))
    }
}

/// Re-encodes the image as JPEG at a random quality to introduce
/// compression artifacts.
#[derive(Clone, Debug)]
pub struct ImageCompressionEffect {
    core: EffectCore,
    quality_min: i64,
    quality_max: i64,
}

impl Default for ImageCompressionEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            quality_min: 50,
            quality_max: 100,
        }
    }
}

impl ImageCompressionEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "ImageCompressionEffect";
}

impl Effect for ImageCompressionEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Noise,
            bbox_safe: true,
            description: "Simulates JPEG compression artifacts.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "quality_min",
                ParamSpec::int(
                    self.quality_min,
                    1,
                    100,
                    1.0,
                    "Minimum JPEG quality (lower = more artifacts)",
                ),
            ),
            (
                "quality_max",
                ParamSpec::int(self.quality_max, 1, 100, 1.0, "Maximum JPEG quality"),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "quality_min") {
            self.quality_min = v.clamp(1, 100);
        }
        if let Some(v) = param_i64(params, "quality_max") {
            self.quality_max = v.clamp(1, 100);
        }
        if self.quality_min > self.quality_max {
            std::mem::swap(&mut self.quality_min, &mut self.quality_max);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        let (min, max) = if self.quality_min <= self.quality_max {
            (self.quality_min, self.quality_max)
        } else {
            (self.quality_max, self.quality_min)
        };
        Box::new(JpegRoundTrip {
            quality_min: min as u8,
            quality_max: max as u8,
        })
    }
}

struct JpegRoundTrip {
    quality_min: u8,
    quality_max: u8,
}

impl TransformPrimitive for JpegRoundTrip {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let quality = ctx.rng.gen_range(self.quality_min..=self.quality_max);
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode_image(&frame.image)
            .map_err(|e| AugError::transform(format!("jpeg encode failed: {e}")))?;
        let image = image::load_from_memory(&buf)
            .map_err(|e| AugError::transform(format!("jpeg decode failed: {e}")))?
            .to_rgb8();
        Ok(Frame::new(image, frame.boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/noise.rs"]
mod tests;
