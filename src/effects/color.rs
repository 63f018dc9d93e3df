//! Color and exposure effects.

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, impl_effect_core, ordered, param_f64, param_i64,
};
use crate::foundation::error::AugResult;
use crate::foundation::param::ParamSpec;
use crate::transform::pixel::{apply_lut, clamp_u8, hsv_to_rgb, map_pixels, rgb_to_hsv};
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

/// Randomly adjusts brightness and contrast levels.
#[derive(Clone, Debug)]
pub struct BrightnessContrastEffect {
    core: EffectCore,
    brightness_limit: f64,
    contrast_limit: f64,
}

impl Default for BrightnessContrastEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            brightness_limit: 0.2,
            contrast_limit: 0.2,
        }
    }
}

impl BrightnessContrastEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "BrightnessContrastEffect";
}

impl Effect for BrightnessContrastEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Color,
            bbox_safe: true,
            description: "Randomly adjusts brightness and contrast levels.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "brightness_limit",
                ParamSpec::float(
                    self.brightness_limit,
                    0.0,
                    1.0,
                    0.01,
                    "Range for brightness adjustment (-limit to +limit)",
                ),
            ),
            (
                "contrast_limit",
                ParamSpec::float(
                    self.contrast_limit,
                    0.0,
                    1.0,
                    0.01,
                    "Range for contrast adjustment (-limit to +limit)",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "brightness_limit") {
            self.brightness_limit = v.clamp(0.0, 1.0);
        }
        if let Some(v) = param_f64(params, "contrast_limit") {
            self.contrast_limit = v.clamp(0.0, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(BrightnessContrast {
            brightness_limit: self.brightness_limit,
            contrast_limit: self.contrast_limit,
        })
    }
}

struct BrightnessContrast {
    brightness_limit: f64,
    contrast_limit: f64,
}

impl TransformPrimitive for BrightnessContrast {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let b = sample_limit(ctx, self.brightness_limit);
        let c = sample_limit(ctx, self.contrast_limit);
        let gain = 1.0 + c;
        let bias = b * 255.0;
        let lut: [u8; 256] =
            std::array::from_fn(|i| clamp_u8((i as f64 - 127.5) * gain + 127.5 + bias));
        Ok(Frame::new(apply_lut(&frame.image, &lut), frame.boxes))
    }
}

fn sample_limit(ctx: &mut ApplyCtx<'_>, limit: f64) -> f64 {
    if limit <= 0.0 {
        0.0
    } else {
        ctx.rng.gen_range(-limit..=limit)
    }
}

/// Adjusts only image brightness.
#[derive(Clone, Debug)]
pub struct BrightnessEffect {
    core: EffectCore,
    limit: f64,
}

impl Default for BrightnessEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            limit: 0.2,
        }
    }
}

impl BrightnessEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "BrightnessEffect";
}

impl Effect for BrightnessEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Color,
            bbox_safe: true,
            description: "Adjusts only image brightness.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "limit",
            ParamSpec::float(self.limit, 0.0, 1.0, 0.01, "Range for brightness adjustment"),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "limit") {
            self.limit = v.clamp(0.0, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(BrightnessContrast {
            brightness_limit: self.limit,
            contrast_limit: 0.0,
        })
    }
}

/// Adjusts only image contrast.
#[derive(Clone, Debug)]
pub struct ContrastEffect {
    core: EffectCore,
    limit: f64,
}

impl Default for ContrastEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            limit: 0.2,
        }
    }
}

impl ContrastEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "ContrastEffect";
}

impl Effect for ContrastEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Color,
            bbox_safe: true,
            description: "Adjusts only image contrast.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "limit",
            ParamSpec::float(self.limit, 0.0, 1.0, 0.01, "Range for contrast adjustment"),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "limit") {
            self.limit = v.clamp(0.0, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(BrightnessContrast {
            brightness_limit: 0.0,
            contrast_limit: self.limit,
        })
    }
}

/// Adjusts image exposure using gamma correction.
#[derive(Clone, Debug)]
pub struct ExposureEffect {
    core: EffectCore,
    gamma_min: i64,
    gamma_max: i64,
}

impl Default for ExposureEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            gamma_min: 80,
            gamma_max: 120,
        }
    }
}

impl ExposureEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "ExposureEffect";
}

impl Effect for ExposureEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Color,
            bbox_safe: true,
            description: "Adjusts image exposure using gamma correction.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "gamma_min",
                ParamSpec::int(self.gamma_min, 40, 200, 5.0, "Minimum gamma value (lower = darker)"),
            ),
            (
                "gamma_max",
                ParamSpec::int(
                    self.gamma_max,
                    40,
                    200,
                    5.0,
                    "Maximum gamma value (higher = brighter)",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "gamma_min") {
            self.gamma_min = v.clamp(40, 200);
        }
        if let Some(v) = param_i64(params, "gamma_max") {
            self.gamma_max = v.clamp(40, 200);
        }
        if self.gamma_min > self.gamma_max {
            std::mem::swap(&mut self.gamma_min, &mut self.gamma_max);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        let (min, max) = ordered(self.gamma_min as f64, self.gamma_max as f64);
        Box::new(Gamma {
            gamma_min: min / 100.0,
            gamma_max: max / 100.0,
        })
    }
}

struct Gamma {
    gamma_min: f64,
    gamma_max: f64,
}

impl TransformPrimitive for Gamma {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let gamma = ctx.rng.gen_range(self.gamma_min..=self.gamma_max).max(0.01);
        let lut: [u8; 256] =
            std::array::from_fn(|i| clamp_u8((i as f64 / 255.0).powf(gamma) * 255.0));
        Ok(Frame::new(apply_lut(&frame.image, &lut), frame.boxes))
    }
}

/// Randomly shifts RGB channels to simulate chromatic aberration.
#[derive(Clone, Debug)]
pub struct RGBShiftEffect {
    core: EffectCore,
    r_shift: i64,
    g_shift: i64,
    b_shift: i64,
}

impl Default for RGBShiftEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            r_shift: 20,
            g_shift: 20,
            b_shift: 20,
        }
    }
}

impl RGBShiftEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RGBShiftEffect";
}

impl Effect for RGBShiftEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Color,
            bbox_safe: true,
            description: "Randomly shifts RGB channels to simulate chromatic aberration.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "r_shift",
                ParamSpec::int(self.r_shift, 0, 50, 1.0, "Maximum red channel shift (+/- limit)"),
            ),
            (
                "g_shift",
                ParamSpec::int(self.g_shift, 0, 50, 1.0, "Maximum green channel shift (+/- limit)"),
            ),
            (
                "b_shift",
                ParamSpec::int(self.b_shift, 0, 50, 1.0, "Maximum blue channel shift (+/- limit)"),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "r_shift") {
            self.r_shift = v.clamp(0, 50);
        }
        if let Some(v) = param_i64(params, "g_shift") {
            self.g_shift = v.clamp(0, 50);
        }
        if let Some(v) = param_i64(params, "b_shift") {
            self.b_shift = v.clamp(0, 50);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(RgbShift {
            limits: [self.r_shift, self.g_shift, self.b_shift],
        })
    }
}

struct RgbShift {
    limits: [i64; 3],
}

impl TransformPrimitive for RgbShift {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let shifts: [f64; 3] = std::array::from_fn(|c| sample_limit(ctx, self.limits[c] as f64));
        let image = map_pixels(&frame.image, |p| {
            [
                clamp_u8(f64::from(p[0]) + shifts[0]),
                clamp_u8(f64::from(p[1]) + shifts[1]),
                clamp_u8(f64::from(p[2]) + shifts[2]),
            ]
        });
        Ok(Frame::new(image, frame.boxes))
    }
}

/// Adjusts hue, saturation, and value in HSV color space.
#[derive(Clone, Debug)]
pub struct HueSaturationEffect {
    core: EffectCore,
    hue_shift: i64,
    sat_shift: i64,
    val_shift: i64,
}

impl Default for HueSaturationEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            hue_shift: 20,
            sat_shift: 30,
            val_shift: 20,
        }
    }
}

impl HueSaturationEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "HueSaturationEffect";
}

impl Effect for HueSaturationEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Color,
            bbox_safe: true,
            description: "Adjusts hue, saturation, and value (brightness) in HSV color space.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "hue_shift",
                ParamSpec::int(self.hue_shift, 0, 180, 1.0, "Maximum hue shift in degrees"),
            ),
            (
                "sat_shift",
                ParamSpec::int(self.sat_shift, 0, 100, 1.0, "Maximum saturation shift"),
            ),
            (
                "val_shift",
                ParamSpec::int(self.val_shift, 0, 100, 1.0, "Maximum value (brightness) shift"),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "hue_shift") {
            self.hue_shift = v.clamp(0, 180);
        }
        if let Some(v) = param_i64(params, "sat_shift") {
            self.sat_shift = v.clamp(0, 100);
        }
        if let Some(v) = param_i64(params, "val_shift") {
            self.val_shift = v.clamp(0, 100);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(HueSaturation {
            hue_limit: self.hue_shift as f64,
            sat_limit: self.sat_shift as f64 / 100.0,
            val_limit: self.val_shift as f64 / 100.0,
        })
    }
}

struct HueSaturation {
    hue_limit: f64,
    sat_limit: f64,
    val_limit: f64,
}

impl TransformPrimitive for HueSaturation {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let dh = sample_limit(ctx, self.hue_limit);
        let ds = sample_limit(ctx, self.sat_limit);
        let dv = sample_limit(ctx, self.val_limit);
        let image = map_pixels(&frame.image, |p| {
            let (h, s, v) = rgb_to_hsv(p);
            hsv_to_rgb(h + dh, (s + ds).clamp(0.0, 1.0), (v + dv).clamp(0.0, 1.0))
        });
        Ok(Frame::new(image, frame.boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
