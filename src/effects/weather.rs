//! Simulated weather overlays: rain, fog, sun flare.

use std::collections::BTreeMap;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, force_odd, impl_effect_core, param_f64, param_i64,
};
use crate::foundation::error::AugResult;
use crate::foundation::param::ParamSpec;
use crate::transform::pixel::{apply_lut, box_blur_rgb, clamp_u8, gaussian_blur_rgb};
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

/// Overlays rain streaks and darkens the scene.
#[derive(Clone, Debug)]
pub struct RandomRainEffect {
    core: EffectCore,
    slant_lower: i64,
    slant_upper: i64,
    drop_length: i64,
    drop_width: i64,
    drop_color: [i64; 3],
    blur_value: i64,
    brightness_coefficient: f64,
}

impl Default for RandomRainEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            slant_lower: -10,
            slant_upper: 10,
            drop_length: 20,
            drop_width: 1,
            drop_color: [200, 200, 200],
            blur_value: 3,
            brightness_coefficient: 0.7,
        }
    }
}

impl RandomRainEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RandomRainEffect";
}

impl Effect for RandomRainEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Weather,
            bbox_safe: true,
            description: "Adds rain effects to the image.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "brightness_coefficient",
                ParamSpec::float(
                    self.brightness_coefficient,
                    0.0,
                    1.0,
                    0.05,
                    "Rain darkening effect",
                ),
            ),
            (
                "blur_value",
                ParamSpec::int(self.blur_value, 1, 7, 1.0, "Rain blur (must be odd)"),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "brightness_coefficient") {
            self.brightness_coefficient = v.clamp(0.0, 1.0);
        }
        if let Some(v) = param_i64(params, "blur_value") {
            self.blur_value = force_odd(v.clamp(1, 7));
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(Rain {
            slant_lower: self.slant_lower,
            slant_upper: self.slant_upper,
            drop_length: self.drop_length.max(1) as u32,
            drop_width: self.drop_width.max(1) as u32,
            drop_color: Rgb(std::array::from_fn(|c| self.drop_color[c].clamp(0, 255) as u8)),
            blur_value: force_odd(self.blur_value) as u32,
            brightness_coefficient: self.brightness_coefficient,
        })
    }
}

struct Rain {
    slant_lower: i64,
    slant_upper: i64,
    drop_length: u32,
    drop_width: u32,
    drop_color: Rgb<u8>,
    blur_value: u32,
    brightness_coefficient: f64,
}

impl TransformPrimitive for Rain {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let (w, h) = frame.image.dimensions();
        let slant = ctx.rng.gen_range(self.slant_lower..=self.slant_upper) as f32;
        let mut image = frame.image;
        // Streak density follows the image area, one drop per ~600 px.
        let drops = ((w * h) / 600).max(1);
        for _ in 0..drops {
            let x0 = ctx.rng.gen_range(0..w) as f32;
            let y0 = ctx.rng.gen_range(0..h) as f32;
            let x1 = x0 + slant;
            let y1 = y0 + self.drop_length as f32;
            for t in 0..self.drop_width {
                draw_line_segment_mut(
                    &mut image,
                    (x0 + t as f32, y0),
                    (x1 + t as f32, y1),
                    self.drop_color,
                );
            }
        }
        let mut image = box_blur_rgb(&image, self.blur_value);
        if self.brightness_coefficient < 1.0 {
            let lut: [u8; 256] =
                std::array::from_fn(|i| clamp_u8(i as f64 * self.brightness_coefficient));
            image = apply_lut(&image, &lut);
        }
        Ok(Frame::new(image, frame.boxes))
    }
}

/// Blends a white haze over the image.
#[derive(Clone, Debug)]
pub struct RandomFogEffect {
    core: EffectCore,
    fog_coef_lower: f64,
    fog_coef_upper: f64,
    alpha_coef: f64,
}

impl Default for RandomFogEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            fog_coef_lower: 0.3,
            fog_coef_upper: 1.0,
            alpha_coef: 0.08,
        }
    }
}

impl RandomFogEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RandomFogEffect";
}

impl Effect for RandomFogEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Weather,
            bbox_safe: true,
            description: "Adds fog effects to the image.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "alpha_coef",
            ParamSpec::float(self.alpha_coef, 0.0, 1.0, 0.01, "Fog intensity"),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "alpha_coef") {
            self.alpha_coef = v.clamp(0.0, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(Fog {
            fog_coef_lower: self.fog_coef_lower,
            fog_coef_upper: self.fog_coef_upper,
            alpha_coef: self.alpha_coef,
        })
    }
}

struct Fog {
    fog_coef_lower: f64,
    fog_coef_upper: f64,
    alpha_coef: f64,
}

impl TransformPrimitive for Fog {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let fog_coef = ctx.rng.gen_range(self.fog_coef_lower..=self.fog_coef_upper);
        // Heavier fog washes out more and blurs more.
        let alpha = (fog_coef * (0.2 + self.alpha_coef * 4.0)).clamp(0.0, 0.9);
        let sigma = (fog_coef * 3.0) as f32;
        let softened = gaussian_blur_rgb(&frame.image, sigma);
        let mut image = softened;
        for pixel in image.pixels_mut() {
            for c in 0..3 {
                pixel.0[c] =
                    clamp_u8(f64::from(pixel.0[c]) * (1.0 - alpha) + 255.0 * alpha);
            }
        }
        Ok(Frame::new(image, frame.boxes))
    }
}

/// Renders an additive sun flare with trailing circles.
#[derive(Clone, Debug)]
pub struct RandomSunFlareEffect {
    core: EffectCore,
    flare_roi: [f64; 4],
    angle_lower: f64,
    angle_upper: f64,
    num_circles_lower: i64,
    num_circles_upper: i64,
    src_radius: i64,
    src_color: [i64; 3],
}

impl Default for RandomSunFlareEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            flare_roi: [0.0, 0.0, 1.0, 0.5],
            angle_lower: 0.0,
            angle_upper: 1.0,
            num_circles_lower: 6,
            num_circles_upper: 10,
            src_radius: 400,
            src_color: [255, 255, 255],
        }
    }
}

impl RandomSunFlareEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RandomSunFlareEffect";
}

impl Effect for RandomSunFlareEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Weather,
            bbox_safe: true,
            description: "Adds sun flare effects.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "src_radius",
                ParamSpec::int(self.src_radius, 100, 800, 50.0, "Source flare radius"),
            ),
            (
                "angle_upper",
                ParamSpec::float(self.angle_upper, 0.0, 1.0, 0.1, "Max flare angle"),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "src_radius") {
            self.src_radius = v.clamp(100, 800);
        }
        if let Some(v) = param_f64(params, "angle_upper") {
            self.angle_upper = v.clamp(0.0, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(SunFlare {
            flare_roi: self.flare_roi,
            angle_lower: self.angle_lower,
            angle_upper: self.angle_upper,
            num_circles_lower: self.num_circles_lower.max(1) as u32,
            num_circles_upper: self.num_circles_upper.max(1) as u32,
            src_radius: self.src_radius.max(1) as f64,
            src_color: std::array::from_fn(|c| self.src_color[c].clamp(0, 255) as f64),
        })
    }
}

struct SunFlare {
    flare_roi: [f64; 4],
    angle_lower: f64,
    angle_upper: f64,
    num_circles_lower: u32,
    num_circles_upper: u32,
    src_radius: f64,
    src_color: [f64; 3],
}

impl SunFlare {
    fn add_glow(image: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: &[f64; 3], gain: f64) {
        let (w, h) = image.dimensions();
        let x0 = ((cx - radius).floor().max(0.0)) as u32;
        let y0 = ((cy - radius).floor().max(0.0)) as u32;
        let x1 = ((cx + radius).ceil() as u32).min(w.saturating_sub(1));
        let y1 = ((cy + radius).ceil() as u32).min(h.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = ((f64::from(x) - cx).powi(2) + (f64::from(y) - cy).powi(2)).sqrt();
                if d >= radius {
                    continue;
                }
                let falloff = (1.0 - d / radius).powi(2) * gain;
                let pixel = image.get_pixel_mut(x, y);
                for c in 0..3 {
                    pixel.0[c] = clamp_u8(f64::from(pixel.0[c]) + color[c] * falloff);
                }
            }
        }
    }
}

impl TransformPrimitive for SunFlare {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let (w, h) = frame.image.dimensions();
        let (fw, fh) = (f64::from(w), f64::from(h));
        let [rx0, ry0, rx1, ry1] = self.flare_roi;
        let cx = ctx.rng.gen_range(rx0..=rx1.max(rx0)) * fw;
        let cy = ctx.rng.gen_range(ry0..=ry1.max(ry0)) * fh;
        let angle =
            ctx.rng.gen_range(self.angle_lower..=self.angle_upper.max(self.angle_lower))
                * std::f64::consts::TAU;
        let circles = ctx
            .rng
            .gen_range(self.num_circles_lower..=self.num_circles_upper.max(self.num_circles_lower));

        let mut image = frame.image;
        Self::add_glow(&mut image, cx, cy, self.src_radius, &self.src_color, 0.85);
        // Trailing circles march away from the source along the flare angle.
        for i in 1..=circles {
            let t = f64::from(i) / f64::from(circles);
            let gx = cx + angle.cos() * t * fw * 0.6;
            let gy = cy + angle.sin() * t * fh * 0.6;
            let radius = self.src_radius * 0.08 * (1.0 + ctx.rng.r#gen::<f64>());
            Self::add_glow(&mut image, gx, gy, radius, &self.src_color, 0.3);
        }
        Ok(Frame::new(image, frame.boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/weather.rs"]
mod tests;
