//! Cropping effects.
//!
//! Crop targets are fixed at 640x640 (the training resolution of the
//! original dataset tooling); sampled windows may be upscaled to reach
//! it. That is intentional for training-time augmentation.

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, impl_effect_core, ordered, param_f64,
};
use crate::foundation::error::AugResult;
use crate::foundation::param::ParamSpec;
use crate::transform::geometry::{CropWindow, crop_with_boxes, resize};
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

const CROP_TARGET: u32 = 640;

/// Crops a random window and resizes it to the crop target.
#[derive(Clone, Debug)]
pub struct RandomCropEffect {
    core: EffectCore,
    scale_min: f64,
    scale_max: f64,
    min_bbox_area: f64,
}

impl Default for RandomCropEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            scale_min: 0.7,
            scale_max: 0.9,
            min_bbox_area: 0.1,
        }
    }
}

impl RandomCropEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RandomCropEffect";
}

impl Effect for RandomCropEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Spatial,
            bbox_safe: true,
            description: "Randomly crops image while preserving bounding boxes.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "scale_min",
                ParamSpec::float(
                    self.scale_min,
                    0.3,
                    1.0,
                    0.05,
                    "Minimum crop scale (fraction of original area)",
                ),
            ),
            (
                "scale_max",
                ParamSpec::float(
                    self.scale_max,
                    0.3,
                    1.0,
                    0.05,
                    "Maximum crop scale (fraction of original area)",
                ),
            ),
            (
                "min_bbox_area",
                ParamSpec::float(
                    self.min_bbox_area,
                    0.0,
                    1.0,
                    0.05,
                    "Minimum bbox area to keep (0.1 = keep if >10% remains)",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "scale_min") {
            self.scale_min = v.clamp(0.3, 1.0);
        }
        if let Some(v) = param_f64(params, "scale_max") {
            self.scale_max = v.clamp(0.3, 1.0);
        }
        if let Some(v) = param_f64(params, "min_bbox_area") {
            self.min_bbox_area = v.clamp(0.0, 1.0);
        }
        (self.scale_min, self.scale_max) = ordered(self.scale_min, self.scale_max);
    }

    fn build_transform(&self) -> BoxedTransform {
        let (scale_min, scale_max) = ordered(self.scale_min, self.scale_max);
        Box::new(RandomResizedCrop {
            scale_min,
            scale_max,
            ratio_min: 0.9,
            ratio_max: 1.1,
            min_visibility: Some(self.min_bbox_area),
        })
    }
}

/// Crops the center region of the image, keeping the original size.
#[derive(Clone, Debug)]
pub struct CenterCropEffect {
    core: EffectCore,
    scale: f64,
}

impl Default for CenterCropEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            scale: 0.8,
        }
    }
}

impl CenterCropEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "CenterCropEffect";
}

impl Effect for CenterCropEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Spatial,
            // A tight center crop can cut away edge boxes entirely.
            bbox_safe: false,
            description: "Crops center region of image. Uses percentage-based sizing.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "scale",
            ParamSpec::float(
                self.scale,
                0.3,
                1.0,
                0.05,
                "Crop scale (fraction of original size)",
            ),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "scale") {
            self.scale = v.clamp(0.3, 1.0);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(CenterCrop { scale: self.scale })
    }
}

struct CenterCrop {
    scale: f64,
}

impl TransformPrimitive for CenterCrop {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let (w, h) = frame.image.dimensions();
        let cw = ((f64::from(w) * self.scale) as u32).max(1);
        let ch = ((f64::from(h) * self.scale) as u32).max(1);
        if cw >= w && ch >= h {
            return Ok(frame);
        }
        let win = CropWindow {
            x: (w - cw) / 2,
            y: (h - ch) / 2,
            w: cw,
            h: ch,
        };
        let (cropped, boxes) = crop_with_boxes(&frame.image, &frame.boxes, win, ctx.min_visibility);
        // keep_size: resize the crop back to the source dimensions.
        Ok(Frame::new(resize(&cropped, w, h), boxes))
    }
}

/// Crops a random window with random aspect ratio, resized to the crop
/// target.
#[derive(Clone, Debug)]
pub struct RandomResizedCropEffect {
    core: EffectCore,
    scale_min: f64,
    scale_max: f64,
    ratio_min: f64,
    ratio_max: f64,
}

impl Default for RandomResizedCropEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            scale_min: 0.5,
            scale_max: 1.0,
            ratio_min: 0.75,
            ratio_max: 1.33,
        }
    }
}

impl RandomResizedCropEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RandomResizedCropEffect";
}

impl Effect for RandomResizedCropEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Spatial,
            bbox_safe: true,
            description: "Crops random region and resizes to target size.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "scale_min",
                ParamSpec::float(self.scale_min, 0.1, 1.0, 0.05, "Minimum area scale for cropping"),
            ),
            (
                "scale_max",
                ParamSpec::float(self.scale_max, 0.1, 1.0, 0.05, "Maximum area scale for cropping"),
            ),
            (
                "ratio_min",
                ParamSpec::float(
                    self.ratio_min,
                    0.5,
                    2.0,
                    0.05,
                    "Minimum aspect ratio (width/height)",
                ),
            ),
            (
                "ratio_max",
                ParamSpec::float(
                    self.ratio_max,
                    0.5,
                    2.0,
                    0.05,
                    "Maximum aspect ratio (width/height)",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "scale_min") {
            self.scale_min = v.clamp(0.1, 1.0);
        }
        if let Some(v) = param_f64(params, "scale_max") {
            self.scale_max = v.clamp(0.1, 1.0);
        }
        if let Some(v) = param_f64(params, "ratio_min") {
            self.ratio_min = v.clamp(0.5, 2.0);
        }
        if let Some(v) = param_f64(params, "ratio_max") {
            self.ratio_max = v.clamp(0.5, 2.0);
        }
        (self.scale_min, self.scale_max) = ordered(self.scale_min, self.scale_max);
        (self.ratio_min, self.ratio_max) = ordered(self.ratio_min, self.ratio_max);
    }

    fn build_transform(&self) -> BoxedTransform {
        let (scale_min, scale_max) = ordered(self.scale_min, self.scale_max);
        let (ratio_min, ratio_max) = ordered(self.ratio_min, self.ratio_max);
        Box::new(RandomResizedCrop {
            scale_min,
            scale_max,
            ratio_min,
            ratio_max,
            min_visibility: None,
        })
    }
}

struct RandomResizedCrop {
    scale_min: f64,
    scale_max: f64,
    ratio_min: f64,
    ratio_max: f64,
    /// Per-effect override of the pipeline's visibility threshold.
    min_visibility: Option<f64>,
}

impl TransformPrimitive for RandomResizedCrop {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let (w, h) = frame.image.dimensions();
        let (fw, fh) = (f64::from(w), f64::from(h));
        let scale = ctx.rng.gen_range(self.scale_min..=self.scale_max);
        let ratio = ctx.rng.gen_range(self.ratio_min..=self.ratio_max);
        let area = scale * fw * fh;
        let cw = ((area * ratio).sqrt() as u32).clamp(1, w);
        let ch = ((area / ratio).sqrt() as u32).clamp(1, h);
        let x = if cw < w { ctx.rng.gen_range(0..=w - cw) } else { 0 };
        let y = if ch < h { ctx.rng.gen_range(0..=h - ch) } else { 0 };
        let win = CropWindow { x, y, w: cw, h: ch };
        let visibility = self.min_visibility.unwrap_or(ctx.min_visibility);
        let (cropped, boxes) = crop_with_boxes(&frame.image, &frame.boxes, win, visibility);
        Ok(Frame::new(resize(&cropped, CROP_TARGET, CROP_TARGET), boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/spatial.rs"]
mod tests;
