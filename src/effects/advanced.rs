//! Projective transforms.

use std::collections::BTreeMap;

use image::Rgb;
use imageproc::geometric_transformations::{Interpolation, Projection, warp};
use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, impl_effect_core, param_f64,
};
use crate::foundation::error::AugResult;
use crate::foundation::param::ParamSpec;
use crate::transform::geometry::project_boxes;
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

/// Applies a random perspective transformation, keeping the image size.
#[derive(Clone, Debug)]
pub struct PerspectiveEffect {
    core: EffectCore,
    scale: f64,
}

impl Default for PerspectiveEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            scale: 0.05,
        }
    }
}

impl PerspectiveEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "PerspectiveEffect";
}

impl Effect for PerspectiveEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Advanced,
            bbox_safe: true,
            description: "Applies perspective transformation for realistic viewing angle changes.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([(
            "scale",
            ParamSpec::float(
                self.scale,
                0.0,
                0.2,
                0.01,
                "Standard deviation of perspective distortion",
            ),
        )])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_f64(params, "scale") {
            self.scale = v.clamp(0.0, 0.2);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(Perspective { scale: self.scale })
    }
}

struct Perspective {
    scale: f64,
}

impl TransformPrimitive for Perspective {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        if self.scale <= 0.0 {
            return Ok(frame);
        }
        let (w, h) = frame.image.dimensions();
        let (fw, fh) = (w as f32, h as f32);
        let max_dx = self.scale as f32 * fw;
        let max_dy = self.scale as f32 * fh;
        let mut jitter = |corner: (f32, f32)| {
            (
                corner.0 + ctx.rng.gen_range(-max_dx..=max_dx),
                corner.1 + ctx.rng.gen_range(-max_dy..=max_dy),
            )
        };
        let from = [(0.0, 0.0), (fw, 0.0), (fw, fh), (0.0, fh)];
        let to = [
            jitter(from[0]),
            jitter(from[1]),
            jitter(from[2]),
            jitter(from[3]),
        ];
        // Degenerate corner draws leave the frame untouched.
        let Some(projection) = Projection::from_control_points(from, to) else {
            return Ok(frame);
        };
        let image = warp(
            &frame.image,
            &projection,
            Interpolation::Bilinear,
            Rgb([0u8; 3]),
        );
        let boxes = project_boxes(&frame.boxes, w, h, ctx.min_visibility, |x, y| {
            let (px, py) = projection * (x as f32, y as f32);
            (f64::from(px), f64::from(py))
        });
        Ok(Frame::new(image, boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/advanced.rs"]
mod tests;
