//! Rigid geometric effects: flips and rotations.

use std::collections::BTreeMap;

use image::{Rgb, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;
use serde_json::{Map, Value};

use crate::effects::effect::{
    Category, Effect, EffectCore, EffectMeta, impl_effect_core, param_i64,
};
use crate::foundation::bbox::{BBox, LabeledBox};
use crate::foundation::error::AugResult;
use crate::foundation::param::ParamSpec;
use crate::transform::geometry::{project_boxes, rotate_point_about_center};
use crate::transform::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};

/// Flips the image horizontally (left to right).
#[derive(Clone, Debug, Default)]
pub struct HorizontalFlipEffect {
    core: EffectCore,
}

impl HorizontalFlipEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "HorizontalFlipEffect";
}

impl Effect for HorizontalFlipEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Geometric,
            bbox_safe: true,
            description: "Flips image horizontally (left to right).",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::new()
    }

    fn set_params(&mut self, _params: &Map<String, Value>) {}

    fn build_transform(&self) -> BoxedTransform {
        Box::new(HorizontalFlip)
    }
}

struct HorizontalFlip;

impl TransformPrimitive for HorizontalFlip {
    fn apply(&self, _ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let image = imageops::flip_horizontal(&frame.image);
        let boxes = frame
            .boxes
            .into_iter()
            .map(|b| {
                LabeledBox::new(
                    b.class_id,
                    BBox::new(1.0 - b.bbox.cx, b.bbox.cy, b.bbox.w, b.bbox.h),
                )
            })
            .collect();
        Ok(Frame::new(image, boxes))
    }
}

/// Flips the image vertically (top to bottom).
#[derive(Clone, Debug, Default)]
pub struct VerticalFlipEffect {
    core: EffectCore,
}

impl VerticalFlipEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "VerticalFlipEffect";
}

impl Effect for VerticalFlipEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Geometric,
            bbox_safe: true,
            description: "Flips image vertically (top to bottom).",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::new()
    }

    fn set_params(&mut self, _params: &Map<String, Value>) {}

    fn build_transform(&self) -> BoxedTransform {
        Box::new(VerticalFlip)
    }
}

struct VerticalFlip;

impl TransformPrimitive for VerticalFlip {
    fn apply(&self, _ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let image = imageops::flip_vertical(&frame.image);
        let boxes = frame
            .boxes
            .into_iter()
            .map(|b| {
                LabeledBox::new(
                    b.class_id,
                    BBox::new(b.bbox.cx, 1.0 - b.bbox.cy, b.bbox.w, b.bbox.h),
                )
            })
            .collect();
        Ok(Frame::new(image, boxes))
    }
}

/// Rotates the image by a random angle within the configured limit.
#[derive(Clone, Debug)]
pub struct RotateEffect {
    core: EffectCore,
    limit: i64,
    border_value: i64,
}

impl Default for RotateEffect {
    fn default() -> Self {
        Self {
            core: EffectCore::default(),
            limit: 15,
            border_value: 0,
        }
    }
}

impl RotateEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "RotateEffect";
}

impl Effect for RotateEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Geometric,
            bbox_safe: true,
            description: "Rotates image by random angle within specified range.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::from([
            (
                "limit",
                ParamSpec::int(
                    self.limit,
                    0,
                    180,
                    5.0,
                    "Maximum rotation angle in degrees (+/- limit)",
                ),
            ),
            (
                "border_value",
                ParamSpec::int(
                    self.border_value,
                    0,
                    255,
                    1.0,
                    "Padding color value (0=black, 255=white)",
                ),
            ),
        ])
    }

    fn set_params(&mut self, params: &Map<String, Value>) {
        if let Some(v) = param_i64(params, "limit") {
            self.limit = v.clamp(0, 180);
        }
        if let Some(v) = param_i64(params, "border_value") {
            self.border_value = v.clamp(0, 255);
        }
    }

    fn build_transform(&self) -> BoxedTransform {
        Box::new(Rotate {
            limit_deg: self.limit as f64,
            border: self.border_value as u8,
        })
    }
}

struct Rotate {
    limit_deg: f64,
    border: u8,
}

impl TransformPrimitive for Rotate {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        if self.limit_deg <= 0.0 {
            return Ok(frame);
        }
        let angle = ctx.rng.gen_range(-self.limit_deg..=self.limit_deg);
        let theta = angle.to_radians();
        let (w, h) = frame.image.dimensions();
        let image = rotate_about_center(
            &frame.image,
            theta as f32,
            Interpolation::Bilinear,
            Rgb([self.border; 3]),
        );
        let boxes = project_boxes(&frame.boxes, w, h, ctx.min_visibility, |x, y| {
            rotate_point_about_center(x, y, theta, w, h)
        });
        Ok(Frame::new(image, boxes))
    }
}

/// Rotates by a random multiple of 90 degrees.
#[derive(Clone, Debug, Default)]
pub struct SafeRotateEffect {
    core: EffectCore,
}

impl SafeRotateEffect {
    /// Stable serialization tag.
    pub const TAG: &'static str = "SafeRotateEffect";
}

impl Effect for SafeRotateEffect {
    impl_effect_core!();

    fn meta(&self) -> EffectMeta {
        EffectMeta {
            tag: Self::TAG,
            category: Category::Geometric,
            bbox_safe: true,
            description: "Rotates only to 90-degree angles (90, 180, 270) for perfect bbox preservation.",
        }
    }

    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec> {
        BTreeMap::new()
    }

    fn set_params(&mut self, _params: &Map<String, Value>) {}

    fn build_transform(&self) -> BoxedTransform {
        Box::new(SafeRotate)
    }
}

struct SafeRotate;

impl TransformPrimitive for SafeRotate {
    fn apply(&self, ctx: &mut ApplyCtx<'_>, frame: Frame) -> AugResult<Frame> {
        let quarter_turns = ctx.rng.gen_range(1..=3u32);
        let image = match quarter_turns {
            1 => imageops::rotate90(&frame.image),
            2 => imageops::rotate180(&frame.image),
            _ => imageops::rotate270(&frame.image),
        };
        let boxes = frame
            .boxes
            .into_iter()
            .map(|b| {
                let BBox { cx, cy, w, h } = b.bbox;
                // Clockwise quarter-turn box maps.
                let bbox = match quarter_turns {
                    1 => BBox::new(1.0 - cy, cx, h, w),
                    2 => BBox::new(1.0 - cx, 1.0 - cy, w, h),
                    _ => BBox::new(cy, 1.0 - cx, h, w),
                };
                LabeledBox::new(b.class_id, bbox)
            })
            .collect();
        Ok(Frame::new(image, boxes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/geometric.rs"]
mod tests;
