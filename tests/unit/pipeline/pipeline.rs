use super::*;
use image::RgbImage;
use rand::SeedableRng;
use serde_json::json;

use crate::effects::registry::create_default_effect;
use crate::foundation::bbox::{BBox, LabeledBox};
use crate::transform::TransformPrimitive;

fn flip() -> Box<dyn crate::effects::Effect> {
    create_default_effect("HorizontalFlipEffect").unwrap()
}

fn one_box_frame() -> Frame {
    Frame::new(
        RgbImage::new(32, 32),
        vec![LabeledBox::new(0, BBox::new(0.2, 0.5, 0.1, 0.1))],
    )
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

#[test]
fn compile_reuses_cache_while_config_is_unchanged() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    let a = pipeline.compile(true);
    let b = pipeline.compile(true);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn compile_without_cache_rebuilds() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    let a = pipeline.compile(true);
    let b = pipeline.compile(false);
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn reconfiguring_an_effect_invalidates_the_cache() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    let a = pipeline.compile(true);
    pipeline.effect_mut(0).unwrap().set_probability(0.9);
    let b = pipeline.compile(true);
    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(pipeline.fingerprint(), {
        pipeline.effect_mut(0).unwrap().set_probability(0.5);
        pipeline.fingerprint()
    });
}

#[test]
fn changing_min_visibility_invalidates_the_cache() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    let a = pipeline.compile(true);
    pipeline.set_min_visibility(0.95);
    let b = pipeline.compile(true);
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn min_visibility_survives_a_round_trip() {
    let mut pipeline = Pipeline::new();
    pipeline.set_min_visibility(0.75);
    let restored = Pipeline::from_value(&pipeline.serialize()).unwrap();
    assert!((restored.min_visibility() - 0.75).abs() < 1e-9);
}

#[test]
fn overhanging_box_is_repaired_before_cropping() {
    let mut pipeline = Pipeline::new();
    let mut crop = create_default_effect("CenterCropEffect").unwrap();
    crop.set_probability(1.0);
    crop.set_params(json!({"scale": 0.99}).as_object().unwrap());
    pipeline.add_effect(crop);

    // Half the raw box hangs off the left edge; clipped first, it sits
    // fully inside the crop window and must survive.
    let frame = Frame::new(
        RgbImage::new(100, 100),
        vec![LabeledBox::new(0, BBox::new(-0.15, 0.5, 0.5, 0.2))],
    );
    let out = pipeline.run(&mut rng(), frame);
    assert_eq!(out.boxes.len(), 1);
    assert!((out.boxes[0].bbox.cx - 0.25).abs() < 0.05);
}

#[test]
fn disabled_effects_are_skipped_at_compile() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    pipeline.add_effect(flip());
    pipeline.effect_mut(1).unwrap().set_enabled(false);
    assert_eq!(pipeline.compile(false).len(), 1);
}

#[test]
fn disabled_pipeline_returns_frame_unchanged() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    pipeline.effect_mut(0).unwrap().set_probability(1.0);
    pipeline.set_enabled(false);
    let out = pipeline.run(&mut rng(), one_box_frame());
    assert!((out.boxes[0].bbox.cx - 0.2).abs() < 1e-9);
}

#[test]
fn certain_flip_moves_the_box() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    pipeline.effect_mut(0).unwrap().set_probability(1.0);
    let out = pipeline.run(&mut rng(), one_box_frame());
    assert!((out.boxes[0].bbox.cx - 0.8).abs() < 1e-9);
}

#[test]
fn zero_probability_step_never_fires() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    pipeline.effect_mut(0).unwrap().set_probability(0.0);
    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let out = pipeline.run(&mut rng, one_box_frame());
        assert!((out.boxes[0].bbox.cx - 0.2).abs() < 1e-9);
    }
}

struct ExplodingKernel;

impl TransformPrimitive for ExplodingKernel {
    fn apply(&self, _ctx: &mut ApplyCtx<'_>, _frame: Frame) -> AugResult<Frame> {
        Err(AugError::transform("boom"))
    }
}

struct ExplodingEffect {
    core: crate::effects::effect::EffectCore,
}

impl crate::effects::Effect for ExplodingEffect {
    fn meta(&self) -> crate::effects::EffectMeta {
        crate::effects::EffectMeta {
            tag: "ExplodingEffect",
            category: crate::effects::Category::Other,
            bbox_safe: true,
            description: "always fails",
        }
    }

    fn probability(&self) -> f64 {
        self.core.probability
    }

    fn set_probability(&mut self, p: f64) {
        self.core.probability = p.clamp(0.0, 1.0);
    }

    fn enabled(&self) -> bool {
        self.core.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.core.enabled = enabled;
    }

    fn param_specs(
        &self,
    ) -> std::collections::BTreeMap<&'static str, crate::foundation::param::ParamSpec> {
        std::collections::BTreeMap::new()
    }

    fn set_params(&mut self, _params: &serde_json::Map<String, Value>) {}

    fn build_transform(&self) -> crate::transform::BoxedTransform {
        Box::new(ExplodingKernel)
    }
}

#[test]
fn failing_step_returns_the_original_frame() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(Box::new(ExplodingEffect {
        core: crate::effects::effect::EffectCore {
            probability: 1.0,
            enabled: true,
        },
    }));
    let original = one_box_frame();
    let out = pipeline.run(&mut rng(), original.clone());
    assert_eq!(out.boxes, original.boxes);
    assert_eq!(out.image.dimensions(), original.image.dimensions());
}

#[test]
fn serialize_round_trips_through_from_value() {
    let mut pipeline = Pipeline::new();
    pipeline.set_augmentations_per_image(3);
    pipeline.add_effect(flip());
    let mut rotate = create_default_effect("RotateEffect").unwrap();
    rotate.set_probability(0.8);
    pipeline.add_effect(rotate);

    let value = pipeline.serialize();
    let restored = Pipeline::from_value(&value).unwrap();
    assert_eq!(restored.augmentations_per_image(), 3);
    assert_eq!(restored.effects().len(), 2);
    assert_eq!(restored.effects()[1].probability(), 0.8);
    assert_eq!(restored.serialize(), value);
}

#[test]
fn from_value_drops_unknown_effect_types() {
    let pipeline = Pipeline::from_value(&json!({
        "enabled": true,
        "augmentations_per_image": 2,
        "effects": [
            {"type": "HorizontalFlipEffect"},
            {"type": "NotARealEffect", "probability": 1.0},
        ],
    }))
    .unwrap();
    assert_eq!(pipeline.effects().len(), 1);
}

#[test]
fn from_value_clamps_copy_count_to_at_least_one() {
    let pipeline = Pipeline::from_value(&json!({"augmentations_per_image": 0})).unwrap();
    assert_eq!(pipeline.augmentations_per_image(), 1);
}

#[test]
fn move_and_remove_reorder_effects() {
    let mut pipeline = Pipeline::new();
    pipeline.add_effect(flip());
    pipeline.add_effect(create_default_effect("RotateEffect").unwrap());
    pipeline.move_effect(1, 0).unwrap();
    assert_eq!(pipeline.effects()[0].meta().tag, "RotateEffect");
    let removed = pipeline.remove_effect(1).unwrap();
    assert_eq!(removed.meta().tag, "HorizontalFlipEffect");
    assert!(pipeline.remove_effect(5).is_err());
    assert!(pipeline.move_effect(0, 3).is_err());
}
