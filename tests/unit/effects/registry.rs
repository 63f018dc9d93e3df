use super::*;
use serde_json::json;

use crate::effects::geometric::HorizontalFlipEffect;
use crate::foundation::error::AugError;

#[test]
fn builtins_are_registered() {
    let reg = EffectRegistry::with_builtins();
    let tags = reg.tags();
    assert!(tags.iter().any(|t| t == "HorizontalFlipEffect"));
    assert!(tags.iter().any(|t| t == "GaussianBlurEffect"));
    assert!(tags.iter().any(|t| t == "RandomCropEffect"));
    assert!(tags.iter().any(|t| t == "BrightnessEffect"));
    assert!(tags.iter().any(|t| t == "ContrastEffect"));
    assert!(tags.iter().any(|t| t == "UnsharpMaskEffect"));
    let sorted = {
        let mut s = tags.clone();
        s.sort();
        s
    };
    assert_eq!(tags, sorted);
}

#[test]
fn create_returns_default_instance() {
    let reg = EffectRegistry::with_builtins();
    let effect = reg.create("HorizontalFlipEffect").unwrap();
    assert_eq!(effect.meta().tag, "HorizontalFlipEffect");
    assert_eq!(effect.probability(), 0.5);
    assert!(effect.enabled());
    assert!(reg.create("NoSuchEffect").is_none());
}

#[test]
fn create_from_value_applies_envelope_and_params() {
    let reg = EffectRegistry::with_builtins();
    let effect = reg
        .create_from_value(&json!({
            "type": "RotateEffect",
            "probability": 0.9,
            "enabled": false,
            "limit": 30,
        }))
        .unwrap();
    assert_eq!(effect.probability(), 0.9);
    assert!(!effect.enabled());
    let specs = effect.param_specs();
    assert_eq!(specs["limit"].value.as_i64(), Some(30));
}

#[test]
fn create_from_value_defaults_missing_envelope() {
    let reg = EffectRegistry::with_builtins();
    let effect = reg
        .create_from_value(&json!({"type": "VerticalFlipEffect"}))
        .unwrap();
    assert_eq!(effect.probability(), 0.5);
    assert!(effect.enabled());
}

#[test]
fn create_from_value_rejects_malformed_input() {
    let reg = EffectRegistry::with_builtins();
    assert!(reg.create_from_value(&json!("RotateEffect")).is_none());
    assert!(reg.create_from_value(&json!({"probability": 0.5})).is_none());
    assert!(reg.create_from_value(&json!({"type": "Unknown"})).is_none());
}

struct StubProvider;

impl EffectProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn factories(&self) -> AugResult<Vec<EffectFactory>> {
        Ok(vec![EffectFactory {
            tag: "StubFlipEffect",
            ctor: || Box::new(HorizontalFlipEffect::default()),
        }])
    }
}

struct FailingProvider;

impl EffectProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn factories(&self) -> AugResult<Vec<EffectFactory>> {
        Err(AugError::registry("provider exploded"))
    }
}

#[test]
fn providers_extend_the_registry() {
    let mut reg = EffectRegistry::with_builtins();
    reg.add_provider(Arc::new(StubProvider));
    assert!(reg.create("StubFlipEffect").is_some());
}

#[test]
fn refresh_is_idempotent_and_keeps_provider_tags() {
    let mut reg = EffectRegistry::with_builtins();
    reg.add_provider(Arc::new(StubProvider));
    let before = reg.tags();
    reg.refresh();
    reg.refresh();
    assert_eq!(reg.tags(), before);
}

#[test]
fn failing_provider_does_not_poison_the_rest() {
    let mut reg = EffectRegistry::with_builtins();
    reg.add_provider(Arc::new(FailingProvider));
    reg.add_provider(Arc::new(StubProvider));
    reg.refresh();
    assert!(reg.create("StubFlipEffect").is_some());
    assert!(reg.create("HorizontalFlipEffect").is_some());
}
