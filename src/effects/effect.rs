//! The effect contract: metadata, typed parameters, transform building.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::foundation::param::ParamSpec;
use crate::transform::BoxedTransform;

/// Category an effect belongs to, for UI grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Category {
    /// Color and exposure adjustments.
    Color,
    /// Rigid geometric transforms (flips, rotations).
    Geometric,
    /// Crops and spatial rearrangement.
    Spatial,
    /// Sensor and compression noise.
    Noise,
    /// Blurring and sharpening.
    Blur,
    /// Environmental effects (rain, fog, flare).
    Weather,
    /// Advanced geometric distortions.
    Advanced,
    /// Anything else.
    Other,
}

/// Static metadata describing an effect variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectMeta {
    /// Stable serialization tag (also the display name).
    pub tag: &'static str,
    /// UI grouping category.
    pub category: Category,
    /// False when the transform may shrink or destroy boxes
    /// (informational only; runtime behavior is unchanged).
    pub bbox_safe: bool,
    /// One-line description of what the effect does.
    pub description: &'static str,
}

/// A polymorphic unit of transformation.
///
/// Every variant owns its typed parameter fields, reflects them through
/// [`param_specs`](Effect::param_specs), accepts updates through
/// [`set_params`](Effect::set_params) (infallible: unknown keys are
/// ignored, out-of-range values clamped, legality fix-ups applied), and
/// builds its kernel with [`build_transform`](Effect::build_transform).
pub trait Effect: Send + Sync {
    /// Static metadata for this variant.
    fn meta(&self) -> EffectMeta;

    /// Per-application chance that the compiled pipeline executes this
    /// effect.
    fn probability(&self) -> f64;

    /// Set the application probability (clamped into `[0, 1]`).
    fn set_probability(&mut self, p: f64);

    /// Whether this effect participates in compilation at all.
    fn enabled(&self) -> bool;

    /// Enable or disable this effect.
    fn set_enabled(&mut self, enabled: bool);

    /// Current parameters as specs; empty for parameterless effects.
    fn param_specs(&self) -> BTreeMap<&'static str, ParamSpec>;

    /// Update parameters from a serialized map. Only keys present in the
    /// input are touched.
    fn set_params(&mut self, params: &Map<String, Value>);

    /// Build the transform kernel for the current parameter values,
    /// applying any variant-specific legality fix-ups first.
    fn build_transform(&self) -> BoxedTransform;
}

/// Serialize an effect to its wire form:
/// `{ "type": tag, "probability": p, "enabled": b, <parameters...> }`.
pub fn serialize_effect(effect: &dyn Effect) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_owned(), Value::from(effect.meta().tag));
    obj.insert("probability".to_owned(), Value::from(effect.probability()));
    obj.insert("enabled".to_owned(), Value::from(effect.enabled()));
    for (name, spec) in effect.param_specs() {
        obj.insert(name.to_owned(), spec.value.to_json());
    }
    Value::Object(obj)
}

/// Common probability/enabled state embedded in every variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectCore {
    /// Application probability in `[0, 1]`.
    pub probability: f64,
    /// Participation flag.
    pub enabled: bool,
}

impl Default for EffectCore {
    fn default() -> Self {
        Self {
            probability: 0.5,
            enabled: true,
        }
    }
}

/// Read a float parameter, tolerating integer JSON values.
pub(crate) fn param_f64(params: &Map<String, Value>, key: &str) -> Option<f64> {
    params.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// Read an integer parameter, truncating float JSON values.
pub(crate) fn param_i64(params: &Map<String, Value>, key: &str) -> Option<i64> {
    let v = params.get(key)?;
    v.as_i64()
        .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Force a kernel-size parameter odd by incrementing even values.
pub(crate) fn force_odd(v: i64) -> i64 {
    if v % 2 == 0 { v + 1 } else { v }
}

/// Restore `min <= max` by swapping when violated.
pub(crate) fn ordered(min: f64, max: f64) -> (f64, f64) {
    if min > max { (max, min) } else { (min, max) }
}

/// Implements the probability/enabled accessors from an `core` field.
macro_rules! impl_effect_core {
    () => {
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
    };
}

pub(crate) use impl_effect_core;

#[cfg(test)]
#[path = "../../tests/unit/effects/effect.rs"]
mod tests;
