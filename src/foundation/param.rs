//! Parameter specifications for effect configuration.
//!
//! Every tunable knob on an effect is described by a [`ParamSpec`]: its
//! current value, type, optional bounds, optional slider step, and a
//! human-readable description. Specs are pure value descriptions: the
//! effect owns the actual field, and `param_specs()` reflects it.

use serde::{Deserialize, Serialize};

/// The type of an effect parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Whole-number parameter (kernel sizes, shift limits).
    Int,
    /// Real-valued parameter (scales, coefficients).
    Float,
    /// On/off switch.
    Bool,
    /// Free-form text.
    Str,
}

/// A typed parameter value.
///
/// Serializes untagged, so JSON round trips as plain scalars
/// (`7`, `0.5`, `true`, `"jpeg"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl ParamValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }

    /// Integer view of the value, truncating floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(v.trunc() as i64),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }

    /// Convert into a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Value::from(*v),
            Self::Str(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Specification of a single tunable effect parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Current value of the parameter.
    pub value: ParamValue,
    /// Lower bound, if constrained.
    pub min: Option<f64>,
    /// Upper bound, if constrained.
    pub max: Option<f64>,
    /// Parameter type.
    pub kind: ParamKind,
    /// Step size for UI sliders, if meaningful.
    pub step: Option<f64>,
    /// Human-readable description.
    pub description: String,
}

impl ParamSpec {
    /// Spec for an integer parameter with inclusive bounds.
    pub fn int(value: i64, min: i64, max: i64, step: f64, description: &str) -> Self {
        Self {
            value: ParamValue::Int(value),
            min: Some(min as f64),
            max: Some(max as f64),
            kind: ParamKind::Int,
            step: Some(step),
            description: description.to_owned(),
        }
    }

    /// Spec for a float parameter with inclusive bounds.
    pub fn float(value: f64, min: f64, max: f64, step: f64, description: &str) -> Self {
        Self {
            value: ParamValue::Float(value),
            min: Some(min),
            max: Some(max),
            kind: ParamKind::Float,
            step: Some(step),
            description: description.to_owned(),
        }
    }

    /// True iff `value` is acceptable without clamping.
    ///
    /// Non-numeric kinds always validate; numeric kinds fail only when a
    /// present bound is violated.
    pub fn validate(&self, value: &ParamValue) -> bool {
        if !matches!(self.kind, ParamKind::Int | ParamKind::Float) {
            return true;
        }
        let Some(v) = value.as_f64() else {
            return true;
        };
        if let Some(min) = self.min
            && v < min
        {
            return false;
        }
        if let Some(max) = self.max
            && v > max
        {
            return false;
        }
        true
    }

    /// Clip `value` into `[min, max]` and coerce it to this spec's kind.
    ///
    /// Idempotent: `clamp(clamp(v)) == clamp(v)`. Non-numeric kinds and
    /// non-numeric values pass through unchanged.
    pub fn clamp(&self, value: ParamValue) -> ParamValue {
        if !matches!(self.kind, ParamKind::Int | ParamKind::Float) {
            return value;
        }
        let Some(mut v) = value.as_f64() else {
            return value;
        };
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        match self.kind {
            ParamKind::Int => ParamValue::Int(v.trunc() as i64),
            _ => ParamValue::Float(v),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/param.rs"]
mod tests;
