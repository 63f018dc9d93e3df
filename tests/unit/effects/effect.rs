use super::*;
use crate::effects::geometric::RotateEffect;

#[test]
fn serialize_effect_includes_envelope_and_params() {
    let effect = RotateEffect::default();
    let value = serialize_effect(&effect);
    let obj = value.as_object().unwrap();
    assert_eq!(obj["type"], "RotateEffect");
    assert_eq!(obj["probability"], 0.5);
    assert_eq!(obj["enabled"], true);
    assert_eq!(obj["limit"], 15);
    assert_eq!(obj["border_value"], 0);
}

#[test]
fn set_probability_clamps() {
    let mut effect = RotateEffect::default();
    effect.set_probability(1.7);
    assert_eq!(effect.probability(), 1.0);
    effect.set_probability(-0.3);
    assert_eq!(effect.probability(), 0.0);
}

#[test]
fn force_odd_bumps_even_values() {
    assert_eq!(force_odd(4), 5);
    assert_eq!(force_odd(5), 5);
    assert_eq!(force_odd(0), 1);
}

#[test]
fn ordered_swaps_inverted_pairs() {
    assert_eq!(ordered(0.9, 0.3), (0.3, 0.9));
    assert_eq!(ordered(0.3, 0.9), (0.3, 0.9));
}

#[test]
fn param_i64_truncates_float_json() {
    let mut params = Map::new();
    params.insert("k".to_owned(), Value::from(6.8));
    assert_eq!(param_i64(&params, "k"), Some(6));
    assert_eq!(param_i64(&params, "missing"), None);
}

#[test]
fn param_f64_rejects_non_finite() {
    let mut params = Map::new();
    params.insert("x".to_owned(), Value::from(1.25));
    assert_eq!(param_f64(&params, "x"), Some(1.25));
    params.insert("s".to_owned(), Value::from("nope"));
    assert_eq!(param_f64(&params, "s"), None);
}
