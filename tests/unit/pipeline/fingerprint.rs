use super::*;
use serde_json::json;

#[test]
fn fingerprint_is_deterministic() {
    let v = json!({"effects": [{"type": "RotateEffect", "limit": 15}], "enabled": true});
    assert_eq!(fingerprint_value(&v), fingerprint_value(&v));
}

#[test]
fn fingerprint_ignores_key_order() {
    let a = json!({"enabled": true, "augmentations_per_image": 5});
    let b = json!({"augmentations_per_image": 5, "enabled": true});
    assert_eq!(fingerprint_value(&a), fingerprint_value(&b));
}

#[test]
fn fingerprint_changes_when_content_changes() {
    let a = json!({"effects": [{"type": "RotateEffect", "limit": 15}]});
    let b = json!({"effects": [{"type": "RotateEffect", "limit": 30}]});
    assert_ne!(fingerprint_value(&a), fingerprint_value(&b));
}

#[test]
fn fingerprint_distinguishes_scalar_types() {
    assert_ne!(fingerprint_value(&json!(1)), fingerprint_value(&json!("1")));
    assert_ne!(fingerprint_value(&json!(true)), fingerprint_value(&json!(1)));
    assert_ne!(fingerprint_value(&json!(null)), fingerprint_value(&json!(0)));
}

#[test]
fn fingerprint_is_order_sensitive_for_arrays() {
    let a = json!(["x", "y"]);
    let b = json!(["y", "x"]);
    assert_ne!(fingerprint_value(&a), fingerprint_value(&b));
}
