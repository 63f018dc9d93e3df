use super::*;

#[test]
fn int_spec_reflects_bounds() {
    let spec = ParamSpec::int(7, 3, 21, 2.0, "kernel size");
    assert_eq!(spec.value, ParamValue::Int(7));
    assert_eq!(spec.min, Some(3.0));
    assert_eq!(spec.max, Some(21.0));
    assert_eq!(spec.kind, ParamKind::Int);
}

#[test]
fn validate_accepts_in_range_and_rejects_out_of_range() {
    let spec = ParamSpec::float(0.5, 0.0, 1.0, 0.05, "alpha");
    assert!(spec.validate(&ParamValue::Float(0.0)));
    assert!(spec.validate(&ParamValue::Float(1.0)));
    assert!(!spec.validate(&ParamValue::Float(1.01)));
    assert!(!spec.validate(&ParamValue::Float(-0.01)));
    assert!(!spec.validate(&ParamValue::Int(2)));
}

#[test]
fn validate_passes_non_numeric_values_through() {
    let spec = ParamSpec::float(0.5, 0.0, 1.0, 0.05, "alpha");
    assert!(spec.validate(&ParamValue::Str("x".to_owned())));
    assert!(spec.validate(&ParamValue::Bool(true)));
}

#[test]
fn clamp_clips_into_bounds() {
    let spec = ParamSpec::float(0.5, 0.0, 1.0, 0.05, "alpha");
    assert_eq!(spec.clamp(ParamValue::Float(1.7)), ParamValue::Float(1.0));
    assert_eq!(spec.clamp(ParamValue::Float(-0.2)), ParamValue::Float(0.0));
    assert_eq!(spec.clamp(ParamValue::Float(0.25)), ParamValue::Float(0.25));
}

#[test]
fn clamp_is_idempotent() {
    let spec = ParamSpec::int(7, 3, 21, 2.0, "kernel size");
    for raw in [-10_i64, 0, 3, 7, 22, 100] {
        let once = spec.clamp(ParamValue::Int(raw));
        let twice = spec.clamp(once.clone());
        assert_eq!(once, twice);
    }
}

#[test]
fn clamp_coerces_floats_for_int_specs() {
    let spec = ParamSpec::int(7, 3, 21, 2.0, "kernel size");
    assert_eq!(spec.clamp(ParamValue::Float(5.9)), ParamValue::Int(5));
    assert_eq!(spec.clamp(ParamValue::Float(100.0)), ParamValue::Int(21));
}

#[test]
fn param_value_json_round_trip_is_untagged() {
    assert_eq!(ParamValue::Int(7).to_json(), serde_json::json!(7));
    assert_eq!(ParamValue::Float(0.5).to_json(), serde_json::json!(0.5));
    assert_eq!(ParamValue::Bool(true).to_json(), serde_json::json!(true));

    let v: ParamValue = serde_json::from_value(serde_json::json!(7)).unwrap();
    assert_eq!(v, ParamValue::Int(7));
    let v: ParamValue = serde_json::from_value(serde_json::json!(0.5)).unwrap();
    assert_eq!(v, ParamValue::Float(0.5));
}

#[test]
fn as_i64_truncates_floats() {
    assert_eq!(ParamValue::Float(3.9).as_i64(), Some(3));
    assert_eq!(ParamValue::Str("x".to_owned()).as_i64(), None);
}
