use crate::*;
use serde_json::json;

#[test]
fn defaults_describe_stock_behaviour() {
    let config = SiteConfig::defaults();
    assert_eq!(config.read_options().unwrap(), ReadOptions::default());
    assert_eq!(config.swap_policy().unwrap(), SwapPolicy::default());
    assert_eq!(config.get_u64("qr.widget.width"), Some(256));
    assert_eq!(config.get_u64("qr.signup.margin"), Some(2));
}

#[test]
fn overrides_merge_over_defaults() {
    let config = SiteConfig::from_json_str(
        r#"{"read": {"missingElement": "fail"}, "swap": {"statuses": [400]}, "qr": {"widget": {"width": 512}}}"#,
    )
    .unwrap();
    assert_eq!(config.read_options().unwrap(), ReadOptions::strict());
    assert_eq!(config.swap_policy().unwrap(), SwapPolicy::new([400]));
    assert_eq!(config.get_u64("qr.widget.width"), Some(512));
    assert_eq!(config.get_u64("qr.widget.margin"), Some(4));
    assert_eq!(config.get_str("qr.widget.dark"), Some("#000000"));
}

#[test]
fn invalid_configs_are_rejected() {
    for text in [
        "[]",
        "{not json",
        r#"{"read": {"missingElement": "ignore"}}"#,
        r#"{"swap": {"statuses": [99999]}}"#,
        r#"{"swap": {"statuses": "422"}}"#,
    ] {
        let err = SiteConfig::from_json_str(text).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }), "{text}: {err}");
    }
}

#[test]
fn set_value_creates_intermediate_objects() {
    let mut config = SiteConfig::empty_object();
    config.set_value("qr.widget.width", json!(128));
    assert_eq!(config.as_value(), &json!({"qr": {"widget": {"width": 128}}}));
    assert_eq!(config.qr_preset("widget").and_then(|p| p.get("width")), Some(&json!(128)));
    assert!(config.qr_preset("signup").is_none());
}
