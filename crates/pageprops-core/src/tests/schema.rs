use crate::*;
use serde_json::json;

#[test]
fn object_collects_every_issue_with_paths() {
    let shape = Shape::object([
        ("phoneNumber", Shape::String),
        ("message", Shape::String),
        (
            "tags",
            Shape::array(Shape::object([("name", Shape::String)])),
        ),
    ]);
    let err = shape
        .parse(json!({"phoneNumber": 15551234567u64, "tags": [{"name": "a"}, {"name": 1}]}))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "phoneNumber: Expected string, received number; message: Required; tags.1.name: Expected string, received number"
    );
    assert_eq!(err.issues.len(), 3);
}

#[test]
fn unknown_keys_policies() {
    let base = Shape::object([("a", Shape::Number)]);
    let input = json!({"a": 1, "b": 2});

    assert_eq!(base.parse(input.clone()).unwrap(), json!({"a": 1}));
    assert_eq!(
        base.clone().passthrough().parse(input.clone()).unwrap(),
        json!({"a": 1, "b": 2})
    );
    let err = base.strict().parse(input).unwrap_err();
    assert_eq!(err.to_string(), "Unrecognized key \"b\"");
}

#[test]
fn optional_and_nullable_fields() {
    let shape = Shape::object([
        ("phoneNumber", Shape::String),
        ("message", Shape::String.optional()),
        ("note", Shape::String.nullable()),
    ]);
    assert_eq!(
        shape
            .parse(json!({"phoneNumber": "1", "note": null}))
            .unwrap(),
        json!({"phoneNumber": "1", "note": null})
    );
    let err = shape.parse(json!({"phoneNumber": "1"})).unwrap_err();
    assert_eq!(err.to_string(), "note: Required");
}

#[test]
fn coercion_follows_javascript_conversions() {
    let number = Shape::Coerce {
        to: Primitive::Number,
    };
    assert_eq!(number.parse(json!("42")).unwrap(), json!(42));
    assert_eq!(number.parse(json!(" 2.5 ")).unwrap(), json!(2.5));
    assert_eq!(number.parse(json!(true)).unwrap(), json!(1));
    assert!(number.parse(json!("abc")).is_err());

    let string = Shape::Coerce {
        to: Primitive::String,
    };
    assert_eq!(string.parse(json!(15551234567u64)).unwrap(), json!("15551234567"));

    let boolean = Shape::Coerce {
        to: Primitive::Boolean,
    };
    assert_eq!(boolean.parse(json!("")).unwrap(), json!(false));
    assert_eq!(boolean.parse(json!("no")).unwrap(), json!(true));
    assert_eq!(boolean.parse(json!(0)).unwrap(), json!(false));
}

#[test]
fn literal_and_integer_shapes() {
    assert!(Shape::literal("v1").parse(json!("v1")).is_ok());
    assert_eq!(
        Shape::literal("v1").parse(json!("v2")).unwrap_err().to_string(),
        "Invalid literal value, expected \"v1\""
    );
    assert!(Shape::Integer.parse(json!(3)).is_ok());
    assert_eq!(
        Shape::Integer.parse(json!(3.5)).unwrap_err().to_string(),
        "Expected integer, received number"
    );
}

#[test]
fn shapes_load_from_json() {
    let shape: Shape = serde_json::from_value(json!({
        "type": "object",
        "unknownKeys": "strict",
        "fields": {
            "phoneNumber": {"type": "string"},
            "message": {"type": "optional", "inner": {"type": "string"}},
            "count": {"type": "coerce", "to": "number"}
        }
    }))
    .unwrap();

    assert_eq!(
        shape,
        Shape::object([
            ("phoneNumber", Shape::String),
            ("message", Shape::String.optional()),
            (
                "count",
                Shape::Coerce {
                    to: Primitive::Number
                }
            ),
        ])
        .strict()
    );
    assert_eq!(
        shape
            .parse(json!({"phoneNumber": "1", "count": "7"}))
            .unwrap(),
        json!({"phoneNumber": "1", "count": 7})
    );
}

#[test]
fn typed_schema_reports_serde_message() {
    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Props {
        width: u32,
    }

    let err = Typed::<Props>::new().parse(json!({"width": -1})).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert!(err.issues[0].path.is_empty());
    assert!(err.to_string().contains("-1"), "{err}");
}
