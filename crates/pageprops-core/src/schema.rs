//! Validation and coercion of parsed props.
//!
//! A [`Schema`] turns a parsed JSON value into the caller's output type or explains, issue by
//! issue, why it could not. [`Typed`] delegates to serde; [`Shape`] is a small declarative schema
//! that can itself be loaded from JSON.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::marker::PhantomData;

pub trait Schema {
    type Output;

    fn parse(&self, value: Value) -> Result<Self::Output, SchemaError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    /// Dotted path to the offending value (`""` for the root, `items.0.name` for nested values).
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

impl SchemaError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![SchemaIssue {
                path: path.into(),
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            if issue.path.is_empty() {
                f.write_str(&issue.message)?;
            } else {
                write!(f, "{}: {}", issue.path, issue.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Serde-backed schema: the output type itself describes the expected shape.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T> Typed<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> Schema for Typed<T> {
    type Output = T;

    fn parse(&self, value: Value) -> Result<T, SchemaError> {
        serde_json::from_value(value).map_err(|err| SchemaError::single("", err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownKeys {
    /// Drop keys that are not declared.
    #[default]
    Strip,
    /// Keep undeclared keys untouched.
    Passthrough,
    /// Reject undeclared keys.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

/// Declarative schema, deserializable from JSON such as
/// `{"type":"object","fields":{"phoneNumber":{"type":"string"}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Literal {
        value: Value,
    },
    Array {
        items: Box<Shape>,
    },
    Object {
        fields: IndexMap<String, Shape>,
        #[serde(default, rename = "unknownKeys")]
        unknown_keys: UnknownKeys,
    },
    Optional {
        inner: Box<Shape>,
    },
    Nullable {
        inner: Box<Shape>,
    },
    Coerce {
        to: Primitive,
    },
}

impl Shape {
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Shape)>,
    {
        Self::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            unknown_keys: UnknownKeys::Strip,
        }
    }

    pub fn array(items: Shape) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn optional(self) -> Self {
        Self::Optional {
            inner: Box::new(self),
        }
    }

    pub fn nullable(self) -> Self {
        Self::Nullable {
            inner: Box::new(self),
        }
    }

    /// Object shapes only; other shapes are returned unchanged.
    pub fn unknown_keys(self, policy: UnknownKeys) -> Self {
        match self {
            Self::Object { fields, .. } => Self::Object {
                fields,
                unknown_keys: policy,
            },
            other => other,
        }
    }

    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Strict)
    }

    pub fn passthrough(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough)
    }

    fn accepts_missing(&self) -> bool {
        matches!(self, Self::Optional { .. } | Self::Any)
    }

    fn check(&self, value: Value, path: &str, issues: &mut Vec<SchemaIssue>) -> Option<Value> {
        match self {
            Self::Any => Some(value),
            Self::String => check_kind(value.is_string(), value, "string", path, issues),
            Self::Number => check_kind(value.is_number(), value, "number", path, issues),
            Self::Integer => {
                let ok = value.is_i64() || value.is_u64();
                check_kind(ok, value, "integer", path, issues)
            }
            Self::Boolean => check_kind(value.is_boolean(), value, "boolean", path, issues),
            Self::Null => check_kind(value.is_null(), value, "null", path, issues),
            Self::Literal { value: expected } => {
                if &value == expected {
                    Some(value)
                } else {
                    issues.push(issue(
                        path,
                        format!("Invalid literal value, expected {expected}"),
                    ));
                    None
                }
            }
            Self::Array { items } => {
                let values = match value {
                    Value::Array(values) => values,
                    other => {
                        issues.push(type_issue(path, "array", &other));
                        return None;
                    }
                };
                let before = issues.len();
                let mut out = Vec::with_capacity(values.len());
                for (i, item) in values.into_iter().enumerate() {
                    if let Some(v) = items.check(item, &join_path(path, &i.to_string()), issues) {
                        out.push(v);
                    }
                }
                (issues.len() == before).then_some(Value::Array(out))
            }
            Self::Object {
                fields,
                unknown_keys,
            } => {
                let mut map = match value {
                    Value::Object(map) => map,
                    other => {
                        issues.push(type_issue(path, "object", &other));
                        return None;
                    }
                };
                let before = issues.len();
                let mut out = Map::new();
                for (key, field) in fields {
                    let field_path = join_path(path, key);
                    match map.shift_remove(key) {
                        Some(v) => {
                            if let Some(v) = field.check(v, &field_path, issues) {
                                out.insert(key.clone(), v);
                            }
                        }
                        None if field.accepts_missing() => {}
                        None => issues.push(issue(&field_path, "Required")),
                    }
                }
                match unknown_keys {
                    UnknownKeys::Strip => {}
                    UnknownKeys::Passthrough => out.extend(map),
                    UnknownKeys::Strict => {
                        for key in map.keys() {
                            issues.push(issue(path, format!("Unrecognized key \"{key}\"")));
                        }
                    }
                }
                (issues.len() == before).then_some(Value::Object(out))
            }
            Self::Optional { inner } => inner.check(value, path, issues),
            Self::Nullable { inner } => {
                if value.is_null() {
                    Some(value)
                } else {
                    inner.check(value, path, issues)
                }
            }
            Self::Coerce { to } => match coerce(*to, value) {
                Ok(v) => Some(v),
                Err(message) => {
                    issues.push(issue(path, message));
                    None
                }
            },
        }
    }
}

impl Schema for Shape {
    type Output = Value;

    fn parse(&self, value: Value) -> Result<Value, SchemaError> {
        let mut issues = Vec::new();
        match self.check(value, "", &mut issues) {
            Some(v) if issues.is_empty() => Ok(v),
            _ => Err(SchemaError { issues }),
        }
    }
}

fn issue(path: &str, message: impl Into<String>) -> SchemaIssue {
    SchemaIssue {
        path: path.to_string(),
        message: message.into(),
    }
}

fn type_issue(path: &str, expected: &str, received: &Value) -> SchemaIssue {
    issue(
        path,
        format!("Expected {expected}, received {}", value_kind(received)),
    )
}

fn check_kind(
    ok: bool,
    value: Value,
    expected: &str,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<Value> {
    if ok {
        Some(value)
    } else {
        issues.push(type_issue(path, expected, &value));
        None
    }
}

fn join_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}.{segment}")
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce(to: Primitive, value: Value) -> Result<Value, String> {
    match to {
        Primitive::String => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Null => Ok(Value::String("null".to_string())),
            other => Err(format!("Expected string, received {}", value_kind(&other))),
        },
        Primitive::Number => {
            let parsed = match &value {
                Value::Number(_) => return Ok(value),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                Value::Null => Some(0.0),
                Value::String(s) if s.trim().is_empty() => Some(0.0),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .and_then(number_value)
                .ok_or_else(|| "Expected number, received nan".to_string())
        }
        Primitive::Boolean => {
            let truthy = match &value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            };
            Ok(Value::Bool(truthy))
        }
    }
}

/// Integral floats stay integers so `"42"` coerces to `42`, not `42.0`.
fn number_value(f: f64) -> Option<Value> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::Number(Number::from(f as i64)));
    }
    Number::from_f64(f).map(Value::Number)
}
