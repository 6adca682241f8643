//! Props embedded by the server as JSON text inside id-addressed elements.

use crate::document::Document;
use crate::error::PropertyReadError;
use crate::schema::{Schema, Typed};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Text used when the props element is absent.
pub const EMPTY_PROPS: &str = "{}";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingElement {
    /// Read the props as if the element contained `{}`.
    #[default]
    EmptyObject,
    /// Report [`PropertyReadError::MissingElement`].
    Fail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub missing: MissingElement,
}

impl ReadOptions {
    pub fn strict() -> Self {
        Self {
            missing: MissingElement::Fail,
        }
    }
}

/// Reads props blobs out of a [`Document`].
///
/// Every failure is logged with the offending props id before it is returned; nothing is
/// substituted on error.
#[derive(Debug)]
pub struct PropsReader<'d, D: ?Sized> {
    document: &'d D,
    options: ReadOptions,
}

impl<'d, D: Document + ?Sized> PropsReader<'d, D> {
    pub fn new(document: &'d D) -> Self {
        Self::with_options(document, ReadOptions::default())
    }

    pub fn with_options(document: &'d D, options: ReadOptions) -> Self {
        Self { document, options }
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    /// Parsed props without any validation.
    pub fn raw(&self, props_id: &str) -> Result<Value, PropertyReadError> {
        self.load(props_id).map_err(report)
    }

    /// Parsed props run through `schema`.
    pub fn parse<S: Schema + ?Sized>(
        &self,
        props_id: &str,
        schema: &S,
    ) -> Result<S::Output, PropertyReadError> {
        let value = self.load(props_id).map_err(report)?;
        schema
            .parse(value)
            .map_err(|source| {
                report(PropertyReadError::SchemaRejected {
                    props_id: props_id.to_string(),
                    source,
                })
            })
    }

    pub fn typed<T: DeserializeOwned>(&self, props_id: &str) -> Result<T, PropertyReadError> {
        self.parse(props_id, &Typed::<T>::new())
    }

    fn load(&self, props_id: &str) -> Result<Value, PropertyReadError> {
        let text = match self.document.text_content(props_id) {
            Some(text) => text,
            None => match self.options.missing {
                MissingElement::EmptyObject => EMPTY_PROPS.into(),
                MissingElement::Fail => {
                    return Err(PropertyReadError::MissingElement {
                        props_id: props_id.to_string(),
                    });
                }
            },
        };

        serde_json::from_str(&text).map_err(|source| PropertyReadError::InvalidJson {
            props_id: props_id.to_string(),
            source,
        })
    }
}

fn report(err: PropertyReadError) -> PropertyReadError {
    tracing::error!(props_id = err.props_id(), error = %err, "failed to get json for props");
    err
}

/// Reads props with an optional schema.
///
/// With a schema the schema's output is returned. Without one the parsed JSON is converted to the
/// declared `T`; for `T = serde_json::Value` that is the parsed value itself.
pub fn get_server_props<T, S>(
    document: &(impl Document + ?Sized),
    props_id: &str,
    schema: Option<&S>,
) -> Result<T, PropertyReadError>
where
    T: DeserializeOwned,
    S: Schema<Output = T> + ?Sized,
{
    let reader = PropsReader::new(document);
    match schema {
        Some(schema) => reader.parse(props_id, schema),
        None => reader.typed(props_id),
    }
}

/// Renders `value` as a props element that [`PropsReader`] can read back.
///
/// The JSON is escaped so that no character sequence in it can terminate the surrounding
/// `<script>` element or be mistaken for markup.
pub fn embed_props(props_id: &str, value: &impl Serialize) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(format!(
        "<script id=\"{}\" type=\"application/json\">{}</script>",
        htmlize::escape_attribute(props_id),
        escape_script_json(&json)
    ))
}

fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}
