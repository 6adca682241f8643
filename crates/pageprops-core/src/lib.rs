#![forbid(unsafe_code)]

//! Typed access to JSON props embedded in server-rendered HTML (headless).
//!
//! Server-rendered pages hand data to their scripts by placing JSON text inside an element
//! addressed by id, usually a `<script type="application/json">`. This crate reads those blobs
//! back, optionally validating them against a [`Schema`], and hosts the small pieces of page
//! behaviour that go with them (htmx swap policy, site config).
//!
//! ```no_run
//! use pageprops_core::{HtmlDocument, PropsReader};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct QrProps {
//!     phone_number: String,
//!     message: String,
//! }
//!
//! let html = r#"<script id="whatsappQrCodeProps" type="application/json">
//!   {"phoneNumber":"15551234567","message":"Hi"}
//! </script>"#;
//! let document = HtmlDocument::parse(html)?;
//! let props: QrProps = PropsReader::new(&document).typed("whatsappQrCodeProps")?;
//! assert_eq!(props.phone_number, "15551234567");
//! # Ok::<(), pageprops_core::Error>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod props;
pub mod schema;
pub mod swap;

pub use config::SiteConfig;
pub use document::{Document, HtmlDocument, StaticDocument};
pub use error::{Error, PropertyReadError, Result};
pub use props::{
    EMPTY_PROPS, MissingElement, PropsReader, ReadOptions, embed_props, get_server_props,
};
pub use schema::{Primitive, Schema, SchemaError, SchemaIssue, Shape, Typed, UnknownKeys};
pub use swap::{BeforeSwapDetail, DEFAULT_SWAP_STATUSES, SwapPolicy};

/// Parses `html` and reads the props blob `props_id` without a schema.
pub fn read_props_from_html(html: &str, props_id: &str) -> Result<serde_json::Value> {
    let document = HtmlDocument::parse(html)?;
    Ok(PropsReader::new(&document).raw(props_id)?)
}

#[cfg(test)]
mod tests;
