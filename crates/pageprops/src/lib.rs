#![forbid(unsafe_code)]

//! `pageprops` reads the JSON props a server embeds in its HTML pages.
//!
//! # Features
//!
//! - `qr`: WhatsApp QR code widget (`pageprops::qr`), rendered to SVG or PNG

pub use pageprops_core::*;

#[cfg(feature = "qr")]
pub mod qr {
    pub use pageprops_qr::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn facade_reads_embedded_props() {
        let tag = embed_props("settingsProps", &json!({"theme": "dark"})).unwrap();
        let value = read_props_from_html(&format!("<body>{tag}</body>"), "settingsProps").unwrap();
        assert_eq!(value, json!({"theme": "dark"}));
    }

    #[cfg(feature = "qr")]
    #[test]
    fn facade_exposes_qr_widget() {
        let props = qr::WhatsAppQrProps::new("15551234567", "Hi");
        assert_eq!(props.link(), "http://wa.me/15551234567?text=Hi");
    }
}
