#![forbid(unsafe_code)]

//! WhatsApp click-to-chat QR codes for server-rendered pages.
//!
//! The page embeds [`WhatsAppQrProps`] under `whatsappQrCodeProps` and reserves a canvas element
//! `whatsapp-qr-code`. [`render_whatsapp_qr`] reads the props, builds the `wa.me` link and renders
//! it as SVG or PNG.

pub mod error;
pub mod render;
pub mod whatsapp;

pub use error::{Error, Result};
pub use render::{
    MAX_MARGIN, MAX_WIDTH, QrFormat, QrMatrix, QrPreset, QrStyle, Rgba8, parse_ec_level,
};
pub use whatsapp::{
    WHATSAPP_LINK_BASE, WHATSAPP_QR_CANVAS_ID, WHATSAPP_QR_PROPS_ID, WhatsAppQrProps,
};

use pageprops_core::{Document, ReadOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    pub props_id: String,
    pub canvas_id: String,
    pub style: QrStyle,
    pub format: QrFormat,
    pub read: ReadOptions,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            props_id: WHATSAPP_QR_PROPS_ID.to_string(),
            canvas_id: WHATSAPP_QR_CANVAS_ID.to_string(),
            style: QrStyle::widget(),
            format: QrFormat::Svg,
            read: ReadOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQr {
    pub link: String,
    pub format: QrFormat,
    /// Side length in pixels.
    pub size: u32,
    pub bytes: Vec<u8>,
}

/// Renders the WhatsApp QR code for `document`.
///
/// Props failures are returned as errors. A page without the canvas element has nowhere to show
/// the code: that is logged and reported as `Ok(None)`.
pub fn render_whatsapp_qr<D: Document + ?Sized>(
    document: &D,
    options: &WidgetOptions,
) -> Result<Option<RenderedQr>> {
    let props = WhatsAppQrProps::read(document, &options.props_id, options.read)?;
    let link = props.link();
    tracing::debug!(
        phone_number = %props.phone_number,
        message = %props.message,
        link = %link,
        "read whatsapp qr props"
    );

    if !document.contains(&options.canvas_id) {
        tracing::error!(canvas_id = %options.canvas_id, "QR code canvas element not found");
        return Ok(None);
    }

    let matrix = QrMatrix::encode(&link, options.style.ec_level)?;
    let bytes = matrix.render(&options.style, options.format)?;
    Ok(Some(RenderedQr {
        size: matrix.image_size(&options.style)?,
        link,
        format: options.format,
        bytes,
    }))
}
