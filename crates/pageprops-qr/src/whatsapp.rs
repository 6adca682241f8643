use pageprops_core::{Document, PropertyReadError, PropsReader, ReadOptions};
use serde::{Deserialize, Serialize};

pub const WHATSAPP_QR_PROPS_ID: &str = "whatsappQrCodeProps";
pub const WHATSAPP_QR_CANVAS_ID: &str = "whatsapp-qr-code";
pub const WHATSAPP_LINK_BASE: &str = "http://wa.me/";

/// Props the server embeds next to a WhatsApp QR code canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppQrProps {
    pub phone_number: String,
    /// Pre-filled chat text; empty means the chat opens without one.
    #[serde(default)]
    pub message: String,
}

impl WhatsAppQrProps {
    pub fn new(phone_number: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            message: message.into(),
        }
    }

    pub fn read<D: Document + ?Sized>(
        document: &D,
        props_id: &str,
        options: ReadOptions,
    ) -> Result<Self, PropertyReadError> {
        PropsReader::with_options(document, options).typed(props_id)
    }

    /// Click-to-chat link encoded into the QR code.
    pub fn link(&self) -> String {
        let mut link = format!("{WHATSAPP_LINK_BASE}{}", self.phone_number);
        if !self.message.is_empty() {
            link.push_str("?text=");
            link.push_str(&urlencoding::encode(&self.message));
        }
        link
    }
}
