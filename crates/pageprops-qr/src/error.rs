use pageprops_core::PropertyReadError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Props(#[from] PropertyReadError),

    #[error("Invalid QR content: {message}")]
    Encode { message: String },

    #[error("Failed to encode QR image: {message}")]
    Image { message: String },

    #[error("Invalid colour `{value}` (expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA)")]
    InvalidColor { value: String },

    #[error("Invalid QR style: {message}")]
    InvalidStyle { message: String },
}
