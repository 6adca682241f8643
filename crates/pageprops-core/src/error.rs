use crate::schema::SchemaError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Props(#[from] PropertyReadError),

    #[error("Failed to parse HTML document: {message}")]
    Markup { message: String },

    #[error("Invalid site config: {message}")]
    InvalidConfig { message: String },
}

/// Failure to read a props blob embedded in the page.
///
/// Every variant carries the property identifier so callers (and logs) can tell which widget lost
/// its data.
#[derive(Debug, thiserror::Error)]
pub enum PropertyReadError {
    #[error("Failed to get json for propsId={props_id}: {source}")]
    InvalidJson {
        props_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Props rejected by schema for propsId={props_id}: {source}")]
    SchemaRejected {
        props_id: String,
        #[source]
        source: SchemaError,
    },

    #[error("No element found for propsId={props_id}")]
    MissingElement { props_id: String },
}

impl PropertyReadError {
    pub fn props_id(&self) -> &str {
        match self {
            Self::InvalidJson { props_id, .. }
            | Self::SchemaRejected { props_id, .. }
            | Self::MissingElement { props_id } => props_id,
        }
    }
}
