use std::path::PathBuf;

use crate::credentials::API_KEY_VAR;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("{} not found", API_KEY_VAR)]
    MissingCredential,

    #[error("unknown model '{name}'. Use 'gen models' to see available options.")]
    UnknownModel { name: String },

    #[error("model '{name}' does not support editing.")]
    EditUnsupported { name: String },

    /// `index` is 1-based.
    #[error("reading image {index} ({}): {source}", .path.display())]
    ImageRead {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No images returned")]
    EmptyResult,

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("image download failed ({status})")]
    Download { status: u16 },

    #[error("writing {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GenError>;
