use crate::kifu::KifError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Missing input file for {key}: {}", path.display())]
    MissingFile { key: String, path: PathBuf },

    #[error("Invalid KIF format: {source} {key}")]
    InvalidFormat {
        key: String,
        #[source]
        source: KifError,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid CMS URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl UploadError {
    /// True when the request never produced an HTTP response.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, UploadError::Network(_) | UploadError::InvalidUrl(_))
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
