use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocidentError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("invalid arXiv ID: {0}")]
    InvalidArxivId(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    Api(String, String),

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("cannot read document {path}: {reason}")]
    Document { path: PathBuf, reason: String },

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("metadata write failed for {path}: {reason}")]
    MetadataWrite { path: PathBuf, reason: String },

    #[error("unknown finder method: {0}")]
    UnknownFinder(String),

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("invalid value for setting {name}: {reason}")]
    InvalidSetting { name: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocidentError>;
