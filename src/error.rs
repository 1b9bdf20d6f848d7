//! Error types for the boundary collaborators (fetching, discovery, parsing).
//!
//! The processing pipeline itself never fails: it records diagnostics in a
//! [`Logger`](crate::Logger). These errors only surface from the I/O edge.

use thiserror::Error;

/// Errors that can occur while fetching or discovering a manifest.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Unexpected content type for {url}: {content_type}")]
    ContentType { url: String, content_type: String },

    #[error("No link to a publication manifest in {0}")]
    NoManifestLink(String),

    #[error("Embedded manifest not found: #{0}")]
    MissingEmbeddedManifest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
