//! Error types for the scraper.
//!
//! Only fatal conditions are errors. Soft extraction failures are carried as
//! `None` fields on [`DocumentItem`](crate::types::DocumentItem) and drops are
//! reported through [`DropReason`](crate::pipeline::DropReason).

use thiserror::Error;

/// Main error type for the scraper library.
#[derive(Debug, Error)]
pub enum ScraperError {
    /// Invalid target year.
    #[error("Invalid year: '{0}'. Expected YYYY between 2000 and the current year")]
    InvalidYear(String),

    /// Invalid access level.
    #[error("Invalid access level: '{0}'. Expected public, private or organization")]
    InvalidAccess(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts exhausted.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// A response did not carry a header we rely on.
    #[error("Missing {header} header in response for {url}")]
    MissingHeader { url: String, header: String },

    /// Last-Modified value that is not an HTTP date.
    #[error("Malformed Last-Modified value '{value}' for {url}")]
    InvalidLastModified { url: String, value: String },

    /// Event data could not be loaded.
    #[error("Failed to load event data from {location}: {message}")]
    EventStoreLoad { location: String, message: String },

    /// Event data could not be stored.
    #[error("Failed to store event data to {location}: {message}")]
    EventStoreWrite { location: String, message: String },

    /// Hand-off to the document host failed.
    #[error("Upload failed for {url}: {message}")]
    Upload { url: String, message: String },

    /// URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, ScraperError>;
