//! Error types for the site catalogue.

use thiserror::Error;

/// Errors that can occur while loading site definitions or probing a site.
#[derive(Error, Debug)]
pub enum SiteError {
    /// Site definition not found
    #[error("site definition not found: {site_id}")]
    NotFound {
        /// The site ID that was not found
        site_id: String,
    },

    /// Failed to load site definition from file
    #[error("failed to load site definition from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse site definition TOML
    #[error("failed to parse site definition TOML in {path}: {source}")]
    ParseError {
        /// Path to the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid site definition (validation failed)
    #[error("invalid site definition for {site_id}: {reason}")]
    ValidationError {
        /// Site ID being validated
        site_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Site definition directory not found
    #[error("site definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// The catalogue has no probe units to offer
    #[error("no site definitions available")]
    EmptyCatalogue,

    /// HTTP request to a site failed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The site answered with something the definition does not recognise
    #[error("unexpected response from {site}: {reason}")]
    UnexpectedResponse {
        /// Site name
        site: String,
        /// What was wrong with the response
        reason: String,
    },

    /// I/O error while accessing site definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid site ID format
    #[error("invalid site ID: {0}")]
    InvalidId(#[from] lookout_core::LookoutError),
}

/// Result type for site catalogue operations.
pub type Result<T> = std::result::Result<T, SiteError>;
