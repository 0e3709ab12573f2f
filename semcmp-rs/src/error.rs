//! Error types for semcmp.

use thiserror::Error;

/// Result type alias for semcmp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing inputs or resolving options.
///
/// Comparison itself never fails once options are resolved.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid match configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document could not be turned into a node tree.
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON error from serde_json.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error from serde_yaml.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration failures raised at resolution or profile registration time.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No built-in or registered profile has this name.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// Name does not denote a match dimension.
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// Behavior name is not one of strict, normalize, ignore.
    #[error("unknown behavior '{behavior}' for dimension {dimension}")]
    UnknownBehavior { dimension: String, behavior: String },

    /// Behavior exists but the dimension does not accept it.
    #[error("dimension {dimension} does not accept '{behavior}' (allowed: {allowed})")]
    BehaviorNotAllowed {
        dimension: String,
        behavior: String,
        allowed: String,
    },

    /// Dimension is fixed and cannot be configured.
    #[error("dimension {0} is always normative and cannot be configured")]
    NotConfigurable(String),

    /// Preprocessing mode name is not recognized.
    #[error("unknown preprocessing mode: {0}")]
    UnknownPreprocessing(String),

    /// Format name is not recognized.
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// Attribute filter pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A profile with this name already exists.
    #[error("profile already registered: {0}")]
    DuplicateProfile(String),

    /// Profile names must be non-empty.
    #[error("profile name must not be empty")]
    EmptyProfileName,
}
