//! Global match configuration.
//!
//! A `GlobalConfig` holds the "globally configured" profile and overrides for
//! each format. It is a plain value passed into option resolution, typically
//! loaded once from a TOML file:
//!
//! ```toml
//! [xml]
//! profile = "spec_friendly"
//!
//! [xml.overrides]
//! text_content = "normalize"
//! identity_attributes = ["id"]
//!
//! [json.overrides]
//! key_order = "strict"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::options::{Format, Overrides};

/// Global configuration for one format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Profile applied after the format defaults.
    pub profile: Option<String>,
    /// Overrides applied after the global profile.
    pub overrides: Option<Overrides>,
}

/// Global configuration for all formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    pub xml: FormatConfig,
    pub html: FormatConfig,
    pub json: FormatConfig,
    pub yaml: FormatConfig,
}

impl GlobalConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Parse(format!("config: {}", e)))
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Returns the section for a format.
    pub fn for_format(&self, format: Format) -> &FormatConfig {
        match format {
            Format::Xml => &self.xml,
            Format::Html => &self.html,
            Format::Json => &self.json,
            Format::Yaml => &self.yaml,
        }
    }
}
