//! Match options: dimensions, behaviors and their resolution.
//!
//! A comparison is governed by one [`ResolvedMatchOptions`] value, built by
//! [`resolve_options`] from (lowest to highest precedence):
//!
//! 1. the format's default bundle,
//! 2. the globally configured profile,
//! 3. the globally configured overrides,
//! 4. the per-call profile,
//! 5. the per-call preprocessing mode,
//! 6. the per-call overrides.
//!
//! Each layer overwrites earlier layers per dimension. Every layer is
//! validated as it is applied, so a bad name fails resolution even when a
//! later layer would have overwritten it.

mod defaults;
mod profile;

pub use profile::{
    lookup_profile, profile_names, register, register_profile, Profile, ProfileBuilder,
    BUILTIN_PROFILE_NAMES,
};

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// A named axis of comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// Character data inside elements.
    TextContent,
    /// Whitespace-only text between elements.
    StructuralWhitespace,
    /// Attribute values (input alias: `attribute_whitespace`).
    AttributeValues,
    /// Which attributes are present.
    AttributePresence,
    /// The order attributes are written in.
    AttributeOrder,
    /// Comment nodes.
    Comments,
    /// Position of matched elements among their siblings.
    ElementPosition,
    /// Order of keys in map-like data formats.
    KeyOrder,
    /// Element names, node kinds, inserted and deleted nodes. Always normative.
    ElementStructure,
    /// Element namespace URIs. Always normative.
    NamespaceUri,
    /// Processing instruction targets. Always normative.
    ProcessingInstructionTarget,
}

impl Dimension {
    /// Dimensions a caller may set a behavior for.
    pub const CONFIGURABLE: [Dimension; 8] = [
        Dimension::TextContent,
        Dimension::StructuralWhitespace,
        Dimension::AttributeValues,
        Dimension::AttributePresence,
        Dimension::AttributeOrder,
        Dimension::Comments,
        Dimension::ElementPosition,
        Dimension::KeyOrder,
    ];

    /// Returns the canonical snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::TextContent => "text_content",
            Dimension::StructuralWhitespace => "structural_whitespace",
            Dimension::AttributeValues => "attribute_values",
            Dimension::AttributePresence => "attribute_presence",
            Dimension::AttributeOrder => "attribute_order",
            Dimension::Comments => "comments",
            Dimension::ElementPosition => "element_position",
            Dimension::KeyOrder => "key_order",
            Dimension::ElementStructure => "element_structure",
            Dimension::NamespaceUri => "namespace_uri",
            Dimension::ProcessingInstructionTarget => "processing_instruction_target",
        }
    }

    /// Parses a dimension name, accepting the `attribute_whitespace` alias.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let dimension = match name {
            "text_content" => Dimension::TextContent,
            "structural_whitespace" => Dimension::StructuralWhitespace,
            "attribute_values" | "attribute_whitespace" => Dimension::AttributeValues,
            "attribute_presence" => Dimension::AttributePresence,
            "attribute_order" => Dimension::AttributeOrder,
            "comments" => Dimension::Comments,
            "element_position" => Dimension::ElementPosition,
            "key_order" => Dimension::KeyOrder,
            "element_structure" => Dimension::ElementStructure,
            "namespace_uri" => Dimension::NamespaceUri,
            "processing_instruction_target" => Dimension::ProcessingInstructionTarget,
            other => return Err(ConfigError::UnknownDimension(other.to_string())),
        };
        Ok(dimension)
    }

    /// True for dimensions that accept a caller-chosen behavior.
    pub fn is_configurable(self) -> bool {
        !self.is_always_normative()
    }

    /// True for dimensions whose differences always break equivalence.
    pub fn is_always_normative(self) -> bool {
        matches!(
            self,
            Dimension::ElementStructure
                | Dimension::NamespaceUri
                | Dimension::ProcessingInstructionTarget
        )
    }

    /// Behaviors this dimension accepts.
    pub fn allowed_behaviors(self) -> &'static [Behavior] {
        match self {
            Dimension::AttributePresence | Dimension::AttributeOrder | Dimension::KeyOrder => {
                &[Behavior::Strict, Behavior::Ignore]
            }
            Dimension::ElementStructure
            | Dimension::NamespaceUri
            | Dimension::ProcessingInstructionTarget => &[Behavior::Strict],
            _ => &[Behavior::Strict, Behavior::Normalize, Behavior::Ignore],
        }
    }

    /// Validates a (dimension, behavior) pair given by name.
    pub fn parse_setting(dimension: &str, behavior: &str) -> Result<(Self, Behavior), ConfigError> {
        let dim = Dimension::parse(dimension)?;
        if !dim.is_configurable() {
            return Err(ConfigError::NotConfigurable(dim.name().to_string()));
        }
        let behavior = Behavior::parse(behavior).map_err(|_| ConfigError::UnknownBehavior {
            dimension: dim.name().to_string(),
            behavior: behavior.to_string(),
        })?;
        dim.check(behavior)?;
        Ok((dim, behavior))
    }

    fn check(self, behavior: Behavior) -> Result<(), ConfigError> {
        if self.allowed_behaviors().contains(&behavior) {
            Ok(())
        } else {
            let allowed: Vec<&str> = self.allowed_behaviors().iter().map(|b| b.name()).collect();
            Err(ConfigError::BehaviorNotAllowed {
                dimension: self.name().to_string(),
                behavior: behavior.name().to_string(),
                allowed: allowed.join(", "),
            })
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The policy value for a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Behavior {
    /// Any difference is normative.
    Strict,
    /// Differences that vanish after normalization are formatting.
    Normalize,
    /// Differences are reported but never normative.
    Ignore,
}

impl Behavior {
    /// Returns the lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Behavior::Strict => "strict",
            Behavior::Normalize => "normalize",
            Behavior::Ignore => "ignore",
        }
    }

    /// Parses a behavior name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "strict" => Ok(Behavior::Strict),
            "normalize" => Ok(Behavior::Normalize),
            "ignore" => Ok(Behavior::Ignore),
            other => Err(ConfigError::UnknownBehavior {
                dimension: String::new(),
                behavior: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// XML markup.
    Xml,
    /// HTML markup.
    Html,
    /// JSON data.
    Json,
    /// YAML data.
    Yaml,
}

impl Format {
    /// Returns the lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Html => "html",
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    /// Parses a format name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "xml" => Ok(Format::Xml),
            "html" | "xhtml" => Ok(Format::Html),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "htm" => Ok(Format::Html),
            "svg" | "xsd" | "xsl" | "xslt" => Ok(Format::Xml),
            other => Format::parse(other),
        }
    }

    /// True for XML and HTML.
    pub fn is_markup(self) -> bool {
        matches!(self, Format::Xml | Format::Html)
    }

    /// True for JSON and YAML.
    pub fn is_data(self) -> bool {
        !self.is_markup()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Preprocessing the parser applies to raw text before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preprocessing {
    /// Compare the document as written.
    None,
    /// Collapse whitespace runs in text and drop whitespace-only text.
    Normalize,
    /// Normalize, drop comments and sort attributes.
    Canonicalize,
    /// Drop whitespace-only text between elements.
    PrettyFormat,
    /// Collapse whitespace the way a browser renders it.
    Rendered,
}

impl Preprocessing {
    /// Returns the mode name.
    pub fn name(self) -> &'static str {
        match self {
            Preprocessing::None => "none",
            Preprocessing::Normalize => "normalize",
            Preprocessing::Canonicalize => "canonicalize",
            Preprocessing::PrettyFormat => "pretty-format",
            Preprocessing::Rendered => "rendered",
        }
    }

    /// Parses a mode name (`pretty_format` is accepted for `pretty-format`).
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "none" => Ok(Preprocessing::None),
            "normalize" => Ok(Preprocessing::Normalize),
            "canonicalize" | "c14n" => Ok(Preprocessing::Canonicalize),
            "pretty-format" | "pretty_format" | "format" => Ok(Preprocessing::PrettyFormat),
            "rendered" => Ok(Preprocessing::Rendered),
            other => Err(ConfigError::UnknownPreprocessing(other.to_string())),
        }
    }
}

impl fmt::Display for Preprocessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled attribute filter pattern. Equality is by source text.
#[derive(Debug, Clone)]
pub struct AttributePattern {
    source: String,
    regex: Regex,
}

impl AttributePattern {
    /// Compiles a pattern.
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(source).map_err(|e| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(AttributePattern {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the pattern source.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Tests the pattern against a string.
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for AttributePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for AttributePattern {}

/// Caller overrides: dimension settings plus the non-dimension options.
///
/// Deserializable so it can be loaded from a configuration file; dimension
/// settings are the remaining `name = "behavior"` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Overrides {
    /// Preprocessing mode name.
    pub preprocessing: Option<String>,
    /// Use the semantic element matcher for all-element sibling lists.
    pub semantic_diff: Option<bool>,
    /// Attribute names whose equal values identify the same element.
    pub identity_attributes: Option<Vec<String>>,
    /// Patterns for attribute names to exclude from comparison.
    pub ignore_attributes: Option<Vec<String>>,
    /// Patterns for attribute values to exclude from comparison.
    pub ignore_attribute_values: Option<Vec<String>>,
    /// Elements whose text is always whitespace-sensitive.
    pub preserve_whitespace_elements: Option<Vec<String>>,
    /// Elements whose text is never whitespace-sensitive.
    pub strip_whitespace_elements: Option<Vec<String>>,
    /// Honor `xml:space` attributes.
    pub respect_xml_space: Option<bool>,
    /// Dimension name -> behavior name.
    #[serde(flatten)]
    pub dimensions: BTreeMap<String, String>,
}

impl Overrides {
    /// Creates empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a dimension behavior by name. Validated at resolution time.
    pub fn set(mut self, dimension: impl Into<String>, behavior: impl Into<String>) -> Self {
        self.dimensions.insert(dimension.into(), behavior.into());
        self
    }

    /// Sets a dimension behavior.
    pub fn dimension(self, dimension: Dimension, behavior: Behavior) -> Self {
        self.set(dimension.name(), behavior.name())
    }

    /// Sets the preprocessing mode.
    pub fn preprocessing(mut self, mode: impl Into<String>) -> Self {
        self.preprocessing = Some(mode.into());
        self
    }

    /// Enables or disables the semantic element matcher.
    pub fn semantic_diff(mut self, enabled: bool) -> Self {
        self.semantic_diff = Some(enabled);
        self
    }

    /// Sets the identity attributes.
    pub fn identity_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identity_attributes = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets attribute-name exclusion patterns.
    pub fn ignore_attributes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_attributes = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets attribute-value exclusion patterns.
    pub fn ignore_attribute_values<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_attribute_values = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the whitespace-sensitive element allow-list.
    pub fn preserve_whitespace_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preserve_whitespace_elements = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the whitespace-sensitive element deny-list.
    pub fn strip_whitespace_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strip_whitespace_elements = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether `xml:space` is honored.
    pub fn respect_xml_space(mut self, respect: bool) -> Self {
        self.respect_xml_space = Some(respect);
        self
    }
}

/// Inputs to [`resolve_options`] besides the format.
#[derive(Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Per-call profile name.
    pub profile: Option<String>,
    /// Per-call overrides.
    pub overrides: Option<Overrides>,
    /// Per-call preprocessing mode name.
    pub preprocessing: Option<String>,
    /// Globally configured profile name.
    pub global_profile: Option<String>,
    /// Globally configured overrides.
    pub global_overrides: Option<Overrides>,
}

impl ResolveArgs {
    /// Creates empty arguments (format defaults only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call profile.
    pub fn profile(mut self, name: impl Into<String>) -> Self {
        self.profile = Some(name.into());
        self
    }

    /// Sets the per-call overrides.
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Sets the per-call preprocessing mode.
    pub fn preprocessing(mut self, mode: impl Into<String>) -> Self {
        self.preprocessing = Some(mode.into());
        self
    }

    /// Sets the global profile and overrides from a per-format configuration.
    pub fn global(mut self, config: &crate::config::FormatConfig) -> Self {
        self.global_profile = config.profile.clone();
        self.global_overrides = config.overrides.clone();
        self
    }
}

/// The immutable rule set a single comparison runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatchOptions {
    format: Format,
    preprocessing: Preprocessing,
    behaviors: BTreeMap<Dimension, Behavior>,
    semantic_diff: bool,
    identity_attributes: Vec<String>,
    ignore_attribute_names: Vec<AttributePattern>,
    ignore_attribute_values: Vec<AttributePattern>,
    preserve_whitespace_elements: Vec<String>,
    strip_whitespace_elements: Vec<String>,
    respect_xml_space: bool,
}

impl ResolvedMatchOptions {
    /// Options made of the format defaults alone.
    pub fn for_format(format: Format) -> Self {
        let (preprocessing, settings) = defaults::format_defaults(format);
        ResolvedMatchOptions {
            format,
            preprocessing,
            behaviors: settings.iter().copied().collect(),
            semantic_diff: true,
            identity_attributes: Vec::new(),
            ignore_attribute_names: Vec::new(),
            ignore_attribute_values: Vec::new(),
            preserve_whitespace_elements: Vec::new(),
            strip_whitespace_elements: Vec::new(),
            respect_xml_space: true,
        }
    }

    /// Returns the document format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the preprocessing mode requested from the parser.
    pub fn preprocessing(&self) -> Preprocessing {
        self.preprocessing
    }

    /// Returns the behavior for a dimension. Fixed dimensions are always strict.
    pub fn behavior(&self, dimension: Dimension) -> Behavior {
        if dimension.is_always_normative() {
            return Behavior::Strict;
        }
        self.behaviors
            .get(&dimension)
            .copied()
            .unwrap_or(Behavior::Strict)
    }

    /// Iterates over every configurable dimension and its behavior.
    pub fn behaviors(&self) -> impl Iterator<Item = (Dimension, Behavior)> + '_ {
        self.behaviors.iter().map(|(d, b)| (*d, *b))
    }

    /// Whether all-element sibling lists go through the semantic matcher.
    pub fn semantic_diff(&self) -> bool {
        self.semantic_diff
    }

    /// Attribute names used to pair elements across trees.
    pub fn identity_attributes(&self) -> &[String] {
        &self.identity_attributes
    }

    /// True if an attribute is excluded by name or by value.
    pub fn is_attribute_excluded(&self, name: &str, value: &str) -> bool {
        self.ignore_attribute_names.iter().any(|p| p.is_match(name))
            || self.ignore_attribute_values.iter().any(|p| p.is_match(value))
    }

    /// Caller allow-list of whitespace-sensitive elements.
    pub fn preserve_whitespace_elements(&self) -> &[String] {
        &self.preserve_whitespace_elements
    }

    /// Caller deny-list of whitespace-sensitive elements.
    pub fn strip_whitespace_elements(&self) -> &[String] {
        &self.strip_whitespace_elements
    }

    /// Whether `xml:space` attributes are honored.
    pub fn respect_xml_space(&self) -> bool {
        self.respect_xml_space
    }

    fn apply_profile(&mut self, profile: &Profile) {
        if let Some(preprocessing) = profile.preprocessing() {
            self.preprocessing = preprocessing;
        }
        for &(dimension, behavior) in profile.settings() {
            self.behaviors.insert(dimension, behavior);
        }
    }

    fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(mode) = &overrides.preprocessing {
            self.preprocessing = Preprocessing::parse(mode)?;
        }
        for (dimension, behavior) in &overrides.dimensions {
            let (dimension, behavior) = Dimension::parse_setting(dimension, behavior)?;
            self.behaviors.insert(dimension, behavior);
        }
        if let Some(enabled) = overrides.semantic_diff {
            self.semantic_diff = enabled;
        }
        if let Some(names) = &overrides.identity_attributes {
            self.identity_attributes = names.clone();
        }
        if let Some(patterns) = &overrides.ignore_attributes {
            self.ignore_attribute_names = compile_patterns(patterns)?;
        }
        if let Some(patterns) = &overrides.ignore_attribute_values {
            self.ignore_attribute_values = compile_patterns(patterns)?;
        }
        if let Some(names) = &overrides.preserve_whitespace_elements {
            self.preserve_whitespace_elements = names.clone();
        }
        if let Some(names) = &overrides.strip_whitespace_elements {
            self.strip_whitespace_elements = names.clone();
        }
        if let Some(respect) = overrides.respect_xml_space {
            self.respect_xml_space = respect;
        }
        Ok(())
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<AttributePattern>, ConfigError> {
    patterns.iter().map(|p| AttributePattern::new(p)).collect()
}

/// Resolves format defaults, profiles and overrides into one rule set.
pub fn resolve_options(
    format: Format,
    args: &ResolveArgs,
) -> Result<ResolvedMatchOptions, ConfigError> {
    let mut options = ResolvedMatchOptions::for_format(format);

    if let Some(name) = &args.global_profile {
        options.apply_profile(&*lookup_profile(name)?);
    }
    if let Some(overrides) = &args.global_overrides {
        options.apply_overrides(overrides)?;
    }
    if let Some(name) = &args.profile {
        options.apply_profile(&*lookup_profile(name)?);
    }
    if let Some(mode) = &args.preprocessing {
        options.preprocessing = Preprocessing::parse(mode)?;
    }
    if let Some(overrides) = &args.overrides {
        options.apply_overrides(overrides)?;
    }

    debug!(
        format = %format,
        profile = args.profile.as_deref().unwrap_or("-"),
        global_profile = args.global_profile.as_deref().unwrap_or("-"),
        preprocessing = %options.preprocessing,
        "resolved match options"
    );
    Ok(options)
}
