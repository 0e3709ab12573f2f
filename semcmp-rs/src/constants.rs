//! Constants used throughout semcmp.

/// URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Local name of the attribute that requests whitespace preservation.
pub const XML_SPACE: &str = "space";

/// `xml:space` value that requests preservation.
pub const XML_SPACE_PRESERVE: &str = "preserve";

/// `xml:space` value that restores the application default.
pub const XML_SPACE_DEFAULT: &str = "default";

/// Elements whose text is whitespace-sensitive when rendered as HTML.
pub const HTML_WHITESPACE_SENSITIVE: &[&str] = &["pre", "code", "textarea", "script", "style"];

/// HTML elements that never have content or an end tag.
pub const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Element names used to map data documents (JSON, YAML) into node trees.
pub mod data {
    /// A mapping; children are one element per key.
    pub const OBJECT: &str = "object";
    /// A sequence; children are the item values.
    pub const ARRAY: &str = "array";
    /// A string scalar.
    pub const STRING: &str = "string";
    /// A numeric scalar.
    pub const NUMBER: &str = "number";
    /// A boolean scalar.
    pub const BOOLEAN: &str = "boolean";
    /// The null value.
    pub const NULL: &str = "null";
}
