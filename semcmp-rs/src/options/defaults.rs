//! Format default bundles.

use super::{Behavior, Dimension, Format, Preprocessing};

use Behavior::{Ignore, Normalize, Strict};
use Dimension::*;

const XML_DEFAULTS: [(Dimension, Behavior); 8] = [
    (TextContent, Strict),
    (StructuralWhitespace, Strict),
    (AttributeValues, Strict),
    (AttributePresence, Strict),
    (AttributeOrder, Ignore),
    (Comments, Strict),
    (ElementPosition, Strict),
    (KeyOrder, Ignore),
];

const HTML_DEFAULTS: [(Dimension, Behavior); 8] = [
    (TextContent, Normalize),
    (StructuralWhitespace, Normalize),
    (AttributeValues, Strict),
    (AttributePresence, Strict),
    (AttributeOrder, Ignore),
    (Comments, Ignore),
    (ElementPosition, Strict),
    (KeyOrder, Ignore),
];

const DATA_DEFAULTS: [(Dimension, Behavior); 8] = [
    (TextContent, Strict),
    (StructuralWhitespace, Ignore),
    (AttributeValues, Strict),
    (AttributePresence, Strict),
    (AttributeOrder, Ignore),
    (Comments, Ignore),
    (ElementPosition, Strict),
    (KeyOrder, Ignore),
];

/// Returns the preprocessing mode and dimension behaviors a format starts from.
pub(super) fn format_defaults(format: Format) -> (Preprocessing, &'static [(Dimension, Behavior)]) {
    match format {
        Format::Xml => (Preprocessing::None, &XML_DEFAULTS),
        Format::Html => (Preprocessing::Rendered, &HTML_DEFAULTS),
        Format::Json | Format::Yaml => (Preprocessing::None, &DATA_DEFAULTS),
    }
}
