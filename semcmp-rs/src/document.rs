//! Whole-document pipeline: parse, compare, classify, serialize.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::data::{parse_json, parse_yaml, to_json_string, to_yaml_string};
use crate::error::{Error, Result};
use crate::node::{subtree_size, NodeRef};
use crate::options::{resolve_options, Format, Preprocessing, ResolveArgs};
use crate::result::{compare, ComparisonResult};
use crate::xml::{parse_markup, print_to_string_pretty};

/// Parses raw text of the given format into a node tree.
pub fn parse_document(raw: &str, format: Format, preprocessing: Preprocessing) -> Result<NodeRef> {
    match format {
        Format::Xml | Format::Html => parse_markup(raw, format, preprocessing),
        Format::Json => parse_json(raw, preprocessing),
        Format::Yaml => parse_yaml(raw, preprocessing),
    }
}

/// Renders a tree for display. Output never feeds back into comparison, so a
/// serialization failure yields an empty string.
pub fn serialize(node: &NodeRef, format: Format) -> String {
    let rendered = match format {
        Format::Xml | Format::Html => print_to_string_pretty(node).map_err(Error::from),
        Format::Json => to_json_string(node),
        Format::Yaml => to_yaml_string(node),
    };
    rendered.unwrap_or_else(|e| {
        warn!(%format, error = %e, "could not serialize document for display");
        String::new()
    })
}

/// Resolves options, parses both documents with the resolved preprocessing
/// mode and compares them.
///
/// Fails before comparing when resolution or either parse fails.
pub fn compare_documents(
    left: &str,
    right: &str,
    format: Format,
    args: &ResolveArgs,
) -> Result<ComparisonResult> {
    let options = resolve_options(format, args)?;
    let preprocessing = options.preprocessing();
    let left_tree = parse_document(left, format, preprocessing)?;
    let right_tree = parse_document(right, format, preprocessing)?;
    debug!(
        %format,
        %preprocessing,
        left_nodes = subtree_size(&left_tree),
        right_nodes = subtree_size(&right_tree),
        "parsed both documents"
    );
    Ok(compare(&left_tree, &right_tree, &options))
}

/// Reads two files and compares them. The format comes from `format` or,
/// when absent, from the left file's extension.
pub fn compare_files(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
    format: Option<Format>,
    args: &ResolveArgs,
) -> Result<ComparisonResult> {
    let format = match format {
        Some(format) => format,
        None => Format::from_path(left.as_ref())?,
    };
    let left = fs::read_to_string(left)?;
    let right = fs::read_to_string(right)?;
    compare_documents(&left, &right, format, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Overrides;

    #[test]
    fn test_dispatch_by_format() {
        for (raw, format) in [
            ("<a/>", Format::Xml),
            ("<p>x<br></p>", Format::Html),
            ("{\"a\": 1}", Format::Json),
            ("a: 1\n", Format::Yaml),
        ] {
            let tree = parse_document(raw, format, Preprocessing::None).unwrap();
            assert_eq!(tree.borrow().child_count(), 1, "{}", format);
        }
    }

    #[test]
    fn test_serialize_per_format() {
        let xml = parse_document("<a><b>t</b></a>", Format::Xml, Preprocessing::None).unwrap();
        assert!(serialize(&xml, Format::Xml).contains("<b>"));

        let json = parse_document("{\"k\": [1]}", Format::Json, Preprocessing::None).unwrap();
        assert!(serialize(&json, Format::Json).contains("\"k\""));
        assert!(serialize(&json, Format::Yaml).contains("k:"));
    }

    #[test]
    fn test_compare_documents_uses_resolved_preprocessing() {
        let args = ResolveArgs::new().preprocessing("normalize");
        let result =
            compare_documents("<a>  x  y </a>", "<a>x y</a>", Format::Xml, &args).unwrap();
        assert!(result.equivalent());
        assert!(result.differences().is_empty());
    }

    #[test]
    fn test_configuration_error_aborts() {
        let args = ResolveArgs::new().profile("no_such_profile");
        let err = compare_documents("<a/>", "<a/>", Format::Xml, &args).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let args = ResolveArgs::new().overrides(Overrides::new().set("colour", "strict"));
        assert!(compare_documents("{}", "{}", Format::Json, &args).is_err());
    }

    #[test]
    fn test_parse_error_aborts() {
        let err = compare_documents("<a>", "<a/>", Format::Xml, &ResolveArgs::new()).unwrap_err();
        assert!(matches!(err, Error::Parse(_) | Error::Xml(_)));
    }
}
