//! The outcome of one comparison.

use std::fmt;

use tracing::debug;

use crate::compare::compare_nodes;
use crate::diff::{classify_all, Classification, DiffNode};
use crate::node::NodeRef;
use crate::options::{Format, ResolvedMatchOptions};
use crate::document::serialize;

/// Classified differences plus display strings of both documents.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    differences: Vec<DiffNode>,
    left_display: String,
    right_display: String,
    format: Format,
    options: ResolvedMatchOptions,
}

/// Counts per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub normative: usize,
    pub informative: usize,
    pub formatting: usize,
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} normative, {} informative, {} formatting",
            self.normative, self.informative, self.formatting
        )
    }
}

impl ComparisonResult {
    /// True when no difference is normative.
    pub fn equivalent(&self) -> bool {
        !self.differences.iter().any(DiffNode::is_normative)
    }

    /// Every difference in detection order.
    pub fn differences(&self) -> &[DiffNode] {
        &self.differences
    }

    /// Differences that break equivalence.
    pub fn normative_differences(&self) -> Vec<&DiffNode> {
        self.with_classification(Classification::Normative)
    }

    /// Reported differences that do not affect equivalence.
    pub fn informative_differences(&self) -> Vec<&DiffNode> {
        self.with_classification(Classification::Informative)
    }

    /// Differences caused by serialization or whitespace layout only.
    pub fn formatting_differences(&self) -> Vec<&DiffNode> {
        self.with_classification(Classification::Formatting)
    }

    fn with_classification(&self, classification: Classification) -> Vec<&DiffNode> {
        self.differences
            .iter()
            .filter(|d| d.classification() == Some(classification))
            .collect()
    }

    /// Counts differences by classification.
    pub fn summary(&self) -> DiffSummary {
        self.differences
            .iter()
            .fold(DiffSummary::default(), |mut acc, d| {
                match d.classification() {
                    Some(Classification::Normative) => acc.normative += 1,
                    Some(Classification::Informative) => acc.informative += 1,
                    Some(Classification::Formatting) => acc.formatting += 1,
                    None => {}
                }
                acc
            })
    }

    /// Serialized left document, for presentation.
    pub fn left_display(&self) -> &str {
        &self.left_display
    }

    /// Serialized right document, for presentation.
    pub fn right_display(&self) -> &str {
        &self.right_display
    }

    /// The format both documents were read as.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The rule set the comparison ran under.
    pub fn options(&self) -> &ResolvedMatchOptions {
        &self.options
    }
}

/// Compares two parsed trees under resolved options and classifies every
/// difference found.
pub fn compare(left: &NodeRef, right: &NodeRef, options: &ResolvedMatchOptions) -> ComparisonResult {
    let (_, mut differences) = compare_nodes(left, right, options);
    classify_all(&mut differences, options);
    let result = ComparisonResult {
        differences,
        left_display: serialize(left, options.format()),
        right_display: serialize(right, options.format()),
        format: options.format(),
        options: options.clone(),
    };
    debug!(format = %result.format, summary = %result.summary(), "comparison finished");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{new_node, new_root, Element, NodeContent, NodeInner, Text};
    use crate::options::{resolve_options, Overrides, ResolveArgs};

    fn doc(text: &str) -> NodeRef {
        let root = new_root();
        let p = new_node(NodeContent::Element(Element::new("p")));
        NodeInner::add_child_to_ref(&root, p.clone());
        NodeInner::add_child_to_ref(&p, new_node(NodeContent::Text(Text::new(text))));
        root
    }

    #[test]
    fn test_equivalent_iff_no_normative() {
        let options = resolve_options(
            Format::Xml,
            &ResolveArgs::new().overrides(Overrides::new().set("text_content", "normalize")),
        )
        .unwrap();

        let result = compare(&doc("a  b"), &doc("a b"), &options);
        assert!(result.equivalent());
        assert_eq!(result.formatting_differences().len(), 1);
        assert_eq!(
            result.summary(),
            DiffSummary {
                normative: 0,
                informative: 0,
                formatting: 1
            }
        );

        let result = compare(&doc("a"), &doc("b"), &options);
        assert!(!result.equivalent());
        assert_eq!(result.normative_differences().len(), 1);
        assert!(result.differences().iter().all(|d| d.classification().is_some()));
    }

    #[test]
    fn test_displays_are_serialized() {
        let options = ResolvedMatchOptions::for_format(Format::Xml);
        let result = compare(&doc("x"), &doc("y"), &options);
        assert_eq!(result.left_display(), "<p>\n  x\n</p>\n");
        assert!(result.right_display().contains("  y\n"));
        assert_eq!(result.format(), Format::Xml);
        assert_eq!(result.summary().to_string(), "1 normative, 0 informative, 0 formatting");
    }
}
