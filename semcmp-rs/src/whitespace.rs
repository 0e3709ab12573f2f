//! Whitespace-sensitivity rules.
//!
//! Inside a whitespace-sensitive element, text and structural whitespace are
//! compared strictly no matter what the options say. Sensitivity is decided
//! by the nearest ancestor that has an opinion.

use crate::constants::{
    HTML_WHITESPACE_SENSITIVE, XML_NAMESPACE, XML_SPACE, XML_SPACE_DEFAULT, XML_SPACE_PRESERVE,
};
use crate::node::{Ancestors, Element, NodeRef};
use crate::options::{Format, ResolvedMatchOptions};

/// Returns true if whitespace under `node` is significant.
///
/// `node` itself is considered when it is an element, then its ancestors,
/// nearest first.
pub fn is_whitespace_sensitive(node: &NodeRef, options: &ResolvedMatchOptions) -> bool {
    std::iter::once(node.clone())
        .chain(Ancestors::new(node))
        .find_map(|n| n.borrow().as_element().and_then(|e| element_rule(e, options)))
        .unwrap_or(false)
}

/// The verdict a single element contributes, if any.
fn element_rule(element: &Element, options: &ResolvedMatchOptions) -> Option<bool> {
    if !options.respect_xml_space() {
        return listed(element, options.preserve_whitespace_elements()).then_some(true);
    }

    match xml_space(element) {
        Some(XML_SPACE_PRESERVE) => return Some(true),
        Some(XML_SPACE_DEFAULT) => return Some(false),
        _ => {}
    }

    let builtin = options.format() == Format::Html
        && HTML_WHITESPACE_SENSITIVE
            .iter()
            .any(|n| n.eq_ignore_ascii_case(element.name()));
    let sensitive = builtin || listed(element, options.preserve_whitespace_elements());
    (sensitive && !listed(element, options.strip_whitespace_elements())).then_some(true)
}

fn xml_space(element: &Element) -> Option<&str> {
    element
        .attribute_ns(XML_NAMESPACE, XML_SPACE)
        .or_else(|| element.attribute("xml:space"))
}

fn listed(element: &Element, names: &[String]) -> bool {
    names
        .iter()
        .any(|n| *n == element.name() || *n == element.qname())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{new_node, new_root, Attribute, NodeContent, NodeInner, Text};
    use crate::options::{resolve_options, Overrides, ResolveArgs};

    /// Builds root > names... > text and returns the root with the text leaf.
    /// Parents are weak links, so the root must outlive every check.
    fn chain(names: &[Element]) -> (NodeRef, NodeRef) {
        let root = new_root();
        let mut parent = root.clone();
        for e in names {
            let child = new_node(NodeContent::Element(e.clone()));
            NodeInner::add_child_to_ref(&parent, child.clone());
            parent = child;
        }
        let text = new_node(NodeContent::Text(Text::new("  x  ")));
        NodeInner::add_child_to_ref(&parent, text.clone());
        (root, text)
    }

    fn sensitive(names: &[Element], options: &ResolvedMatchOptions) -> bool {
        let (_root, text) = chain(names);
        is_whitespace_sensitive(&text, options)
    }

    fn options(format: Format, overrides: Overrides) -> ResolvedMatchOptions {
        resolve_options(format, &ResolveArgs::new().overrides(overrides)).unwrap()
    }

    #[test]
    fn test_html_builtins_are_sensitive() {
        let (_root, text) = chain(&[Element::new("body"), Element::new("pre")]);
        assert!(is_whitespace_sensitive(&text, &options(Format::Html, Overrides::new())));
        // The HTML set does not apply to XML documents.
        assert!(!is_whitespace_sensitive(&text, &options(Format::Xml, Overrides::new())));
    }

    #[test]
    fn test_detached_text_is_not_sensitive() {
        let text = new_node(NodeContent::Text(Text::new(" ")));
        assert!(!is_whitespace_sensitive(&text, &options(Format::Html, Overrides::new())));
    }

    #[test]
    fn test_xml_space_nearest_wins() {
        let preserve = Element::new("outer").with_attribute(Attribute::with_namespace(
            "xml:space",
            XML_NAMESPACE,
            "preserve",
        ));
        let reset = Element::new("inner").with_attr("xml:space", "default");
        let xml = options(Format::Xml, Overrides::new());

        assert!(sensitive(&[preserve.clone()], &xml));
        assert!(!sensitive(&[preserve, reset], &xml));
    }

    #[test]
    fn test_allow_and_deny_lists() {
        let allow = options(Format::Xml, Overrides::new().preserve_whitespace_elements(["verse"]));
        assert!(sensitive(&[Element::new("verse")], &allow));

        let deny = options(
            Format::Html,
            Overrides::new().strip_whitespace_elements(["pre"]),
        );
        assert!(!sensitive(&[Element::new("pre")], &deny));
    }

    #[test]
    fn test_ignoring_xml_space_leaves_only_allow_list() {
        let preserve = Element::new("p").with_attr("xml:space", "preserve");
        let opts = options(Format::Html, Overrides::new().respect_xml_space(false));
        assert!(!sensitive(&[preserve], &opts));
        assert!(!sensitive(&[Element::new("pre")], &opts));

        let opts = options(
            Format::Xml,
            Overrides::new()
                .respect_xml_space(false)
                .preserve_whitespace_elements(["p"]),
        );
        assert!(sensitive(&[Element::new("p")], &opts));
    }
}
