//! Attribute comparison for a pair of same-named elements.

use crate::diff::{DiffKind, DiffNode};
use crate::node::{Attribute, Element, NodeRef};
use crate::options::{Behavior, Dimension, ResolvedMatchOptions};

type Key<'a> = (Option<&'a str>, &'a str);

fn render_key(key: Key<'_>) -> String {
    match key.0 {
        Some(uri) => format!("{{{}}}{}", uri, key.1),
        None => key.1.to_string(),
    }
}

/// Attributes that take part in comparison. An attribute is dropped from
/// both sides when its name or either side's value is excluded.
fn comparable<'e>(
    own: &'e Element,
    other: &Element,
    options: &ResolvedMatchOptions,
) -> Vec<&'e Attribute> {
    own.attributes()
        .iter()
        .filter(|attr| {
            if options.is_attribute_excluded(attr.name(), attr.value()) {
                return false;
            }
            let counterpart = other.attributes().iter().find(|o| o.key() == attr.key());
            !counterpart.is_some_and(|o| options.is_attribute_excluded(o.name(), o.value()))
        })
        .collect()
}

/// Compares attribute sets, then order when `attribute_order` is strict.
pub(super) fn compare_attributes(
    left: &NodeRef,
    right: &NodeRef,
    a: &Element,
    b: &Element,
    options: &ResolvedMatchOptions,
) -> Vec<DiffNode> {
    let mut diffs = Vec::new();
    let ours = comparable(a, b, options);
    let theirs = comparable(b, a, options);

    for attr in &ours {
        match theirs.iter().find(|o| o.key() == attr.key()) {
            None => diffs.push(
                DiffNode::new(
                    DiffKind::MissingAttribute,
                    Dimension::AttributePresence,
                    Some(left.clone()),
                    Some(right.clone()),
                    format!(
                        "attribute {} on <{}> missing from right",
                        render_key(attr.key()),
                        a.qname()
                    ),
                )
                .with_values(Some(attr.value().to_string()), None),
            ),
            Some(other) if other.value() != attr.value() => diffs.push(
                DiffNode::new(
                    DiffKind::UnequalAttributeValues,
                    Dimension::AttributeValues,
                    Some(left.clone()),
                    Some(right.clone()),
                    format!(
                        "attribute {} on <{}> differs",
                        render_key(attr.key()),
                        a.qname()
                    ),
                )
                .with_values(Some(attr.value().to_string()), Some(other.value().to_string())),
            ),
            Some(_) => {}
        }
    }
    for attr in &theirs {
        if !ours.iter().any(|o| o.key() == attr.key()) {
            diffs.push(
                DiffNode::new(
                    DiffKind::MissingAttribute,
                    Dimension::AttributePresence,
                    Some(left.clone()),
                    Some(right.clone()),
                    format!(
                        "attribute {} on <{}> missing from left",
                        render_key(attr.key()),
                        b.qname()
                    ),
                )
                .with_values(None, Some(attr.value().to_string())),
            );
        }
    }

    if options.behavior(Dimension::AttributeOrder) == Behavior::Strict {
        let left_order: Vec<Key<'_>> = ours
            .iter()
            .map(|x| x.key())
            .filter(|k| theirs.iter().any(|o| o.key() == *k))
            .collect();
        let right_order: Vec<Key<'_>> = theirs
            .iter()
            .map(|x| x.key())
            .filter(|k| ours.iter().any(|o| o.key() == *k))
            .collect();
        if left_order != right_order {
            let render = |keys: &[Key<'_>]| {
                keys.iter()
                    .map(|k| render_key(*k))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            diffs.push(
                DiffNode::new(
                    DiffKind::UnequalAttributeOrder,
                    Dimension::AttributeOrder,
                    Some(left.clone()),
                    Some(right.clone()),
                    format!("attribute order on <{}> differs", a.qname()),
                )
                .with_values(Some(render(&left_order)), Some(render(&right_order))),
            );
        }
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{new_node, NodeContent};
    use crate::options::{resolve_options, Format, Overrides, ResolveArgs};

    fn run(a: Element, b: Element, overrides: Overrides) -> Vec<DiffNode> {
        let options =
            resolve_options(Format::Xml, &ResolveArgs::new().overrides(overrides)).unwrap();
        let left = new_node(NodeContent::Element(a.clone()));
        let right = new_node(NodeContent::Element(b.clone()));
        compare_attributes(&left, &right, &a, &b, &options)
    }

    #[test]
    fn test_order_is_ignored_by_default() {
        let a = Element::new("e").with_attr("x", "1").with_attr("y", "2");
        let b = Element::new("e").with_attr("y", "2").with_attr("x", "1");
        assert!(run(a, b, Overrides::new()).is_empty());
    }

    #[test]
    fn test_strict_order_reports_order_only() {
        let a = Element::new("e").with_attr("x", "1").with_attr("y", "2");
        let b = Element::new("e").with_attr("y", "2").with_attr("x", "1");
        let diffs = run(a, b, Overrides::new().set("attribute_order", "strict"));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].dimension(), Dimension::AttributeOrder);
        assert_eq!(diffs[0].left_value(), Some("x y"));
    }

    #[test]
    fn test_presence_and_values() {
        let a = Element::new("e").with_attr("x", "1").with_attr("only_left", "z");
        let b = Element::new("e").with_attr("x", "2").with_attr("only_right", "z");
        let diffs = run(a, b, Overrides::new());
        let dims: Vec<Dimension> = diffs.iter().map(|d| d.dimension()).collect();
        assert_eq!(
            dims,
            [
                Dimension::AttributeValues,
                Dimension::AttributePresence,
                Dimension::AttributePresence
            ]
        );
    }

    #[test]
    fn test_excluded_by_name_or_value() {
        let a = Element::new("e").with_attr("data-x", "1").with_attr("id", "gen-17");
        let b = Element::new("e").with_attr("id", "gen-42");
        let diffs = run(
            a,
            b,
            Overrides::new()
                .ignore_attributes(["^data-"])
                .ignore_attribute_values(["^gen-"]),
        );
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_namespaced_attributes_compare_by_uri() {
        let a = Element::new("e").with_attribute(Attribute::with_namespace("p:lang", "urn:l", "en"));
        let b = Element::new("e").with_attribute(Attribute::with_namespace("q:lang", "urn:l", "en"));
        assert!(run(a, b, Overrides::new()).is_empty());
    }
}
