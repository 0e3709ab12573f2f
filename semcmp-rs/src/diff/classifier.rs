//! Normative / informative / formatting classification.
//!
//! Rules are checked in order and the first one that applies wins:
//!
//! 1. Fixed dimensions are always normative.
//! 2. Text differences where both sides are empty or absent are formatting.
//! 3. Under `normalize`, outside whitespace-sensitive elements, values that
//!    agree once whitespace is collapsed are formatting.
//! 4. `ignore` is informative. `strict` and unreconciled `normalize` are
//!    normative, except for the position dimensions, which have nothing to
//!    normalize and treat `normalize` like `ignore`.

use tracing::trace;

use super::{Classification, DiffNode};
use crate::node::NodeRef;
use crate::options::{Behavior, Dimension, ResolvedMatchOptions};
use crate::whitespace::is_whitespace_sensitive;

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Assigns a classification to one difference and returns it.
pub fn classify(diff: &mut DiffNode, options: &ResolvedMatchOptions) -> Classification {
    let classification = decide(diff, options);
    trace!(
        path = diff.path(),
        dimension = %diff.dimension(),
        kind = %diff.kind(),
        %classification,
        "classified difference"
    );
    diff.set_classification(classification);
    classification
}

/// Classifies every difference in place.
pub fn classify_all(diffs: &mut [DiffNode], options: &ResolvedMatchOptions) {
    for diff in diffs.iter_mut() {
        classify(diff, options);
    }
}

fn decide(diff: &DiffNode, options: &ResolvedMatchOptions) -> Classification {
    let dimension = diff.dimension();
    if dimension.is_always_normative() {
        return Classification::Normative;
    }

    let sensitive = is_whitespace_dimension(dimension) && in_sensitive_element(diff, options);
    let behavior = if sensitive {
        Behavior::Strict
    } else {
        options.behavior(dimension)
    };

    if dimension == Dimension::TextContent && both_sides_empty(diff) {
        return Classification::Formatting;
    }

    if behavior == Behavior::Normalize {
        if let Some(equal) = normalized_equal(diff) {
            if equal {
                return Classification::Formatting;
            }
        } else {
            return Classification::Informative;
        }
    }

    match behavior {
        Behavior::Ignore => Classification::Informative,
        Behavior::Strict | Behavior::Normalize => Classification::Normative,
    }
}

fn is_whitespace_dimension(dimension: Dimension) -> bool {
    matches!(
        dimension,
        Dimension::TextContent | Dimension::StructuralWhitespace
    )
}

/// A text node inherits sensitivity from its ancestors; an element node
/// also counts its own `xml:space` and name.
fn in_sensitive_element(diff: &DiffNode, options: &ResolvedMatchOptions) -> bool {
    [diff.left(), diff.right()]
        .into_iter()
        .flatten()
        .any(|node| is_whitespace_sensitive(node, options))
}

fn both_sides_empty(diff: &DiffNode) -> bool {
    side_empty(diff.left(), diff.left_value()) && side_empty(diff.right(), diff.right_value())
}

fn side_empty(node: Option<&NodeRef>, value: Option<&str>) -> bool {
    match node {
        None => value.map_or(true, str::is_empty),
        Some(node) => node
            .borrow()
            .content()
            .text_value()
            .is_some_and(str::is_empty),
    }
}

/// `None` when the dimension has no value to normalize.
fn normalized_equal(diff: &DiffNode) -> Option<bool> {
    match diff.dimension() {
        Dimension::TextContent
        | Dimension::StructuralWhitespace
        | Dimension::AttributeValues
        | Dimension::Comments => {
            let left = normalize_whitespace(diff.left_value().unwrap_or(""));
            let right = normalize_whitespace(diff.right_value().unwrap_or(""));
            Some(left == right)
        }
        Dimension::ElementPosition | Dimension::KeyOrder => None,
        // Only strict and ignore are accepted for these.
        _ => Some(false),
    }
}
