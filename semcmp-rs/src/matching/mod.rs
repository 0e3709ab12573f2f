//! Semantic element matching.
//!
//! Pairs the element children of two matched parents by identity instead of
//! by position. Candidates are grouped by namespace URI and local name; inside
//! a group, identity attributes are tried in configured order and whatever is
//! left is paired in document order. Every input element ends up in exactly
//! one result entry.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::node::{NodeContent, NodeRef};

/// Outcome for one element of the two sibling lists.
#[derive(Debug, Clone)]
pub enum ElementMatch {
    /// Paired elements and their indices in the input lists.
    Matched {
        left: NodeRef,
        right: NodeRef,
        left_pos: usize,
        right_pos: usize,
    },
    /// A left element with no counterpart.
    Deleted { left: NodeRef, pos: usize },
    /// A right element with no counterpart.
    Inserted { right: NodeRef, pos: usize },
}

impl ElementMatch {
    /// True for a pair whose members sit at different indices.
    pub fn is_moved(&self) -> bool {
        matches!(self, ElementMatch::Matched { left_pos, right_pos, .. } if left_pos != right_pos)
    }
}

/// Grouping key: namespace URI and local name, or the node kind for
/// anything that is not an element.
type NameKey = (Option<String>, String);

fn name_key(node: &NodeRef) -> NameKey {
    match node.borrow().content() {
        NodeContent::Element(e) => (e.namespace_uri().map(str::to_string), e.name().to_string()),
        other => (None, format!("#{}", other.kind_name())),
    }
}

fn identity_value(node: &NodeRef, attribute: &str) -> Option<String> {
    node.borrow()
        .as_element()
        .and_then(|e| e.attribute(attribute))
        .map(str::to_string)
}

/// Candidates of one name on both sides, as indices into the input lists.
#[derive(Default)]
struct CandidateGroup {
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Pairs two sibling lists of elements.
pub struct SiblingMatcher<'a> {
    identity_attributes: &'a [String],
    /// For each left index, the paired right index.
    left_to_right: Vec<Option<usize>>,
    right_taken: Vec<bool>,
}

impl<'a> SiblingMatcher<'a> {
    /// Creates a matcher using the given identity attributes, in priority order.
    pub fn new(identity_attributes: &'a [String]) -> Self {
        SiblingMatcher {
            identity_attributes,
            left_to_right: Vec::new(),
            right_taken: Vec::new(),
        }
    }

    /// Matches `left` against `right`.
    ///
    /// Matched and deleted entries come first in left order, followed by
    /// inserted entries in right order.
    pub fn match_siblings(mut self, left: &[NodeRef], right: &[NodeRef]) -> Vec<ElementMatch> {
        self.left_to_right = vec![None; left.len()];
        self.right_taken = vec![false; right.len()];

        for group in group_candidates(left, right) {
            self.match_by_identity(&group, left, right);
            self.match_by_order(&group, left, right);
        }

        let mut result = Vec::with_capacity(left.len().max(right.len()));
        for (left_pos, paired) in self.left_to_right.iter().enumerate() {
            match paired {
                Some(right_pos) => result.push(ElementMatch::Matched {
                    left: left[left_pos].clone(),
                    right: right[*right_pos].clone(),
                    left_pos,
                    right_pos: *right_pos,
                }),
                None => result.push(ElementMatch::Deleted {
                    left: left[left_pos].clone(),
                    pos: left_pos,
                }),
            }
        }
        for (pos, taken) in self.right_taken.iter().enumerate() {
            if !taken {
                result.push(ElementMatch::Inserted {
                    right: right[pos].clone(),
                    pos,
                });
            }
        }
        result
    }

    fn pair(&mut self, left_pos: usize, right_pos: usize) {
        self.left_to_right[left_pos] = Some(right_pos);
        self.right_taken[right_pos] = true;
    }

    fn match_by_identity(&mut self, group: &CandidateGroup, left: &[NodeRef], right: &[NodeRef]) {
        for attribute in self.identity_attributes {
            for &li in &group.left {
                if self.left_to_right[li].is_some() {
                    continue;
                }
                let Some(value) = identity_value(&left[li], attribute) else {
                    continue;
                };
                let found = group.right.iter().copied().find(|&ri| {
                    !self.right_taken[ri]
                        && identity_value(&right[ri], attribute).as_deref() == Some(value.as_str())
                });
                if let Some(ri) = found {
                    trace!(attribute = attribute.as_str(), %value, li, ri, "matched by identity");
                    self.pair(li, ri);
                }
            }
        }
    }

    fn match_by_order(&mut self, group: &CandidateGroup, left: &[NodeRef], right: &[NodeRef]) {
        for &li in &group.left {
            if self.left_to_right[li].is_some() {
                continue;
            }
            let found = group
                .right
                .iter()
                .copied()
                .find(|&ri| !self.right_taken[ri] && !self.identity_conflict(&left[li], &right[ri]));
            if let Some(ri) = found {
                self.pair(li, ri);
            }
        }
    }

    /// Two elements that both carry an identity attribute with different
    /// values are never paired.
    fn identity_conflict(&self, a: &NodeRef, b: &NodeRef) -> bool {
        self.identity_attributes.iter().any(|attr| {
            match (identity_value(a, attr), identity_value(b, attr)) {
                (Some(x), Some(y)) => x != y,
                _ => false,
            }
        })
    }
}

/// Groups both lists by name, keeping first-appearance order for determinism.
fn group_candidates(left: &[NodeRef], right: &[NodeRef]) -> Vec<CandidateGroup> {
    let mut index: FxHashMap<NameKey, usize> = FxHashMap::default();
    let mut groups: Vec<CandidateGroup> = Vec::new();

    let mut slot = |key: NameKey| -> usize {
        *index.entry(key).or_insert_with(|| {
            groups.push(CandidateGroup::default());
            groups.len() - 1
        })
    };
    let left_slots: Vec<usize> = left.iter().map(|n| slot(name_key(n))).collect();
    let right_slots: Vec<usize> = right.iter().map(|n| slot(name_key(n))).collect();

    for (i, g) in left_slots.into_iter().enumerate() {
        groups[g].left.push(i);
    }
    for (i, g) in right_slots.into_iter().enumerate() {
        groups[g].right.push(i);
    }
    groups
}

/// Pairs two element sibling lists.
///
/// See [`SiblingMatcher`] for the pairing rules.
pub fn match_elements(
    left: &[NodeRef],
    right: &[NodeRef],
    identity_attributes: &[String],
) -> Vec<ElementMatch> {
    SiblingMatcher::new(identity_attributes).match_siblings(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{new_node, Element};

    fn el(name: &str, attrs: &[(&str, &str)]) -> NodeRef {
        let e = attrs
            .iter()
            .fold(Element::new(name), |e, (k, v)| e.with_attr(*k, *v));
        new_node(NodeContent::Element(e))
    }

    fn ids() -> Vec<String> {
        vec!["id".to_string()]
    }

    fn summary(matches: &[ElementMatch]) -> Vec<String> {
        matches
            .iter()
            .map(|m| match m {
                ElementMatch::Matched { left_pos, right_pos, .. } => format!("{}={}", left_pos, right_pos),
                ElementMatch::Deleted { pos, .. } => format!("-{}", pos),
                ElementMatch::Inserted { pos, .. } => format!("+{}", pos),
            })
            .collect()
    }

    #[test]
    fn test_reordered_items_pair_by_identity() {
        let left = [el("item", &[("id", "1")]), el("item", &[("id", "2")])];
        let right = [el("item", &[("id", "2")]), el("item", &[("id", "1")])];
        let matches = match_elements(&left, &right, &ids());
        assert_eq!(summary(&matches), ["0=1", "1=0"]);
        assert!(matches.iter().all(ElementMatch::is_moved));
    }

    #[test]
    fn test_document_order_fallback() {
        let left = [el("a", &[]), el("b", &[]), el("a", &[])];
        let right = [el("b", &[]), el("a", &[]), el("a", &[])];
        let matches = match_elements(&left, &right, &[]);
        assert_eq!(summary(&matches), ["0=1", "1=0", "2=2"]);
    }

    #[test]
    fn test_conflicting_identity_never_pairs() {
        let left = [el("item", &[("id", "1")])];
        let right = [el("item", &[("id", "9")])];
        let matches = match_elements(&left, &right, &ids());
        assert_eq!(summary(&matches), ["-0", "+0"]);

        // Without identity attributes the same elements pair by order.
        let matches = match_elements(&left, &right, &[]);
        assert_eq!(summary(&matches), ["0=0"]);
    }

    #[test]
    fn test_identity_attributes_in_priority_order() {
        let attrs = vec!["key".to_string(), "id".to_string()];
        let left = [el("x", &[("id", "a"), ("key", "k2")]), el("x", &[("id", "b"), ("key", "k1")])];
        let right = [el("x", &[("id", "b"), ("key", "k1")]), el("x", &[("id", "a"), ("key", "k2")])];
        let matches = match_elements(&left, &right, &attrs);
        assert_eq!(summary(&matches), ["0=1", "1=0"]);
    }

    #[test]
    fn test_different_names_never_pair() {
        let left = [el("a", &[])];
        let right = [el("b", &[])];
        let matches = match_elements(&left, &right, &[]);
        assert_eq!(summary(&matches), ["-0", "+0"]);
    }

    #[test]
    fn test_namespaces_separate_groups() {
        let left = [new_node(NodeContent::Element(
            Element::new("a").with_namespace_uri("urn:one"),
        ))];
        let right = [new_node(NodeContent::Element(
            Element::new("a").with_namespace_uri("urn:two"),
        ))];
        let matches = match_elements(&left, &right, &[]);
        assert_eq!(summary(&matches), ["-0", "+0"]);
    }

    #[test]
    fn test_every_element_appears_once() {
        let left = [el("a", &[]), el("a", &[]), el("c", &[])];
        let right = [el("a", &[]), el("d", &[])];
        let matches = match_elements(&left, &right, &[]);
        assert_eq!(summary(&matches), ["0=0", "-1", "-2", "+1"]);
    }
}
