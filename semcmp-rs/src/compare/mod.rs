//! Structural comparison of two document trees.
//!
//! The comparator walks both trees in lockstep and records every raw
//! difference it finds as an unclassified [`DiffNode`]. It never decides
//! whether a difference matters; that is the classifier's job. The only
//! places where options suppress work here are sibling filtering (ignored
//! comments and droppable whitespace), attribute exclusion, attribute order
//! (checked only when strict) and position changes under `ignore`.

mod attributes;

use md5::{Digest, Md5};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::constants::data;
use crate::diff::{DiffKind, DiffNode};
use crate::matching::{match_elements, ElementMatch};
use crate::node::{NodeContent, NodeRef};
use crate::options::{Behavior, Dimension, ResolvedMatchOptions};
use crate::whitespace::is_whitespace_sensitive;

/// Overall outcome of a raw comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareStatus {
    /// No differences were recorded.
    Equal,
    /// At least one difference; carries the kind of the first one.
    Unequal(DiffKind),
}

impl CompareStatus {
    /// True when nothing differs.
    pub fn is_equal(self) -> bool {
        self == CompareStatus::Equal
    }
}

/// Compares two trees and returns the status and every raw difference.
pub fn compare_nodes(
    left: &NodeRef,
    right: &NodeRef,
    options: &ResolvedMatchOptions,
) -> (CompareStatus, Vec<DiffNode>) {
    let mut comparator = Comparator::new(options);
    comparator.compare_node(left, right);
    let diffs = comparator.finish();
    let status = diffs
        .first()
        .map_or(CompareStatus::Equal, |d| CompareStatus::Unequal(d.kind()));
    debug!(differences = diffs.len(), ?status, "structural comparison done");
    (status, diffs)
}

/// Walks two trees and collects differences.
pub struct Comparator<'a> {
    options: &'a ResolvedMatchOptions,
    diffs: Vec<DiffNode>,
    /// Subtree digests keyed by node id.
    digests: FxHashMap<u64, [u8; 16]>,
}

impl<'a> Comparator<'a> {
    /// Creates a comparator for one comparison.
    pub fn new(options: &'a ResolvedMatchOptions) -> Self {
        Comparator {
            options,
            diffs: Vec::new(),
            digests: FxHashMap::default(),
        }
    }

    /// Returns the collected differences.
    pub fn finish(self) -> Vec<DiffNode> {
        self.diffs
    }

    fn record(&mut self, diff: DiffNode) {
        trace!(path = diff.path(), kind = %diff.kind(), reason = diff.reason(), "difference");
        self.diffs.push(diff);
    }

    /// Compares two nodes and their subtrees.
    pub fn compare_node(&mut self, left: &NodeRef, right: &NodeRef) {
        if self.digest(left) == self.digest(right) {
            return;
        }

        let left_content = left.borrow().content().clone();
        let right_content = right.borrow().content().clone();
        match (&left_content, &right_content) {
            (NodeContent::Root, NodeContent::Root) => self.compare_children(left, right),
            (NodeContent::Element(_), NodeContent::Element(_)) => self.compare_elements(left, right),
            (
                NodeContent::Text(_) | NodeContent::CData(_),
                NodeContent::Text(_) | NodeContent::CData(_),
            ) => self.compare_text(left, right, &left_content, &right_content),
            (NodeContent::Comment(a), NodeContent::Comment(b)) => {
                if a.value() != b.value() {
                    self.record(
                        DiffNode::new(
                            DiffKind::UnequalComments,
                            Dimension::Comments,
                            Some(left.clone()),
                            Some(right.clone()),
                            "comment content differs",
                        )
                        .with_values(Some(a.value().to_string()), Some(b.value().to_string())),
                    );
                }
            }
            (NodeContent::ProcessingInstruction(a), NodeContent::ProcessingInstruction(b)) => {
                if a.target() != b.target() {
                    self.record(
                        DiffNode::new(
                            DiffKind::UnequalProcessingInstructions,
                            Dimension::ProcessingInstructionTarget,
                            Some(left.clone()),
                            Some(right.clone()),
                            format!(
                                "processing instruction target differs: {} vs {}",
                                a.target(),
                                b.target()
                            ),
                        )
                        .with_values(Some(a.target().to_string()), Some(b.target().to_string())),
                    );
                } else if a.data().trim() != b.data().trim() {
                    self.record(
                        DiffNode::new(
                            DiffKind::UnequalProcessingInstructions,
                            Dimension::TextContent,
                            Some(left.clone()),
                            Some(right.clone()),
                            format!("processing instruction <?{}?> content differs", a.target()),
                        )
                        .with_values(Some(a.data().to_string()), Some(b.data().to_string())),
                    );
                }
            }
            (NodeContent::Root, _) | (_, NodeContent::Root) => {
                debug!(
                    left = left_content.kind_name(),
                    right = right_content.kind_name(),
                    "unhandled node pairing treated as equivalent"
                );
            }
            _ => self.record(DiffNode::new(
                DiffKind::UnequalNodeTypes,
                Dimension::ElementStructure,
                Some(left.clone()),
                Some(right.clone()),
                format!(
                    "node kinds differ: {} vs {}",
                    left_content.kind_name(),
                    right_content.kind_name()
                ),
            )),
        }
    }

    fn compare_elements(&mut self, left: &NodeRef, right: &NodeRef) {
        {
            let l = left.borrow();
            let r = right.borrow();
            let (Some(a), Some(b)) = (l.as_element(), r.as_element()) else {
                return;
            };

            if a.name() != b.name() {
                let diff = DiffNode::new(
                    DiffKind::UnequalElements,
                    Dimension::ElementStructure,
                    Some(left.clone()),
                    Some(right.clone()),
                    format!("element name differs: <{}> vs <{}>", a.qname(), b.qname()),
                )
                .with_values(Some(a.qname()), Some(b.qname()));
                self.record(diff);
                return;
            }

            let mut pending = Vec::new();
            if a.namespace_uri() != b.namespace_uri() {
                pending.push(
                    DiffNode::new(
                        DiffKind::UnequalNamespaces,
                        Dimension::NamespaceUri,
                        Some(left.clone()),
                        Some(right.clone()),
                        format!(
                            "namespace of <{}> differs: {} vs {}",
                            a.name(),
                            a.namespace_uri().unwrap_or("(none)"),
                            b.namespace_uri().unwrap_or("(none)")
                        ),
                    )
                    .with_values(
                        a.namespace_uri().map(str::to_string),
                        b.namespace_uri().map(str::to_string),
                    ),
                );
            }
            if !same_declarations(a.namespace_decls(), b.namespace_decls()) {
                pending.push(DiffNode::new(
                    DiffKind::UnequalNamespaceDeclarations,
                    Dimension::AttributePresence,
                    Some(left.clone()),
                    Some(right.clone()),
                    format!("namespace declarations on <{}> differ", a.qname()),
                ));
            }
            pending.extend(attributes::compare_attributes(
                left,
                right,
                a,
                b,
                self.options,
            ));
            for diff in pending {
                self.record(diff);
            }
        }

        self.compare_children(left, right);
    }

    fn compare_text(
        &mut self,
        left: &NodeRef,
        right: &NodeRef,
        left_content: &NodeContent,
        right_content: &NodeContent,
    ) {
        let a = left_content.text_value().unwrap_or("");
        let b = right_content.text_value().unwrap_or("");
        if a == b {
            return;
        }
        let blank = a.trim().is_empty() && b.trim().is_empty();
        let dimension = if blank && !self.options.format().is_data() {
            Dimension::StructuralWhitespace
        } else {
            Dimension::TextContent
        };
        self.record(
            DiffNode::new(
                DiffKind::UnequalText,
                dimension,
                Some(left.clone()),
                Some(right.clone()),
                "text content differs",
            )
            .with_values(Some(a.to_string()), Some(b.to_string())),
        );
    }

    fn compare_children(&mut self, left: &NodeRef, right: &NodeRef) {
        let left_children = self.comparable_children(left);
        let right_children = self.comparable_children(right);

        let is_object = self.options.format().is_data() && is_data_object(left);
        let is_array = self.options.format().is_data() && !is_object;
        let all_elements = left_children
            .iter()
            .chain(right_children.iter())
            .all(|n| n.borrow().content().is_element());

        if is_object || (self.options.semantic_diff() && all_elements && !is_array) {
            let position_dimension = if is_object {
                Dimension::KeyOrder
            } else {
                Dimension::ElementPosition
            };
            self.compare_matched(&left_children, &right_children, position_dimension);
        } else {
            self.compare_positional(&left_children, &right_children);
        }
    }

    /// Compares matched pairs and reports one-sided elements. A pair counts as
    /// moved when its ordinal among the compared siblings differs between the
    /// two sides. Siblings dropped as formatting do not count; the reported
    /// values are the positions among all children.
    fn compare_matched(&mut self, left: &[NodeRef], right: &[NodeRef], position: Dimension) {
        let report_moves = self.options.behavior(position) != Behavior::Ignore;
        for m in match_elements(left, right, self.options.identity_attributes()) {
            match m {
                ElementMatch::Matched {
                    left,
                    right,
                    left_pos,
                    right_pos,
                } => {
                    if left_pos != right_pos && report_moves {
                        let name = left.borrow().content().display_value();
                        let from = left.borrow().child_pos().unwrap_or(left_pos);
                        let to = right.borrow().child_pos().unwrap_or(right_pos);
                        self.record(
                            DiffNode::new(
                                DiffKind::ElementMoved,
                                position,
                                Some(left.clone()),
                                Some(right.clone()),
                                format!("<{}> moved from position {} to {}", name, from, to),
                            )
                            .with_values(Some(from.to_string()), Some(to.to_string())),
                        );
                    }
                    self.compare_node(&left, &right);
                }
                ElementMatch::Deleted { left, .. } => self.missing(Some(left), None),
                ElementMatch::Inserted { right, .. } => self.missing(None, Some(right)),
            }
        }
    }

    /// Pairs siblings by index. A comment or whitespace-only text facing a
    /// node of another kind is reported missing on its own instead of
    /// shifting every later pair.
    fn compare_positional(&mut self, left: &[NodeRef], right: &[NodeRef]) {
        let (mut i, mut j) = (0, 0);
        loop {
            match (left.get(i), right.get(j)) {
                (Some(l), Some(r)) => {
                    let same_kind = same_kind(l, r);
                    if !same_kind && detachable(l) {
                        self.missing(Some(l.clone()), None);
                        i += 1;
                    } else if !same_kind && detachable(r) {
                        self.missing(None, Some(r.clone()));
                        j += 1;
                    } else {
                        self.compare_node(l, r);
                        i += 1;
                        j += 1;
                    }
                }
                (Some(l), None) => {
                    self.missing(Some(l.clone()), None);
                    i += 1;
                }
                (None, Some(r)) => {
                    self.missing(None, Some(r.clone()));
                    j += 1;
                }
                (None, None) => break,
            }
        }
    }

    /// Records a node present on one side only.
    fn missing(&mut self, left: Option<NodeRef>, right: Option<NodeRef>) {
        let Some(present) = left.as_ref().or(right.as_ref()) else {
            return;
        };
        let (dimension, description, value) = {
            let node = present.borrow();
            let content = node.content();
            let dimension = match content {
                NodeContent::Text(t) | NodeContent::CData(t) => {
                    if !self.options.format().is_data()
                        && !t.value().is_empty()
                        && t.value().trim().is_empty()
                    {
                        Dimension::StructuralWhitespace
                    } else {
                        Dimension::TextContent
                    }
                }
                NodeContent::Comment(_) => Dimension::Comments,
                NodeContent::Root
                | NodeContent::Element(_)
                | NodeContent::ProcessingInstruction(_) => Dimension::ElementStructure,
            };
            let description = match content {
                NodeContent::Element(e) => format!("<{}>", e.qname()),
                other => other.kind_name().to_string(),
            };
            (dimension, description, content.display_value())
        };
        let (reason, values) = if left.is_some() {
            (
                format!("{} missing from right", description),
                (Some(value), None),
            )
        } else {
            (
                format!("{} missing from left", description),
                (None, Some(value)),
            )
        };
        self.record(
            DiffNode::new(DiffKind::MissingNode, dimension, left, right, reason)
                .with_values(values.0, values.1),
        );
    }

    /// Children that take part in pairing: ignored comments and droppable
    /// whitespace-only text are left out. Text in a data tree is a scalar
    /// value and is never dropped.
    fn comparable_children(&self, parent: &NodeRef) -> Vec<NodeRef> {
        let skip_comments = self.options.behavior(Dimension::Comments) == Behavior::Ignore;
        let skip_blank = !self.options.format().is_data()
            && self.options.behavior(Dimension::StructuralWhitespace) != Behavior::Strict
            && !is_whitespace_sensitive(parent, self.options);
        parent
            .borrow()
            .children()
            .iter()
            .filter(|child| {
                let child = child.borrow();
                let content = child.content();
                !(skip_comments && content.is_comment() || skip_blank && content.is_blank_text())
            })
            .cloned()
            .collect()
    }

    /// MD5 digest of a whole subtree, memoized per node.
    fn digest(&mut self, node: &NodeRef) -> [u8; 16] {
        let id = node.borrow().id();
        if let Some(digest) = self.digests.get(&id) {
            return *digest;
        }
        let children = node.borrow().children().to_vec();
        let mut hasher = Md5::new();
        node.borrow().content().digest_into(&mut hasher);
        hasher.update((children.len() as u64).to_le_bytes());
        for child in &children {
            hasher.update(self.digest(child));
        }
        let digest: [u8; 16] = hasher.finalize().into();
        self.digests.insert(id, digest);
        digest
    }
}

fn is_data_object(node: &NodeRef) -> bool {
    node.borrow()
        .as_element()
        .is_some_and(|e| e.name() == data::OBJECT)
}

fn same_kind(a: &NodeRef, b: &NodeRef) -> bool {
    let (a, b) = (a.borrow(), b.borrow());
    let (a, b) = (a.content(), b.content());
    (a.is_text_like() && b.is_text_like()) || std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn detachable(node: &NodeRef) -> bool {
    let node = node.borrow();
    node.content().is_comment() || node.content().is_blank_text()
}

fn same_declarations(a: &[(String, String)], b: &[(String, String)]) -> bool {
    a.len() == b.len() && a.iter().all(|d| b.contains(d))
}
