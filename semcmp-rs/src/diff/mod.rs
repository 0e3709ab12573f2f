//! Detected differences and their classification.
//!
//! The comparator records a [`DiffNode`] for every mismatch it sees. Each one
//! starts unclassified; [`classify`] later decides whether it is normative,
//! informative or pure formatting.

mod classifier;

pub use classifier::{classify, classify_all, normalize_whitespace};

use std::fmt;

use crate::node::{node_path, NodeRef};
use crate::options::Dimension;

/// What a detected difference is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Element names differ.
    UnequalElements,
    /// Element namespace URIs differ.
    UnequalNamespaces,
    /// Namespace declarations on an element differ.
    UnequalNamespaceDeclarations,
    /// An attribute exists on one side only.
    MissingAttribute,
    /// An attribute has different values.
    UnequalAttributeValues,
    /// The same attributes are written in a different order.
    UnequalAttributeOrder,
    /// Text or CDATA content differs.
    UnequalText,
    /// Comment content differs.
    UnequalComments,
    /// Processing instructions differ.
    UnequalProcessingInstructions,
    /// Nodes paired by position are of different kinds.
    UnequalNodeTypes,
    /// A node exists on one side only.
    MissingNode,
    /// A matched element sits at a different sibling position.
    ElementMoved,
}

impl DiffKind {
    /// Returns the upper-case status code.
    pub fn code(self) -> &'static str {
        match self {
            DiffKind::UnequalElements => "UNEQUAL_ELEMENTS",
            DiffKind::UnequalNamespaces => "UNEQUAL_NAMESPACES",
            DiffKind::UnequalNamespaceDeclarations => "UNEQUAL_NAMESPACE_DECLARATIONS",
            DiffKind::MissingAttribute => "MISSING_ATTRIBUTE",
            DiffKind::UnequalAttributeValues => "UNEQUAL_ATTRIBUTES",
            DiffKind::UnequalAttributeOrder => "UNEQUAL_ATTRIBUTE_ORDER",
            DiffKind::UnequalText => "UNEQUAL_TEXT_CONTENTS",
            DiffKind::UnequalComments => "UNEQUAL_COMMENTS",
            DiffKind::UnequalProcessingInstructions => "UNEQUAL_PROCESSING_INSTRUCTIONS",
            DiffKind::UnequalNodeTypes => "UNEQUAL_NODES_TYPES",
            DiffKind::MissingNode => "MISSING_NODE",
            DiffKind::ElementMoved => "ELEMENT_MOVED",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Severity of a difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Breaks equivalence.
    Normative,
    /// Reported, harmless.
    Informative,
    /// Attributable to serialization or whitespace layout only.
    Formatting,
}

impl Classification {
    /// Returns the lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Classification::Normative => "normative",
            Classification::Informative => "informative",
            Classification::Formatting => "formatting",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected difference between two trees.
#[derive(Debug, Clone)]
pub struct DiffNode {
    /// Node in the left tree (absent for insertions).
    left: Option<NodeRef>,
    /// Node in the right tree (absent for deletions).
    right: Option<NodeRef>,
    dimension: Dimension,
    kind: DiffKind,
    reason: String,
    /// Location of the difference, taken from the left node when present.
    path: String,
    /// Compared value on the left, if the difference is about a value.
    left_value: Option<String>,
    /// Compared value on the right.
    right_value: Option<String>,
    /// Assigned by the classifier, never at construction.
    classification: Option<Classification>,
}

impl DiffNode {
    /// Creates an unclassified difference.
    pub fn new(
        kind: DiffKind,
        dimension: Dimension,
        left: Option<NodeRef>,
        right: Option<NodeRef>,
        reason: impl Into<String>,
    ) -> Self {
        let path = left
            .as_ref()
            .or(right.as_ref())
            .map(node_path)
            .unwrap_or_else(|| "/".to_string());
        DiffNode {
            left,
            right,
            dimension,
            kind,
            reason: reason.into(),
            path,
            left_value: None,
            right_value: None,
            classification: None,
        }
    }

    /// Attaches the compared values.
    pub fn with_values(mut self, left: Option<String>, right: Option<String>) -> Self {
        self.left_value = left;
        self.right_value = right;
        self
    }

    /// Returns the left node.
    pub fn left(&self) -> Option<&NodeRef> {
        self.left.as_ref()
    }

    /// Returns the right node.
    pub fn right(&self) -> Option<&NodeRef> {
        self.right.as_ref()
    }

    /// Returns the responsible dimension.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Returns the kind of difference.
    pub fn kind(&self) -> DiffKind {
        self.kind
    }

    /// Returns the human-readable reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the location of the difference.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the left compared value.
    pub fn left_value(&self) -> Option<&str> {
        self.left_value.as_deref()
    }

    /// Returns the right compared value.
    pub fn right_value(&self) -> Option<&str> {
        self.right_value.as_deref()
    }

    /// Returns the classification, `None` until classified.
    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    /// True once classified as normative.
    pub fn is_normative(&self) -> bool {
        self.classification == Some(Classification::Normative)
    }

    pub(crate) fn set_classification(&mut self, classification: Classification) {
        self.classification = Some(classification);
    }
}

impl fmt::Display for DiffNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.classification.map(|c| c.name()).unwrap_or("unclassified");
        write!(
            f,
            "[{}] {} {}: {}",
            class, self.dimension, self.path, self.reason
        )
    }
}
