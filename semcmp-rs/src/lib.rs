//! semcmp - Semantic equivalence for markup and data documents
//!
//! This library decides whether two documents are *semantically* equivalent
//! under a configurable policy, rather than byte-identical. It works on XML,
//! HTML, JSON and YAML, all read into one node tree model.
//!
//! # Overview
//!
//! A comparison runs in four steps:
//!
//! 1. **Resolve options.** Format defaults, profiles and overrides are merged
//!    into one [`ResolvedMatchOptions`] value that sets a behavior
//!    (`strict`, `normalize`, `ignore`) per match dimension.
//! 2. **Compare structurally.** Both trees are walked in parallel. Sibling
//!    elements are paired by name and identity attributes, so reordered
//!    siblings are recognized as moved rather than deleted and inserted.
//! 3. **Classify.** Every difference found is tagged *normative*,
//!    *informative* or *formatting* according to its dimension's behavior.
//! 4. **Report.** A [`ComparisonResult`] is equivalent when no difference is
//!    normative.
//!
//! # Example
//!
//! ```
//! use semcmp::{compare_documents, Format, Overrides, ResolveArgs};
//!
//! let args = ResolveArgs::new().overrides(Overrides::new().set("attribute_order", "ignore"));
//! let result = compare_documents(
//!     r#"<a x="1" y="2"/>"#,
//!     r#"<a y="2" x="1"/>"#,
//!     Format::Xml,
//!     &args,
//! )
//! .unwrap();
//! assert!(result.equivalent());
//! ```

pub mod compare;
pub mod config;
pub mod constants;
pub mod data;
pub mod diff;
pub mod document;
pub mod error;
pub mod matching;
pub mod node;
pub mod options;
pub mod result;
pub mod whitespace;
pub mod xml;

// Re-export commonly used types
pub use compare::{compare_nodes, Comparator, CompareStatus};
pub use config::{FormatConfig, GlobalConfig};
pub use diff::{classify, classify_all, Classification, DiffKind, DiffNode};
pub use document::{compare_documents, compare_files, parse_document, serialize};
pub use error::{ConfigError, Error, Result};
pub use matching::{match_elements, ElementMatch, SiblingMatcher};
pub use node::{
    new_node, new_root, Attribute, Element, NodeContent, NodeInner, NodeRef, WeakNodeRef,
};
pub use options::{
    lookup_profile, profile_names, register_profile, resolve_options, Behavior, Dimension, Format,
    Overrides, Preprocessing, Profile, ProfileBuilder, ResolveArgs, ResolvedMatchOptions,
};
pub use result::{compare, ComparisonResult, DiffSummary};
pub use whitespace::is_whitespace_sensitive;
