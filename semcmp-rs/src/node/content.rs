//! Content types for tree nodes.
//!
//! `NodeContent` is the closed set of node kinds every collaborator maps its
//! documents into. Comparison code dispatches on it exhaustively.

use md5::{Digest, Md5};

use super::namespace::split_qname;

/// Represents the content of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    /// The document root. Exactly one per tree.
    Root,
    /// An element with a name, namespace and attributes.
    Element(Element),
    /// Character data.
    Text(Text),
    /// A CDATA section.
    CData(Text),
    /// A comment.
    Comment(Comment),
    /// A processing instruction.
    ProcessingInstruction(ProcessingInstruction),
}

impl NodeContent {
    /// Returns a short human-readable name for the node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeContent::Root => "root",
            NodeContent::Element(_) => "element",
            NodeContent::Text(_) => "text",
            NodeContent::CData(_) => "cdata",
            NodeContent::Comment(_) => "comment",
            NodeContent::ProcessingInstruction(_) => "processing instruction",
        }
    }

    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, NodeContent::Element(_))
    }

    /// Returns true for text and CDATA nodes.
    pub fn is_text_like(&self) -> bool {
        matches!(self, NodeContent::Text(_) | NodeContent::CData(_))
    }

    /// Returns true if this is a comment node.
    pub fn is_comment(&self) -> bool {
        matches!(self, NodeContent::Comment(_))
    }

    /// Returns true for text or CDATA consisting only of whitespace.
    pub fn is_blank_text(&self) -> bool {
        self.text_value().is_some_and(|t| t.trim().is_empty())
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the character data of text and CDATA nodes.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            NodeContent::Text(t) | NodeContent::CData(t) => Some(t.value()),
            _ => None,
        }
    }

    /// Returns the comparable value of this node as a string.
    ///
    /// Elements render as their qualified name; the root renders empty.
    pub fn display_value(&self) -> String {
        match self {
            NodeContent::Root => String::new(),
            NodeContent::Element(e) => e.qname(),
            NodeContent::Text(t) | NodeContent::CData(t) => t.value().to_string(),
            NodeContent::Comment(c) => c.value().to_string(),
            NodeContent::ProcessingInstruction(pi) => pi.data().to_string(),
        }
    }

    /// True when both contents are the same kind and, for elements, share a name.
    pub fn same_label(&self, other: &NodeContent) -> bool {
        match (self, other) {
            (NodeContent::Element(a), NodeContent::Element(b)) => a.same_name(b),
            (NodeContent::ProcessingInstruction(a), NodeContent::ProcessingInstruction(b)) => {
                a.target == b.target
            }
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    /// Feeds this node's own content (not its children) into an MD5 hasher.
    pub fn digest_into(&self, hasher: &mut Md5) {
        match self {
            NodeContent::Root => hasher.update([0u8]),
            NodeContent::Element(e) => {
                hasher.update([1u8]);
                e.digest_into(hasher);
            }
            NodeContent::Text(t) => {
                hasher.update([2u8]);
                update_str(hasher, t.value());
            }
            NodeContent::CData(t) => {
                hasher.update([3u8]);
                update_str(hasher, t.value());
            }
            NodeContent::Comment(c) => {
                hasher.update([4u8]);
                update_str(hasher, c.value());
            }
            NodeContent::ProcessingInstruction(pi) => {
                hasher.update([5u8]);
                update_str(hasher, pi.target());
                update_str(hasher, pi.data());
            }
        }
    }
}

/// Hashes a length-prefixed string so adjacent fields cannot run together.
fn update_str(hasher: &mut Md5, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// One attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (e.g. `xml:space`, `href`).
    name: String,
    /// Namespace URI the prefix resolved to, if any.
    namespace_uri: Option<String>,
    /// Attribute value with entities resolved.
    value: String,
}

impl Attribute {
    /// Creates an attribute without a namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            namespace_uri: None,
            value: value.into(),
        }
    }

    /// Creates an attribute bound to a namespace URI.
    pub fn with_namespace(
        name: impl Into<String>,
        namespace_uri: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Attribute {
            name: name.into(),
            namespace_uri: Some(namespace_uri.into()),
            value: value.into(),
        }
    }

    /// Returns the qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the local part of the name.
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Returns the namespace URI.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Identity of the attribute for set comparison: namespace URI plus local
    /// name when namespaced, the plain name otherwise.
    pub fn key(&self) -> (Option<&str>, &str) {
        match &self.namespace_uri {
            Some(uri) => (Some(uri.as_str()), self.local_name()),
            None => (None, self.name.as_str()),
        }
    }
}

/// An element with a name, namespace information and ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name.
    name: String,
    /// Prefix as written, if any.
    prefix: Option<String>,
    /// Resolved namespace URI, if any.
    namespace_uri: Option<String>,
    /// Namespace declarations on this element, in document order (prefix, URI).
    /// The default namespace uses an empty prefix.
    namespace_decls: Vec<(String, String)>,
    /// Attributes in document order.
    attributes: Vec<Attribute>,
}

impl Element {
    /// Creates an element with no namespace and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            prefix: None,
            namespace_uri: None,
            namespace_decls: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Sets the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the namespace URI.
    pub fn with_namespace_uri(mut self, uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(uri.into());
        self
    }

    /// Appends a namespace declaration.
    pub fn with_namespace_decl(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespace_decls.push((prefix.into(), uri.into()));
        self
    }

    /// Appends an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Appends a plain attribute.
    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_attribute(Attribute::new(name, value))
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the qualified name (`prefix:name` or `name`).
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(p) if !p.is_empty() => format!("{}:{}", p, self.name),
            _ => self.name.clone(),
        }
    }

    /// Returns the namespace URI.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// Returns namespace declarations on this element.
    pub fn namespace_decls(&self) -> &[(String, String)] {
        &self.namespace_decls
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Mutable access for collaborators that reorder attributes.
    pub(crate) fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }

    /// Looks up an attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Looks up an attribute value by namespace URI and local name.
    pub fn attribute_ns(&self, namespace_uri: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace_uri() == Some(namespace_uri) && a.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    /// Compares names with namespace awareness: local name plus namespace URI.
    pub fn same_name(&self, other: &Element) -> bool {
        self.name == other.name && self.namespace_uri == other.namespace_uri
    }

    fn digest_into(&self, hasher: &mut Md5) {
        update_str(hasher, &self.name);
        update_str(hasher, self.prefix.as_deref().unwrap_or(""));
        update_str(hasher, self.namespace_uri.as_deref().unwrap_or(""));
        hasher.update((self.namespace_decls.len() as u64).to_le_bytes());
        for (prefix, uri) in &self.namespace_decls {
            update_str(hasher, prefix);
            update_str(hasher, uri);
        }
        hasher.update((self.attributes.len() as u64).to_le_bytes());
        for attr in &self.attributes {
            update_str(hasher, &attr.name);
            update_str(hasher, attr.namespace_uri.as_deref().unwrap_or(""));
            update_str(hasher, &attr.value);
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.qname())?;
        for attr in &self.attributes {
            write!(f, " {}=\"{}\"", attr.name, attr.value)?;
        }
        write!(f, ">")
    }
}

/// Character data (also used for CDATA sections).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    value: String,
}

impl Text {
    /// Creates a new text value.
    pub fn new(value: impl Into<String>) -> Self {
        Text {
            value: value.into(),
        }
    }

    /// Returns the text.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Comment content (without the `<!--` and `-->` markers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    value: String,
}

impl Comment {
    /// Creates a new comment.
    pub fn new(value: impl Into<String>) -> Self {
        Comment {
            value: value.into(),
        }
    }

    /// Returns the comment text.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Processing instruction content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    /// The target of the PI (e.g., "xml-stylesheet").
    target: String,
    /// Everything after the target.
    data: String,
}

impl ProcessingInstruction {
    /// Creates a new PI from target and data strings.
    pub fn new(target: impl Into<String>, data: impl Into<String>) -> Self {
        ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        }
    }

    /// Returns the PI target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the PI data.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl std::fmt::Display for ProcessingInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.data.is_empty() {
            write!(f, "<?{}?>", self.target)
        } else {
            write!(f, "<?{} {}?>", self.target, self.data)
        }
    }
}
