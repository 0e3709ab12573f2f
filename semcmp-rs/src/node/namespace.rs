//! Namespace handling for markup elements.

use std::collections::HashMap;

use crate::constants::XML_NAMESPACE;

/// Tracks namespace bindings while a markup document is being parsed.
#[derive(Debug)]
pub struct NamespaceContext {
    /// Stack of scopes, each containing prefix -> URI bindings.
    scopes: Vec<HashMap<String, String>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a new namespace context with the `xml` prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            scopes: vec![HashMap::new()],
        };
        ctx.bind("xml", XML_NAMESPACE);
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope. The empty prefix is the
    /// default namespace; binding it to the empty URI undeclares it.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolves a prefix to its URI, searching from innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .map(String::as_str)
            .filter(|uri| !uri.is_empty())
    }

    /// Returns the default namespace (empty prefix binding).
    pub fn default_namespace(&self) -> Option<&str> {
        self.resolve("")
    }

    /// Resolves the namespace of an element name: prefixed names use their
    /// prefix, unprefixed names the default namespace.
    pub fn resolve_element(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some(p) => self.resolve(p),
            None => self.default_namespace(),
        }
    }

    /// Resolves the namespace of an attribute name. Unprefixed attributes are
    /// never in a namespace.
    pub fn resolve_attribute(&self, prefix: Option<&str>) -> Option<&str> {
        prefix.and_then(|p| self.resolve(p))
    }
}

/// Splits a qualified name into prefix and local name.
///
/// Returns (Some(prefix), local) for "prefix:local"
/// Returns (None, name) for "name" without prefix
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some(pos) = qname.find(':') {
        (Some(&qname[..pos]), &qname[pos + 1..])
    } else {
        (None, qname)
    }
}

/// Checks if an attribute name is a namespace declaration.
pub fn is_xmlns_attr(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

/// Returns the prefix declared by an `xmlns` attribute (empty for the default).
pub fn declared_prefix(name: &str) -> &str {
    name.strip_prefix("xmlns:").unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
        assert_eq!(split_qname("rect"), (None, "rect"));
        assert_eq!(split_qname("ns:foo:bar"), (Some("ns"), "foo:bar"));
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("svg", "http://www.w3.org/2000/svg");
        assert_eq!(ctx.resolve("svg"), Some("http://www.w3.org/2000/svg"));

        ctx.pop_scope();
        assert!(ctx.resolve("svg").is_none());
    }

    #[test]
    fn test_is_xmlns() {
        assert!(is_xmlns_attr("xmlns"));
        assert!(is_xmlns_attr("xmlns:svg"));
        assert!(!is_xmlns_attr("xml:space"));
        assert!(!is_xmlns_attr("href"));
        assert_eq!(declared_prefix("xmlns:svg"), "svg");
        assert_eq!(declared_prefix("xmlns"), "");
    }

    #[test]
    fn test_default_namespace_and_undeclare() {
        let mut ctx = NamespaceContext::new();
        assert!(ctx.default_namespace().is_none());

        ctx.push_scope();
        ctx.bind("", "http://www.w3.org/1999/xhtml");
        assert_eq!(ctx.resolve_element(None), Some("http://www.w3.org/1999/xhtml"));
        assert_eq!(ctx.resolve_attribute(None), None);

        ctx.push_scope();
        ctx.bind("", "");
        assert!(ctx.default_namespace().is_none());

        ctx.pop_scope();
        ctx.pop_scope();
        assert!(ctx.default_namespace().is_none());
    }

    #[test]
    fn test_xml_prefix_always_bound() {
        let ctx = NamespaceContext::new();
        assert_eq!(ctx.resolve("xml"), Some(XML_NAMESPACE));
    }
}
