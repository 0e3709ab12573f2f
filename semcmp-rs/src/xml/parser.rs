//! Markup parser that builds node trees.
//!
//! Uses quick-xml's streaming API. Whitespace text, CDATA sections, comments
//! and processing instructions are kept unless the preprocessing mode says
//! otherwise. HTML input is read leniently: names are lowercased, void
//! elements never open a scope and stray end tags are tolerated.

use std::fs;
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::constants::{
    HTML_VOID_ELEMENTS, HTML_WHITESPACE_SENSITIVE, XML_SPACE_DEFAULT, XML_SPACE_PRESERVE,
};
use crate::diff::normalize_whitespace;
use crate::error::{Error, Result};
use crate::node::namespace::{declared_prefix, is_xmlns_attr, split_qname, NamespaceContext};
use crate::node::{
    new_node, new_root, Attribute, Comment, Element, NodeContent, NodeInner, NodeRef,
    ProcessingInstruction, Text,
};
use crate::options::{Format, Preprocessing};

/// Markup parser configured for one dialect and preprocessing mode.
#[derive(Debug, Clone, Copy)]
pub struct MarkupParser {
    html: bool,
    preprocessing: Preprocessing,
}

impl MarkupParser {
    /// Creates a parser for XML.
    pub fn xml(preprocessing: Preprocessing) -> Self {
        MarkupParser {
            html: false,
            preprocessing,
        }
    }

    /// Creates a lenient parser for HTML.
    pub fn html(preprocessing: Preprocessing) -> Self {
        MarkupParser {
            html: true,
            preprocessing,
        }
    }

    /// Parses markup from a string.
    pub fn parse_str(&self, markup: &str) -> Result<NodeRef> {
        let mut reader = Reader::from_str(markup);
        let config = reader.config_mut();
        config.trim_text_start = false;
        config.trim_text_end = false;
        config.check_end_names = !self.html;
        self.parse_reader(&mut reader)
    }

    /// Parses markup from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<NodeRef> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    fn parse_reader(&self, reader: &mut Reader<&[u8]>) -> Result<NodeRef> {
        let mut builder = TreeBuilder::new(*self);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let (element, preserve) = builder.open(&e, reader)?;
                    if self.html && HTML_VOID_ELEMENTS.contains(&element.name()) {
                        builder.add_leaf(element);
                    } else {
                        builder.push(element, preserve);
                    }
                }
                Ok(Event::End(e)) => {
                    let name = decode(reader, e.name().as_ref())?.into_owned();
                    builder.close(&name)?;
                }
                Ok(Event::Empty(e)) => {
                    let (element, _) = builder.open(&e, reader)?;
                    builder.add_leaf(element);
                }
                Ok(Event::Text(e)) => {
                    let raw = decode(reader, e.as_ref())?;
                    let text = unescape(&raw).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.text(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name = decode(reader, &e)?;
                    let resolved = resolve_entity(&name, self.html)?;
                    builder.text(&resolved);
                }
                Ok(Event::CData(e)) => {
                    let text = decode(reader, e.as_ref())?;
                    builder.cdata(&text);
                }
                Ok(Event::Comment(e)) => {
                    let text = decode(reader, e.as_ref())?;
                    builder.comment(&text);
                }
                Ok(Event::PI(e)) => {
                    let raw = decode(reader, &e)?;
                    let (target, data) = raw
                        .split_once(char::is_whitespace)
                        .map(|(t, d)| (t.to_string(), d.to_string()))
                        .unwrap_or_else(|| (raw.to_string(), String::new()));
                    builder.processing_instruction(target, data);
                }
                Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e)),
            }
        }

        builder.finish()
    }
}

fn decode<'b>(reader: &Reader<&[u8]>, bytes: &'b [u8]) -> Result<std::borrow::Cow<'b, str>> {
    reader
        .decoder()
        .decode(bytes)
        .map_err(|e| Error::Parse(e.to_string()))
}

/// Resolves a general entity reference (`&name;` without the delimiters).
fn resolve_entity(name: &str, html: bool) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return value
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::Parse(format!("invalid character reference &{};", name)));
    }
    let known = match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "nbsp" if html => Some("\u{a0}"),
        "copy" if html => Some("\u{a9}"),
        "reg" if html => Some("\u{ae}"),
        "hellip" if html => Some("\u{2026}"),
        "mdash" if html => Some("\u{2014}"),
        "ndash" if html => Some("\u{2013}"),
        _ => None,
    };
    match known {
        Some(s) => Ok(s.to_string()),
        // Browsers render unknown references literally.
        None if html => Ok(format!("&{};", name)),
        None => Err(Error::Parse(format!("unknown entity &{};", name))),
    }
}

/// An element that is still open, with the whitespace mode for its content.
struct OpenElement {
    node: NodeRef,
    qname: String,
    preserve: bool,
}

/// Accumulates events into a tree.
struct TreeBuilder {
    parser: MarkupParser,
    root: NodeRef,
    stack: Vec<OpenElement>,
    namespaces: NamespaceContext,
    /// Character data waiting for the next structural event.
    pending: Option<String>,
}

impl TreeBuilder {
    fn new(parser: MarkupParser) -> Self {
        TreeBuilder {
            parser,
            root: new_root(),
            stack: Vec::new(),
            namespaces: NamespaceContext::new(),
            pending: None,
        }
    }

    fn parent(&self) -> &NodeRef {
        self.stack.last().map(|open| &open.node).unwrap_or(&self.root)
    }

    fn preserving(&self) -> bool {
        self.stack.last().is_some_and(|open| open.preserve)
    }

    fn append(&mut self, content: NodeContent) -> NodeRef {
        let node = new_node(content);
        NodeInner::add_child_to_ref(self.parent(), node.clone());
        node
    }

    fn text(&mut self, text: &str) {
        self.pending.get_or_insert_with(String::new).push_str(text);
    }

    fn cdata(&mut self, text: &str) {
        if self.parser.preprocessing == Preprocessing::None || self.preserving() {
            self.flush_text();
            self.append(NodeContent::CData(Text::new(text)));
        } else {
            self.text(text);
        }
    }

    fn comment(&mut self, text: &str) {
        let drop_comments = matches!(
            self.parser.preprocessing,
            Preprocessing::Canonicalize | Preprocessing::Rendered
        );
        if drop_comments {
            return;
        }
        self.flush_text();
        self.append(NodeContent::Comment(Comment::new(text)));
    }

    fn processing_instruction(&mut self, target: String, data: String) {
        self.flush_text();
        self.append(NodeContent::ProcessingInstruction(ProcessingInstruction::new(
            target, data,
        )));
    }

    /// Emits pending character data according to the preprocessing mode.
    /// Blank text outside the document element is never kept.
    fn flush_text(&mut self) {
        let Some(text) = self.pending.take() else {
            return;
        };
        if self.stack.is_empty() && text.trim().is_empty() {
            return;
        }
        let kept = if self.preserving() {
            Some(text)
        } else {
            match self.parser.preprocessing {
                Preprocessing::None => Some(text),
                Preprocessing::PrettyFormat => (!text.trim().is_empty()).then_some(text),
                Preprocessing::Normalize
                | Preprocessing::Canonicalize
                | Preprocessing::Rendered => {
                    let collapsed = normalize_whitespace(&text);
                    (!collapsed.is_empty()).then_some(collapsed)
                }
            }
        };
        if let Some(text) = kept.filter(|t| !t.is_empty()) {
            self.append(NodeContent::Text(Text::new(text)));
        }
    }

    /// Builds an element from a start tag and opens its namespace scope.
    /// Returns the element and whether its content preserves whitespace.
    fn open(&mut self, e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<(Element, bool)> {
        self.flush_text();

        let mut qname = decode(reader, e.name().as_ref())?.into_owned();
        if self.parser.html {
            qname = qname.to_ascii_lowercase();
        }

        let attributes = if self.parser.html {
            e.html_attributes()
        } else {
            e.attributes()
        };
        let mut raw = Vec::new();
        for attr in attributes {
            let attr = attr.map_err(|e| Error::Parse(format!("attribute error: {}", e)))?;
            let mut key = decode(reader, attr.key.as_ref())?.into_owned();
            if self.parser.html {
                key = key.to_ascii_lowercase();
            }
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .into_owned();
            raw.push((key, value));
        }

        self.namespaces.push_scope();
        let mut decls = Vec::new();
        for (key, value) in raw.iter().filter(|(k, _)| is_xmlns_attr(k)) {
            let prefix = declared_prefix(key);
            self.namespaces.bind(prefix, value);
            decls.push((prefix.to_string(), value.clone()));
        }

        let (prefix, local) = split_qname(&qname);
        let mut element = Element::new(local);
        if let Some(prefix) = prefix {
            element = element.with_prefix(prefix);
        }
        if let Some(uri) = self.namespaces.resolve_element(prefix) {
            element = element.with_namespace_uri(uri);
        }

        let canonical = self.parser.preprocessing == Preprocessing::Canonicalize;
        if canonical {
            decls.sort();
        }
        for (prefix, uri) in decls {
            element = element.with_namespace_decl(prefix, uri);
        }
        for (key, value) in raw.into_iter().filter(|(k, _)| !is_xmlns_attr(k)) {
            let (prefix, _) = split_qname(&key);
            let attribute = match self.namespaces.resolve_attribute(prefix) {
                Some(uri) => Attribute::with_namespace(key.as_str(), uri, value),
                None => Attribute::new(key, value),
            };
            element = element.with_attribute(attribute);
        }
        if canonical {
            element
                .attributes_mut()
                .sort_by(|a, b| a.key().cmp(&b.key()));
        }

        let preserve = self.content_preserves(&element);
        Ok((element, preserve))
    }

    fn content_preserves(&self, element: &Element) -> bool {
        let xml_space = element
            .attributes()
            .iter()
            .find(|a| a.name() == "xml:space")
            .map(|a| a.value());
        match xml_space {
            Some(XML_SPACE_PRESERVE) => true,
            Some(XML_SPACE_DEFAULT) => false,
            _ => {
                self.preserving()
                    || (self.parser.html && HTML_WHITESPACE_SENSITIVE.contains(&element.name()))
            }
        }
    }

    fn push(&mut self, element: Element, preserve: bool) {
        let qname = element.qname();
        let node = self.append(NodeContent::Element(element));
        self.stack.push(OpenElement {
            node,
            qname,
            preserve,
        });
    }

    fn add_leaf(&mut self, element: Element) {
        self.append(NodeContent::Element(element));
        self.namespaces.pop_scope();
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.flush_text();
        if !self.parser.html {
            self.stack.pop();
            self.namespaces.pop_scope();
            return Ok(());
        }

        let name = name.to_ascii_lowercase();
        // Unknown end tags (and end tags of void elements) are dropped.
        let Some(depth) = self.stack.iter().rposition(|open| open.qname == name) else {
            return Ok(());
        };
        while self.stack.len() > depth {
            self.stack.pop();
            self.namespaces.pop_scope();
        }
        Ok(())
    }

    fn finish(mut self) -> Result<NodeRef> {
        self.flush_text();
        if !self.parser.html {
            if let Some(open) = self.stack.last() {
                return Err(Error::Parse(format!("unclosed element <{}>", open.qname)));
            }
        }
        Ok(self.root)
    }
}

/// Parses markup in the given dialect. Data formats are read as XML.
pub fn parse_markup(markup: &str, format: Format, preprocessing: Preprocessing) -> Result<NodeRef> {
    let parser = match format {
        Format::Html => MarkupParser::html(preprocessing),
        _ => MarkupParser::xml(preprocessing),
    };
    parser.parse_str(markup)
}

/// Parses an XML string with no preprocessing.
pub fn parse_str(xml: &str) -> Result<NodeRef> {
    MarkupParser::xml(Preprocessing::None).parse_str(xml)
}

/// Parses an XML file with no preprocessing.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    MarkupParser::xml(Preprocessing::None).parse_file(path)
}
