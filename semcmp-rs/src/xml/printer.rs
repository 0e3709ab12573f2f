//! Markup printer that outputs node trees.
//!
//! Attributes are written in document order, namespace declarations first.
//! Elements without children are written self-closing. Without pretty
//! printing no whitespace is added, so output parses back to the same tree.

use std::io::Write;

use crate::node::{Element, NodeContent, NodeRef};

/// Options for markup printing.
#[derive(Debug, Clone, Default)]
pub struct XmlPrinterOptions {
    /// Whether to pretty-print with indentation.
    pub pretty_print: bool,
    /// Whether to start the output with an XML declaration.
    pub declaration: bool,
}

/// Markup printer that outputs node trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
    indent: usize,
    /// Whether anything has been written yet
    state: PrintState,
    /// Stack of "has content" flags for each element level
    content_stack: Vec<bool>,
    /// Whether current element has content
    has_content: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PrintState {
    Initial,
    Written,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter {
            writer,
            options,
            indent: 0,
            state: PrintState::Initial,
            content_stack: Vec::new(),
            has_content: true,
        }
    }

    /// Prints a whole document.
    pub fn print(&mut self, root: &NodeRef) -> std::io::Result<()> {
        if self.options.declaration {
            self.write_markup("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        }
        self.print_node(root)?;
        if !self.options.pretty_print && self.state != PrintState::Initial {
            writeln!(self.writer)?;
        }
        self.writer.flush()
    }

    fn print_node(&mut self, node: &NodeRef) -> std::io::Result<()> {
        let borrowed = node.borrow();
        match borrowed.content() {
            NodeContent::Root => {
                for child in borrowed.children() {
                    self.print_node(child)?;
                }
            }
            NodeContent::Element(element) => {
                self.start_element(element)?;
                for child in borrowed.children() {
                    self.print_node(child)?;
                }
                self.end_element(&element.qname())?;
            }
            NodeContent::Text(text) => self.characters(&to_entities(text.value()))?,
            NodeContent::CData(text) => {
                self.characters(&format!("<![CDATA[{}]]>", text.value()))?
            }
            NodeContent::Comment(comment) => {
                self.write_markup(&format!("<!--{}-->", comment.value()))?
            }
            NodeContent::ProcessingInstruction(pi) => self.write_markup(&pi.to_string())?,
        }
        Ok(())
    }

    /// Writes a comment or processing instruction; on its own line when pretty.
    fn write_markup(&mut self, markup: &str) -> std::io::Result<()> {
        self.close_open_tag()?;
        if self.options.pretty_print {
            write!(self.writer, "{}", Self::indent_str(self.indent))?;
        }
        self.print_with_nl(markup)?;
        self.state = PrintState::Written;
        Ok(())
    }

    fn close_open_tag(&mut self) -> std::io::Result<()> {
        if !self.has_content {
            self.print_with_nl(">")?;
            self.has_content = true;
        }
        Ok(())
    }

    fn start_element(&mut self, element: &Element) -> std::io::Result<()> {
        self.close_open_tag()?;

        let mut tag = String::new();
        tag.push('<');
        tag.push_str(&element.qname());
        for (prefix, uri) in element.namespace_decls() {
            if prefix.is_empty() {
                tag.push_str(" xmlns");
            } else {
                tag.push_str(" xmlns:");
                tag.push_str(prefix);
            }
            tag.push_str("=\"");
            tag.push_str(&to_entities(uri));
            tag.push('"');
        }
        for attr in element.attributes() {
            tag.push(' ');
            tag.push_str(attr.name());
            tag.push_str("=\"");
            tag.push_str(&to_entities(attr.value()));
            tag.push('"');
        }

        if self.options.pretty_print {
            write!(self.writer, "{}", &Self::indent_str(self.indent))?;
        }
        write!(self.writer, "{}", tag)?;

        self.content_stack.push(self.has_content);
        self.has_content = false;
        self.indent += 1;
        self.state = PrintState::Written;

        Ok(())
    }

    fn end_element(&mut self, qname: &str) -> std::io::Result<()> {
        self.indent = self.indent.saturating_sub(1);

        if !self.has_content {
            self.print_with_nl(" />")?;
        } else {
            let close_tag = format!("</{}>", qname);
            if self.options.pretty_print {
                write!(self.writer, "{}", &Self::indent_str(self.indent))?;
            }
            self.print_with_nl(&close_tag)?;
        }

        self.has_content = self.content_stack.pop().unwrap_or(true);
        self.state = PrintState::Written;

        Ok(())
    }

    fn characters(&mut self, encoded: &str) -> std::io::Result<()> {
        self.state = PrintState::Written;
        self.close_open_tag()?;
        if encoded.is_empty() {
            return Ok(());
        }
        if self.options.pretty_print {
            write!(self.writer, "{}", &Self::indent_str(self.indent))?;
        }
        self.print_with_nl(encoded)
    }

    fn print_with_nl(&mut self, s: &str) -> std::io::Result<()> {
        if self.options.pretty_print {
            writeln!(self.writer, "{}", s)
        } else {
            write!(self.writer, "{}", s)
        }
    }

    fn indent_str(level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Converts special characters to XML entities.
pub fn to_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a node tree to a string.
pub fn print_to_string(root: &NodeRef) -> std::io::Result<String> {
    print_with(root, XmlPrinterOptions::default())
}

/// Prints a node tree to a string with indentation.
pub fn print_to_string_pretty(root: &NodeRef) -> std::io::Result<String> {
    print_with(
        root,
        XmlPrinterOptions {
            pretty_print: true,
            declaration: false,
        },
    )
}

/// Prints a node tree to a string with explicit options.
pub fn print_with(root: &NodeRef, options: XmlPrinterOptions) -> std::io::Result<String> {
    let mut output = Vec::new();
    {
        let mut printer = XmlPrinter::with_options(&mut output, options);
        printer.print(root)?;
    }
    Ok(String::from_utf8_lossy(&output).to_string())
}
