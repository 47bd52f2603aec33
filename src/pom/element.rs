use std::borrow::Cow;

use quick_xml::escape::{partial_escape, unescape};

/// A node of a parsed descriptor.
///
/// Markup is kept as it appeared in the source (text stays escaped) so that
/// rendering an untouched tree reproduces the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

/// An element and its ordered content.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    /// Everything between `<` and `>` of the start tag: name plus attributes.
    start_tag: String,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>, start_tag: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            start_tag: start_tag.into(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    pub(crate) fn empty(name: impl Into<String>, start_tag: impl Into<String>) -> Self {
        Element {
            self_closing: true,
            ..Element::new(name, start_tag)
        }
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Qualified name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without any namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// First child element with the given local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(e) if e.local_name() == name => Some(e),
            _ => None,
        })
    }

    /// Child elements in document order, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Trimmed, unescaped text content of this element
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => text.push_str(&unescape_or_raw(raw)),
                Node::CData(raw) => text.push_str(raw),
                _ => {}
            }
        }
        text.trim().to_string()
    }

    /// Text of the named child, or `None` if there is no such child
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    /// Replace the whole content of this element with `value`
    pub fn set_text(&mut self, value: &str) {
        self.children = vec![Node::Text(partial_escape(value).into_owned())];
        self.self_closing = false;
    }

    pub(crate) fn render_into(&self, out: &mut String) {
        if self.self_closing && self.children.is_empty() {
            out.push('<');
            out.push_str(&self.start_tag);
            out.push_str("/>");
            return;
        }

        out.push('<');
        out.push_str(&self.start_tag);
        out.push('>');
        for node in &self.children {
            node.render_into(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    pub(crate) fn render_into(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.render_into(out),
            Node::Text(raw) => out.push_str(raw),
            Node::CData(raw) => {
                out.push_str("<![CDATA[");
                out.push_str(raw);
                out.push_str("]]>");
            }
            Node::Comment(raw) => {
                out.push_str("<!--");
                out.push_str(raw);
                out.push_str("-->");
            }
            Node::ProcessingInstruction(raw) | Node::Declaration(raw) => {
                out.push_str("<?");
                out.push_str(raw);
                out.push_str("?>");
            }
            Node::DocType(raw) => {
                out.push_str("<!DOCTYPE");
                if !raw.starts_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(raw);
                out.push('>');
            }
        }
    }
}

// Parsing rejects undecodable text, so the fallback only covers trees built in memory.
fn unescape_or_raw(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or(Cow::Borrowed(raw))
}
