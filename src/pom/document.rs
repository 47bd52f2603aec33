use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::element::{Element, Node};
use crate::error::{BumpError, Result};

/// File name of a module descriptor
pub const POM_FILE_NAME: &str = "pom.xml";

const ROOT_ELEMENT: &str = "project";

/// A project descriptor loaded into an editable tree.
///
/// Editing only ever changes the text of existing elements; the shape of the
/// document is fixed at load time.
#[derive(Debug, Clone)]
pub struct PomDocument {
    path: PathBuf,
    nodes: Vec<Node>,
    root_index: usize,
    namespace: Option<String>,
}

impl PomDocument {
    /// Load `module_path/pom.xml` below `base_dir`.
    ///
    /// An empty `module_path` loads the descriptor in `base_dir` itself.
    ///
    /// # Returns
    /// * `Err(BumpError::DirectoryNotFound)` - If the base or module directory is missing
    /// * `Err(BumpError::Parse)` - If the descriptor is missing, unreadable or malformed
    pub fn load(base_dir: impl AsRef<Path>, module_path: &str) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let mut dir = existing_dir(base_dir.to_path_buf())?;
        if !module_path.is_empty() {
            dir = existing_dir(dir.join(module_path))?;
        }
        Self::from_file(dir.join(POM_FILE_NAME))
    }

    /// Parse the descriptor at `path`
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|e| BumpError::parse(&path, e.to_string()))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| BumpError::parse(&path, format!("not valid UTF-8: {}", e)))?;
        Self::parse(path, &content)
    }

    /// Parse descriptor markup that belongs to `path`
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let fail = |reason: String| BumpError::parse(&path, reason);

        let mut reader = Reader::from_str(content);
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut namespace = None;

        loop {
            let node = match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if open.is_empty() {
                        namespace = default_namespace(&e).map_err(&fail)?;
                    }
                    open.push(Element::new(element_name(&e).map_err(&fail)?, utf8(&e).map_err(&fail)?));
                    continue;
                }
                Ok(Event::End(_)) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| fail("unexpected closing tag".to_string()))?;
                    Node::Element(element)
                }
                Ok(Event::Empty(e)) => {
                    if open.is_empty() {
                        namespace = default_namespace(&e).map_err(&fail)?;
                    }
                    Node::Element(Element::empty(element_name(&e).map_err(&fail)?, utf8(&e).map_err(&fail)?))
                }
                Ok(Event::Text(e)) => {
                    let raw = utf8(&e).map_err(&fail)?;
                    unescape(&raw).map_err(|err| fail(err.to_string()))?;
                    Node::Text(raw)
                }
                Ok(Event::CData(e)) => Node::CData(utf8(&e).map_err(&fail)?),
                Ok(Event::Comment(e)) => Node::Comment(utf8(&e).map_err(&fail)?),
                Ok(Event::PI(e)) => Node::ProcessingInstruction(utf8(&e).map_err(&fail)?),
                Ok(Event::Decl(e)) => Node::Declaration(utf8(&e).map_err(&fail)?),
                Ok(Event::DocType(e)) => Node::DocType(utf8(&e).map_err(&fail)?),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(fail(format!(
                        "{} at position {}",
                        e,
                        reader.error_position()
                    )))
                }
            };

            match open.last_mut() {
                Some(parent) => parent.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(fail(format!("unclosed element <{}>", unclosed.name())));
        }

        let root_index = root_index(&nodes).map_err(&fail)?;

        debug!(path = %path.display(), "parsed descriptor");
        Ok(PomDocument {
            path,
            nodes,
            root_index,
            namespace,
        })
    }

    /// Path of the descriptor file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default namespace declared on the root element
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn root(&self) -> &Element {
        match &self.nodes[self.root_index] {
            Node::Element(e) => e,
            _ => unreachable!("root index always points at an element"),
        }
    }

    fn root_mut(&mut self) -> &mut Element {
        match &mut self.nodes[self.root_index] {
            Node::Element(e) => e,
            _ => unreachable!("root index always points at an element"),
        }
    }

    /// Element reached by following `path` from the root
    pub fn element(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self.root(), |current, name| current.child(name))
    }

    pub fn element_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self.root_mut();
        for name in path {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Text at `path`, or `None` if any segment is missing
    pub fn child_text(&self, path: &[&str]) -> Option<String> {
        self.element(path).map(Element::text)
    }

    /// Overwrite the text at `path`.
    ///
    /// Fails with a state error if the path does not resolve; elements are
    /// never created.
    pub fn set_child_text(&mut self, path: &[&str], value: &str) -> Result<()> {
        let location = path.join("/");
        let file = self.path.display().to_string();
        let element = self.element_mut(path).ok_or_else(|| {
            BumpError::state(format!("no element {} in {}", location, file))
        })?;
        element.set_text(value);
        debug!(path = %location, value, "set element text");
        Ok(())
    }

    /// Immediate child elements at `path`, empty if the path does not resolve
    pub fn children(&self, path: &[&str]) -> Vec<&Element> {
        self.element(path)
            .map(|e| e.elements().collect())
            .unwrap_or_default()
    }

    /// Serialize the whole document with `\n` line endings
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.render_into(&mut out);
        }
        out.replace("\r\n", "\n")
    }

    /// Write the document back to its file, replacing the previous content
    pub fn save(&self) -> Result<()> {
        let rendered = self.render();
        fs::write(&self.path, rendered.as_bytes())?;
        debug!(path = %self.path.display(), bytes = rendered.len(), "saved descriptor");
        Ok(())
    }
}

fn existing_dir(dir: PathBuf) -> Result<PathBuf> {
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(BumpError::DirectoryNotFound(dir))
    }
}

fn utf8(bytes: &[u8]) -> std::result::Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

fn element_name(start: &BytesStart) -> std::result::Result<String, String> {
    utf8(start.name().as_ref())
}

fn default_namespace(start: &BytesStart) -> std::result::Result<Option<String>, String> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == b"xmlns" {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn root_index(nodes: &[Node]) -> std::result::Result<usize, String> {
    let mut root = None;
    for (index, node) in nodes.iter().enumerate() {
        match node {
            Node::Element(e) => {
                if root.is_some() {
                    return Err(format!("more than one root element, found <{}>", e.name()));
                }
                if e.local_name() != ROOT_ELEMENT {
                    return Err(format!(
                        "root element is <{}>, expected <{}>",
                        e.name(),
                        ROOT_ELEMENT
                    ));
                }
                root = Some(index);
            }
            Node::Text(text) if !text.trim().is_empty() => {
                return Err("text outside of the root element".to_string());
            }
            _ => {}
        }
    }
    root.ok_or_else(|| "no root element".to_string())
}
