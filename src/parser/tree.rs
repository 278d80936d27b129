//! Neutral element tree built from a quick-xml event stream.
//!
//! The section and figure walkers only ever see [`XmlNode`]s, never reader
//! events, so the extraction rules stay independent of the markup library.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::ParseError;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Deepest element nesting accepted by [`XmlDocument::parse`].
pub const MAX_DEPTH: usize = 1024;

/// An attribute with its prefix resolved against the in-scope declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified name as written, e.g. `xlink:href`.
    pub name: String,
    pub local_name: String,
    /// Namespace URI bound to the prefix, `None` for unprefixed attributes.
    pub namespace: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
}

/// An element and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    local_name: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlChild>,
}

impl XmlNode {
    /// Qualified element name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the element name, without its prefix, is `name`.
    pub fn is(&self, name: &str) -> bool {
        self.local_name == name
    }

    /// Attribute value by qualified name (`id`, `xlink:href`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute value by namespace URI and local name, whatever prefix was used.
    pub fn attr_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr_value(&self, name: &str, value: &str) -> bool {
        self.attr(name) == Some(value)
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|c| match c {
            XmlChild::Element(e) => Some(e),
            XmlChild::Text(_) => None,
        })
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.elements().find(|e| e.is(name))
    }

    /// Direct child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.elements().filter(move |e| e.is(name))
    }

    /// All elements below this one in document order, excluding itself.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&XmlNode> = self.elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// First descendant with the given name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        self.descendants().find(|e| e.is(name))
    }

    /// Every descendant with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.descendants().filter(move |e| e.is(name))
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlChild::Text(t) => out.push_str(t),
                XmlChild::Element(e) => e.collect_text(out),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(XmlChild::Text(prev)) = self.children.last_mut() {
            prev.push_str(text);
        } else {
            self.children.push(XmlChild::Text(text.to_string()));
        }
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(node.elements());
        self.stack[start..].reverse();
        Some(node)
    }
}

/// A parsed, well-formed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlNode,
}

impl XmlDocument {
    /// Parse markup into a tree.
    ///
    /// Anything that is not a single well-formed element tree is rejected:
    /// mismatched or unclosed tags, text or a second element outside the root,
    /// undefined entities, broken attributes. Elements nested deeper than
    /// [`MAX_DEPTH`] are rejected too, which keeps every later walk over the
    /// tree within a bounded recursion depth.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut reader = Reader::from_str(text);
        reader.config_mut().check_end_names = true;

        let mut scopes = NamespaceScopes::new();
        let mut open: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    if open.is_empty() && root.is_some() {
                        return Err(ParseError::Malformed("multiple root elements".to_string()));
                    }
                    if open.len() >= MAX_DEPTH {
                        return Err(ParseError::Malformed("nesting too deep".to_string()));
                    }
                    open.push(build_element(e, &mut scopes)?);
                }
                Event::Empty(ref e) => {
                    if open.len() >= MAX_DEPTH {
                        return Err(ParseError::Malformed("nesting too deep".to_string()));
                    }
                    let node = build_element(e, &mut scopes)?;
                    scopes.pop();
                    attach(node, &mut open, &mut root)?;
                }
                Event::End(_) => {
                    let node = open.pop().ok_or_else(|| {
                        ParseError::Malformed("unexpected closing tag".to_string())
                    })?;
                    scopes.pop();
                    attach(node, &mut open, &mut root)?;
                }
                Event::Text(ref t) => {
                    let text = t.unescape()?;
                    append_text(&text, &mut open)?;
                }
                Event::CData(ref c) => {
                    let text = String::from_utf8_lossy(c);
                    append_text(&text, &mut open)?;
                }
                Event::Eof => break,
                // declarations, doctype, comments, processing instructions
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(ParseError::Malformed(format!(
                "unclosed element <{}>",
                unclosed.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| ParseError::Malformed("no root element".to_string()))
    }

    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    /// First element with the given name, the root included.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.root.is(name) {
            Some(&self.root)
        } else {
            self.root.find(name)
        }
    }

    /// Every element with the given name in document order, the root included.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(move |e| e.is(name))
    }
}

fn attach(
    node: XmlNode,
    open: &mut [XmlNode],
    root: &mut Option<XmlNode>,
) -> Result<(), ParseError> {
    match open.last_mut() {
        Some(parent) => parent.children.push(XmlChild::Element(node)),
        None if root.is_none() => *root = Some(node),
        None => return Err(ParseError::Malformed("multiple root elements".to_string())),
    }
    Ok(())
}

fn append_text(text: &str, open: &mut [XmlNode]) -> Result<(), ParseError> {
    match open.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {}
        None => return Err(ParseError::Malformed("text outside the root element".to_string())),
    }
    Ok(())
}

/// Stack of prefix bindings, one frame per open element.
struct NamespaceScopes {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScopes {
    fn new() -> Self {
        Self {
            frames: vec![vec![("xml".to_string(), XML_NAMESPACE.to_string())]],
        }
    }

    fn push(&mut self, bindings: Vec<(String, String)>) {
        self.frames.push(bindings);
    }

    fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Convert a start tag into a node, opening a namespace frame for it.
///
/// The caller pops the frame when the element closes.
fn build_element(
    start: &BytesStart<'_>,
    scopes: &mut NamespaceScopes,
) -> Result<XmlNode, ParseError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut raw = Vec::new();
    let mut bindings = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| ParseError::Malformed(format!("attribute in <{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            bindings.push((prefix.to_string(), value.clone()));
        }
        raw.push((key, value));
    }
    scopes.push(bindings);

    let attributes = raw
        .into_iter()
        .map(|(key, value)| {
            let (namespace, local_name) = match key.split_once(':') {
                Some((prefix, local)) => (
                    scopes.resolve(prefix).map(str::to_string),
                    local.to_string(),
                ),
                None => (None, key.clone()),
            };
            XmlAttribute {
                name: key,
                local_name,
                namespace,
                value,
            }
        })
        .collect();

    Ok(XmlNode {
        name,
        local_name,
        attributes,
        children: Vec::new(),
    })
}
