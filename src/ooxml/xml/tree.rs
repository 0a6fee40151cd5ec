//! Namespace-aware, lossless XML tree for package parts.
//!
//! Every node that is not an element (text, CDATA, comments, processing
//! instructions, the declaration) is kept as an opaque passthrough node so
//! that a parse followed by [`Tree::serialize`] reproduces the part. Text and
//! attribute values are stored in their escaped form and only unescaped on
//! request.

use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::unit::{self, Emu};
use crate::common::xml::{escape_text, escape_xml, unescape_xml};
use crate::ooxml::error::{ElementError, FormatError, Result};
use crate::ooxml::xml::namespace;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Markers recording which transformations have been applied to a tree.
///
/// They are kept next to the tree rather than written into the XML, and
/// prevent a second application of a non-idempotent pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformState {
    /// Geometry and text direction have been mirrored
    pub mirrored: bool,
    /// Horizontal bar value axes have been reversed
    pub orientation_reversed: bool,
    /// Translated text has been written into the tree
    pub text_injected: bool,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped as it appeared in the source
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

impl Node {
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// An attribute with its qualified name and escaped value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    ns: Option<Arc<str>>,
    value: String,
}

impl Attribute {
    /// Qualified name as written (`r:id`, `algn`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local part of the name.
    #[inline]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Resolved namespace URI. Unprefixed attributes have none.
    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    /// Value in escaped form.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    local_start: usize,
    ns: Option<Arc<str>>,
    attrs: Vec<Attribute>,
    pub(crate) children: Vec<Node>,
    collapsed: bool,
}

impl Element {
    /// Create an element in a namespace with the given prefix.
    pub fn new(prefix: &str, ns: &str, local: &str) -> Self {
        let (name, local_start) = if prefix.is_empty() {
            (local.to_string(), 0)
        } else {
            (format!("{}:{}", prefix, local), prefix.len() + 1)
        };
        Self {
            name,
            local_start,
            ns: Some(Arc::from(ns)),
            attrs: Vec::new(),
            children: Vec::new(),
            collapsed: true,
        }
    }

    /// Create an element with the same prefix and namespace as `self`.
    pub fn sibling(&self, local: &str) -> Self {
        Self {
            name: format!("{}{}", &self.name[..self.local_start], local),
            local_start: self.local_start,
            ns: self.ns.clone(),
            attrs: Vec::new(),
            children: Vec::new(),
            collapsed: true,
        }
    }

    /// Add an attribute, returning the element (builder style).
    pub fn with_attr(mut self, local: &str, value: &str) -> Self {
        self.set_attr(local, value);
        self
    }

    /// Qualified name as written.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.name[self.local_start..]
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        if self.local_start == 0 {
            ""
        } else {
            &self.name[..self.local_start - 1]
        }
    }

    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    /// Check namespace and local name.
    #[inline]
    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.local_name() == local && self.namespace() == Some(ns)
    }

    /// Rename the element, keeping its prefix and namespace.
    pub fn set_local_name(&mut self, local: &str) {
        self.name.truncate(self.local_start);
        self.name.push_str(local);
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Get an unprefixed attribute value (escaped form).
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.ns.is_none() && a.name == local)
            .map(|a| a.value.as_str())
    }

    /// Get a namespace-qualified attribute value (escaped form).
    pub fn attr_ns(&self, ns: &str, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.namespace() == Some(ns) && a.local_name() == local)
            .map(|a| a.value.as_str())
    }

    /// Set an unprefixed attribute. Existing attributes keep their position.
    pub fn set_attr(&mut self, local: &str, value: &str) {
        let value = escape_xml(value);
        match self
            .attrs
            .iter_mut()
            .find(|a| a.ns.is_none() && a.name == local)
        {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute {
                name: local.to_string(),
                ns: None,
                value,
            }),
        }
    }

    /// Remove an unprefixed attribute, returning its old value.
    pub fn remove_attr(&mut self, local: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.ns.is_none() && a.name == local)?;
        Some(self.attrs.remove(pos).value)
    }

    /// Parse an integer attribute.
    #[inline]
    pub fn attr_emu(&self, local: &str) -> Option<Emu> {
        self.attr(local).and_then(unit::parse_emu)
    }

    /// Parse an `xsd:boolean` attribute.
    pub fn attr_bool(&self, local: &str) -> Option<bool> {
        self.attr(local).and_then(|s| match s {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        })
    }

    /// Write a coordinate, rejecting values outside `ST_Coordinate`.
    pub fn set_emu(&mut self, local: &str, value: Emu) -> std::result::Result<(), ElementError> {
        if !unit::is_coordinate(value) {
            return Err(ElementError::Domain {
                attr: local.to_string(),
                value: unit::format_emu(value),
            });
        }
        self.set_attr(local, &unit::format_emu(value));
        Ok(())
    }

    /// Write an enumerated token, rejecting values outside `allowed`.
    pub fn set_token(
        &mut self,
        local: &str,
        value: &str,
        allowed: &[&str],
    ) -> std::result::Result<(), ElementError> {
        if !allowed.contains(&value) {
            return Err(ElementError::Domain {
                attr: local.to_string(),
                value: value.to_string(),
            });
        }
        self.set_attr(local, value);
        Ok(())
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Unescaped direct character data of this element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => text.push_str(&unescape_xml(raw)),
                Node::CData(raw) => text.push_str(raw),
                _ => {},
            }
        }
        text
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(escape_text(text)));
        }
        self.collapsed = text.is_empty();
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            if attr.value.contains('"') {
                out.push_str(&attr.value.replace('"', "&quot;"));
            } else {
                out.push_str(&attr.value);
            }
            out.push('"');
        }
        if self.children.is_empty() && self.collapsed {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(e) => e.write(out),
        Node::Text(raw) => out.push_str(raw),
        Node::CData(raw) => {
            out.push_str("<![CDATA[");
            out.push_str(raw);
            out.push_str("]]>");
        },
        Node::Comment(raw) => {
            out.push_str("<!--");
            out.push_str(raw);
            out.push_str("-->");
        },
        Node::ProcessingInstruction(raw) | Node::Declaration(raw) => {
            out.push_str("<?");
            out.push_str(raw);
            out.push_str("?>");
        },
        Node::DocType(raw) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(raw);
            out.push('>');
        },
    }
}

/// A parsed part.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    bom: bool,
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
    /// Transformations applied so far. Never serialized.
    pub state: TransformState,
}

impl Tree {
    /// Wrap a root element in a fresh tree with a standard declaration.
    pub fn new(root: Element) -> Self {
        Self {
            bom: false,
            prolog: vec![
                Node::Declaration(r#"xml version="1.0" encoding="UTF-8" standalone="yes""#.into()),
                Node::Text("\r\n".into()),
            ],
            root,
            epilog: Vec::new(),
            state: TransformState::default(),
        }
    }

    /// Parse bytes that do not belong to a named part.
    #[inline]
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_part("<memory>", bytes)
    }

    /// Parse a part, naming it in any [`FormatError::MalformedXml`].
    pub fn parse_part(part: &str, bytes: &[u8]) -> Result<Self> {
        let (bom, body) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, bytes),
        };

        let mut reader = Reader::from_reader(body);
        let mut buf = Vec::new();
        let mut builder = Builder::default();
        let mut scopes = NamespaceScopes::default();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| FormatError::malformed(part, e))?;
            match event {
                Event::Start(ref e) => {
                    let mark = scopes.mark();
                    let element =
                        open_element(e, &mut scopes, false).map_err(|e| FormatError::malformed(part, e))?;
                    builder.stack.push((element, mark));
                },
                Event::Empty(ref e) => {
                    let mark = scopes.mark();
                    let element =
                        open_element(e, &mut scopes, true).map_err(|e| FormatError::malformed(part, e))?;
                    scopes.reset(mark);
                    builder
                        .attach(Node::Element(element))
                        .map_err(|e| FormatError::malformed(part, e))?;
                },
                Event::End(_) => {
                    let (element, mark) = builder
                        .stack
                        .pop()
                        .ok_or_else(|| FormatError::malformed(part, "unbalanced end tag"))?;
                    scopes.reset(mark);
                    builder
                        .attach(Node::Element(element))
                        .map_err(|e| FormatError::malformed(part, e))?;
                },
                Event::Text(ref t) => builder.push_text(&utf8(t, part)?),
                Event::GeneralRef(ref r) => {
                    let name = utf8(r, part)?;
                    builder.push_text(&format!("&{};", name));
                },
                Event::CData(ref c) => builder
                    .attach(Node::CData(utf8(c, part)?))
                    .map_err(|e| FormatError::malformed(part, e))?,
                Event::Comment(ref c) => builder
                    .attach(Node::Comment(utf8(c, part)?))
                    .map_err(|e| FormatError::malformed(part, e))?,
                Event::PI(ref p) => builder
                    .attach(Node::ProcessingInstruction(utf8(p, part)?))
                    .map_err(|e| FormatError::malformed(part, e))?,
                Event::Decl(ref d) => builder
                    .attach(Node::Declaration(utf8(d, part)?))
                    .map_err(|e| FormatError::malformed(part, e))?,
                Event::DocType(ref d) => builder
                    .attach(Node::DocType(utf8(d, part)?))
                    .map_err(|e| FormatError::malformed(part, e))?,
                Event::Eof => break,
            }
            buf.clear();
        }

        if !builder.stack.is_empty() {
            return Err(FormatError::malformed(part, "unclosed element at end of input"));
        }
        let root = builder
            .root
            .ok_or_else(|| FormatError::malformed(part, "no root element"))?;

        Ok(Self {
            bom,
            prolog: builder.prolog,
            root,
            epilog: builder.epilog,
            state: TransformState::default(),
        })
    }

    #[inline]
    pub fn root(&self) -> &Element {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize the tree back to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        if self.bom {
            out.push('\u{FEFF}');
        }
        for node in &self.prolog {
            write_node(node, &mut out);
        }
        self.root.write(&mut out);
        for node in &self.epilog {
            write_node(node, &mut out);
        }
        out.into_bytes()
    }
}

fn utf8(bytes: &[u8], part: &str) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| FormatError::malformed(part, e))
}

/// In-scope `xmlns` declarations, innermost last.
struct NamespaceScopes {
    bindings: Vec<(String, Arc<str>)>,
}

impl Default for NamespaceScopes {
    fn default() -> Self {
        Self {
            bindings: vec![("xml".to_string(), Arc::from(namespace::XML))],
        }
    }
}

impl NamespaceScopes {
    #[inline]
    fn mark(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    fn reset(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }

    fn resolve(&self, prefix: &str) -> Option<Arc<str>> {
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }
}

fn open_element(
    start: &BytesStart,
    scopes: &mut NamespaceScopes,
    collapsed: bool,
) -> std::result::Result<Element, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_owned();

    let mut raw = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_owned();
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| e.to_string())?
            .to_owned();
        if key == "xmlns" {
            scopes.bindings.push((String::new(), Arc::from(unescape_xml(&value))));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scopes
                .bindings
                .push((prefix.to_string(), Arc::from(unescape_xml(&value))));
        }
        raw.push((key, value));
    }

    let (prefix, local_start) = match name.find(':') {
        Some(pos) => (&name[..pos], pos + 1),
        None => ("", 0),
    };
    let ns = scopes.resolve(prefix);

    let attrs = raw
        .into_iter()
        .map(|(key, value)| {
            let ns = match key.split_once(':') {
                Some(("xmlns", _)) => None,
                Some((prefix, _)) => scopes.resolve(prefix),
                None => None,
            };
            Attribute {
                name: key,
                ns,
                value,
            }
        })
        .collect();

    Ok(Element {
        name,
        local_start,
        ns,
        attrs,
        children: Vec::new(),
        collapsed,
    })
}

#[derive(Default)]
struct Builder {
    stack: Vec<(Element, usize)>,
    root: Option<Element>,
    prolog: Vec<Node>,
    epilog: Vec<Node>,
}

impl Builder {
    fn target(&mut self) -> &mut Vec<Node> {
        if let Some((parent, _)) = self.stack.last_mut() {
            &mut parent.children
        } else if self.root.is_none() {
            &mut self.prolog
        } else {
            &mut self.epilog
        }
    }

    fn attach(&mut self, node: Node) -> std::result::Result<(), String> {
        if self.stack.is_empty() {
            if let Node::Element(element) = node {
                if self.root.is_some() {
                    return Err("multiple root elements".to_string());
                }
                self.root = Some(element);
                return Ok(());
            }
        }
        self.target().push(node);
        Ok(())
    }

    fn push_text(&mut self, raw: &str) {
        let target = self.target();
        if let Some(Node::Text(existing)) = target.last_mut() {
            existing.push_str(raw);
        } else {
            target.push(Node::Text(raw.to_string()));
        }
    }
}
